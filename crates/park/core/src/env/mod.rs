//! Traits describing read-only collaborators.
//!
//! Oracles expose object definitions (prices, ride limits) and localised
//! text. The [`Env`] aggregate bundles them so commands can reach everything
//! they need without hard coupling to concrete implementations.
mod error;
mod objects;
mod strings;

pub use error::OracleError;
pub use objects::{BannerEntry, ObjectOracle, RideEntry, StaticObjects};
pub use strings::{EnglishStrings, LocalisationOracle, StringId};

/// Aggregates read-only oracles required by the engine and the commands.
pub struct Env<'a, O, L>
where
    O: ObjectOracle + ?Sized,
    L: LocalisationOracle + ?Sized,
{
    objects: Option<&'a O>,
    strings: Option<&'a L>,
}

pub type ParkEnv<'a> = Env<'a, dyn ObjectOracle + 'a, dyn LocalisationOracle + 'a>;

impl<O, L> Clone for Env<'_, O, L>
where
    O: ObjectOracle + ?Sized,
    L: LocalisationOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, L> Copy for Env<'_, O, L>
where
    O: ObjectOracle + ?Sized,
    L: LocalisationOracle + ?Sized,
{
}

impl<'a, O, L> Env<'a, O, L>
where
    O: ObjectOracle + ?Sized,
    L: LocalisationOracle + ?Sized,
{
    pub fn new(objects: Option<&'a O>, strings: Option<&'a L>) -> Self {
        Self { objects, strings }
    }

    pub fn with_all(objects: &'a O, strings: &'a L) -> Self {
        Self::new(Some(objects), Some(strings))
    }

    pub fn empty() -> Self {
        Self {
            objects: None,
            strings: None,
        }
    }

    /// Returns the ObjectOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ObjectsNotAvailable` if no object oracle was provided.
    pub fn objects(&self) -> Result<&'a O, OracleError> {
        self.objects.ok_or(OracleError::ObjectsNotAvailable)
    }

    /// Returns the LocalisationOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::StringsNotAvailable` if no localisation oracle was provided.
    pub fn strings(&self) -> Result<&'a L, OracleError> {
        self.strings.ok_or(OracleError::StringsNotAvailable)
    }
}

impl<'a, O, L> Env<'a, O, L>
where
    O: ObjectOracle + 'a,
    L: LocalisationOracle + 'a,
{
    /// Converts this environment into a trait-object based `ParkEnv`.
    pub fn as_park_env(&self) -> ParkEnv<'a> {
        let objects: Option<&'a dyn ObjectOracle> = self.objects.map(|objects| objects as _);
        let strings: Option<&'a dyn LocalisationOracle> = self.strings.map(|strings| strings as _);
        Env::new(objects, strings)
    }
}
