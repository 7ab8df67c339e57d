//! Wire tag to empty-body factories.
//!
//! The codec materializes an empty shell of the right kind here before
//! filling in its fields.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::{ErrorSeverity, ParkError};

use super::{ActionBody, BUILTIN_FACTORIES, CommandKind};

/// Produces an empty body of one command kind.
pub type ActionFactory = fn() -> ActionBody;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistryError {
    #[error("unknown command tag {0}")]
    UnknownCommand(u32),

    #[error("command {0} registered twice")]
    DuplicateCommand(CommandKind),

    #[error("factory registered for {expected} builds {found}")]
    KindMismatch {
        expected: CommandKind,
        found: CommandKind,
    },
}

impl ParkError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RegistryError::UnknownCommand(_) => ErrorSeverity::Validation,
            RegistryError::DuplicateCommand(_) | RegistryError::KindMismatch { .. } => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::UnknownCommand(_) => "REGISTRY_UNKNOWN_COMMAND",
            RegistryError::DuplicateCommand(_) => "REGISTRY_DUPLICATE_COMMAND",
            RegistryError::KindMismatch { .. } => "REGISTRY_KIND_MISMATCH",
        }
    }
}

static GLOBAL: LazyLock<ActionRegistry> = LazyLock::new(ActionRegistry::builtin);

/// Mapping from wire tag to factory.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    factories: BTreeMap<u32, (CommandKind, ActionFactory)>,
}

impl ActionRegistry {
    /// Process-wide registry holding every built-in command, built on first use.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command.
    pub fn builtin() -> Self {
        let factories = BUILTIN_FACTORIES
            .iter()
            .map(|(kind, factory)| (kind.tag(), (*kind, *factory)))
            .collect();
        Self { factories }
    }

    /// Adds a factory.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateCommand` if `kind` is already present,
    /// or `RegistryError::KindMismatch` if `factory` builds a different kind.
    pub fn register(
        &mut self,
        kind: CommandKind,
        factory: ActionFactory,
    ) -> Result<(), RegistryError> {
        let found = factory().kind();
        if found != kind {
            return Err(RegistryError::KindMismatch {
                expected: kind,
                found,
            });
        }
        if self.factories.contains_key(&kind.tag()) {
            return Err(RegistryError::DuplicateCommand(kind));
        }
        self.factories.insert(kind.tag(), (kind, factory));
        Ok(())
    }

    /// Resolves a wire tag to its command kind.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownCommand` for unregistered tags.
    pub fn kind(&self, tag: u32) -> Result<CommandKind, RegistryError> {
        self.factories
            .get(&tag)
            .map(|(kind, _)| *kind)
            .ok_or(RegistryError::UnknownCommand(tag))
    }

    /// Builds an empty body for a wire tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownCommand` for unregistered tags; no partial
    /// body is ever produced.
    pub fn create(&self, tag: u32) -> Result<ActionBody, RegistryError> {
        self.factories
            .get(&tag)
            .map(|(_, factory)| factory())
            .ok_or(RegistryError::UnknownCommand(tag))
    }

    pub fn kinds(&self) -> impl Iterator<Item = CommandKind> + '_ {
        self.factories.values().map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
