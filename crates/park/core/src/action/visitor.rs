//! Structural access to the typed fields of a command body.
//!
//! Every body exposes its fields, in a fixed order and under stable names,
//! through [`ParameterVisitor`]. The wire codec and the reflection helpers
//! below are both visitors, so serialization and reflection cannot drift
//! apart.

use std::fmt;

use crate::state::{CoordsXY, CoordsXYZ, CoordsXYZD, MapRange};

use super::ActionBody;

/// Receives each field of a body in declaration order.
///
/// Composite coordinate types are decomposed into their primitive components
/// so the traversal stays flat.
pub trait ParameterVisitor {
    fn visit_bool(&mut self, name: &'static str, value: &mut bool);
    fn visit_u8(&mut self, name: &'static str, value: &mut u8);
    fn visit_u16(&mut self, name: &'static str, value: &mut u16);
    fn visit_u32(&mut self, name: &'static str, value: &mut u32);
    fn visit_i32(&mut self, name: &'static str, value: &mut i32);
    fn visit_i64(&mut self, name: &'static str, value: &mut i64);
    fn visit_string(&mut self, name: &'static str, value: &mut String);

    fn visit_coords_xy(&mut self, value: &mut CoordsXY) {
        self.visit_i32("x", &mut value.x);
        self.visit_i32("y", &mut value.y);
    }

    fn visit_coords_xyz(&mut self, value: &mut CoordsXYZ) {
        self.visit_i32("x", &mut value.x);
        self.visit_i32("y", &mut value.y);
        self.visit_i32("z", &mut value.z);
    }

    fn visit_coords_xyzd(&mut self, value: &mut CoordsXYZD) {
        self.visit_i32("x", &mut value.x);
        self.visit_i32("y", &mut value.y);
        self.visit_i32("z", &mut value.z);
        self.visit_u8("direction", &mut value.direction);
    }

    fn visit_map_range(&mut self, value: &mut MapRange) {
        self.visit_i32("x1", &mut value.x1);
        self.visit_i32("y1", &mut value.y1);
        self.visit_i32("x2", &mut value.x2);
        self.visit_i32("y2", &mut value.y2);
    }
}

/// A single reflected field value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    I64(i64),
    String(String),
}

impl ParameterValue {
    /// Integer view of numeric values; `None` for bools and strings.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::U8(value) => Some(i64::from(value)),
            Self::U16(value) => Some(i64::from(value)),
            Self::U32(value) => Some(i64::from(value)),
            Self::I32(value) => Some(i64::from(value)),
            Self::I64(value) => Some(value),
            Self::Bool(_) | Self::String(_) => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            other => match other.as_i64() {
                Some(value) => write!(f, "{value}"),
                None => Ok(()),
            },
        }
    }
}

/// Ordered `name -> value` list. Names repeat when a body visits two
/// composites with the same component names.
pub type ParameterList = Vec<(&'static str, ParameterValue)>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter `{0}` missing")]
    Missing(&'static str),

    #[error("parameter `{name}` expects {expected}, got {found}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("parameter `{name}` value {value} out of range")]
    OutOfRange { name: &'static str, value: i64 },
}

/// Enumerates a body's fields in traversal order.
pub fn collect_parameters(body: &ActionBody) -> ParameterList {
    let mut collector = Collector::default();
    body.clone().accept_parameters(&mut collector);
    collector.values
}

/// Fills a body's fields from a `name -> value` list.
///
/// The n-th visit of a name takes the n-th entry with that name. Integer
/// values convert between widths when they fit.
pub fn assign_parameters(
    body: &mut ActionBody,
    values: &[(&str, ParameterValue)],
) -> Result<(), ParameterError> {
    let mut assigner = Assigner {
        values,
        seen: Vec::new(),
        error: None,
    };
    body.accept_parameters(&mut assigner);
    match assigner.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[derive(Default)]
struct Collector {
    values: ParameterList,
}

impl ParameterVisitor for Collector {
    fn visit_bool(&mut self, name: &'static str, value: &mut bool) {
        self.values.push((name, ParameterValue::Bool(*value)));
    }

    fn visit_u8(&mut self, name: &'static str, value: &mut u8) {
        self.values.push((name, ParameterValue::U8(*value)));
    }

    fn visit_u16(&mut self, name: &'static str, value: &mut u16) {
        self.values.push((name, ParameterValue::U16(*value)));
    }

    fn visit_u32(&mut self, name: &'static str, value: &mut u32) {
        self.values.push((name, ParameterValue::U32(*value)));
    }

    fn visit_i32(&mut self, name: &'static str, value: &mut i32) {
        self.values.push((name, ParameterValue::I32(*value)));
    }

    fn visit_i64(&mut self, name: &'static str, value: &mut i64) {
        self.values.push((name, ParameterValue::I64(*value)));
    }

    fn visit_string(&mut self, name: &'static str, value: &mut String) {
        self.values.push((name, ParameterValue::String(value.clone())));
    }
}

struct Assigner<'v, 'n> {
    values: &'v [(&'n str, ParameterValue)],
    seen: Vec<(&'static str, usize)>,
    error: Option<ParameterError>,
}

impl<'v> Assigner<'v, '_> {
    /// Next unconsumed value for `name`.
    fn take(&mut self, name: &'static str) -> Option<&'v ParameterValue> {
        if self.error.is_some() {
            return None;
        }
        let occurrence = match self.seen.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => {
                *count += 1;
                *count - 1
            }
            None => {
                self.seen.push((name, 1));
                0
            }
        };
        let values = self.values;
        let found = values
            .iter()
            .filter(|(candidate, _)| *candidate == name)
            .nth(occurrence)
            .map(|(_, value)| value);
        if found.is_none() {
            self.error = Some(ParameterError::Missing(name));
        }
        found
    }

    fn integer<T>(&mut self, name: &'static str, expected: &'static str, slot: &mut T)
    where
        T: TryFrom<i64>,
    {
        let Some(value) = self.take(name) else {
            return;
        };
        let Some(raw) = value.as_i64() else {
            let found = value.type_name();
            self.error = Some(ParameterError::TypeMismatch {
                name,
                expected,
                found,
            });
            return;
        };
        match T::try_from(raw) {
            Ok(converted) => *slot = converted,
            Err(_) => self.error = Some(ParameterError::OutOfRange { name, value: raw }),
        }
    }
}

impl ParameterVisitor for Assigner<'_, '_> {
    fn visit_bool(&mut self, name: &'static str, value: &mut bool) {
        match self.take(name) {
            Some(ParameterValue::Bool(assigned)) => *value = *assigned,
            Some(other) => {
                let found = other.type_name();
                self.error = Some(ParameterError::TypeMismatch {
                    name,
                    expected: "bool",
                    found,
                });
            }
            None => {}
        }
    }

    fn visit_u8(&mut self, name: &'static str, value: &mut u8) {
        self.integer(name, "u8", value);
    }

    fn visit_u16(&mut self, name: &'static str, value: &mut u16) {
        self.integer(name, "u16", value);
    }

    fn visit_u32(&mut self, name: &'static str, value: &mut u32) {
        self.integer(name, "u32", value);
    }

    fn visit_i32(&mut self, name: &'static str, value: &mut i32) {
        self.integer(name, "i32", value);
    }

    fn visit_i64(&mut self, name: &'static str, value: &mut i64) {
        self.integer(name, "i64", value);
    }

    fn visit_string(&mut self, name: &'static str, value: &mut String) {
        match self.take(name) {
            Some(ParameterValue::String(assigned)) => value.clone_from(assigned),
            Some(other) => {
                let found = other.type_name();
                self.error = Some(ParameterError::TypeMismatch {
                    name,
                    expected: "string",
                    found,
                });
            }
            None => {}
        }
    }
}
