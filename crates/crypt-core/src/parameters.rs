//! The restricted model-parameter environment.
//!
//! A crypt run reads its geometry and timing from a fixed set of named
//! parameters. Callers may overwrite a parameter with a value of the same
//! kind, but the set of names itself is closed: defining a new name or
//! removing an existing one always fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised by the parameter environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// New names may not be defined.
    #[error("new names may not be defined in a restricted environment: {name}")]
    DefineForbidden {
        /// The rejected name.
        name: String,
    },

    /// Names may not be removed.
    #[error("definitions may not be removed from a restricted environment: {name}")]
    RemoveForbidden {
        /// The rejected name.
        name: String,
    },

    /// The name has no definition.
    #[error("name is not defined: {name}")]
    Undefined {
        /// The missing name.
        name: String,
    },

    /// An overwrite tried to change the kind of a value.
    #[error("new definition for '{name}' has a different type: expected {expected}, got {found}")]
    KindMismatch {
        /// The parameter name.
        name: String,
        /// Kind of the current definition.
        expected: &'static str,
        /// Kind of the rejected value.
        found: &'static str,
    },

    /// A scalar lookup hit a non-scalar value.
    #[error("parameter '{name}' is not a number")]
    NotANumber {
        /// The parameter name.
        name: String,
    },
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single number.
    Number(f64),
    /// A flat array of numbers.
    Array(Vec<f64>),
}

impl ParamValue {
    /// Name of the value's kind, for error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Array(_) => "array",
        }
    }

    /// The scalar value, if this is a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Array(_) => None,
        }
    }
}

/// Name → value store with a closed set of names.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEnvironment {
    bindings: BTreeMap<String, ParamValue>,
}

impl Default for ParameterEnvironment {
    /// The crypt model defaults.
    fn default() -> Self {
        Self::with_definitions([
            ("cells_across", 14.0),
            ("crypt_width", 10.0),
            ("crypt_length", 20.0),
            ("cells_up", 24.0),
            ("thickness_of_ghost_layer", 2.0),
            ("end_time", 50.0),
            ("dt_divisor", 360.0),
        ])
    }
}

impl ParameterEnvironment {
    /// Seed an environment with numeric definitions. These are the only
    /// names it will ever hold.
    pub fn with_definitions<'a>(definitions: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            bindings: definitions
                .into_iter()
                .map(|(name, value)| (name.to_owned(), ParamValue::Number(value)))
                .collect(),
        }
    }

    /// Always fails: the set of names is closed.
    #[allow(clippy::unused_self, clippy::needless_pass_by_ref_mut)]
    pub fn define(&mut self, name: &str, _value: ParamValue) -> Result<(), ParameterError> {
        Err(ParameterError::DefineForbidden {
            name: name.to_owned(),
        })
    }

    /// Always fails: the set of names is closed.
    #[allow(clippy::unused_self, clippy::needless_pass_by_ref_mut)]
    pub fn remove(&mut self, name: &str) -> Result<(), ParameterError> {
        Err(ParameterError::RemoveForbidden {
            name: name.to_owned(),
        })
    }

    /// Replace the value of an existing name with a value of the same kind.
    pub fn overwrite(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let current = self
            .bindings
            .get_mut(name)
            .ok_or_else(|| ParameterError::Undefined {
                name: name.to_owned(),
            })?;
        if current.kind() != value.kind() {
            return Err(ParameterError::KindMismatch {
                name: name.to_owned(),
                expected: current.kind(),
                found: value.kind(),
            });
        }
        *current = value;
        Ok(())
    }

    /// Look up a value by name.
    pub fn lookup(&self, name: &str) -> Result<&ParamValue, ParameterError> {
        self.bindings
            .get(name)
            .ok_or_else(|| ParameterError::Undefined {
                name: name.to_owned(),
            })
    }

    /// Look up a scalar value by name.
    pub fn number(&self, name: &str) -> Result<f64, ParameterError> {
        self.lookup(name)?
            .as_number()
            .ok_or_else(|| ParameterError::NotANumber {
                name: name.to_owned(),
            })
    }

    /// Apply a batch of overwrites in name order. Stops at the first error.
    pub fn overwrite_all(
        &mut self,
        overrides: &BTreeMap<String, ParamValue>,
    ) -> Result<(), ParameterError> {
        for (name, value) in overrides {
            self.overwrite(name, value.clone())?;
        }
        Ok(())
    }

    /// Defined names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
