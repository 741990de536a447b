use alloc::boxed::Box;
use alloc::string::String;
use owo_colors::OwoColorize;

use crate::FieldId;
use crate::field::short_name;

/// Errors that can occur when reading a field out of a partial.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum FieldError {
    /// The field has no cell and the partial has no backing record.
    MissingField {
        /// The field that was read.
        field: FieldId,
    },

    /// The field has a cell, but it could not be turned into a value: a
    /// nested partial that does not build yet, or (unreachable through typed
    /// tokens) a cell of another type.
    InvalidValue {
        /// The field that was read.
        field: FieldId,
        /// Debug rendering of what the cell holds.
        actual: String,
        /// Why the nested partial did not build, if that was the problem.
        source: Option<Box<ConstructionError>>,
    },
}

impl FieldError {
    /// The field the error is about.
    pub fn field(&self) -> FieldId {
        match self {
            FieldError::MissingField { field } | FieldError::InvalidValue { field, .. } => *field,
        }
    }

    /// Whether this is [`FieldError::MissingField`].
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldError::MissingField { .. })
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FieldError::MissingField { field } => {
                write!(
                    f,
                    "Field '{}::{}' is not set and there is no backing value",
                    short_name(field.record()).blue(),
                    field.name().yellow()
                )
            }
            FieldError::InvalidValue {
                field,
                actual,
                source,
            } => {
                write!(
                    f,
                    "Field '{}::{}' holds {} which is not a valid {}",
                    short_name(field.record()).blue(),
                    field.name().yellow(),
                    actual.red(),
                    short_name(field.value_type_name()).green()
                )?;
                if let Some(source) = source {
                    write!(f, ": {source}")?;
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            FieldError::InvalidValue {
                source: Some(source),
                ..
            } => Some(&**source),
            _ => None,
        }
    }
}

/// Errors that can occur when building a complete record out of a partial.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum ConstructionError {
    /// A required field could not be read. Construction stops at the first one.
    Field(FieldError),

    /// The fields were all readable, but the record refused them.
    Rejected {
        /// Type name of the record being built.
        record: &'static str,
        /// Why.
        reason: String,
    },
}

impl ConstructionError {
    /// Creates a [`ConstructionError::Rejected`] for the record type `W`.
    pub fn rejected<W>(reason: impl Into<String>) -> Self {
        ConstructionError::Rejected {
            record: core::any::type_name::<W>(),
            reason: reason.into(),
        }
    }

    /// The field error behind this failure, if any.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            ConstructionError::Field(err) => Some(err),
            ConstructionError::Rejected { .. } => None,
        }
    }
}

impl From<FieldError> for ConstructionError {
    fn from(err: FieldError) -> Self {
        ConstructionError::Field(err)
    }
}

impl core::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConstructionError::Field(err) => write!(f, "Could not build record: {err}"),
            ConstructionError::Rejected { record, reason } => {
                write!(
                    f,
                    "Could not build '{}': {}",
                    short_name(*record).blue(),
                    reason
                )
            }
        }
    }
}

impl core::error::Error for ConstructionError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ConstructionError::Field(err) => Some(err),
            ConstructionError::Rejected { .. } => None,
        }
    }
}

/// Errors that can occur when filling a partial from externally keyed data.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum DecodeError {
    /// No field is mapped to this key.
    UnknownKey {
        /// The key as found in the input.
        key: String,
    },

    /// The mapped field's decoder refused the value.
    InvalidValue {
        /// The key as found in the input.
        key: String,
        /// What the decoder reported.
        reason: String,
    },
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::UnknownKey { key } => {
                write!(f, "No field is mapped to key '{}'", key.red())
            }
            DecodeError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for key '{}': {}", key.yellow(), reason)
            }
        }
    }
}

impl core::error::Error for DecodeError {}
