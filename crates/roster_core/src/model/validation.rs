//! Field validation shared by every roster record.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Argument-validation failure naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required string is empty.
    EmptyField { field: &'static str },
    /// Required string contains only whitespace.
    BlankField { field: &'static str },
    /// Review year below the accepted floor.
    YearOutOfRange { year: i32, min: i32 },
    /// Foreign key value does not point at an existing row.
    MissingReference { field: &'static str, id: i64 },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field }
            | Self::BlankField { field }
            | Self::MissingReference { field, .. } => field,
            Self::YearOutOfRange { .. } => "year",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must be a non-empty string"),
            Self::BlankField { field } => {
                write!(f, "{field} must contain non-whitespace characters")
            }
            Self::YearOutOfRange { year, min } => {
                write!(f, "year must be an integer >= {min}, got {year}")
            }
            Self::MissingReference { field, id } => {
                write!(f, "{field} must reference an existing row, got {id}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_non_empty(field, value)?;
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    Ok(())
}

/// Maps a lookup outcome to `MissingReference` when the row is absent.
pub fn require_reference(field: &'static str, id: i64, exists: bool) -> Result<(), ValidationError> {
    if exists {
        Ok(())
    } else {
        Err(ValidationError::MissingReference { field, id })
    }
}
