//! Write-time validation errors shared by all aggregates.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason an aggregate was rejected before any SQL mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required relation id is absent.
    MissingRelation {
        entity: &'static str,
        field: &'static str,
    },
    /// A required text field is empty or whitespace only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRelation { entity, field } => {
                write!(f, "{entity} requires `{field}` to reference a persisted parent")
            }
            Self::BlankField { entity, field } => {
                write!(f, "{entity} requires a non-blank `{field}`")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_relation<T>(
    entity: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingRelation { entity, field })
}
