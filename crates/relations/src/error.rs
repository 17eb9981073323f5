//! Relation data errors

use thiserror::Error;

/// Why a databag could not be turned into a typed record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationDataError {
    /// Required key absent or empty
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Key present but its value does not validate
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl RelationDataError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
