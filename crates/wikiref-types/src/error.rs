//! Error types for reference construction, parsing, and serialization.

use thiserror::Error;

use crate::reference::EntityType;

/// Errors that can occur while building or converting references.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The input does not match the grammar, or a structural invariant
    /// (non-empty name, non-empty segment list) was violated.
    #[error("invalid reference {input:?}: {reason}")]
    InvalidReference { input: String, reason: String },

    /// The grammar has no representation for this kind of entity.
    #[error("{grammar} cannot represent a {entity_type} reference")]
    UnsupportedEntityType {
        grammar: &'static str,
        entity_type: EntityType,
    },
}

impl ReferenceError {
    /// Shorthand for [`ReferenceError::InvalidReference`].
    pub fn invalid(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ReferenceError::UnsupportedEntityType`].
    pub fn unsupported(grammar: &'static str, entity_type: EntityType) -> Self {
        Self::UnsupportedEntityType {
            grammar,
            entity_type,
        }
    }
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;
