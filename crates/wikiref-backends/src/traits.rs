//! The capability set every backend grammar provides.
//!
//! A grammar converts between the canonical reference tree and one
//! backend's native strings. Parsing and serialization are pure: the only
//! outside input is the current-document snapshot passed to
//! [`ReferenceParser::parse`].

use wikiref_types::{DocumentReference, EntityReference, EntityType, Result};

/// Turns a backend string into a canonical reference.
pub trait ReferenceParser {
    /// Parse `input`.
    ///
    /// `expected` narrows the entity type when the grammar alone cannot
    /// tell (e.g. a REST URL naming either a space or a document). `current`
    /// is the document relative references resolve against.
    ///
    /// Fails with [`wikiref_types::ReferenceError::InvalidReference`] and
    /// never returns a partially built reference.
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        current: Option<&DocumentReference>,
    ) -> Result<EntityReference>;
}

/// Turns a canonical reference into a backend string.
pub trait ReferenceSerializer {
    /// Serialize `reference`.
    ///
    /// Fails with [`wikiref_types::ReferenceError::UnsupportedEntityType`]
    /// when the grammar has no representation for the variant.
    fn serialize(&self, reference: &EntityReference) -> Result<String>;
}
