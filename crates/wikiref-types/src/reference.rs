//! The canonical reference tree.
//!
//! A reference names a wiki, a space, a document, or an attachment
//! independently of any backend. Children embed their parent by value, so a
//! reference is a small immutable tree with structural equality and no
//! back-pointers.
//!
//! ```text
//! AttachmentReference ──▶ DocumentReference ──▶ SpaceReference ──▶ WikiReference
//!        (name)               (name)             (names: [..])         (name)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};

/// Discriminates the four reference variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
}

impl EntityType {
    /// All entity types, outermost first.
    pub const ALL: [EntityType; 4] = [
        EntityType::Wiki,
        EntityType::Space,
        EntityType::Document,
        EntityType::Attachment,
    ];

    /// Lowercase label used in messages and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Wiki => "wiki",
            EntityType::Space => "space",
            EntityType::Document => "document",
            EntityType::Attachment => "attachment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReferenceError::invalid(s, "unknown entity type"))
    }
}

fn require_name(kind: EntityType, name: String) -> Result<String> {
    if name.is_empty() {
        return Err(ReferenceError::invalid(
            name,
            format!("{kind} name must not be empty"),
        ));
    }
    Ok(name)
}

/// A wiki, the root of addressing on multi-tenant backends.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WikiRepr")]
pub struct WikiReference {
    name: String,
}

impl WikiReference {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: require_name(EntityType::Wiki, name.into())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A possibly nested space, optionally scoped to a wiki.
///
/// `names` lists the space path from the outermost space inwards, e.g.
/// `["Main", "Sub"]`. It is never empty and no segment is empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SpaceRepr")]
pub struct SpaceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    wiki: Option<WikiReference>,
    names: Vec<String>,
}

impl SpaceReference {
    pub fn new<I, S>(wiki: Option<WikiReference>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ReferenceError::invalid(
                "",
                "space must have at least one segment",
            ));
        }
        if names.iter().any(String::is_empty) {
            return Err(ReferenceError::invalid(
                names.join("/"),
                "space segments must not be empty",
            ));
        }
        Ok(Self { wiki, names })
    }

    pub fn wiki(&self) -> Option<&WikiReference> {
        self.wiki.as_ref()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The innermost segment.
    pub fn name(&self) -> &str {
        // `names` is never empty.
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    /// The enclosing space, or `None` for a top-level space.
    pub fn parent(&self) -> Option<SpaceReference> {
        match self.names.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self {
                wiki: self.wiki.clone(),
                names: rest.to_vec(),
            }),
            _ => None,
        }
    }

    /// A space nested directly inside this one.
    pub fn child(&self, name: impl Into<String>) -> Result<SpaceReference> {
        let name = require_name(EntityType::Space, name.into())?;
        let mut names = self.names.clone();
        names.push(name);
        Ok(Self {
            wiki: self.wiki.clone(),
            names,
        })
    }

    /// The default document of this space (the page shown for the space
    /// itself, e.g. `WebHome` or `index`).
    pub fn index_document(&self, index_name: &str) -> Result<DocumentReference> {
        DocumentReference::new(index_name, Some(self.clone()))
    }
}

/// A document, optionally inside a space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DocumentRepr")]
pub struct DocumentReference {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    space: Option<SpaceReference>,
}

impl DocumentReference {
    pub fn new(name: impl Into<String>, space: Option<SpaceReference>) -> Result<Self> {
        Ok(Self {
            name: require_name(EntityType::Document, name.into())?,
            space,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn space(&self) -> Option<&SpaceReference> {
        self.space.as_ref()
    }

    /// Space segments of the enclosing space, empty for a top-level document.
    pub fn space_names(&self) -> &[String] {
        self.space.as_ref().map(|s| s.names()).unwrap_or_default()
    }

    pub fn wiki(&self) -> Option<&WikiReference> {
        self.space.as_ref().and_then(SpaceReference::wiki)
    }

    /// Whether this document is a leaf page rather than the index document
    /// of its space. Top-level documents are always terminal.
    pub fn is_terminal(&self, index_name: &str) -> bool {
        self.space.is_none() || self.name != index_name
    }
}

/// Where an attachment's bytes live relative to its document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStorage {
    /// Stored in the document's `.<name>/attachments/` metadata folder.
    #[default]
    Metadata,
    /// A plain file managed by the storage provider itself.
    Native,
}

/// A file attached to exactly one document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AttachmentRepr")]
pub struct AttachmentReference {
    name: String,
    document: DocumentReference,
    storage: AttachmentStorage,
}

impl AttachmentReference {
    pub fn new(name: impl Into<String>, document: DocumentReference) -> Result<Self> {
        Ok(Self {
            name: require_name(EntityType::Attachment, name.into())?,
            document,
            storage: AttachmentStorage::Metadata,
        })
    }

    /// Marks the attachment as a provider-native file.
    pub fn native(mut self) -> Self {
        self.storage = AttachmentStorage::Native;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentReference {
        &self.document
    }

    pub fn storage(&self) -> AttachmentStorage {
        self.storage
    }
}

/// Any of the four reference variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityReference {
    Wiki(WikiReference),
    Space(SpaceReference),
    Document(DocumentReference),
    Attachment(AttachmentReference),
}

impl EntityReference {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityReference::Wiki(_) => EntityType::Wiki,
            EntityReference::Space(_) => EntityType::Space,
            EntityReference::Document(_) => EntityType::Document,
            EntityReference::Attachment(_) => EntityType::Attachment,
        }
    }

    /// The name of the innermost entity.
    pub fn name(&self) -> &str {
        match self {
            EntityReference::Wiki(w) => w.name(),
            EntityReference::Space(s) => s.name(),
            EntityReference::Document(d) => d.name(),
            EntityReference::Attachment(a) => a.name(),
        }
    }

    /// The wiki this reference belongs to, if one is named.
    pub fn wiki(&self) -> Option<&WikiReference> {
        match self {
            EntityReference::Wiki(w) => Some(w),
            EntityReference::Space(s) => s.wiki(),
            EntityReference::Document(d) => d.wiki(),
            EntityReference::Attachment(a) => a.document().wiki(),
        }
    }

    /// The document itself, or the owning document of an attachment.
    pub fn document(&self) -> Option<&DocumentReference> {
        match self {
            EntityReference::Wiki(_) | EntityReference::Space(_) => None,
            EntityReference::Document(d) => Some(d),
            EntityReference::Attachment(a) => Some(a.document()),
        }
    }
}

impl From<WikiReference> for EntityReference {
    fn from(r: WikiReference) -> Self {
        EntityReference::Wiki(r)
    }
}

impl From<SpaceReference> for EntityReference {
    fn from(r: SpaceReference) -> Self {
        EntityReference::Space(r)
    }
}

impl From<DocumentReference> for EntityReference {
    fn from(r: DocumentReference) -> Self {
        EntityReference::Document(r)
    }
}

impl From<AttachmentReference> for EntityReference {
    fn from(r: AttachmentReference) -> Self {
        EntityReference::Attachment(r)
    }
}

// Deserialization goes through these shapes so that decoded references
// uphold the same invariants as constructed ones.

#[derive(Deserialize)]
struct WikiRepr {
    name: String,
}

impl TryFrom<WikiRepr> for WikiReference {
    type Error = ReferenceError;

    fn try_from(r: WikiRepr) -> Result<Self> {
        WikiReference::new(r.name)
    }
}

#[derive(Deserialize)]
struct SpaceRepr {
    #[serde(default)]
    wiki: Option<WikiReference>,
    names: Vec<String>,
}

impl TryFrom<SpaceRepr> for SpaceReference {
    type Error = ReferenceError;

    fn try_from(r: SpaceRepr) -> Result<Self> {
        SpaceReference::new(r.wiki, r.names)
    }
}

#[derive(Deserialize)]
struct DocumentRepr {
    name: String,
    #[serde(default)]
    space: Option<SpaceReference>,
}

impl TryFrom<DocumentRepr> for DocumentReference {
    type Error = ReferenceError;

    fn try_from(r: DocumentRepr) -> Result<Self> {
        DocumentReference::new(r.name, r.space)
    }
}

#[derive(Deserialize)]
struct AttachmentRepr {
    name: String,
    document: DocumentReference,
    #[serde(default)]
    storage: AttachmentStorage,
}

impl TryFrom<AttachmentRepr> for AttachmentReference {
    type Error = ReferenceError;

    fn try_from(r: AttachmentRepr) -> Result<Self> {
        let attachment = AttachmentReference::new(r.name, r.document)?;
        Ok(match r.storage {
            AttachmentStorage::Metadata => attachment,
            AttachmentStorage::Native => attachment.native(),
        })
    }
}
