//! WebDAV storage URLs.
//!
//! Each user's wiki lives under a storage root such as
//! `https://cloud.example.org/remote.php/dav/files/alice/.wiki`. Below it,
//! spaces are folders, documents are Markdown files and attachments sit in a
//! metadata folder next to their document:
//!
//! ```text
//! <root>/Main/Sub/Page.md
//! <root>/Main/Sub/.Page/attachments/image.png
//! ```
//!
//! Attachments marked [`AttachmentStorage::Native`] are plain files managed
//! by the storage provider and sit directly in the document's space folder.

use wikiref_types::{
    AttachmentStorage, DocumentReference, EntityReference, EntityType, ReferenceError, Result,
    SpaceReference,
};

use crate::error::ConfigResult;
use crate::segments::{
    build, classify, parse_url, require_path, split_trailing_slash, str_segments, PathShape,
    UrlBase, ATTACHMENTS_FOLDER, METADATA_PREFIX,
};
use crate::traits::{ReferenceParser, ReferenceSerializer};

/// File extension of stored documents.
pub const DOCUMENT_EXTENSION: &str = ".md";

/// Parser and serializer for URLs below one user's storage root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebDavUrls {
    storage_root: UrlBase,
}

impl WebDavUrls {
    pub const NAME: &'static str = "webdav";

    /// Create for an already resolved storage root (user name substituted).
    pub fn new(storage_root: &str) -> ConfigResult<Self> {
        Ok(Self {
            storage_root: UrlBase::new("webdav.storage_root", storage_root)?,
        })
    }

    pub fn storage_root(&self) -> &str {
        self.storage_root.as_str()
    }

    fn check_no_wiki(space: Option<&SpaceReference>) -> Result<()> {
        if space.and_then(SpaceReference::wiki).is_some() {
            return Err(ReferenceError::unsupported(Self::NAME, EntityType::Wiki));
        }
        Ok(())
    }
}

/// Folders starting with `.` hold attachment metadata, so no space may use
/// that prefix.
fn check_visible_space(input: &str, names: &[String]) -> Result<()> {
    match names.iter().find(|n| n.starts_with(METADATA_PREFIX)) {
        Some(name) => Err(ReferenceError::invalid(
            input,
            format!("space {name:?} is reserved for attachment metadata"),
        )),
        None => Ok(()),
    }
}

impl ReferenceParser for WebDavUrls {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        _current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        let url = parse_url(input)?;
        let Some(mut segments) = self.storage_root.segments_below(input, &url)? else {
            return Err(ReferenceError::invalid(input, "URL is outside the storage root"));
        };
        split_trailing_slash(&mut segments);
        require_path(input, &segments)?;

        match expected {
            Some(EntityType::Space) => {
                check_visible_space(input, &segments)?;
                return Ok(SpaceReference::new(None, segments)?.into());
            }
            Some(EntityType::Wiki) => {
                return Err(ReferenceError::invalid(input, "storage URLs have no wiki"));
            }
            _ => {}
        }

        let Some(shape) = classify(&segments, true) else {
            return Err(ReferenceError::invalid(input, "URL names no document"));
        };
        let shape = match shape {
            PathShape::Document { space, name } => PathShape::Document {
                space,
                name: name.strip_suffix(DOCUMENT_EXTENSION).unwrap_or(name),
            },
            attachment => attachment,
        };
        let (PathShape::Document { space, .. } | PathShape::Attachment { space, .. }) = &shape;
        check_visible_space(input, space)?;
        match (expected, &shape) {
            (Some(EntityType::Document), PathShape::Attachment { .. })
            | (Some(EntityType::Attachment), PathShape::Document { .. }) => {
                Err(ReferenceError::invalid(
                    input,
                    format!("URL does not address a {}", expected.map_or("", |t| t.as_str())),
                ))
            }
            _ => build(shape, None, Vec::new()),
        }
    }
}

impl ReferenceSerializer for WebDavUrls {
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        let root = self.storage_root.as_str();
        match reference {
            EntityReference::Wiki(_) => {
                Err(ReferenceError::unsupported(Self::NAME, EntityType::Wiki))
            }
            EntityReference::Space(space) => {
                Self::check_no_wiki(Some(space))?;
                check_visible_space(root, space.names())?;
                self.storage_root.join(str_segments(space.names()))
            }
            EntityReference::Document(document) => {
                Self::check_no_wiki(document.space())?;
                check_visible_space(root, document.space_names())?;
                let file = format!("{}{DOCUMENT_EXTENSION}", document.name());
                let mut segments = str_segments(document.space_names());
                segments.push(&file);
                self.storage_root.join(segments)
            }
            EntityReference::Attachment(attachment) => {
                let document = attachment.document();
                Self::check_no_wiki(document.space())?;
                check_visible_space(root, document.space_names())?;
                let folder = format!("{METADATA_PREFIX}{}", document.name());
                let mut segments = str_segments(document.space_names());
                if attachment.storage() == AttachmentStorage::Metadata {
                    segments.extend([folder.as_str(), ATTACHMENTS_FOLDER]);
                }
                segments.push(attachment.name());
                self.storage_root.join(segments)
            }
        }
    }
}
