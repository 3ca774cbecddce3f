//! View and download URLs of the wiki server.
//!
//! ```text
//! <base>/bin/view/Main/Sub/Page            terminal page Main.Sub.Page
//! <base>/bin/view/Main/Sub/                nested page, index document of Main.Sub
//! <base>/bin/download/Main/Page/img.png    attachment img.png of Main.Page
//! <base>/wiki/<wiki>/view/Main/Page        same, in a named wiki
//! ```
//!
//! The trailing slash is what separates a nested page (the index document
//! of a space) from a terminal page of the same name.

use wikiref_types::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, ReferenceError, Result,
    SpaceReference, WikiReference,
};

use crate::error::ConfigResult;
use crate::segments::{parse_url, require_metadata_storage, space_of, str_segments, UrlBase};
use crate::traits::{ReferenceParser, ReferenceSerializer};

const DEFAULT_WIKI_PREFIX: &str = "bin";
const NAMED_WIKI_PREFIX: &str = "wiki";
const VIEW_ACTION: &str = "view";
const DOWNLOAD_ACTION: &str = "download";

/// Default name of a space's index document.
pub const DEFAULT_INDEX_DOCUMENT: &str = "WebHome";

/// Parser and serializer for wiki server URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerUrls {
    base_url: UrlBase,
    index_document: String,
}

impl ServerUrls {
    pub const NAME: &'static str = "wiki server";

    pub fn new(base_url: &str) -> ConfigResult<Self> {
        Ok(Self {
            base_url: UrlBase::new("wiki_server.base_url", base_url)?,
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
        })
    }

    /// Use a different index document name than [`DEFAULT_INDEX_DOCUMENT`].
    pub fn with_index_document(mut self, name: impl Into<String>) -> Self {
        self.index_document = name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn index_document(&self) -> &str {
        &self.index_document
    }

    /// `bin/<action>` or `wiki/<name>/<action>`.
    fn prefix<'a>(wiki: Option<&'a WikiReference>, action: &'a str) -> Vec<&'a str> {
        match wiki {
            Some(wiki) => vec![NAMED_WIKI_PREFIX, wiki.name(), action],
            None => vec![DEFAULT_WIKI_PREFIX, action],
        }
    }

    fn parse_view(
        &self,
        input: &str,
        wiki: Option<WikiReference>,
        path: &[&str],
        expected: Option<EntityType>,
    ) -> Result<EntityReference> {
        let (nested, path) = match path.split_last() {
            Some((&"", rest)) => (true, rest),
            _ => (false, path),
        };
        let names: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        if names.is_empty() || names.iter().any(String::is_empty) {
            return Err(ReferenceError::invalid(input, "empty path segment"));
        }

        match expected {
            Some(EntityType::Space) => return Ok(SpaceReference::new(wiki, names)?.into()),
            Some(EntityType::Attachment) => {
                return Err(ReferenceError::invalid(input, "view URLs do not address attachments"));
            }
            _ => {}
        }

        if nested {
            let space = SpaceReference::new(wiki, names)?;
            return Ok(space.index_document(&self.index_document)?.into());
        }
        let Some((name, space)) = names.split_last() else {
            return Err(ReferenceError::invalid(input, "no document name"));
        };
        if space.is_empty() && wiki.is_some() {
            return Err(ReferenceError::invalid(input, "a named wiki needs a space"));
        }
        Ok(DocumentReference::new(name.clone(), space_of(wiki, space)?)?.into())
    }

    fn parse_download(
        input: &str,
        wiki: Option<WikiReference>,
        path: &[&str],
        expected: Option<EntityType>,
    ) -> Result<EntityReference> {
        if !matches!(expected, None | Some(EntityType::Attachment)) {
            return Err(ReferenceError::invalid(input, "download URLs only address attachments"));
        }
        let names: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        if names.iter().any(String::is_empty) {
            return Err(ReferenceError::invalid(input, "empty path segment"));
        }
        match names.as_slice() {
            [space @ .., document, attachment] => {
                if space.is_empty() && wiki.is_some() {
                    return Err(ReferenceError::invalid(input, "a named wiki needs a space"));
                }
                let document = DocumentReference::new(document.clone(), space_of(wiki, space)?)?;
                Ok(AttachmentReference::new(attachment.clone(), document)?.into())
            }
            _ => Err(ReferenceError::invalid(
                input,
                "download URL needs a document and an attachment name",
            )),
        }
    }

    fn document_url(&self, document: &DocumentReference) -> Result<String> {
        let mut segments = Self::prefix(document.wiki(), VIEW_ACTION);
        segments.extend(str_segments(document.space_names()));
        if document.is_terminal(&self.index_document) {
            segments.push(document.name());
        } else {
            segments.push("");
        }
        self.base_url.join(segments)
    }
}

impl ReferenceParser for ServerUrls {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        _current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        let url = parse_url(input)?;
        let Some(segments) = self.base_url.segments_below(input, &url)? else {
            return Err(ReferenceError::invalid(input, "URL is not below the server base URL"));
        };
        let segments = str_segments(&segments);

        let (wiki, action, rest) = match segments.as_slice() {
            [DEFAULT_WIKI_PREFIX, action, rest @ ..] => (None, *action, rest),
            [NAMED_WIKI_PREFIX, wiki, action, rest @ ..] => {
                (Some(WikiReference::new(*wiki)?), *action, rest)
            }
            _ => return Err(ReferenceError::invalid(input, "unrecognised server URL")),
        };

        if expected == Some(EntityType::Wiki) {
            return match wiki {
                Some(wiki) => Ok(wiki.into()),
                None => Err(ReferenceError::invalid(input, "URL addresses the default wiki")),
            };
        }
        match action {
            VIEW_ACTION => self.parse_view(input, wiki, rest, expected),
            DOWNLOAD_ACTION => Self::parse_download(input, wiki, rest, expected),
            other => Err(ReferenceError::invalid(
                input,
                format!("unsupported server action {other:?}"),
            )),
        }
    }
}

impl ReferenceSerializer for ServerUrls {
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        match reference {
            EntityReference::Wiki(wiki) => {
                let mut segments = Self::prefix(Some(wiki), VIEW_ACTION);
                segments.push("");
                self.base_url.join(segments)
            }
            EntityReference::Space(space) => {
                let mut segments = Self::prefix(space.wiki(), VIEW_ACTION);
                segments.extend(str_segments(space.names()));
                segments.push("");
                self.base_url.join(segments)
            }
            EntityReference::Document(document) => self.document_url(document),
            EntityReference::Attachment(attachment) => {
                require_metadata_storage(Self::NAME, attachment)?;
                let document = attachment.document();
                let mut segments = Self::prefix(document.wiki(), DOWNLOAD_ACTION);
                segments.extend(str_segments(document.space_names()));
                segments.extend([document.name(), attachment.name()]);
                self.base_url.join(segments)
            }
        }
    }
}
