//! Helpers shared by the path and URL grammars.
//!
//! Every backend that stores documents as files keeps attachments in a
//! hidden metadata folder next to the document:
//!
//! ```text
//! <space>/<space>/.<document>/attachments/<attachment>
//! ```
//!
//! [`classify`] recognises that layout structurally, by looking at the last
//! three segments of a path. [`UrlBase`] maps between such segment lists and
//! percent-encoded URLs below a configured prefix.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;
use wikiref_types::{
    AttachmentReference, AttachmentStorage, DocumentReference, EntityReference, EntityType,
    ReferenceError, Result, SpaceReference, WikiReference,
};

use crate::error::{ConfigError, ConfigResult};

/// Name of the folder holding a document's attachments.
pub(crate) const ATTACHMENTS_FOLDER: &str = "attachments";

/// Prefix marking a document's metadata folder.
pub(crate) const METADATA_PREFIX: char = '.';

/// The structural shape of a segmented path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PathShape<'a> {
    Attachment {
        space: &'a [String],
        document: &'a str,
        name: &'a str,
    },
    Document {
        space: &'a [String],
        name: &'a str,
    },
}

/// Recognise `.../<doc-folder>/attachments/<name>` versus `.../<name>`.
///
/// With `require_prefix`, the document folder must start with `.` for the
/// path to count as an attachment; otherwise the leading `.` is stripped
/// when present. Returns `None` for an empty path.
pub(crate) fn classify(segments: &[String], require_prefix: bool) -> Option<PathShape<'_>> {
    match segments {
        [space @ .., folder, marker, name]
            if marker == ATTACHMENTS_FOLDER
                && (!require_prefix || folder.starts_with(METADATA_PREFIX)) =>
        {
            let document = folder.strip_prefix(METADATA_PREFIX).unwrap_or(folder.as_str());
            Some(PathShape::Attachment {
                space,
                document,
                name,
            })
        }
        [space @ .., name] => Some(PathShape::Document { space, name }),
        [] => None,
    }
}

/// Build the optional space of a document from its segment list.
pub(crate) fn space_of(
    wiki: Option<WikiReference>,
    names: &[String],
) -> Result<Option<SpaceReference>> {
    if names.is_empty() {
        return Ok(None);
    }
    SpaceReference::new(wiki, names.iter().cloned()).map(Some)
}

/// Turn a recognised shape into a reference.
pub(crate) fn build(
    shape: PathShape<'_>,
    wiki: Option<WikiReference>,
    base: Vec<String>,
) -> Result<EntityReference> {
    let mut names = base;
    match shape {
        PathShape::Attachment {
            space,
            document,
            name,
        } => {
            names.extend_from_slice(space);
            let document = DocumentReference::new(document, space_of(wiki, &names)?)?;
            Ok(AttachmentReference::new(name, document)?.into())
        }
        PathShape::Document { space, name } => {
            names.extend_from_slice(space);
            Ok(DocumentReference::new(name, space_of(wiki, &names)?)?.into())
        }
    }
}

/// Only WebDAV storage has provider-native attachments; every other grammar
/// writes attachments into the metadata folder.
pub(crate) fn require_metadata_storage(
    grammar: &'static str,
    attachment: &AttachmentReference,
) -> Result<()> {
    match attachment.storage() {
        AttachmentStorage::Metadata => Ok(()),
        AttachmentStorage::Native => Err(ReferenceError::unsupported(
            grammar,
            EntityType::Attachment,
        )),
    }
}

/// Borrow owned segments for [`UrlBase::join`].
pub(crate) fn str_segments(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Drop the empty segment a trailing slash leaves behind. Returns whether
/// there was one.
pub(crate) fn split_trailing_slash(segments: &mut Vec<String>) -> bool {
    if segments.last().is_some_and(String::is_empty) {
        segments.pop();
        true
    } else {
        false
    }
}

/// Reject an empty path or one with empty segments.
pub(crate) fn require_path(input: &str, segments: &[String]) -> Result<()> {
    if segments.is_empty() {
        return Err(ReferenceError::invalid(input, "URL has no path below its base"));
    }
    if segments.iter().any(String::is_empty) {
        return Err(ReferenceError::invalid(input, "empty path segment"));
    }
    Ok(())
}

/// Parse `input` as an absolute URL.
pub(crate) fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|e| ReferenceError::invalid(input, format!("not a URL: {e}")))
}

/// A configured URL prefix that entity paths are appended to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UrlBase {
    url: Url,
}

impl UrlBase {
    /// Parse an `http` or `https` base URL. Query, fragment and a trailing
    /// slash are dropped.
    pub(crate) fn new(field: &'static str, base: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidUrl { field, reason };
        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot carry a path".into()))?
            .pop_if_empty();
        Ok(Self { url })
    }

    pub(crate) fn as_str(&self) -> &str {
        self.url.as_str()
    }

    fn base_segments(&self) -> Vec<&str> {
        match self.url.path() {
            "/" => Vec::new(),
            _ => self
                .url
                .path_segments()
                .map(|s| s.collect())
                .unwrap_or_default(),
        }
    }

    /// Percent-decoded path segments of `url` below this base, or `None`
    /// when `url` lies elsewhere. A trailing slash leaves a final empty
    /// segment; query and fragment are ignored.
    pub(crate) fn segments_below(&self, input: &str, url: &Url) -> Result<Option<Vec<String>>> {
        if url.origin() != self.url.origin() {
            return Ok(None);
        }
        let Some(path) = url.path_segments() else {
            return Ok(None);
        };
        let path: Vec<&str> = path.collect();
        let base = self.base_segments();
        if path.len() < base.len() || path[..base.len()] != base[..] {
            return Ok(None);
        }
        path[base.len()..]
            .iter()
            .map(|s| decode_segment(input, s))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// The base with `segments` appended, each percent-encoded. An empty
    /// segment produces a trailing slash.
    pub(crate) fn join(&self, segments: Vec<&str>) -> Result<String> {
        for segment in &segments {
            check_segment(segment)?;
        }
        let mut url = self.url.clone();
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.extend(segments);
            }
            Err(()) => {
                return Err(ReferenceError::invalid(
                    self.url.as_str(),
                    "URL cannot carry a path",
                ));
            }
        }
        Ok(url.into())
    }
}

/// Segments the URL parser would drop or rewrite instead of encoding.
fn check_segment(segment: &str) -> Result<()> {
    if matches!(segment, "." | "..") {
        return Err(ReferenceError::invalid(
            segment,
            "dot segments cannot appear in a URL path",
        ));
    }
    if segment.contains(['\t', '\n', '\r']) {
        return Err(ReferenceError::invalid(
            segment,
            "tabs and line breaks cannot appear in a URL path",
        ));
    }
    Ok(())
}

fn decode_segment(input: &str, segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ReferenceError::invalid(input, "path segment is not valid UTF-8"))
}
