//! The wiki's own link syntax.
//!
//! ```text
//! [wiki:]Space.Sub.Page[@attachment]
//! ```
//!
//! - The first unescaped `@` starts the optional attachment name.
//! - The last unescaped `.` before it ends the space; what follows names
//!   the document.
//! - Within the space, the last unescaped `:` ends the wiki name, so a wiki
//!   name may itself contain `:` and `.`.
//! - Without any `.`, the whole text names a document in the current
//!   document's space. `wiki:Page` is a document called `wiki:Page`.
//! - `@file` alone names an attachment of the current document.
//!
//! Reserved characters are escaped with a backslash, per position: wiki
//! names escape `:` and `@`, space and document segments escape `.`, `@`
//! and `:`, attachment names escape `@` and `:`. A file name such as
//! `img.png` is therefore written verbatim after the `@`.

use wikiref_escape::{escape_reserved, find_unescaped, rfind_unescaped, split_unescaped, unescape};
use wikiref_types::{
    AttachmentReference, DocumentReference, EntityReference, EntityType, ReferenceError, Result,
    SpaceReference, WikiReference,
};

use crate::segments::require_metadata_storage;
use crate::traits::{ReferenceParser, ReferenceSerializer};

const WIKI_SEPARATOR: char = ':';
const SPACE_SEPARATOR: char = '.';
const ATTACHMENT_SEPARATOR: char = '@';

const WIKI_RESERVED: &[char] = &[WIKI_SEPARATOR, ATTACHMENT_SEPARATOR];
const SEGMENT_RESERVED: &[char] = &[SPACE_SEPARATOR, ATTACHMENT_SEPARATOR, WIKI_SEPARATOR];
const ATTACHMENT_RESERVED: &[char] = &[ATTACHMENT_SEPARATOR, WIKI_SEPARATOR];

/// Parser and serializer for `wiki:Space.Page@file` references.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalSyntax;

impl CanonicalSyntax {
    pub const NAME: &'static str = "wiki syntax";

    pub fn new() -> Self {
        Self
    }

    /// `[wiki:]Space.Sub`, wiki ending at the last unescaped `:`.
    fn parse_space(input: &str, text: &str) -> Result<SpaceReference> {
        let (wiki, names) = match rfind_unescaped(text, WIKI_SEPARATOR) {
            Some(i) => {
                let name = unescape(&text[..i]);
                if name.is_empty() {
                    return Err(ReferenceError::invalid(input, "empty wiki name"));
                }
                (Some(WikiReference::new(name)?), &text[i + 1..])
            }
            None => (None, text),
        };
        let segments: Vec<String> = split_unescaped(names, SPACE_SEPARATOR)
            .into_iter()
            .map(unescape)
            .collect();
        if segments.iter().any(String::is_empty) {
            return Err(ReferenceError::invalid(input, "empty segment"));
        }
        SpaceReference::new(wiki, segments)
    }

    fn parse_document(
        input: &str,
        path: &str,
        current: Option<&DocumentReference>,
    ) -> Result<DocumentReference> {
        match rfind_unescaped(path, SPACE_SEPARATOR) {
            Some(i) => {
                let space = Self::parse_space(input, &path[..i])?;
                let name = unescape(&path[i + 1..]);
                if name.is_empty() {
                    return Err(ReferenceError::invalid(input, "empty segment"));
                }
                DocumentReference::new(name, Some(space))
            }
            None => {
                let space = current.and_then(DocumentReference::space).cloned();
                DocumentReference::new(unescape(path), space)
            }
        }
    }

    fn serialize_space(out: &mut String, space: &SpaceReference) {
        if let Some(wiki) = space.wiki() {
            out.push_str(&escape_reserved(wiki.name(), WIKI_RESERVED));
            out.push(WIKI_SEPARATOR);
        }
        let names: Vec<String> = space
            .names()
            .iter()
            .map(|n| escape_reserved(n, SEGMENT_RESERVED))
            .collect();
        out.push_str(&names.join("."));
    }

    fn serialize_document(out: &mut String, document: &DocumentReference) {
        if let Some(space) = document.space() {
            Self::serialize_space(out, space);
            out.push(SPACE_SEPARATOR);
        }
        out.push_str(&escape_reserved(document.name(), SEGMENT_RESERVED));
    }
}

impl ReferenceParser for CanonicalSyntax {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        if input.is_empty() {
            return Err(ReferenceError::invalid(input, "empty reference"));
        }
        if expected == Some(EntityType::Wiki) {
            return Ok(WikiReference::new(unescape(input))?.into());
        }

        let (path, attachment) = match find_unescaped(input, ATTACHMENT_SEPARATOR) {
            Some(i) => (&input[..i], Some(&input[i + 1..])),
            None => (input, None),
        };
        let attachment = match attachment {
            Some(a) if find_unescaped(a, ATTACHMENT_SEPARATOR).is_some() => {
                return Err(ReferenceError::invalid(input, "more than one unescaped '@'"));
            }
            Some("") => return Err(ReferenceError::invalid(input, "empty attachment name")),
            Some(a) => Some(unescape(a)),
            None => None,
        };

        if expected == Some(EntityType::Space) {
            if attachment.is_some() {
                return Err(ReferenceError::invalid(input, "a space cannot name an attachment"));
            }
            return Ok(Self::parse_space(input, path)?.into());
        }

        match (expected, attachment) {
            (Some(EntityType::Document), Some(_)) => Err(ReferenceError::invalid(
                input,
                "expected a document but found an attachment",
            )),
            (Some(EntityType::Attachment), None) => match current {
                Some(document) => {
                    Ok(AttachmentReference::new(unescape(input), document.clone())?.into())
                }
                None => Err(ReferenceError::invalid(
                    input,
                    "expected an attachment but found no '@' and no current document",
                )),
            },
            (_, Some(name)) if path.is_empty() => match current {
                Some(document) => Ok(AttachmentReference::new(name, document.clone())?.into()),
                None => Err(ReferenceError::invalid(
                    input,
                    "attachment without a document and no current document",
                )),
            },
            (_, Some(name)) => {
                let document = Self::parse_document(input, path, current)?;
                Ok(AttachmentReference::new(name, document)?.into())
            }
            (_, None) => Ok(Self::parse_document(input, path, current)?.into()),
        }
    }
}

impl ReferenceSerializer for CanonicalSyntax {
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        let mut out = String::new();
        match reference {
            EntityReference::Wiki(wiki) => {
                out.push_str(&escape_reserved(wiki.name(), WIKI_RESERVED));
            }
            EntityReference::Space(space) => Self::serialize_space(&mut out, space),
            EntityReference::Document(document) => Self::serialize_document(&mut out, document),
            EntityReference::Attachment(attachment) => {
                require_metadata_storage(Self::NAME, attachment)?;
                Self::serialize_document(&mut out, attachment.document());
                out.push(ATTACHMENT_SEPARATOR);
                out.push_str(&escape_reserved(attachment.name(), ATTACHMENT_RESERVED));
            }
        }
        Ok(out)
    }
}
