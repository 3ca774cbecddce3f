//! Filesystem-style references, as written in Markdown links between
//! documents stored as files.
//!
//! ```text
//! ../Other/Page                    document Page, one space up then Other
//! ./.Page/attachments/image.png    attachment of Page in the current space
//! /Main/Sub/Page                   absolute, ignores the current document
//! ```
//!
//! Segments are separated by `/` and escaped with [`wikiref_escape::escape`].
//! Relative paths resolve against the space of the current document: every
//! leading `..` drops one trailing space segment, leading `.` segments are
//! skipped, and the remaining segments are appended literally.

use wikiref_escape::{escape, split_unescaped, unescape};
use wikiref_types::{DocumentReference, EntityReference, EntityType, ReferenceError, Result};

use crate::segments::{
    build, classify, require_metadata_storage, PathShape, ATTACHMENTS_FOLDER, METADATA_PREFIX,
};
use crate::traits::{ReferenceParser, ReferenceSerializer};

const SEPARATOR: char = '/';
const CURRENT: &str = ".";
const PARENT: &str = "..";

/// Parser and serializer for filesystem-style relative paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathSyntax;

impl PathSyntax {
    pub const NAME: &'static str = "filesystem path";

    pub fn new() -> Self {
        Self
    }

    /// Serialize `reference` relative to the space of `current`.
    ///
    /// The result is the shortest path that [`ReferenceParser::parse`]
    /// resolves back to `reference` given the same current document.
    pub fn serialize_relative(
        &self,
        reference: &EntityReference,
        current: Option<&DocumentReference>,
    ) -> Result<String> {
        let (target, tail) = Self::split_target(reference)?;
        let base = current.map(DocumentReference::space_names).unwrap_or_default();
        let common = base
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<String> = vec![PARENT.to_string(); base.len() - common];
        parts.extend(target[common..].iter().map(|s| escape_segment(s)));
        parts.extend(tail);
        Ok(parts.join("/"))
    }

    /// Target space segments and the trailing document/attachment segments.
    fn split_target(reference: &EntityReference) -> Result<(&[String], Vec<String>)> {
        let (document, attachment) = match reference {
            EntityReference::Document(d) => (d, None),
            EntityReference::Attachment(a) => {
                require_metadata_storage(Self::NAME, a)?;
                (a.document(), Some(a.name()))
            }
            EntityReference::Wiki(_) | EntityReference::Space(_) => {
                return Err(ReferenceError::unsupported(
                    Self::NAME,
                    reference.entity_type(),
                ));
            }
        };
        if document.wiki().is_some() {
            return Err(ReferenceError::unsupported(Self::NAME, EntityType::Wiki));
        }
        let tail = match attachment {
            Some(name) => vec![
                format!("{METADATA_PREFIX}{}", escape_segment(document.name())),
                ATTACHMENTS_FOLDER.to_string(),
                escape(name),
            ],
            None => vec![escape_segment(document.name())],
        };
        Ok((document.space_names(), tail))
    }
}

/// Escape a space or document segment so it can never be mistaken for a
/// navigation segment or a metadata folder.
fn escape_segment(segment: &str) -> String {
    let escaped = escape(segment);
    if escaped.starts_with(METADATA_PREFIX) {
        format!("\\{escaped}")
    } else {
        escaped
    }
}

impl ReferenceParser for PathSyntax {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        if matches!(expected, Some(EntityType::Wiki | EntityType::Space)) {
            return Err(ReferenceError::invalid(
                input,
                "filesystem paths address documents and attachments only",
            ));
        }
        if input.is_empty() {
            return Err(ReferenceError::invalid(input, "empty path"));
        }

        let (absolute, body) = match input.strip_prefix(SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let mut base: Vec<String> = match current {
            Some(document) if !absolute => document.space_names().to_vec(),
            _ => Vec::new(),
        };

        let raw = split_unescaped(body, SEPARATOR);
        let mut rest = raw.as_slice();
        while let Some((first, tail)) = rest.split_first() {
            match *first {
                PARENT => {
                    base.pop();
                }
                CURRENT => {}
                _ => break,
            }
            rest = tail;
        }
        if rest.is_empty() {
            return Err(ReferenceError::invalid(input, "path names no document"));
        }
        if rest.iter().any(|s| s.is_empty()) {
            return Err(ReferenceError::invalid(input, "empty path segment"));
        }

        // Recognise the metadata folder on the escaped text, so an escaped
        // leading period names an ordinary space.
        let segments: Vec<String> = rest.iter().map(|s| unescape(s)).collect();
        let shape = match rest {
            [.., folder, marker, _]
                if *marker == ATTACHMENTS_FOLDER && folder.starts_with(METADATA_PREFIX) =>
            {
                classify(&segments, true)
            }
            _ => segments
                .split_last()
                .map(|(name, space)| PathShape::Document { space, name }),
        };
        let Some(shape) = shape else {
            return Err(ReferenceError::invalid(input, "path names no document"));
        };

        match (expected, &shape) {
            (Some(EntityType::Document), PathShape::Attachment { .. }) => {
                return Err(ReferenceError::invalid(
                    input,
                    "expected a document but found an attachment path",
                ));
            }
            (Some(EntityType::Attachment), PathShape::Document { .. }) => {
                return Err(ReferenceError::invalid(
                    input,
                    "expected an attachment but found a document path",
                ));
            }
            _ => {}
        }
        build(shape, None, base)
    }
}

impl ReferenceSerializer for PathSyntax {
    /// Serialize as an absolute path (`/Space/Page`), which resolves the
    /// same way whatever document is current.
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        let (space, tail) = Self::split_target(reference)?;
        let mut out = String::new();
        for segment in space.iter().map(|s| escape_segment(s)).chain(tail) {
            out.push(SEPARATOR);
            out.push_str(&segment);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wikiref_types::{AttachmentReference, SpaceReference};

    fn space(names: &[&str]) -> Option<SpaceReference> {
        Some(SpaceReference::new(None, names.iter().copied()).unwrap())
    }

    fn doc(name: &str, names: &[&str]) -> DocumentReference {
        let space = if names.is_empty() { None } else { space(names) };
        DocumentReference::new(name, space).unwrap()
    }

    #[test]
    fn parent_segments_pop_the_current_space() {
        let current = doc("Here", &["A", "B"]);
        let r = PathSyntax.parse("../C/Doc", None, Some(&current)).unwrap();
        assert_eq!(r, doc("Doc", &["A", "C"]).into());
    }

    #[test]
    fn parent_beyond_root_stays_at_root() {
        let current = doc("Here", &["A"]);
        let r = PathSyntax.parse("../../Doc", None, Some(&current)).unwrap();
        assert_eq!(r, doc("Doc", &[]).into());
    }

    #[test]
    fn attachment_in_current_space() {
        let current = doc("Here", &["A"]);
        let r = PathSyntax
            .parse("./.Doc/attachments/image.png", None, Some(&current))
            .unwrap();
        let expected = AttachmentReference::new("image.png", doc("Doc", &["A"])).unwrap();
        assert_eq!(r, expected.into());
    }

    #[test]
    fn attachment_without_context() {
        let r = PathSyntax.parse("./.Doc/attachments/image.png", None, None).unwrap();
        let EntityReference::Attachment(att) = r else {
            panic!("expected attachment");
        };
        assert_eq!(att.name(), "image.png");
        assert_eq!(att.document().name(), "Doc");
    }

    #[test]
    fn attachments_folder_without_period_is_a_space() {
        let r = PathSyntax.parse("Doc/attachments/image.png", None, None).unwrap();
        assert_eq!(r, doc("image.png", &["Doc", "attachments"]).into());
    }

    #[test]
    fn middle_parent_segments_are_literal() {
        let current = doc("Here", &["A"]);
        let r = PathSyntax.parse("X/../Doc", None, Some(&current)).unwrap();
        assert_eq!(r, doc("Doc", &["A", "X", ".."]).into());
    }

    #[test]
    fn absolute_paths_ignore_the_current_document() {
        let current = doc("Here", &["A", "B"]);
        let r = PathSyntax.parse("/Main/Page", None, Some(&current)).unwrap();
        assert_eq!(r, doc("Page", &["Main"]).into());
    }

    #[test]
    fn escaped_slash_stays_in_segment() {
        let r = PathSyntax.parse(r"a\/b/Doc", None, None).unwrap();
        assert_eq!(r, doc("Doc", &["a/b"]).into());
    }

    #[test]
    fn reject_malformed_paths() {
        assert!(PathSyntax.parse("", None, None).is_err());
        assert!(PathSyntax.parse("..", None, None).is_err());
        assert!(PathSyntax.parse("./", None, None).is_err());
        assert!(PathSyntax.parse("a//b", None, None).is_err());
        assert!(PathSyntax.parse("a/", None, None).is_err());
        assert!(PathSyntax.parse("Doc", Some(EntityType::Space), None).is_err());
        assert!(PathSyntax.parse("Doc", Some(EntityType::Attachment), None).is_err());
        assert!(PathSyntax
            .parse(".D/attachments/x", Some(EntityType::Document), None)
            .is_err());
    }

    #[test]
    fn serialize_absolute() {
        let d: EntityReference = doc("Page", &["Main", "Sub"]).into();
        assert_eq!(PathSyntax.serialize(&d).unwrap(), "/Main/Sub/Page");
        let a: EntityReference = AttachmentReference::new("f.png", doc("Page", &["Main"]))
            .unwrap()
            .into();
        assert_eq!(PathSyntax.serialize(&a).unwrap(), "/Main/.Page/attachments/f.png");
    }

    #[test]
    fn serialize_relative_walks_up_to_common_space() {
        let current = doc("Here", &["A", "B"]);
        let target: EntityReference = doc("Doc", &["A", "C"]).into();
        assert_eq!(
            PathSyntax.serialize_relative(&target, Some(&current)).unwrap(),
            "../C/Doc"
        );
        let sibling: EntityReference = doc("Doc", &["A", "B"]).into();
        assert_eq!(PathSyntax.serialize_relative(&sibling, Some(&current)).unwrap(), "Doc");
    }

    #[test]
    fn serialize_rejects_spaces_and_wikis() {
        let s: EntityReference = space(&["A"]).unwrap().into();
        assert!(matches!(
            PathSyntax.serialize(&s),
            Err(ReferenceError::UnsupportedEntityType { .. })
        ));
        let wiki = wikiref_types::WikiReference::new("w").unwrap();
        let scoped = SpaceReference::new(Some(wiki), ["A"]).unwrap();
        let d: EntityReference = DocumentReference::new("P", Some(scoped)).unwrap().into();
        assert!(PathSyntax.serialize(&d).is_err());
    }

    #[test]
    fn native_attachments_are_unsupported() {
        let a: EntityReference = AttachmentReference::new("f.png", doc("Page", &["Main"]))
            .unwrap()
            .native()
            .into();
        assert!(matches!(
            PathSyntax.serialize(&a),
            Err(ReferenceError::UnsupportedEntityType { .. })
        ));
        assert!(PathSyntax.serialize_relative(&a, None).is_err());
    }

    #[test]
    fn dotted_names_are_escaped() {
        let d: EntityReference = doc("..", &[".hidden"]).into();
        let text = PathSyntax.serialize(&d).unwrap();
        assert_eq!(text, r"/\.hidden/\..");
        assert_eq!(PathSyntax.parse(&text, None, None).unwrap(), d);
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ./\\\\_-]{1,8}"
    }

    fn reference() -> impl Strategy<Value = EntityReference> {
        (
            proptest::collection::vec(name(), 0..4),
            name(),
            proptest::option::of(name()),
        )
            .prop_map(|(names, d, att)| {
                let space = if names.is_empty() {
                    None
                } else {
                    Some(SpaceReference::new(None, names).unwrap())
                };
                let document = DocumentReference::new(d, space).unwrap();
                match att {
                    Some(a) => AttachmentReference::new(a, document).unwrap().into(),
                    None => document.into(),
                }
            })
    }

    proptest! {
        #[test]
        fn absolute_roundtrip(r in reference(), ctx in proptest::collection::vec(name(), 0..3)) {
            let current = DocumentReference::new(
                "Current",
                if ctx.is_empty() { None } else { Some(SpaceReference::new(None, ctx).unwrap()) },
            ).unwrap();
            let text = PathSyntax.serialize(&r).unwrap();
            prop_assert_eq!(PathSyntax.parse(&text, None, Some(&current)).unwrap(), r);
        }

        #[test]
        fn relative_roundtrip(r in reference(), ctx in proptest::collection::vec(name(), 0..3)) {
            let current = DocumentReference::new(
                "Current",
                if ctx.is_empty() { None } else { Some(SpaceReference::new(None, ctx).unwrap()) },
            ).unwrap();
            let text = PathSyntax.serialize_relative(&r, Some(&current)).unwrap();
            prop_assert_eq!(PathSyntax.parse(&text, None, Some(&current)).unwrap(), r);
        }
    }
}
