//! GitHub-style content URLs.
//!
//! A repository exposes two URL families:
//!
//! - the REST contents API, `<rest_base>/Space/Sub/Page.md?ref=main`, which
//!   addresses documents and spaces (directories);
//! - raw content, `<raw_base>/Space/.Page/attachments/image.png`, which is
//!   how attachments are fetched.
//!
//! Which family a URL belongs to is decided by prefix match against the two
//! configured bases.

use wikiref_types::{
    DocumentReference, EntityReference, EntityType, ReferenceError, Result, SpaceReference,
};

use crate::error::ConfigResult;
use crate::segments::{
    build, classify, parse_url, require_metadata_storage, require_path, split_trailing_slash,
    str_segments, PathShape, UrlBase, ATTACHMENTS_FOLDER, METADATA_PREFIX,
};
use crate::traits::{ReferenceParser, ReferenceSerializer};

/// Parser and serializer for a repository's REST and raw content URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitHubUrls {
    rest_base: UrlBase,
    raw_base: UrlBase,
}

impl GitHubUrls {
    pub const NAME: &'static str = "github";

    /// Create from the REST contents base and the raw content base. Query
    /// strings and trailing slashes are ignored.
    pub fn new(rest_base: &str, raw_base: &str) -> ConfigResult<Self> {
        Ok(Self {
            rest_base: UrlBase::new("github.rest_base", rest_base)?,
            raw_base: UrlBase::new("github.raw_base", raw_base)?,
        })
    }

    pub fn rest_base(&self) -> &str {
        self.rest_base.as_str()
    }

    pub fn raw_base(&self) -> &str {
        self.raw_base.as_str()
    }

    fn parse_rest(
        input: &str,
        mut segments: Vec<String>,
        expected: Option<EntityType>,
    ) -> Result<EntityReference> {
        split_trailing_slash(&mut segments);
        require_path(input, &segments)?;
        match expected {
            None | Some(EntityType::Document) => {
                let Some(last) = segments.pop() else {
                    return Err(ReferenceError::invalid(input, "no document name"));
                };
                let name = strip_extension(&last);
                let space = if segments.is_empty() {
                    None
                } else {
                    Some(SpaceReference::new(None, segments)?)
                };
                Ok(DocumentReference::new(name, space)?.into())
            }
            Some(EntityType::Space) => Ok(SpaceReference::new(None, segments)?.into()),
            Some(other) => Err(ReferenceError::invalid(
                input,
                format!("REST content URLs cannot address a {other}"),
            )),
        }
    }

    fn parse_raw(
        input: &str,
        segments: Vec<String>,
        expected: Option<EntityType>,
    ) -> Result<EntityReference> {
        if !matches!(expected, None | Some(EntityType::Attachment)) {
            return Err(ReferenceError::invalid(
                input,
                "raw content URLs only address attachments",
            ));
        }
        require_path(input, &segments)?;
        match classify(&segments, false) {
            Some(shape @ PathShape::Attachment { .. }) => build(shape, None, Vec::new()),
            _ => Err(ReferenceError::invalid(
                input,
                "raw content URL is not inside an attachments folder",
            )),
        }
    }

    fn check_no_wiki(space: Option<&SpaceReference>) -> Result<()> {
        if space.and_then(SpaceReference::wiki).is_some() {
            return Err(ReferenceError::unsupported(Self::NAME, EntityType::Wiki));
        }
        Ok(())
    }
}

/// `Page.md` -> `Page`. A leading period is part of the name, not an
/// extension.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

impl ReferenceParser for GitHubUrls {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        _current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        let url = parse_url(input)?;
        let rest = self.rest_base.segments_below(input, &url)?;
        let raw = self.raw_base.segments_below(input, &url)?;
        // When one base is nested in the other, the deeper match wins.
        match (rest, raw) {
            (Some(rest), Some(raw)) if rest.len() <= raw.len() => {
                Self::parse_rest(input, rest, expected)
            }
            (_, Some(raw)) => Self::parse_raw(input, raw, expected),
            (Some(rest), None) => Self::parse_rest(input, rest, expected),
            (None, None) => Err(ReferenceError::invalid(
                input,
                "URL matches neither the REST nor the raw content base",
            )),
        }
    }
}

impl ReferenceSerializer for GitHubUrls {
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        match reference {
            EntityReference::Wiki(_) => Err(ReferenceError::unsupported(
                Self::NAME,
                EntityType::Wiki,
            )),
            EntityReference::Space(space) => {
                Self::check_no_wiki(Some(space))?;
                self.rest_base.join(str_segments(space.names()))
            }
            EntityReference::Document(document) => {
                Self::check_no_wiki(document.space())?;
                let mut segments = str_segments(document.space_names());
                segments.push(document.name());
                self.rest_base.join(segments)
            }
            EntityReference::Attachment(attachment) => {
                require_metadata_storage(Self::NAME, attachment)?;
                let document = attachment.document();
                Self::check_no_wiki(document.space())?;
                let folder = format!("{METADATA_PREFIX}{}", document.name());
                let mut segments = str_segments(document.space_names());
                segments.extend([folder.as_str(), ATTACHMENTS_FOLDER, attachment.name()]);
                self.raw_base.join(segments)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wikiref_types::AttachmentReference;

    const REST: &str = "https://api.github.com/repos/acme/docs/contents";
    const RAW: &str = "https://raw.githubusercontent.com/acme/docs/main";

    fn urls() -> GitHubUrls {
        GitHubUrls::new(REST, &format!("{RAW}/")).unwrap()
    }

    fn space(names: &[&str]) -> SpaceReference {
        SpaceReference::new(None, names.iter().copied()).unwrap()
    }

    #[test]
    fn rest_document_strips_extension() {
        let r = urls()
            .parse(&format!("{REST}/Space/Sub/Page.md"), Some(EntityType::Document), None)
            .unwrap();
        let expected = DocumentReference::new("Page", Some(space(&["Space", "Sub"]))).unwrap();
        assert_eq!(r, expected.into());
    }

    #[test]
    fn rest_query_string_is_ignored() {
        let r = urls()
            .parse(&format!("{REST}/Space/Page.md?ref=main"), None, None)
            .unwrap();
        let expected = DocumentReference::new("Page", Some(space(&["Space"]))).unwrap();
        assert_eq!(r, expected.into());
    }

    #[test]
    fn rest_space() {
        let r = urls()
            .parse(&format!("{REST}/Space/Sub"), Some(EntityType::Space), None)
            .unwrap();
        assert_eq!(r, space(&["Space", "Sub"]).into());
    }

    #[test]
    fn rest_rejects_other_types() {
        let url = format!("{REST}/Space/Page");
        assert!(urls().parse(&url, Some(EntityType::Attachment), None).is_err());
        assert!(urls().parse(&url, Some(EntityType::Wiki), None).is_err());
        assert!(urls().parse(&format!("{REST}/"), None, None).is_err());
    }

    #[test]
    fn raw_attachment() {
        let r = urls()
            .parse(&format!("{RAW}/Space/.Page/attachments/img.png"), None, None)
            .unwrap();
        let document = DocumentReference::new("Page", Some(space(&["Space"]))).unwrap();
        assert_eq!(r, AttachmentReference::new("img.png", document).unwrap().into());
    }

    #[test]
    fn raw_non_attachment_is_rejected() {
        assert!(urls().parse(&format!("{RAW}/Space/Page.md"), None, None).is_err());
        assert!(urls()
            .parse(&format!("{RAW}/.P/attachments/x"), Some(EntityType::Document), None)
            .is_err());
    }

    #[test]
    fn foreign_url_is_rejected() {
        let err = urls().parse("https://example.org/Space/Page", None, None).unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidReference { .. }));
    }

    #[test]
    fn serialize_space_and_document() {
        assert_eq!(
            urls().serialize(&space(&["Space"]).into()).unwrap(),
            format!("{REST}/Space")
        );
        let d = DocumentReference::new("Page", Some(space(&["Space", "Sub"]))).unwrap();
        assert_eq!(urls().serialize(&d.into()).unwrap(), format!("{REST}/Space/Sub/Page"));
        let top = DocumentReference::new("Page", None).unwrap();
        assert_eq!(urls().serialize(&top.into()).unwrap(), format!("{REST}/Page"));
    }

    #[test]
    fn serialize_attachment_uses_raw_base() {
        let d = DocumentReference::new("Page", Some(space(&["Space"]))).unwrap();
        let a = AttachmentReference::new("img.png", d).unwrap();
        assert_eq!(
            urls().serialize(&a.into()).unwrap(),
            format!("{RAW}/Space/.Page/attachments/img.png")
        );
    }

    #[test]
    fn serialize_rejects_wiki_and_dot_segments() {
        let w = wikiref_types::WikiReference::new("w").unwrap();
        assert!(matches!(
            urls().serialize(&w.into()),
            Err(ReferenceError::UnsupportedEntityType { .. })
        ));
        let d = DocumentReference::new("..", None).unwrap();
        assert!(matches!(
            urls().serialize(&d.into()),
            Err(ReferenceError::InvalidReference { .. })
        ));
    }

    #[test]
    fn names_are_percent_encoded() {
        let d = DocumentReference::new("My Page", Some(space(&["Café"]))).unwrap();
        let url = urls().serialize(&d.clone().into()).unwrap();
        assert_eq!(url, format!("{REST}/Caf%C3%A9/My%20Page"));

        let r = urls()
            .parse(&format!("{REST}/Caf%C3%A9/My%20Page.md"), None, None)
            .unwrap();
        assert_eq!(r, d.into());

        let slash = DocumentReference::new("a/b", None).unwrap();
        let url = urls().serialize(&slash.clone().into()).unwrap();
        assert_eq!(url, format!("{REST}/a%2Fb"));
        assert_eq!(urls().parse(&url, None, None).unwrap(), slash.into());
    }

    #[test]
    fn attachment_names_are_percent_encoded() {
        let d = DocumentReference::new("My Page", Some(space(&["Café"]))).unwrap();
        let a: EntityReference = AttachmentReference::new("photo 1.png", d).unwrap().into();
        let url = urls().serialize(&a).unwrap();
        assert_eq!(url, format!("{RAW}/Caf%C3%A9/.My%20Page/attachments/photo%201.png"));
        assert_eq!(urls().parse(&url, None, None).unwrap(), a);
    }

    #[test]
    fn native_attachments_are_unsupported() {
        let d = DocumentReference::new("Page", Some(space(&["Space"]))).unwrap();
        let a = AttachmentReference::new("img.png", d).unwrap().native();
        assert!(matches!(
            urls().serialize(&a.into()),
            Err(ReferenceError::UnsupportedEntityType { .. })
        ));
    }

    #[test]
    fn invalid_bases_are_config_errors() {
        assert!(GitHubUrls::new("not a url", RAW).is_err());
        assert!(matches!(
            GitHubUrls::new(REST, "file:///tmp/raw"),
            Err(crate::ConfigError::InvalidUrl { field: "github.raw_base", .. })
        ));
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_é-][a-zA-Z0-9 _%/?#é-]{0,7}"
    }

    proptest! {
        #[test]
        fn roundtrip(
            names in proptest::collection::vec(name(), 0..4),
            doc in name(),
            att in proptest::option::of("[a-z]{1,6}\\.[a-z]{2,3}"),
        ) {
            let space = if names.is_empty() { None } else { Some(SpaceReference::new(None, names).unwrap()) };
            let document = DocumentReference::new(doc, space).unwrap();
            let r: EntityReference = match att {
                Some(a) => AttachmentReference::new(a, document).unwrap().into(),
                None => document.into(),
            };
            let url = urls().serialize(&r).unwrap();
            prop_assert_eq!(urls().parse(&url, Some(r.entity_type()), None).unwrap(), r);
        }
    }
}
