//! Backend configuration, loaded from TOML.
//!
//! ```toml
//! [wiki_server]
//! base_url = "https://wiki.example.org/xwiki"
//!
//! [github]
//! rest_base = "https://api.github.com/repos/acme/docs/contents"
//! raw_base = "https://raw.githubusercontent.com/acme/docs/main"
//!
//! [webdav]
//! storage_root = "https://cloud.example.org/remote.php/dav/files/{username}/.wiki"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::segments::UrlBase;
use crate::server::DEFAULT_INDEX_DOCUMENT;

/// Placeholder substituted with the authenticated user name.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Settings for every backend. Each section is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default)]
    pub wiki_server: Option<WikiServerConfig>,
    #[serde(default)]
    pub github: Option<GitHubConfig>,
    #[serde(default)]
    pub webdav: Option<WebDavConfig>,
}

impl RegistryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded reference registry config");
        Ok(config)
    }

    /// Check every configured URL.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(server) = &self.wiki_server {
            UrlBase::new("wiki_server.base_url", &server.base_url)?;
            if server.index_document.is_empty() {
                return Err(ConfigError::InvalidField {
                    field: "wiki_server.index_document",
                    reason: "index document name is empty".into(),
                });
            }
        }
        if let Some(github) = &self.github {
            UrlBase::new("github.rest_base", &github.rest_base)?;
            UrlBase::new("github.raw_base", &github.raw_base)?;
        }
        if let Some(webdav) = &self.webdav {
            if !webdav.storage_root.contains(USERNAME_PLACEHOLDER) {
                return Err(ConfigError::MissingUserPlaceholder(
                    webdav.storage_root.clone(),
                ));
            }
            UrlBase::new(
                "webdav.storage_root",
                &webdav.storage_root.replace(USERNAME_PLACEHOLDER, "user"),
            )?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WikiServerConfig {
    pub base_url: String,
    #[serde(default = "default_index_document")]
    pub index_document: String,
}

impl Default for WikiServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/xwiki".into(),
            index_document: default_index_document(),
        }
    }
}

fn default_index_document() -> String {
    DEFAULT_INDEX_DOCUMENT.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST contents API base, e.g. `https://api.github.com/repos/o/r/contents`.
    pub rest_base: String,
    /// Raw content base, e.g. `https://raw.githubusercontent.com/o/r/main`.
    pub raw_base: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebDavConfig {
    /// Storage root template; must contain `{username}`.
    pub storage_root: String,
}

impl WebDavConfig {
    /// Substitute `username` into the storage root template.
    pub fn storage_root_for(&self, username: &str) -> ConfigResult<String> {
        if matches!(username, "" | "." | "..") || username.contains(['/', '\\', '?', '#']) {
            return Err(ConfigError::InvalidIdentity(username.to_string()));
        }
        if !self.storage_root.contains(USERNAME_PLACEHOLDER) {
            return Err(ConfigError::MissingUserPlaceholder(self.storage_root.clone()));
        }
        Ok(self.storage_root.replace(USERNAME_PLACEHOLDER, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
[wiki_server]
base_url = "https://wiki.example.org/xwiki"

[github]
rest_base = "https://api.github.com/repos/acme/docs/contents"
raw_base = "https://raw.githubusercontent.com/acme/docs/main"

[webdav]
storage_root = "https://cloud.example.org/remote.php/dav/files/{username}/.wiki"
"#;

    #[test]
    fn default_config_is_empty() {
        let c = RegistryConfig::default();
        assert!(c.wiki_server.is_none());
        assert!(c.github.is_none());
        assert!(c.webdav.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let c = RegistryConfig::from_toml_str(FULL).unwrap();
        let server = c.wiki_server.unwrap();
        assert_eq!(server.base_url, "https://wiki.example.org/xwiki");
        assert_eq!(server.index_document, "WebHome");
        assert_eq!(
            c.github.unwrap().raw_base,
            "https://raw.githubusercontent.com/acme/docs/main"
        );
    }

    #[test]
    fn custom_index_document() {
        let c = RegistryConfig::from_toml_str(
            "[wiki_server]\nbase_url = \"https://w.org\"\nindex_document = \"Home\"\n",
        )
        .unwrap();
        assert_eq!(c.wiki_server.unwrap().index_document, "Home");
    }

    #[test]
    fn reject_bad_urls() {
        let err = RegistryConfig::from_toml_str("[wiki_server]\nbase_url = \"not a url\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "wiki_server.base_url", .. }));

        let err = RegistryConfig::from_toml_str(
            "[github]\nrest_base = \"ftp://h/x\"\nraw_base = \"https://h/y\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "github.rest_base", .. }));
    }

    #[test]
    fn reject_empty_index_document() {
        let err = RegistryConfig::from_toml_str(
            "[wiki_server]\nbase_url = \"https://w.org\"\nindex_document = \"\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }

    #[test]
    fn reject_template_without_placeholder() {
        let err = RegistryConfig::from_toml_str("[webdav]\nstorage_root = \"https://h/dav\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingUserPlaceholder(_)));
    }

    #[test]
    fn reject_unknown_section() {
        let err = RegistryConfig::from_toml_str("[gitlab]\nbase = \"https://h\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn storage_root_substitutes_user() {
        let c = WebDavConfig {
            storage_root: "https://h/dav/files/{username}/.wiki".into(),
        };
        assert_eq!(c.storage_root_for("alice").unwrap(), "https://h/dav/files/alice/.wiki");
        assert!(matches!(c.storage_root_for(""), Err(ConfigError::InvalidIdentity(_))));
        assert!(matches!(c.storage_root_for("a/b"), Err(ConfigError::InvalidIdentity(_))));
        assert!(matches!(c.storage_root_for(".."), Err(ConfigError::InvalidIdentity(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let c = RegistryConfig::load(file.path()).unwrap();
        assert!(c.webdav.is_some());

        let missing = file.path().with_extension("missing");
        assert!(matches!(RegistryConfig::load(&missing), Err(ConfigError::Io(_))));
    }

    #[test]
    fn toml_round_trip() {
        let c = RegistryConfig::from_toml_str(FULL).unwrap();
        let text = toml::to_string(&c).unwrap();
        assert_eq!(RegistryConfig::from_toml_str(&text).unwrap(), c);
    }
}
