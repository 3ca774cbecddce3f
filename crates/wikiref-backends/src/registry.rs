//! Selecting a grammar for a backend.
//!
//! [`ReferenceRegistry`] maps a [`BackendKind`] and a [`Grammar`] to a
//! [`ReferenceSyntax`], a closed set of every grammar this crate implements.
//! The user identity needed by per-user storage is passed in explicitly and
//! never looked up behind the caller's back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wikiref_types::{CurrentDocument, DocumentReference, EntityReference, EntityType, Result};

use crate::canonical::CanonicalSyntax;
use crate::config::RegistryConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::github::GitHubUrls;
use crate::path::PathSyntax;
use crate::server::ServerUrls;
use crate::traits::{ReferenceParser, ReferenceSerializer};
use crate::webdav::WebDavUrls;

/// The storage backends a wiki can live on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    WikiServer,
    #[serde(rename = "filesystem")]
    FileSystem,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "webdav")]
    WebDav,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::WikiServer,
        BackendKind::FileSystem,
        BackendKind::GitHub,
        BackendKind::WebDav,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::WikiServer => "wiki-server",
            BackendKind::FileSystem => "filesystem",
            BackendKind::GitHub => "github",
            BackendKind::WebDav => "webdav",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        BackendKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownBackend(s.to_string()))
    }
}

/// Which string form a reference takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// References written inside document content.
    Link,
    /// URLs the backend serves the entity at.
    RemoteUrl,
}

/// Every grammar, dispatched by `match`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceSyntax {
    Canonical(CanonicalSyntax),
    Path(PathSyntax),
    GitHub(GitHubUrls),
    WebDav(WebDavUrls),
    Server(ServerUrls),
}

impl ReferenceSyntax {
    /// Human readable grammar name.
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceSyntax::Canonical(_) => CanonicalSyntax::NAME,
            ReferenceSyntax::Path(_) => PathSyntax::NAME,
            ReferenceSyntax::GitHub(_) => GitHubUrls::NAME,
            ReferenceSyntax::WebDav(_) => WebDavUrls::NAME,
            ReferenceSyntax::Server(_) => ServerUrls::NAME,
        }
    }

    /// Parse against the document `context` has open right now.
    ///
    /// The snapshot is taken once, before parsing starts.
    pub fn parse_in(
        &self,
        input: &str,
        expected: Option<EntityType>,
        context: &dyn CurrentDocument,
    ) -> Result<EntityReference> {
        let current = context.current_document();
        self.parse(input, expected, current.as_ref())
    }

    fn parser(&self) -> &dyn ReferenceParser {
        match self {
            ReferenceSyntax::Canonical(s) => s,
            ReferenceSyntax::Path(s) => s,
            ReferenceSyntax::GitHub(s) => s,
            ReferenceSyntax::WebDav(s) => s,
            ReferenceSyntax::Server(s) => s,
        }
    }

    fn serializer(&self) -> &dyn ReferenceSerializer {
        match self {
            ReferenceSyntax::Canonical(s) => s,
            ReferenceSyntax::Path(s) => s,
            ReferenceSyntax::GitHub(s) => s,
            ReferenceSyntax::WebDav(s) => s,
            ReferenceSyntax::Server(s) => s,
        }
    }
}

impl ReferenceParser for ReferenceSyntax {
    fn parse(
        &self,
        input: &str,
        expected: Option<EntityType>,
        current: Option<&DocumentReference>,
    ) -> Result<EntityReference> {
        match self.parser().parse(input, expected, current) {
            Ok(reference) => {
                tracing::trace!(grammar = self.name(), input, ?reference, "parsed reference");
                Ok(reference)
            }
            Err(e) => {
                tracing::debug!(grammar = self.name(), input, error = %e, "rejected reference");
                Err(e)
            }
        }
    }
}

impl ReferenceSerializer for ReferenceSyntax {
    fn serialize(&self, reference: &EntityReference) -> Result<String> {
        match self.serializer().serialize(reference) {
            Ok(text) => {
                tracing::trace!(grammar = self.name(), ?reference, output = %text, "serialized reference");
                Ok(text)
            }
            Err(e) => {
                tracing::debug!(grammar = self.name(), ?reference, error = %e, "cannot serialize reference");
                Err(e)
            }
        }
    }
}

/// Resolves backend grammars from configuration.
#[derive(Clone, Debug, Default)]
pub struct ReferenceRegistry {
    config: RegistryConfig,
    user: Option<String>,
}

impl ReferenceRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config, user: None }
    }

    /// Set the authenticated user for per-user storage backends.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The grammar `kind` uses for `grammar`.
    pub fn resolve(&self, kind: BackendKind, grammar: Grammar) -> ConfigResult<ReferenceSyntax> {
        let syntax = match (kind, grammar) {
            (BackendKind::WikiServer, Grammar::Link) => {
                ReferenceSyntax::Canonical(CanonicalSyntax::new())
            }
            (_, Grammar::Link) | (BackendKind::FileSystem, Grammar::RemoteUrl) => {
                ReferenceSyntax::Path(PathSyntax::new())
            }
            (BackendKind::WikiServer, Grammar::RemoteUrl) => {
                let server = self
                    .config
                    .wiki_server
                    .as_ref()
                    .ok_or(ConfigError::MissingSection("wiki_server"))?;
                ReferenceSyntax::Server(
                    ServerUrls::new(&server.base_url)?
                        .with_index_document(&server.index_document),
                )
            }
            (BackendKind::GitHub, Grammar::RemoteUrl) => {
                let github = self
                    .config
                    .github
                    .as_ref()
                    .ok_or(ConfigError::MissingSection("github"))?;
                ReferenceSyntax::GitHub(GitHubUrls::new(&github.rest_base, &github.raw_base)?)
            }
            (BackendKind::WebDav, Grammar::RemoteUrl) => {
                let webdav = self
                    .config
                    .webdav
                    .as_ref()
                    .ok_or(ConfigError::MissingSection("webdav"))?;
                let user = self
                    .user
                    .as_deref()
                    .ok_or(ConfigError::MissingIdentity(BackendKind::WebDav))?;
                ReferenceSyntax::WebDav(WebDavUrls::new(&webdav.storage_root_for(user)?)?)
            }
        };
        tracing::debug!(backend = %kind, ?grammar, syntax = syntax.name(), "resolved reference syntax");
        Ok(syntax)
    }
}
