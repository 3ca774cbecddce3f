//! Backend reference grammars for wikiref.
//!
//! Each backend that hosts a wiki writes references its own way: the wiki
//! server's link syntax and view URLs, relative paths on a filesystem, REST
//! and raw URLs of a Git hosting service, and per-user WebDAV storage URLs.
//! This crate converts between those strings and the canonical
//! [`wikiref_types::EntityReference`] tree.
//!
//! # Architecture
//!
//! - Every grammar implements [`ReferenceParser`] and [`ReferenceSerializer`].
//! - [`ReferenceSyntax`] is the closed set of grammars, and
//!   [`ReferenceRegistry`] picks one for a [`BackendKind`] and [`Grammar`]
//!   using a [`RegistryConfig`].
//! - Grammars are pure values; the current document is passed to each parse
//!   as a snapshot.
//!
//! # Modules
//!
//! - [`canonical`] — `wiki:Space.Page@file` link syntax
//! - [`path`] — Filesystem paths, absolute or relative to the current document
//! - [`github`] — REST contents and raw content URLs
//! - [`webdav`] — Per-user WebDAV storage URLs
//! - [`server`] — Wiki server view and download URLs
//! - [`registry`] — Backend selection
//! - [`config`] — TOML configuration
//! - [`error`] — Configuration errors

pub mod canonical;
pub mod config;
pub mod error;
pub mod github;
pub mod path;
pub mod registry;
pub mod server;
pub mod traits;
pub mod webdav;

mod segments;

pub use canonical::CanonicalSyntax;
pub use config::{GitHubConfig, RegistryConfig, WebDavConfig, WikiServerConfig};
pub use error::{ConfigError, ConfigResult};
pub use github::GitHubUrls;
pub use path::PathSyntax;
pub use registry::{BackendKind, Grammar, ReferenceRegistry, ReferenceSyntax};
pub use server::ServerUrls;
pub use traits::{ReferenceParser, ReferenceSerializer};
pub use webdav::WebDavUrls;
