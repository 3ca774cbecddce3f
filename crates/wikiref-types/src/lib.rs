//! Canonical entity references for wikiref.
//!
//! This crate provides the backend-agnostic reference tree every other
//! wikiref crate converts to and from. A reference identifies a wiki, a
//! space, a document, or an attachment without saying anything about where
//! or how a backend stores it.
//!
//! # Key Types
//!
//! - [`EntityReference`] — Sum type over the four reference variants
//! - [`EntityType`] — Discriminator for the variants
//! - [`WikiReference`], [`SpaceReference`], [`DocumentReference`],
//!   [`AttachmentReference`] — The variants themselves
//! - [`CurrentDocument`] — Host-provided snapshot of the open document
//! - [`ReferenceError`] — Errors shared by every grammar

pub mod context;
pub mod error;
pub mod reference;

pub use context::{CurrentDocument, NoCurrentDocument};
pub use error::{ReferenceError, Result};
pub use reference::{
    AttachmentReference, AttachmentStorage, DocumentReference, EntityReference, EntityType,
    SpaceReference, WikiReference,
};
