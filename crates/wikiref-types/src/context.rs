//! The current-document context used to resolve relative references.
//!
//! The host application knows which document is open; the reference core
//! only ever reads a snapshot of it. [`CurrentDocument`] is the seam: hosts
//! implement it over whatever state they keep, and parsers receive the
//! snapshot as a plain `Option<&DocumentReference>`.

use crate::reference::DocumentReference;

/// Read access to the document currently being viewed or edited.
pub trait CurrentDocument {
    /// A point-in-time snapshot of the open document, or `None` when no
    /// document is open.
    fn current_document(&self) -> Option<DocumentReference>;
}

/// No document is open.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCurrentDocument;

impl CurrentDocument for NoCurrentDocument {
    fn current_document(&self) -> Option<DocumentReference> {
        None
    }
}

impl CurrentDocument for DocumentReference {
    fn current_document(&self) -> Option<DocumentReference> {
        Some(self.clone())
    }
}

impl<F> CurrentDocument for F
where
    F: Fn() -> Option<DocumentReference>,
{
    fn current_document(&self) -> Option<DocumentReference> {
        self()
    }
}
