//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use deck_core::export::ExportError;
use storage::StoreError;

/// Editor actions that talk to the deck store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Fetch,
    Save,
    Delete,
    Create,
    Download,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "file list refresh",
            Operation::Fetch => "deck load",
            Operation::Save => "save",
            Operation::Delete => "delete",
            Operation::Create => "deck creation",
            Operation::Download => "download",
        };
        f.write_str(name)
    }
}

/// Errors emitted by `DeckEditor`.
///
/// The `Display` text is what the user sees in the notification, so each
/// message names the action that failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EditorError {
    #[error("Failed to get file list: {0}")]
    List(#[source] StoreError),

    #[error("Failed to get deck: {0}")]
    Fetch(#[source] StoreError),

    #[error("Save failed: {0}")]
    Save(#[source] StoreError),

    #[error("Delete failed: {0}")]
    Delete(#[source] StoreError),

    #[error("Create deck failed: {0}")]
    Create(#[source] StoreError),

    #[error("Download failed: {0}")]
    Download(#[source] StoreError),

    #[error("Download failed: {0}")]
    Export(#[from] ExportError),

    #[error("Please select or create a deck file first")]
    NoFileSelected,

    #[error("Please select a deck file first")]
    NoFileToDownload,

    #[error("Deck filename cannot be empty")]
    EmptyFilename,

    #[error("Delete was not confirmed")]
    NotConfirmed,

    /// The control is disabled while the same kind of request is pending.
    #[error("{0} already in progress")]
    InFlight(Operation),
}

impl EditorError {
    /// Whether this error is shown to the user as a notification.
    ///
    /// Disabled-control rejections are not; everything else is.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        !matches!(self, EditorError::InFlight(_) | EditorError::NotConfirmed)
    }
}
