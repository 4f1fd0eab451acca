//! Error types for article sync.

use std::path::PathBuf;

use crate::document::DocumentState;
use crate::remote::RemoteError;

/// Error while syncing a single document.
///
/// Any of these stops processing of the document it was raised for. The
/// orchestrator records it and moves on to the next document in the run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Neither the document, its parent, nor the run defaults give a placement.
    #[error("cannot resolve placement for {path}: missing {missing}")]
    PlacementUnresolved {
        /// Relative path of the document.
        path: String,
        /// Name of the missing field (`space` or `ancestor_id`).
        missing: &'static str,
    },

    /// Parent chain leads back to a document that is still being resolved.
    #[error("cycle in parent chain of {path} (revisits {revisited})")]
    CycleDetected {
        /// Relative path of the document being placed.
        path: String,
        /// Relative path found twice on the chain.
        revisited: String,
    },

    /// An ancestor failed earlier in this run.
    #[error("parent {parent} of {path} failed to sync")]
    ParentFailed {
        /// Relative path of the document.
        path: String,
        /// Relative path of the failed ancestor.
        parent: String,
    },

    /// State machine was asked to move backwards.
    #[error("invalid state transition for {path}: {from} -> {to}")]
    InvalidTransition {
        /// Relative path of the document.
        path: String,
        /// Current state.
        from: DocumentState,
        /// Requested state.
        to: DocumentState,
    },

    /// Update attempted before the remote page ID and version were known.
    #[error("no remote page tracked for {0}")]
    MissingRemotePage(String),

    /// Remote API call failed.
    #[error("remote call failed for {path}")]
    Remote {
        /// Relative path of the document.
        path: String,
        /// Underlying remote error.
        #[source]
        source: RemoteError,
    },
}

/// Error while reading or parsing a document's content.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Content file could not be read.
    #[error("cannot read {}", path.display())]
    Io {
        /// Path of the content file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Front matter is not valid YAML or has the wrong shape.
    #[error("invalid front matter in {}: {message}", path.display())]
    FrontMatter {
        /// Path of the content file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Front matter block opened with `---` but never closed.
    #[error("unterminated front matter in {}", .0.display())]
    Unterminated(PathBuf),
}
