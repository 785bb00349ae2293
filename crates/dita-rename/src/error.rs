//! Error types for renaming
//!
//! A rename failure is local to one file: it is recorded in the batch report
//! and the batch moves on.

use std::path::PathBuf;

use dita_content::{SerializeError, TopicType};

/// Errors renaming one file
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// The destination already exists; nothing was overwritten
    #[error("cannot rename {} to {}: destination exists", from.display(), to.display())]
    NameCollision { from: PathBuf, to: PathBuf },

    /// Moving the file failed
    #[error("io error renaming {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a rewritten document failed
    #[error("write error: {0}")]
    Serialize(#[from] SerializeError),
}

impl RenameError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Type is not one of the canonical content types
    NotCanonical(TopicType),
    /// Normalization failed; the topic awaits manual review
    NotNormalized,
    /// No usable title to derive a name from
    MissingTitle,
    /// The title has no word characters
    EmptyName,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCanonical(kind) => write!(f, "not a canonical type ({kind})"),
            Self::NotNormalized => f.write_str("not normalized"),
            Self::MissingTitle => f.write_str("missing title"),
            Self::EmptyName => f.write_str("title yields an empty name"),
        }
    }
}

/// Errors from the background batch worker
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A batch is already running on this slot
    #[error("a batch is already running")]
    Busy,

    /// The batch ended without delivering a result
    #[error("batch worker stopped before delivering a result")]
    Dropped,
}
