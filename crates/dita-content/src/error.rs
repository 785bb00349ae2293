//! Error types for the content model
//!
//! Provides error handling for:
//! - Parse operations (file → [`DocumentTree`](crate::DocumentTree))
//! - Structural transforms (classify / normalize / field edits)
//! - Serialize operations (tree → file)

use std::path::PathBuf;

/// Errors while reading a document (ingress)
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed XML
    #[error("syntax error in {path}: {message}")]
    SyntaxError { path: PathBuf, message: String },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document contains no root element
    #[error("no root element in {0}")]
    NoRoot(PathBuf),
}

impl ParseError {
    /// Create syntax error for path
    pub fn syntax_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a path to an error produced while parsing an in-memory string.
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::SyntaxError { message, .. } => Self::SyntaxError {
                path: path.into(),
                message,
            },
            Self::NoRoot(_) => Self::NoRoot(path.into()),
            other => other,
        }
    }
}

/// A document does not have the structure its type requires.
///
/// Never fatal for a batch: the document is reported and left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// Neither the legacy nor the canonical body element exists
    #[error("<{root}> has no body element (expected <body> or <{expected}>)")]
    MissingBody { root: String, expected: String },

    /// A task with no list and no enumerated paragraphs
    #[error("task body has nothing convertible to steps")]
    NoSteps,

    /// Only canonical content types can be normalized
    #[error("cannot normalize to an unclassified type")]
    Unclassified,

    /// Title and short description may not be set to empty text
    #[error("{field} may not be empty")]
    EmptyText { field: &'static str },
}

/// Errors while writing a document (egress)
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatting into the output buffer failed
    #[error("format error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl SerializeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined content model error
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),
}

/// Result type alias for content operations
pub type ContentResult<T> = Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::syntax_error("a.dita", "unexpected end");
        assert_eq!(err.to_string(), "syntax error in a.dita: unexpected end");
    }

    #[test]
    fn with_path_replaces_placeholder_path() {
        let err = ParseError::syntax_error("<string>", "bad").with_path("topics/b.dita");
        assert!(err.to_string().contains("topics/b.dita"));
    }

    #[test]
    fn structure_error_display() {
        let err = StructureError::MissingBody {
            root: "topic".to_string(),
            expected: "taskbody".to_string(),
        };
        assert!(err.to_string().contains("<taskbody>"));
    }

    #[test]
    fn error_conversions() {
        let err: ContentError = StructureError::NoSteps.into();
        assert!(matches!(err, ContentError::Structure(StructureError::NoSteps)));
    }
}
