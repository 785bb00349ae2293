//! Error types for project discovery
//!
//! Only two failures abort discovery: a map that does not parse and a map
//! entry pointing at a file that does not exist. Everything else is recorded
//! per file and discovery continues.

use std::path::PathBuf;

use dita_content::{ContentError, ParseError, SerializeError};

/// Errors that abort building a [`ProjectGraph`](crate::ProjectGraph)
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The root map could not be read
    #[error("cannot read map: {0}")]
    Map(#[source] ParseError),

    /// A map entry references a file that does not exist
    #[error("map {map} references missing file {href} (expected at {expected})")]
    MissingReference {
        map: PathBuf,
        href: String,
        expected: PathBuf,
    },

    /// The project folder could not be listed
    #[error("io error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the synchronized map back failed
    #[error("cannot write map: {0}")]
    WriteMap(#[from] SerializeError),
}

impl DiscoveryError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`MigrationConfig`](crate::MigrationConfig)
    #[error("invalid configuration in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Combined project error
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SerializeError> for ProjectError {
    fn from(err: SerializeError) -> Self {
        Self::Content(err.into())
    }
}

impl From<ParseError> for ProjectError {
    fn from(err: ParseError) -> Self {
        Self::Content(err.into())
    }
}

/// Result type alias for project operations
pub type ProjectResult<T> = Result<T, ProjectError>;
