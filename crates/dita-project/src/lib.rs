//! Project graph
//!
//! Discovery reads a root map, checks that every referenced file exists,
//! scans the image folder and then resolves each topic in map order:
//! load, classify, normalize, write back if changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use dita_project::{MigrationConfig, ProjectGraph};
//!
//! let config = MigrationConfig::load("migrate.toml")?;
//! let graph = ProjectGraph::discover("project/root.ditamap", &config)?;
//! for problem in graph.problem_topics() {
//!     println!("{}", problem.path.display());
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod sidecar;
pub mod status;
pub mod topic;

pub use config::{MigrationConfig, TypicalShortDescription};
pub use error::{ConfigError, DiscoveryError, ProjectError, ProjectResult};
pub use graph::{ProjectFlavor, ProjectGraph};
pub use sidecar::Sidecar;
pub use topic::{DiscoveryIssue, Image, MapEntry, ProblemTopic, Topic, TopicId};
