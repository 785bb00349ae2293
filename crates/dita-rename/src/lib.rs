//! Identity & rename engine
//!
//! Derives file names from titles and moves topics and images to them,
//! keeping every reference (local links, map entries, sidecars, figures)
//! pointing at the new name.
//!
//! # Example
//!
//! ```rust,ignore
//! use dita_project::{MigrationConfig, ProjectGraph};
//! use dita_rename::{rename_images, rename_topics};
//!
//! let mut graph = ProjectGraph::discover("project/root.ditamap", &MigrationConfig::new())?;
//! let topics = rename_topics(&mut graph);
//! let images = rename_images(&mut graph, "acme");
//! println!("{topics}\n{images}");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod images;
pub mod naming;
pub mod report;
pub mod worker;

pub use context::BatchContext;
pub use engine::{rename_topic, rename_topics};
pub use error::{RenameError, SkipReason, WorkerError};
pub use images::{plan_image_names, rename_images, PlannedImage};
pub use naming::{base_name, image_marker, image_stem};
pub use report::{BatchReport, FileOutcome, FileReport};
pub use worker::{BatchGuard, BatchHandle, BatchSlot};
