//! Topic content model
//!
//! An arena-backed XML tree with the topic-level operations the migration
//! needs: reading and writing title and short description, enumerating local
//! links and figures, classifying a legacy body and normalizing it to a
//! canonical topic type.
//!
//! # Pipeline
//!
//! ```text
//! file → DocumentTree::load → classify → normalize_to(type) → write → file
//!                                 ↑_____________↓
//!                        title / links / figures edits
//! ```
//!
//! # Example
//!
//! ```rust
//! use dita_content::{DocumentTree, NormalizeOutcome, TopicType};
//!
//! let mut tree = DocumentTree::parse_str(
//!     "<topic><title>Pump</title><body><p>1. Open the valve</p></body></topic>",
//! )?;
//! let kind = tree.classify();
//! assert_eq!(kind, TopicType::Task);
//! assert_eq!(tree.normalize_to(kind)?, NormalizeOutcome::Normalized);
//! assert!(tree.to_xml_string()?.contains("<cmd>Open the valve</cmd>"));
//! # Ok::<(), dita_content::ContentError>(())
//! ```

pub mod content;
pub mod error;
pub mod href;
pub mod kind;
pub mod normalize;
pub mod tree;
pub mod xml;

pub use content::{Figure, BODY_TAGS};
pub use error::{ContentError, ContentResult, ParseError, SerializeError, StructureError};
pub use href::{href_file_name, href_targets, normalize_path, replace_href_file, resolve_href, split_href};
pub use kind::{TextField, TopicType, SHORTDESC_PLACEHOLDER, SPACER_TEXT, TITLE_PLACEHOLDER};
pub use normalize::{NormalizeOutcome, DOCUMENT_DETAILS, LEGAL_TITLE};
pub use tree::{DocumentTree, Element, Node, NodeId};
pub use xml::DEFAULT_PROLOG;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
