//! Topics and images as held by the project graph

use std::path::{Path, PathBuf};

use dita_content::{DocumentTree, SerializeError, TextField, TopicType};

use crate::sidecar::Sidecar;

/// Index of a topic inside one [`ProjectGraph`](crate::ProjectGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId(pub(crate) usize);

/// One topic file, parsed and classified
#[derive(Debug, Clone)]
pub struct Topic {
    pub(crate) path: PathBuf,
    pub(crate) tree: DocumentTree,
    pub(crate) kind: TopicType,
    pub(crate) container: bool,
    pub(crate) normalized: bool,
    pub(crate) children: Vec<TopicId>,
    pub(crate) sidecar: Option<Sidecar>,
}

impl Topic {
    pub(crate) fn new(path: PathBuf, tree: DocumentTree, container: bool) -> Self {
        Self {
            path,
            tree,
            kind: TopicType::Unclassified,
            container,
            normalized: false,
            children: Vec::new(),
            sidecar: None,
        }
    }

    /// Location on disk
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name, including extension
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// File name without extension
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path.file_stem().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// Folder the topic's own hrefs are relative to
    #[must_use]
    pub fn folder(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Record a new location after the file was moved
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Parsed document
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Parsed document, mutable
    #[inline]
    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    /// Resolved content type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TopicType {
        self.kind
    }

    /// True when the map nests other topics under this one or the topic
    /// carries a container marker
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.container || matches!(self.tree.outputclass(), Some("context" | "lpcontext"))
    }

    /// True when normalization to [`Topic::kind`] succeeded
    #[inline]
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Topics nested under this one in the map
    #[must_use]
    pub fn children(&self) -> &[TopicId] {
        &self.children
    }

    /// Sidecar metadata, sidecar-flavor projects only
    #[must_use]
    pub fn sidecar(&self) -> Option<&Sidecar> {
        self.sidecar.as_ref()
    }

    /// Sidecar metadata, mutable
    pub fn sidecar_mut(&mut self) -> Option<&mut Sidecar> {
        self.sidecar.as_mut()
    }

    /// Title text
    #[must_use]
    pub fn title(&self) -> TextField {
        self.tree.title()
    }

    /// Short description text
    #[must_use]
    pub fn short_description(&self) -> TextField {
        self.tree.short_description()
    }

    /// Write the document back to [`Topic::path`]
    pub fn write(&self) -> Result<(), SerializeError> {
        tracing::debug!("Writing {}", self.path.display());
        self.tree.write(&self.path)
    }
}

/// An image file in the project's image folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) path: PathBuf,
    pub(crate) title: Option<String>,
}

impl Image {
    /// Location on disk
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name, the identity used by figure hrefs
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// File name without extension
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path.file_stem().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// Extension including the leading dot, as found on disk
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }

    /// Caption of the first figure found for this image
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// One `topicref` of the map, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub(crate) element: dita_content::NodeId,
    pub(crate) href: String,
    pub(crate) topic: Option<TopicId>,
}

impl MapEntry {
    /// Href as written in the map
    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Resolved topic; `None` when the file failed to parse
    #[must_use]
    pub fn topic(&self) -> Option<TopicId> {
        self.topic
    }
}

/// A file that could not be loaded during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryIssue {
    /// File concerned
    pub path: PathBuf,
    /// What went wrong
    pub message: String,
}

/// A topic that still needs manual attention
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProblemTopic {
    /// Topic file
    pub path: PathBuf,
    /// Title is `Missing`
    pub missing_title: bool,
    /// Short description is `Missing`
    pub missing_short_description: bool,
    /// Contains draft comments
    pub has_draft_comments: bool,
}
