//! Project graph
//!
//! The map, every topic it references (transitively), the images in the
//! project's image folder and, for sidecar-flavor projects, each topic's
//! metadata record. Discovery classifies and normalizes topics as it meets
//! them and writes back only what changed, so running it on an already
//! migrated project touches nothing.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use dita_content::{
    href_file_name, href_targets, replace_href_file, resolve_href, DocumentTree, NodeId, SerializeError, TopicType,
};

use crate::config::MigrationConfig;
use crate::error::DiscoveryError;
use crate::sidecar::Sidecar;
use crate::topic::{DiscoveryIssue, Image, MapEntry, Topic, TopicId};

/// Where a project keeps its images and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFlavor {
    /// Topics come with sidecar files; images sit next to the topics
    Sidecar,
    /// No sidecars; images sit in the media folder
    Media,
}

impl ProjectFlavor {
    /// Inspect the project folder
    pub fn detect(folder: &Path, config: &MigrationConfig) -> Result<Self, DiscoveryError> {
        let mut topics = 0usize;
        let mut sidecars = 0usize;
        let entries = std::fs::read_dir(folder).map_err(|e| DiscoveryError::io_error(folder, e))?;
        for entry in entries {
            let path = entry.map_err(|e| DiscoveryError::io_error(folder, e))?.path();
            if config.is_topic(&path) {
                topics += 1;
            } else if config.is_sidecar(&path) {
                sidecars += 1;
            }
        }
        if sidecars == 0 {
            return Ok(Self::Media);
        }
        if sidecars != topics {
            tracing::error!(
                "Project {} has {} topics but {} sidecar files",
                folder.display(),
                topics,
                sidecars
            );
        }
        Ok(Self::Sidecar)
    }

    /// Image folder for a project folder
    #[must_use]
    pub fn image_folder(self, folder: &Path, config: &MigrationConfig) -> PathBuf {
        match self {
            Self::Sidecar => folder.to_path_buf(),
            Self::Media => folder.join(&config.media_folder),
        }
    }
}

/// The resolved project
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    config: MigrationConfig,
    map_path: PathBuf,
    folder: PathBuf,
    flavor: ProjectFlavor,
    map: DocumentTree,
    entries: Vec<MapEntry>,
    topics: Vec<Topic>,
    images: BTreeMap<String, Image>,
    issues: Vec<DiscoveryIssue>,
    map_dirty: bool,
}

/// Href of a topicref that points at a local topic file
fn topic_href(map: &DocumentTree, element: NodeId) -> Option<String> {
    if map.attribute(element, "scope") == Some("external") {
        return None;
    }
    if map.attribute(element, "format").is_some_and(|f| f != "dita") {
        return None;
    }
    let href = map.attribute(element, "href")?;
    let file = href.split('#').next().unwrap_or_default();
    (!file.is_empty()).then(|| href.to_string())
}

/// Type resolution order: explicit marker, canonical root, container, body
fn resolve_type(tree: &DocumentTree, container: bool) -> TopicType {
    tree.outputclass()
        .and_then(TopicType::from_outputclass)
        .or_else(|| tree.tag(tree.root()).and_then(TopicType::from_root_tag))
        .unwrap_or_else(|| {
            if container {
                TopicType::Concept
            } else {
                tree.classify()
            }
        })
}

impl ProjectGraph {
    /// Read the map and resolve every topic it references.
    ///
    /// Fails before touching any file when the map does not parse or an
    /// entry points at a missing file.
    pub fn discover(map_path: impl AsRef<Path>, config: &MigrationConfig) -> Result<Self, DiscoveryError> {
        let map_path = map_path.as_ref().to_path_buf();
        tracing::info!("Discovering project from {}", map_path.display());

        let map = DocumentTree::load(&map_path).map_err(DiscoveryError::Map)?;
        let folder = match map_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        for element in map.elements_by_tag(map.root(), "topicref") {
            if let Some(href) = topic_href(&map, element) {
                let expected = resolve_href(&folder, &href);
                if !expected.is_file() {
                    return Err(DiscoveryError::MissingReference {
                        map: map_path,
                        href,
                        expected,
                    });
                }
            }
        }

        let flavor = ProjectFlavor::detect(&folder, config)?;
        let mut graph = Self {
            config: config.clone(),
            map_path,
            folder,
            flavor,
            map,
            entries: Vec::new(),
            topics: Vec::new(),
            images: BTreeMap::new(),
            issues: Vec::new(),
            map_dirty: false,
        };
        graph.scan_images()?;

        let mut seen = HashMap::new();
        let root = graph.map.root();
        graph.resolve_level(root, None, &mut seen);

        if graph.map_dirty {
            tracing::info!("Synchronizing topic types in {}", graph.map_path.display());
            graph.write_map()?;
            graph.map_dirty = false;
        }
        tracing::info!(
            "Discovered {} topics, {} images ({} issues)",
            graph.topics.len(),
            graph.images.len(),
            graph.issues.len()
        );
        Ok(graph)
    }

    /// Rebuild everything from disk
    pub fn refresh(&mut self) -> Result<(), DiscoveryError> {
        *self = Self::discover(&self.map_path, &self.config)?;
        Ok(())
    }

    /// Rescan the image folder and cross-reference figure captions.
    ///
    /// Returns the number of images found.
    pub fn scan_images(&mut self) -> Result<usize, DiscoveryError> {
        let folder = self.image_folder();
        let mut images = BTreeMap::new();
        if folder.is_dir() {
            let entries = std::fs::read_dir(&folder).map_err(|e| DiscoveryError::io_error(&folder, e))?;
            for entry in entries {
                let path = entry.map_err(|e| DiscoveryError::io_error(&folder, e))?.path();
                if !path.is_file() || !self.config.is_image(&path) {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    images.insert(name.to_string(), Image { path: path.clone(), title: None });
                }
            }
        } else {
            tracing::debug!("No image folder at {}", folder.display());
        }
        self.images = images;
        for topic in &self.topics {
            Self::cross_reference(&mut self.images, topic);
        }
        Ok(self.images.len())
    }

    fn cross_reference(images: &mut BTreeMap<String, Image>, topic: &Topic) {
        for figure in topic.tree.figures() {
            let Some(image) = images.get_mut(href_file_name(&figure.href)) else {
                continue;
            };
            if image.title.is_none() && href_targets(topic.folder(), &figure.href, &image.path) {
                image.title = figure.caption;
            }
        }
    }

    fn resolve_level(&mut self, parent: NodeId, owner: Option<TopicId>, seen: &mut HashMap<PathBuf, TopicId>) {
        let children: Vec<NodeId> = self.map.child_elements(parent).collect();
        for element in children {
            let href = if self.map.is_element(element, "topicref") {
                topic_href(&self.map, element)
            } else {
                None
            };
            let Some(href) = href else {
                self.resolve_level(element, owner, seen);
                continue;
            };

            let topic = self.resolve_entry(element, &href, seen);
            self.entries.push(MapEntry { element, href, topic });
            if let (Some(owner), Some(topic)) = (owner, topic) {
                let children = &mut self.topics[owner.0].children;
                if owner != topic && !children.contains(&topic) {
                    children.push(topic);
                }
            }
            self.resolve_level(element, topic, seen);
        }
    }

    fn resolve_entry(&mut self, element: NodeId, href: &str, seen: &mut HashMap<PathBuf, TopicId>) -> Option<TopicId> {
        let path = resolve_href(&self.folder, href);
        if let Some(id) = seen.get(&path).copied() {
            self.sync_map_type(element, id);
            return Some(id);
        }

        let tree = match DocumentTree::load(&path) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                self.issues.push(DiscoveryIssue {
                    path,
                    message: e.to_string(),
                });
                return None;
            }
        };
        let container = self.map.elements_by_tag(element, "topicref").len() > 1;
        let mut topic = Topic::new(path.clone(), tree, container);
        self.classify_and_normalize(&mut topic);
        if self.flavor == ProjectFlavor::Sidecar {
            topic.sidecar = self.load_sidecar(&topic.path);
        }
        Self::cross_reference(&mut self.images, &topic);

        let id = TopicId(self.topics.len());
        self.topics.push(topic);
        seen.insert(path, id);
        self.sync_map_type(element, id);
        Some(id)
    }

    fn classify_and_normalize(&mut self, topic: &mut Topic) {
        let had_marker = topic
            .tree
            .outputclass()
            .and_then(TopicType::from_outputclass)
            .is_some();
        let kind = resolve_type(&topic.tree, topic.container);
        topic.kind = kind;

        match topic.tree.normalize_to(kind) {
            Ok(outcome) => {
                topic.normalized = true;
                let mut changed = outcome.is_changed();
                if kind == TopicType::Concept && topic.container && !had_marker {
                    if let Some(marker) = kind.outputclass(true) {
                        topic.tree.set_outputclass(marker);
                        changed = true;
                    }
                }
                if !changed {
                    tracing::debug!("{} already canonical", topic.file_name());
                    return;
                }
                match topic.write() {
                    Ok(()) => tracing::info!("Normalized {} as {}", topic.file_name(), kind),
                    Err(e) => {
                        tracing::error!("Could not write {}: {}", topic.path.display(), e);
                        self.issues.push(DiscoveryIssue {
                            path: topic.path.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{} left for manual review: {}", topic.path.display(), e);
                topic.normalized = false;
            }
        }
    }

    fn load_sidecar(&self, topic: &Path) -> Option<Sidecar> {
        let path = self.config.sidecar_path(topic);
        if !path.is_file() {
            tracing::warn!("No sidecar file for {}", topic.display());
            return None;
        }
        match Sidecar::load(&path) {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                tracing::warn!("Malformed sidecar {}: {}", path.display(), e);
                None
            }
        }
    }

    fn sync_map_type(&mut self, element: NodeId, id: TopicId) {
        let topic = &self.topics[id.0];
        if !topic.normalized {
            return;
        }
        if let Some(map_type) = topic.kind.map_type() {
            if self.map.attribute(element, "type") != Some(map_type) {
                self.map.set_attribute(element, "type", map_type);
                self.map_dirty = true;
            }
        }
    }

    /// Configuration the graph was discovered with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Root map file
    #[inline]
    #[must_use]
    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    /// Folder holding the map
    #[inline]
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Detected project flavor
    #[inline]
    #[must_use]
    pub fn flavor(&self) -> ProjectFlavor {
        self.flavor
    }

    /// Folder scanned for images
    #[must_use]
    pub fn image_folder(&self) -> PathBuf {
        self.flavor.image_folder(&self.folder, &self.config)
    }

    /// Parsed map document
    #[must_use]
    pub fn map(&self) -> &DocumentTree {
        &self.map
    }

    /// Map entries in document order
    #[must_use]
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Topics in first-encounter map order
    pub fn topics(&self) -> impl Iterator<Item = (TopicId, &Topic)> + '_ {
        self.topics.iter().enumerate().map(|(i, t)| (TopicId(i), t))
    }

    /// Topics in map order, mutable
    pub fn topics_mut(&mut self) -> impl Iterator<Item = (TopicId, &mut Topic)> + '_ {
        self.topics.iter_mut().enumerate().map(|(i, t)| (TopicId(i), t))
    }

    /// Topic ids in map order
    #[must_use]
    pub fn topic_ids(&self) -> Vec<TopicId> {
        (0..self.topics.len()).map(TopicId).collect()
    }

    /// Number of resolved topics
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// A topic by id
    #[must_use]
    pub fn topic(&self, id: TopicId) -> &Topic {
        &self.topics[id.0]
    }

    /// A topic by id, mutable
    pub fn topic_mut(&mut self, id: TopicId) -> &mut Topic {
        &mut self.topics[id.0]
    }

    /// Topic whose file name is `name`
    #[must_use]
    pub fn find_topic(&self, name: &str) -> Option<TopicId> {
        self.topics().find(|(_, t)| t.file_name() == name).map(|(id, _)| id)
    }

    /// Images keyed by file name
    #[must_use]
    pub fn images(&self) -> &BTreeMap<String, Image> {
        &self.images
    }

    /// Files that failed to load during discovery
    #[must_use]
    pub fn issues(&self) -> &[DiscoveryIssue] {
        &self.issues
    }

    /// Image a figure href held by a document in `base_dir` points at
    #[must_use]
    pub fn image_for_href(&self, base_dir: &Path, href: &str) -> Option<&Image> {
        self.images
            .get(href_file_name(href))
            .filter(|image| href_targets(base_dir, href, &image.path))
    }

    /// Point every map entry that resolves to `old_path` at `new_name`.
    ///
    /// Entries resolve against the map folder, so a same-named file in
    /// another folder keeps its entry. Only the in-memory map changes; see
    /// [`ProjectGraph::write_map`].
    pub fn update_map_hrefs(&mut self, old_path: &Path, new_name: &str) -> usize {
        let mut count = 0;
        for entry in &mut self.entries {
            if !href_targets(&self.folder, &entry.href, old_path) {
                continue;
            }
            entry.href = replace_href_file(&entry.href, new_name);
            self.map.set_attribute(entry.element, "href", &entry.href);
            count += 1;
        }
        count
    }

    /// Write the map back to disk
    pub fn write_map(&self) -> Result<(), SerializeError> {
        self.map.write(&self.map_path)
    }

    /// Record that an image file was moved on disk
    pub fn rename_image(&mut self, old_name: &str, new_path: PathBuf) {
        let Some(mut image) = self.images.remove(old_name) else {
            return;
        };
        image.path = new_path;
        let name = image.file_name().to_string();
        self.images.insert(name, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_prefers_marker_then_root_then_container() {
        let marked = DocumentTree::parse_str(r#"<topic outputclass="procedure"><body><table/></body></topic>"#).unwrap();
        assert_eq!(resolve_type(&marked, false), TopicType::Task);

        let canonical = DocumentTree::parse_str("<reference><refbody/></reference>").unwrap();
        assert_eq!(resolve_type(&canonical, true), TopicType::Reference);

        let container = DocumentTree::parse_str("<topic><body><table/></body></topic>").unwrap();
        assert_eq!(resolve_type(&container, true), TopicType::Concept);
        assert_eq!(resolve_type(&container, false), TopicType::Reference);
    }

    #[test]
    fn external_and_non_topic_refs_are_ignored() {
        let map = DocumentTree::parse_str(
            r#"<map><topicref href="http://x" scope="external"/><topicref href="sub.ditamap" format="ditamap"/><topicref href="a.dita#t"/><topicref navtitle="group"/></map>"#,
        )
        .unwrap();
        let hrefs: Vec<_> = map
            .elements_by_tag(map.root(), "topicref")
            .into_iter()
            .filter_map(|e| topic_href(&map, e))
            .collect();
        assert_eq!(hrefs, vec!["a.dita#t".to_string()]);
    }
}
