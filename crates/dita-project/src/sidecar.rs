//! Sidecar metadata files
//!
//! Sidecar-flavor projects keep an `ishobject` record next to each topic.
//! Its `FTITLE` field must always equal the topic's file stem.

use std::path::{Path, PathBuf};

use dita_content::{DocumentTree, NodeId, ParseError, SerializeError};

const ROOT_TAG: &str = "ishobject";
const TITLE_FIELD: &str = "FTITLE";

/// A parsed sidecar file
#[derive(Debug, Clone)]
pub struct Sidecar {
    path: PathBuf,
    tree: DocumentTree,
}

impl Sidecar {
    /// Read a sidecar; the root element must be `ishobject`
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ParseError> {
        let path = path.into();
        let tree = DocumentTree::load(&path)?;
        if !tree.is_element(tree.root(), ROOT_TAG) {
            return Err(ParseError::syntax_error(
                path.clone(),
                format!("expected <{ROOT_TAG}> root, found <{}>", tree.tag(tree.root()).unwrap_or_default()),
            ));
        }
        Ok(Self { path, tree })
    }

    /// Location on disk
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn title_field(&self) -> Option<NodeId> {
        let fields = self.tree.find_child(self.tree.root(), "ishfields")?;
        self.tree
            .child_elements(fields)
            .find(|field| {
                self.tree.is_element(*field, "ishfield")
                    && self.tree.attribute(*field, "name") == Some(TITLE_FIELD)
            })
    }

    /// Current `FTITLE` value
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.title_field()
            .map(|field| self.tree.text_content(field).trim().to_string())
    }

    /// Set `FTITLE`, creating the field when absent
    pub fn set_title(&mut self, title: &str) {
        if let Some(field) = self.title_field() {
            self.tree.set_text(field, title);
            return;
        }
        let root = self.tree.root();
        let fields = match self.tree.find_child(root, "ishfields") {
            Some(fields) => fields,
            None => {
                let fields = self.tree.create_element("ishfields");
                self.tree.append_child(root, fields);
                fields
            }
        };
        let field = self.tree.create_text_element("ishfield", title);
        self.tree.set_attribute(field, "name", TITLE_FIELD);
        self.tree.set_attribute(field, "level", "logical");
        self.tree.insert_child(fields, 0, field);
    }

    /// Write to the current path
    pub fn write(&self) -> Result<(), SerializeError> {
        self.tree.write(&self.path)
    }

    /// Write under a new path and remove the old file
    pub fn move_to(&mut self, path: impl Into<PathBuf>) -> Result<(), SerializeError> {
        let path = path.into();
        if path == self.path {
            return self.write();
        }
        self.tree.write(&path)?;
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Could not remove old sidecar {}: {}", self.path.display(), e);
        }
        self.path = path;
        Ok(())
    }
}
