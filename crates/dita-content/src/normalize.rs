//! Classification and structural normalization
//!
//! `classify` inspects an unmodified legacy body. `normalize_to` drives a tree
//! to the canonical shape of a type and is idempotent: running it on its own
//! output reports [`NormalizeOutcome::AlreadyCanonical`] and changes nothing.
//! Structural preconditions are checked before the first mutation, so a
//! [`StructureError`] always leaves the tree untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StructureError;
use crate::kind::{TopicType, SPACER_TEXT};
use crate::tree::{DocumentTree, Node, NodeId};
use crate::xml::DEFAULT_PROLOG;

/// Title given to legal notices
pub const LEGAL_TITLE: &str = "Legal information";

/// Short description given to document detail pages
pub const DOCUMENT_DETAILS: &str = "Document details";

static ENUMERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s").expect("enumerator pattern is valid"));

/// Result of a successful normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The tree was rewritten
    Normalized,
    /// The tree already had the canonical shape
    AlreadyCanonical,
}

impl NormalizeOutcome {
    /// True when the tree must be written back
    #[inline]
    #[must_use]
    pub fn is_changed(self) -> bool {
        self == Self::Normalized
    }
}

impl DocumentTree {
    /// Infer a type from the legacy body.
    ///
    /// Never yields `LegalInfo`; that type is only reached via outputclass.
    #[must_use]
    pub fn classify(&self) -> TopicType {
        let root = self.root();
        if !self.elements_by_tag(root, "ol").is_empty() || !self.enumerated_paragraphs(root).is_empty() {
            TopicType::Task
        } else if !self.elements_by_tag(root, "table").is_empty()
            || !self.elements_by_tag(root, "simpletable").is_empty()
        {
            TopicType::Reference
        } else {
            TopicType::Concept
        }
    }

    /// Paragraphs whose leading text starts with `<n>. `, with the byte
    /// length of that enumerator
    fn enumerated_paragraphs(&self, scope: NodeId) -> Vec<(NodeId, usize)> {
        self.elements_by_tag(scope, "p")
            .into_iter()
            .filter_map(|p| {
                let first = *self.children(p).first()?;
                let text = match self.node(first) {
                    Node::Text(text) => text,
                    _ => return None,
                };
                ENUMERATOR.find(text).map(|m| (p, m.end()))
            })
            .collect()
    }

    /// Ordered lists not nested in another ordered list
    fn top_level_lists(&self, scope: NodeId) -> Vec<NodeId> {
        let mut lists = Vec::new();
        let mut stack: Vec<NodeId> = self.child_elements(scope).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if self.is_element(current, "ol") {
                lists.push(current);
                continue;
            }
            let mut children: Vec<NodeId> = self.child_elements(current).collect();
            children.reverse();
            stack.extend(children);
        }
        lists
    }

    fn has_steps(&self, scope: NodeId) -> bool {
        self.subtree_elements(scope)
            .into_iter()
            .any(|el| self.is_element(el, "steps") || self.is_element(el, "steps-unordered"))
    }

    /// Drive the tree to the canonical shape of `kind`
    pub fn normalize_to(&mut self, kind: TopicType) -> Result<NormalizeOutcome, StructureError> {
        let (Some(root_tag), Some(body_tag)) = (kind.root_tag(), kind.body_tag()) else {
            return Err(StructureError::Unclassified);
        };
        let root = self.root();
        let body = self
            .find_child(root, body_tag)
            .or_else(|| self.find_child(root, "body"))
            .ok_or_else(|| StructureError::MissingBody {
                root: self.tag(root).unwrap_or_default().to_string(),
                expected: body_tag.to_string(),
            })?;
        if kind == TopicType::Task
            && !self.has_steps(body)
            && self.top_level_lists(body).is_empty()
            && self.enumerated_paragraphs(body).is_empty()
        {
            return Err(StructureError::NoSteps);
        }

        let mut changed = false;
        if !self.is_element(root, root_tag) {
            self.set_tag(root, root_tag);
            changed = true;
        }
        if !self.is_element(body, body_tag) {
            self.set_tag(body, body_tag);
            changed = true;
        }
        if self.outputclass().and_then(TopicType::from_outputclass) != Some(kind) {
            if let Some(marker) = kind.outputclass(false) {
                self.set_outputclass(marker);
                changed = true;
            }
        }
        if let Some(doctype) = kind.doctype() {
            if !self.header().contains(&format!("<!DOCTYPE {root_tag} ")) {
                self.set_header(format!("{DEFAULT_PROLOG}{doctype}\n"));
                changed = true;
            }
        }
        changed |= self.ensure_title();
        changed |= self.ensure_short_description();

        match kind {
            TopicType::Task => changed |= self.convert_to_steps(body),
            TopicType::Reference | TopicType::LegalInfo => {
                changed |= self.wrap_in_section(body);
                changed |= self.add_spacer_after_table();
            }
            TopicType::Concept | TopicType::Unclassified => {}
        }

        if changed {
            self.rebuild_parent_index();
            tracing::debug!("Normalized to {}", kind);
            Ok(NormalizeOutcome::Normalized)
        } else {
            Ok(NormalizeOutcome::AlreadyCanonical)
        }
    }

    fn convert_to_steps(&mut self, body: NodeId) -> bool {
        if self.has_steps(body) {
            return false;
        }
        let lists = self.top_level_lists(body);
        if !lists.is_empty() {
            for list in lists {
                self.set_tag(list, "steps");
                let items: Vec<NodeId> = self
                    .child_elements(list)
                    .filter(|item| self.is_element(*item, "li"))
                    .collect();
                for item in items {
                    self.convert_to_step(item);
                }
            }
            return true;
        }

        let paragraphs = self.enumerated_paragraphs(body);
        let Some((first, _)) = paragraphs.first().copied() else {
            return false;
        };
        let container = self.create_element("steps");
        self.insert_before(first, container);
        for (paragraph, enumerator) in paragraphs {
            self.strip_leading_text(paragraph, enumerator);
            self.convert_to_step(paragraph);
            self.append_child(container, paragraph);
        }
        true
    }

    /// Turn an element into a `step` whose former content sits in a `cmd`
    fn convert_to_step(&mut self, item: NodeId) {
        self.set_tag(item, "step");
        let content = self.take_children(item);
        let cmd = self.create_element("cmd");
        for node in content {
            self.append_child(cmd, node);
        }
        self.append_child(item, cmd);
    }

    fn wrap_in_section(&mut self, body: NodeId) -> bool {
        if self.find_child(body, "section").is_some() {
            return false;
        }
        let has_content = self.child_elements(body).next().is_some()
            || !self.text_content(body).trim().is_empty();
        if !has_content {
            return false;
        }
        let section = self.create_element("section");
        for node in self.take_children(body) {
            self.append_child(section, node);
        }
        self.append_child(body, section);
        true
    }

    /// Place a spacer paragraph directly after the first table, unless one
    /// is already there. Returns whether the tree changed.
    pub fn add_spacer_after_table(&mut self) -> bool {
        let Some(table) = self
            .subtree_elements(self.root())
            .into_iter()
            .find(|el| self.is_element(*el, "table") || self.is_element(*el, "simpletable"))
        else {
            return false;
        };
        let already_spaced = self
            .next_element_sibling(table)
            .is_some_and(|next| self.is_element(next, "p") && self.text_content(next) == SPACER_TEXT);
        if already_spaced {
            return false;
        }
        let spacer = self.create_text_element("p", SPACER_TEXT);
        self.insert_after(table, spacer);
        true
    }

    /// Give a legal notice its fixed title and move the copyright statement
    /// into the short description. Returns whether the tree changed.
    pub fn synthesize_legal_title(&mut self) -> bool {
        let mut changed = false;
        if self.title().as_deref() != Some(LEGAL_TITLE) {
            self.write_title(LEGAL_TITLE);
            changed = true;
        }
        changed |= self.ensure_short_description();
        if let Some((paragraph, statement)) = self.copyright_statement() {
            if self.short_description().as_deref() != Some(statement.as_str()) {
                self.write_short_description(&statement);
            }
            self.detach(paragraph);
            changed = true;
        }
        changed
    }

    /// First paragraph mentioning `Copyright` inside a copyright element
    fn copyright_statement(&self) -> Option<(NodeId, String)> {
        self.subtree_elements(self.root())
            .into_iter()
            .filter(|el| self.attribute(*el, "outputclass") == Some("copyright"))
            .flat_map(|el| self.elements_by_tag(el, "p"))
            .map(|p| (p, self.text_content(p).trim().to_string()))
            .find(|(_, text)| text.contains("Copyright"))
    }

    /// Document detail pages (first `ph` is the `DocTitle` variable) get a
    /// fixed short description when theirs is missing. Returns whether the
    /// tree changed.
    pub fn fill_document_details(&mut self) -> bool {
        let is_details_page = self
            .elements_by_tag(self.root(), "ph")
            .first()
            .is_some_and(|ph| self.attribute(*ph, "varref") == Some("DocTitle"));
        if !is_details_page || !self.short_description().is_missing() {
            return false;
        }
        self.write_short_description(DOCUMENT_DETAILS);
        self.add_spacer_after_table();
        true
    }
}
