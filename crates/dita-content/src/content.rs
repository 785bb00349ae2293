//! Topic-level queries and edits on a [`DocumentTree`]

use std::path::Path;

use crate::error::StructureError;
use crate::href::{href_targets, replace_href_file};
use crate::kind::{TextField, SHORTDESC_PLACEHOLDER, TITLE_PLACEHOLDER};
use crate::tree::{DocumentTree, NodeId};

/// Body element names, legacy and canonical
pub const BODY_TAGS: [&str; 4] = ["body", "conbody", "taskbody", "refbody"];

/// A figure referencing an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    /// The `fig` element
    pub fig: NodeId,
    /// Its `image` element
    pub image: NodeId,
    /// Value of `image/@href`
    pub href: String,
    /// Trimmed `fig/title` text, if any
    pub caption: Option<String>,
}

impl DocumentTree {
    /// `title` child of the root
    #[must_use]
    pub fn title_element(&self) -> Option<NodeId> {
        self.find_child(self.root(), "title")
    }

    /// `shortdesc` child of the root
    #[must_use]
    pub fn short_description_element(&self) -> Option<NodeId> {
        self.find_child(self.root(), "shortdesc")
    }

    /// First body element, legacy or canonical
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.child_elements(self.root())
            .find(|child| self.tag(*child).is_some_and(|tag| BODY_TAGS.contains(&tag)))
    }

    /// Title text
    #[must_use]
    pub fn title(&self) -> TextField {
        self.field(self.title_element(), TITLE_PLACEHOLDER)
    }

    /// Short description text
    #[must_use]
    pub fn short_description(&self) -> TextField {
        self.field(self.short_description_element(), SHORTDESC_PLACEHOLDER)
    }

    fn field(&self, element: Option<NodeId>, placeholder: &str) -> TextField {
        element.map_or(TextField::Missing, |el| {
            TextField::from_text(&self.text_content(el), placeholder)
        })
    }

    /// Set the title, inserting it as first child of the root when absent
    pub fn set_title(&mut self, text: &str) -> Result<(), StructureError> {
        if text.trim().is_empty() {
            return Err(StructureError::EmptyText { field: "title" });
        }
        self.write_title(text);
        Ok(())
    }

    /// Set the short description, inserting it directly after the title when absent
    pub fn set_short_description(&mut self, text: &str) -> Result<(), StructureError> {
        if text.trim().is_empty() {
            return Err(StructureError::EmptyText {
                field: "short description",
            });
        }
        self.write_short_description(text);
        Ok(())
    }

    /// Set the title without the emptiness check
    pub(crate) fn write_title(&mut self, text: &str) {
        match self.title_element() {
            Some(title) => self.set_text(title, text),
            None => {
                let title = self.create_text_element("title", text);
                let root = self.root();
                self.insert_child(root, 0, title);
            }
        }
    }

    /// Set the short description without the emptiness check
    pub(crate) fn write_short_description(&mut self, text: &str) {
        match self.short_description_element() {
            Some(shortdesc) => self.set_text(shortdesc, text),
            None => {
                let shortdesc = self.create_text_element("shortdesc", text);
                match self.title_element() {
                    Some(title) => self.insert_after(title, shortdesc),
                    None => {
                        let root = self.root();
                        self.insert_child(root, 0, shortdesc);
                    }
                }
            }
        }
    }

    /// Insert a placeholder title when there is no title element.
    ///
    /// Returns whether the tree changed.
    pub fn ensure_title(&mut self) -> bool {
        if self.title_element().is_some() {
            return false;
        }
        self.write_title(TITLE_PLACEHOLDER);
        true
    }

    /// Insert a placeholder short description when there is none.
    ///
    /// Returns whether the tree changed.
    pub fn ensure_short_description(&mut self) -> bool {
        if self.short_description_element().is_some() {
            return false;
        }
        self.write_short_description(SHORTDESC_PLACEHOLDER);
        true
    }

    /// `outputclass` of the root element
    #[must_use]
    pub fn outputclass(&self) -> Option<&str> {
        self.attribute(self.root(), "outputclass")
    }

    /// Set `outputclass` on the root element
    pub fn set_outputclass(&mut self, value: &str) {
        let root = self.root();
        self.set_attribute(root, "outputclass", value);
    }

    /// Local cross-reference elements (`xref[@scope="local"]`)
    #[must_use]
    pub fn local_links(&self) -> Vec<NodeId> {
        self.elements_by_tag(self.root(), "xref")
            .into_iter()
            .filter(|xref| self.attribute(*xref, "scope") == Some("local"))
            .collect()
    }

    /// Rewrite every local link pointing at `old_path` so it names
    /// `new_name` instead.
    ///
    /// Hrefs resolve against `base_dir`, the folder of this document; a link
    /// to another file that merely shares the name is left alone. Directory
    /// prefix and fragment are kept. Returns the number of links rewritten.
    pub fn update_local_links(&mut self, base_dir: &Path, old_path: &Path, new_name: &str) -> usize {
        let mut count = 0;
        for xref in self.local_links() {
            let Some(href) = self.attribute(xref, "href") else {
                continue;
            };
            if !href_targets(base_dir, href, old_path) {
                continue;
            }
            let updated = replace_href_file(href, new_name);
            tracing::debug!("Rewriting local link {} -> {}", href, updated);
            self.set_attribute(xref, "href", &updated);
            count += 1;
        }
        count
    }

    /// Figures with an image, in document order
    #[must_use]
    pub fn figures(&self) -> Vec<Figure> {
        self.elements_by_tag(self.root(), "fig")
            .into_iter()
            .filter_map(|fig| {
                let image = self.elements_by_tag(fig, "image").into_iter().next()?;
                let href = self.attribute(image, "href")?.to_string();
                let caption = self
                    .find_child(fig, "title")
                    .map(|title| self.text_content(title).trim().to_string())
                    .filter(|caption| !caption.is_empty());
                Some(Figure {
                    fig,
                    image,
                    href,
                    caption,
                })
            })
            .collect()
    }

    /// Rewrite every `image` pointing at `old_path` so it names `new_name`.
    ///
    /// Hrefs resolve against `base_dir` as for local links. Returns the
    /// number of hrefs rewritten.
    pub fn rewrite_image_hrefs(&mut self, base_dir: &Path, old_path: &Path, new_name: &str) -> usize {
        let mut count = 0;
        for image in self.elements_by_tag(self.root(), "image") {
            let Some(href) = self.attribute(image, "href") else {
                continue;
            };
            if href_targets(base_dir, href, old_path) {
                let updated = replace_href_file(href, new_name);
                self.set_attribute(image, "href", &updated);
                count += 1;
            }
        }
        count
    }

    /// Number of `draft-comment` elements
    #[must_use]
    pub fn draft_comment_count(&self) -> usize {
        self.elements_by_tag(self.root(), "draft-comment").len()
    }
}
