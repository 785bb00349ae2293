//! Arena-backed element tree
//!
//! Nodes are stored in a flat arena and addressed by [`NodeId`]. An id
//! returned by a query stays valid for the lifetime of the tree, so callers
//! can hold on to element handles (for example local links) and mutate them
//! later in place.
//!
//! The parent index is derived data: primitive mutators keep it current and
//! composite transforms call [`DocumentTree::rebuild_parent_index`] once they
//! are done. It is never serialized.

use crate::xml::DEFAULT_PROLOG;

/// Handle to a node inside one [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with tag, attributes and children
    Element(Element),
    /// Character data (stored unescaped)
    Text(String),
    /// `<![CDATA[...]]>` section
    CData(String),
    /// `<!-- ... -->`
    Comment(String),
    /// `<? ... ?>` inside the root element
    ProcessingInstruction(String),
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) self_closing: bool,
}

impl Element {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Element tag name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in document order
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

/// One parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
    header: String,
    trailer: String,
    parents: Vec<Option<NodeId>>,
}

impl DocumentTree {
    /// Create a document with a single empty root element and the default prolog
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        Self::from_parts(
            vec![Node::Element(Element::new(root_tag))],
            NodeId(0),
            DEFAULT_PROLOG.to_string(),
            String::new(),
        )
    }

    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId, header: String, trailer: String) -> Self {
        let mut tree = Self {
            parents: vec![None; nodes.len()],
            nodes,
            root,
            header,
            trailer,
        };
        tree.rebuild_parent_index();
        tree
    }

    pub(crate) fn push_node(nodes: &mut Vec<Node>, node: Node) -> NodeId {
        nodes.push(node);
        NodeId(nodes.len() - 1)
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Literal text preceding the root element (prolog, doctype)
    #[inline]
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Replace the header written before the root element
    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    /// Literal text following the root element
    #[inline]
    #[must_use]
    pub fn trailer(&self) -> &str {
        &self.trailer
    }

    /// Node payload
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Element payload, if `id` is an element
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0] {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0] {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Tag name of an element
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    /// True when `id` is an element named `tag`
    #[must_use]
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Rename an element
    pub fn set_tag(&mut self, id: NodeId, tag: &str) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag.to_string();
        }
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set (or add) an attribute, keeping its position when it already exists
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => el.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Child nodes (empty for non-elements)
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map_or(&[], |el| el.children.as_slice())
    }

    /// Child elements, skipping text, comments and instructions
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.element(*child).is_some())
    }

    /// First child element named `tag`
    #[must_use]
    pub fn find_child(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.child_elements(id).find(|child| self.is_element(*child, tag))
    }

    /// Elements of the subtree rooted at `id` in document order, `id` included
    #[must_use]
    pub fn subtree_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.element(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Elements named `tag` in the subtree rooted at `id`, in document order
    #[must_use]
    pub fn elements_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.subtree_elements(id)
            .into_iter()
            .filter(|el| self.is_element(*el, tag))
            .collect()
    }

    /// Text before the first child element (what lxml calls `.text`)
    #[must_use]
    pub fn leading_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            match self.node(*child) {
                Node::Text(text) | Node::CData(text) => out.push_str(text),
                Node::Element(_) => break,
                _ => {}
            }
        }
        out
    }

    /// All descendant text concatenated in document order
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node(id) {
            Node::Text(text) | Node::CData(text) => out.push_str(text),
            Node::Element(el) => {
                for child in &el.children {
                    self.collect_text(*child, out);
                }
            }
            _ => {}
        }
    }

    /// Replace all children of an element with one text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in self.take_children(id) {
            self.parents[child.0] = None;
        }
        let text_node = self.create_text(text);
        self.append_child(id, text_node);
    }

    /// Strip the first `len` bytes from the leading text node of an element
    pub(crate) fn strip_leading_text(&mut self, id: NodeId, len: usize) {
        let Some(first) = self.children(id).first().copied() else {
            return;
        };
        if let Node::Text(text) = &mut self.nodes[first.0] {
            if text.is_char_boundary(len) {
                text.replace_range(..len, "");
            }
        }
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(Node::Element(Element::new(tag)))
    }

    /// Allocate a detached element holding a single text node
    pub fn create_text_element(&mut self, tag: &str, text: &str) -> NodeId {
        let element = self.create_element(tag);
        let text_node = self.create_text(text);
        self.append_child(element, text_node);
        element
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.allocate(Node::Text(text.to_string()))
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        let id = Self::push_node(&mut self.nodes, node);
        self.parents.push(None);
        id
    }

    /// Append `child` as last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `child` at `index` among the children of `parent`, detaching it first
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        if let Some(el) = self.element_mut(parent) {
            let index = index.min(el.children.len());
            el.children.insert(index, child);
            self.parents[child.0] = Some(parent);
        }
    }

    /// Insert `node` directly before `sibling`
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(sibling) {
            self.detach(node);
            let index = self.position(parent, sibling).unwrap_or(0);
            self.insert_child(parent, index, node);
        }
    }

    /// Insert `node` directly after `sibling`
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(sibling) {
            self.detach(node);
            let index = self.position(parent, sibling).map_or(0, |i| i + 1);
            self.insert_child(parent, index, node);
        }
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Remove a node from its parent; the node stays allocated
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parents[id.0].take() {
            if let Some(el) = self.element_mut(parent) {
                el.children.retain(|c| *c != id);
            }
        }
    }

    /// Detach and return all children of an element
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = match self.element_mut(id) {
            Some(el) => std::mem::take(&mut el.children),
            None => Vec::new(),
        };
        for child in &children {
            self.parents[child.0] = None;
        }
        children
    }

    /// Parent element, from the derived index
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Ancestors from the closest outwards
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Next sibling that is an element
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|s| self.element(*s).is_some())
    }

    /// Recompute the parent index from the root
    pub fn rebuild_parent_index(&mut self) {
        self.parents.clear();
        self.parents.resize(self.nodes.len(), None);
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            if let Node::Element(el) = &self.nodes[current.0] {
                for child in &el.children {
                    self.parents[child.0] = Some(current);
                    stack.push(*child);
                }
            }
        }
    }
}
