//! XML ingress and egress
//!
//! Parsing goes through `quick_xml`'s pull reader into the arena tree.
//! Everything before the root element (declaration, doctype, comments) is
//! kept verbatim as the header, everything after it as the trailer, so a
//! document that is not mutated serializes back to the same bytes modulo
//! attribute quoting.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, SerializeError};
use crate::tree::{DocumentTree, Element, Node, NodeId};

/// Prolog used when a document carries no XML declaration
pub const DEFAULT_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const IN_MEMORY: &str = "<string>";

/// The five predefined entities, plus `&nbsp;`, which legacy exports use
/// without declaring it
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        _ => quick_xml::escape::resolve_predefined_entity(entity),
    }
}

fn offset(position: impl TryInto<usize>) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    header_end: usize,
    trailer_start: Option<usize>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element, start: usize) -> Result<NodeId, String> {
        if self.stack.is_empty() {
            if self.root.is_some() {
                return Err(format!("second root element <{}>", element.tag));
            }
            self.header_end = start;
        }
        let id = DocumentTree::push_node(&mut self.nodes, Node::Element(element));
        match self.stack.last() {
            Some(parent) => self.attach(*parent, id),
            None => self.root = Some(id),
        }
        Ok(id)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Node::Element(el)) = self.nodes.get_mut(parent.index()) {
            el.children.push(child);
        }
    }

    fn leaf(&mut self, node: Node) {
        if let Some(parent) = self.stack.last().copied() {
            let id = DocumentTree::push_node(&mut self.nodes, node);
            self.attach(parent, id);
        }
    }
}

/// Byte offset of the `<` opening the markup read from `position`
///
/// Depending on the reader state the position sits on the `<` or one past it.
fn markup_start(source: &str, position: usize) -> usize {
    let from = position.saturating_sub(1).min(source.len());
    source.as_bytes()[from..]
        .iter()
        .position(|b| *b == b'<')
        .map_or(position, |i| from + i)
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn element_from(start: &BytesStart<'_>, self_closing: bool) -> Result<Element, String> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    element.self_closing = self_closing;
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value_with(resolve_entity)
            .map_err(|e| e.to_string())?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

impl DocumentTree {
    /// Parse a document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ParseError::io_error(path, e))?;
        Self::parse_str(&source).map_err(|e| e.with_path(path))
    }

    /// Parse a document from a string
    pub fn parse_str(source: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(source);
        let mut builder = TreeBuilder::default();

        loop {
            let start = offset(reader.buffer_position());
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    let at = offset(reader.buffer_position());
                    return Err(ParseError::syntax_error(IN_MEMORY, format!("{e} (byte {at})")));
                }
            };
            let syntax = |message: String| ParseError::syntax_error(IN_MEMORY, message);

            match event {
                Event::Start(tag) => {
                    let element = element_from(&tag, false).map_err(syntax)?;
                    let id = builder
                        .open(element, markup_start(source, start))
                        .map_err(syntax)?;
                    builder.stack.push(id);
                }
                Event::Empty(tag) => {
                    let element = element_from(&tag, true).map_err(syntax)?;
                    builder
                        .open(element, markup_start(source, start))
                        .map_err(syntax)?;
                    if builder.stack.is_empty() {
                        builder.trailer_start = Some(offset(reader.buffer_position()));
                    }
                }
                Event::End(_) => {
                    builder.stack.pop();
                    if builder.stack.is_empty() {
                        builder.trailer_start = Some(offset(reader.buffer_position()));
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape_with(resolve_entity)
                        .map_err(|e| syntax(e.to_string()))?;
                    if builder.stack.is_empty() {
                        if !text.trim().is_empty() {
                            return Err(syntax(format!("text outside the root element: {:?}", text.trim())));
                        }
                    } else {
                        builder.leaf(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    builder.leaf(Node::CData(String::from_utf8_lossy(&data).into_owned()));
                }
                Event::Comment(comment) => {
                    builder.leaf(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
                Event::PI(instruction) => {
                    builder.leaf(Node::ProcessingInstruction(
                        String::from_utf8_lossy(&instruction).into_owned(),
                    ));
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = builder.stack.last() {
            let tag = match builder.nodes.get(open.index()) {
                Some(Node::Element(el)) => el.tag.clone(),
                _ => String::new(),
            };
            return Err(ParseError::syntax_error(IN_MEMORY, format!("unclosed element <{tag}>")));
        }
        let root = builder.root.ok_or_else(|| ParseError::NoRoot(IN_MEMORY.into()))?;

        let raw_header = source.get(..builder.header_end).unwrap_or_default();
        let header = if raw_header.contains("<?xml") {
            raw_header.to_string()
        } else {
            format!("{DEFAULT_PROLOG}{raw_header}")
        };
        let trailer = builder
            .trailer_start
            .and_then(|at| source.get(at..))
            .unwrap_or_default()
            .to_string();

        Ok(Self::from_parts(builder.nodes, root, header, trailer))
    }

    /// Serialize header, root element and trailer
    pub fn to_xml_string(&self) -> Result<String, SerializeError> {
        let mut out = String::with_capacity(self.header().len() + 4096);
        out.push_str(self.header());
        self.write_node(self.root(), &mut out)?;
        out.push_str(self.trailer());
        Ok(out)
    }

    /// Serialize to disk
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml).map_err(|e| SerializeError::io_error(path, e))
    }

    fn write_node(&self, id: NodeId, out: &mut String) -> std::fmt::Result {
        match self.node(id) {
            Node::Element(el) => {
                write!(out, "<{}", el.tag)?;
                for (key, value) in &el.attributes {
                    write!(out, " {key}=\"{}\"", escape_attribute(value))?;
                }
                if el.children.is_empty() && el.self_closing {
                    out.push_str("/>");
                    return Ok(());
                }
                out.push('>');
                for child in &el.children {
                    self.write_node(*child, out)?;
                }
                write!(out, "</{}>", el.tag)?;
            }
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::CData(data) => write!(out, "<![CDATA[{data}]]>")?,
            Node::Comment(comment) => write!(out, "<!--{comment}-->")?,
            Node::ProcessingInstruction(body) => write!(out, "<?{body}?>")?,
        }
        Ok(())
    }
}

fn escape_with<'a>(raw: &'a str, special: &[char], entity: fn(char) -> &'static str) -> Cow<'a, str> {
    if !raw.contains(special) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        if special.contains(&ch) {
            out.push_str(entity(ch));
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn entity_for(ch: char) -> &'static str {
    match ch {
        '&' => "&amp;",
        '<' => "&lt;",
        '"' => "&quot;",
        _ => "",
    }
}

/// Text keeps `>` and quotes literal so untouched prose round-trips
fn escape_text(raw: &str) -> Cow<'_, str> {
    escape_with(raw, &['&', '<'], entity_for)
}

fn escape_attribute(raw: &str) -> Cow<'_, str> {
    escape_with(raw, &['&', '<', '"'], entity_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_document_round_trips() {
        let source = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!DOCTYPE concept PUBLIC \"-//OASIS//DTD DITA Concept//EN\" \"concept.dtd\">\n",
            "<concept id=\"c1\" outputclass=\"explanation\">\n",
            "  <title>Fish &amp; chips</title>\n",
            "  <conbody><p>a &lt; b > c</p><!-- note --><p/></conbody>\n",
            "</concept>\n",
        );
        let tree = DocumentTree::parse_str(source).unwrap();
        assert_eq!(tree.to_xml_string().unwrap(), source);
    }

    #[test]
    fn default_prolog_when_declaration_missing() {
        let tree = DocumentTree::parse_str("<topic/>").unwrap();
        assert_eq!(tree.header(), DEFAULT_PROLOG);
        assert_eq!(tree.to_xml_string().unwrap(), format!("{DEFAULT_PROLOG}<topic/>"));
    }

    #[test]
    fn nbsp_entity_resolves() {
        let tree = DocumentTree::parse_str("<p>&nbsp;</p>").unwrap();
        assert_eq!(tree.text_content(tree.root()), "\u{a0}");
    }

    #[test]
    fn predefined_entities_resolve() {
        let tree = DocumentTree::parse_str(
            r#"<p title="&quot;A&quot; &amp; &apos;B&apos;">&lt;&gt;&amp;&quot;&apos;</p>"#,
        )
        .unwrap();
        assert_eq!(tree.text_content(tree.root()), "<>&\"'");
        assert_eq!(tree.attribute(tree.root(), "title"), Some("\"A\" & 'B'"));
    }

    #[test]
    fn malformed_documents_fail() {
        for source in [
            "<a><b></a>",
            "<a><b>",
            "<a/><b/>",
            "<a/>trailing",
            "",
        ] {
            assert!(DocumentTree::parse_str(source).is_err(), "accepted {source:?}");
        }
    }

    #[test]
    fn attribute_quotes_are_escaped() {
        let mut tree = DocumentTree::parse_str("<a/>").unwrap();
        let root = tree.root();
        tree.set_attribute(root, "title", "say \"hi\" & <go>");
        let xml = tree.to_xml_string().unwrap();
        assert!(xml.ends_with("<a title=\"say &quot;hi&quot; &amp; &lt;go>\"/>"));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dita");
        std::fs::write(&path, "<topic><title></topic>").unwrap();
        let err = DocumentTree::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.dita"), "{err}");
    }
}
