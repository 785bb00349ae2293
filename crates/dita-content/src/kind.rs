//! Content types and text fields
//!
//! The closed set of topic types and everything that is looked up from one:
//! canonical root/body tags, doctype, outputclass marker, file name prefix.

use std::fmt;

/// Placeholder written into a topic that has no title
pub const TITLE_PLACEHOLDER: &str = "MISSING TITLE";

/// Placeholder written into a topic that has no short description
pub const SHORTDESC_PLACEHOLDER: &str = "SHORT DESCRIPTION";

/// Text of the spacer paragraph placed after tables
pub const SPACER_TEXT: &str = "\u{a0}";

/// Topic content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopicType {
    /// Explanatory or container topic
    Concept,
    /// Procedure with steps
    Task,
    /// Tabular reference material
    Reference,
    /// Legal notice; serialized as a reference
    LegalInfo,
    /// Not yet classified
    Unclassified,
}

impl TopicType {
    /// Resolve an explicit `outputclass` marker
    #[must_use]
    pub fn from_outputclass(outputclass: &str) -> Option<Self> {
        match outputclass.trim() {
            "context" | "lpcontext" | "explanation" => Some(Self::Concept),
            "procedure" => Some(Self::Task),
            "referenceinformation" => Some(Self::Reference),
            "legalinformation" => Some(Self::LegalInfo),
            _ => None,
        }
    }

    /// Resolve an already canonical root tag
    #[must_use]
    pub fn from_root_tag(tag: &str) -> Option<Self> {
        match tag {
            "concept" => Some(Self::Concept),
            "task" => Some(Self::Task),
            "reference" => Some(Self::Reference),
            _ => None,
        }
    }

    /// Every type except `Unclassified`
    #[inline]
    #[must_use]
    pub fn is_canonical(self) -> bool {
        self != Self::Unclassified
    }

    /// Canonical root element
    #[must_use]
    pub fn root_tag(self) -> Option<&'static str> {
        match self {
            Self::Concept => Some("concept"),
            Self::Task => Some("task"),
            Self::Reference | Self::LegalInfo => Some("reference"),
            Self::Unclassified => None,
        }
    }

    /// Canonical body element
    #[must_use]
    pub fn body_tag(self) -> Option<&'static str> {
        match self {
            Self::Concept => Some("conbody"),
            Self::Task => Some("taskbody"),
            Self::Reference | Self::LegalInfo => Some("refbody"),
            Self::Unclassified => None,
        }
    }

    /// Value of `topicref/@type` in the map
    #[must_use]
    pub fn map_type(self) -> Option<&'static str> {
        self.root_tag()
    }

    /// Doctype declaration written for this type
    #[must_use]
    pub fn doctype(self) -> Option<&'static str> {
        match self {
            Self::Concept => Some(r#"<!DOCTYPE concept PUBLIC "-//OASIS//DTD DITA Concept//EN" "concept.dtd">"#),
            Self::Task => Some(r#"<!DOCTYPE task PUBLIC "-//OASIS//DTD DITA General Task//EN" "generalTask.dtd">"#),
            Self::Reference | Self::LegalInfo => {
                Some(r#"<!DOCTYPE reference PUBLIC "-//OASIS//DTD DITA Reference//EN" "reference.dtd">"#)
            }
            Self::Unclassified => None,
        }
    }

    /// Outputclass marker; containers are concepts marked `context`
    #[must_use]
    pub fn outputclass(self, container: bool) -> Option<&'static str> {
        match self {
            Self::Concept if container => Some("context"),
            Self::Concept => Some("explanation"),
            Self::Task => Some("procedure"),
            Self::Reference => Some("referenceinformation"),
            Self::LegalInfo => Some("legalinformation"),
            Self::Unclassified => None,
        }
    }

    /// File name prefix used by the rename engine
    #[must_use]
    pub fn name_prefix(self, container: bool) -> Option<&'static str> {
        match self {
            Self::Concept if container => Some("c_"),
            Self::Concept | Self::LegalInfo => Some("e_"),
            Self::Task => Some("t_"),
            Self::Reference => Some("r_"),
            Self::Unclassified => None,
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Concept => "concept",
            Self::Task => "task",
            Self::Reference => "reference",
            Self::LegalInfo => "legal-info",
            Self::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Title or short description text
///
/// `Missing` covers an absent element, empty text and the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextField {
    /// Trimmed, non-empty author text
    Present(String),
    /// No usable text
    Missing,
}

impl TextField {
    /// Classify raw element text against its placeholder
    #[must_use]
    pub fn from_text(text: &str, placeholder: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == placeholder {
            Self::Missing
        } else {
            Self::Present(text.to_string())
        }
    }

    /// True for `Missing`
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Text when present
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Missing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_exact_match() {
        assert_eq!(TextField::from_text("  MISSING TITLE \n", TITLE_PLACEHOLDER), TextField::Missing);
        assert_eq!(TextField::from_text("", TITLE_PLACEHOLDER), TextField::Missing);
        assert_eq!(
            TextField::from_text("MISSING TITLE (draft)", TITLE_PLACEHOLDER),
            TextField::Present("MISSING TITLE (draft)".to_string())
        );
        assert_eq!(
            TextField::from_text("missing title", TITLE_PLACEHOLDER).as_deref(),
            Some("missing title")
        );
    }

    #[test]
    fn legal_info_serializes_as_reference() {
        assert_eq!(TopicType::LegalInfo.root_tag(), Some("reference"));
        assert_eq!(TopicType::LegalInfo.name_prefix(false), Some("e_"));
        assert_eq!(TopicType::LegalInfo.outputclass(false), Some("legalinformation"));
    }

    #[test]
    fn container_concepts_get_their_own_marker() {
        assert_eq!(TopicType::Concept.name_prefix(true), Some("c_"));
        assert_eq!(TopicType::Concept.outputclass(true), Some("context"));
        assert_eq!(TopicType::Task.name_prefix(true), Some("t_"));
    }

    #[test]
    fn outputclass_resolution() {
        assert_eq!(TopicType::from_outputclass("lpcontext"), Some(TopicType::Concept));
        assert_eq!(TopicType::from_outputclass("procedure"), Some(TopicType::Task));
        assert_eq!(TopicType::from_outputclass("frontmatter"), None);
        assert!(TopicType::Unclassified.root_tag().is_none());
    }
}
