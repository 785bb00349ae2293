//! Content model scenarios
//!
//! Classification and normalization driven through the public API, the way a
//! discovery pass uses it.

use dita_content::{DocumentTree, NormalizeOutcome, TextField, TopicType, SPACER_TEXT};
use pretty_assertions::assert_eq;

const LEGACY_TABLE_TOPIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE topic PUBLIC "-//OASIS//DTD DITA Topic//EN" "topic.dtd">
<topic id="specs">
  <title>Roller dimensions</title>
  <body>
    <p>Nominal values.</p>
    <table><tgroup cols="1"><tbody><row><entry>42 mm</entry></row></tbody></tgroup></table>
    <p>Values may vary.</p>
  </body>
</topic>
"#;

#[test]
fn table_topic_becomes_reference_with_section_and_spacer() {
    let mut tree = DocumentTree::parse_str(LEGACY_TABLE_TOPIC).unwrap();
    let kind = tree.classify();
    assert_eq!(kind, TopicType::Reference);

    assert_eq!(tree.normalize_to(kind), Ok(NormalizeOutcome::Normalized));

    let table = tree.elements_by_tag(tree.root(), "table")[0];
    let ancestors: Vec<_> = tree
        .ancestors(table)
        .filter_map(|a| tree.tag(a).map(str::to_string))
        .collect();
    assert_eq!(ancestors, vec!["section", "refbody", "reference"]);

    let spacer = tree.next_element_sibling(table).unwrap();
    assert_eq!(tree.tag(spacer), Some("p"));
    assert_eq!(tree.text_content(spacer), SPACER_TEXT);

    assert!(tree.header().contains("<!DOCTYPE reference PUBLIC"));
    assert_eq!(tree.outputclass(), Some("referenceinformation"));
}

#[test]
fn normalized_output_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("specs.dita");

    let mut tree = DocumentTree::parse_str(LEGACY_TABLE_TOPIC).unwrap();
    tree.normalize_to(TopicType::Reference).unwrap();
    tree.write(&path).unwrap();

    let mut reloaded = DocumentTree::load(&path).unwrap();
    assert_eq!(reloaded.title(), TextField::Present("Roller dimensions".to_string()));
    assert_eq!(reloaded.short_description(), TextField::Missing);
    assert_eq!(
        reloaded.normalize_to(TopicType::Reference),
        Ok(NormalizeOutcome::AlreadyCanonical)
    );
    assert_eq!(reloaded.to_xml_string().unwrap(), std::fs::read_to_string(&path).unwrap());
}

#[test]
fn unmutated_document_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("specs.dita");
    std::fs::write(&path, LEGACY_TABLE_TOPIC).unwrap();

    let tree = DocumentTree::load(&path).unwrap();
    tree.write(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), LEGACY_TABLE_TOPIC);
}

#[test]
fn placeholders_read_back_as_missing() {
    let mut tree = DocumentTree::parse_str("<topic><body><p>text</p></body></topic>").unwrap();
    tree.normalize_to(TopicType::Concept).unwrap();

    let reparsed = DocumentTree::parse_str(&tree.to_xml_string().unwrap()).unwrap();
    assert!(reparsed.title().is_missing());
    assert!(reparsed.short_description().is_missing());
}

#[test]
fn explicit_legal_marker_normalizes_as_reference() {
    let mut tree = DocumentTree::parse_str(
        r#"<topic outputclass="legalinformation"><title>Legal</title><body><p outputclass="copyright">x</p></body></topic>"#,
    )
    .unwrap();
    let kind = tree
        .outputclass()
        .and_then(TopicType::from_outputclass)
        .unwrap();
    assert_eq!(kind, TopicType::LegalInfo);

    tree.normalize_to(kind).unwrap();
    assert_eq!(tree.tag(tree.root()), Some("reference"));
    assert_eq!(tree.outputclass(), Some("legalinformation"));
    assert!(tree.find_child(tree.body().unwrap(), "section").is_some());
}

#[test]
fn escaped_text_survives_write_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.dita");
    std::fs::write(
        &path,
        r#"<topic id="menu" audience="cooks &amp; waiters"><title>Salt &amp; pepper</title><body><p>a &lt; b</p></body></topic>"#,
    )
    .unwrap();

    let mut tree = DocumentTree::load(&path).unwrap();
    assert_eq!(tree.title(), TextField::Present("Salt & pepper".to_string()));
    assert_eq!(tree.attribute(tree.root(), "audience"), Some("cooks & waiters"));
    tree.set_title("Fish & chips").unwrap();
    tree.normalize_to(TopicType::Concept).unwrap();
    tree.write(&path).unwrap();

    let reloaded = DocumentTree::load(&path).unwrap();
    assert_eq!(reloaded.title(), TextField::Present("Fish & chips".to_string()));
    assert_eq!(reloaded.attribute(reloaded.root(), "audience"), Some("cooks & waiters"));
    let body = reloaded.body().unwrap();
    assert_eq!(reloaded.text_content(body).trim(), "a < b");
    assert!(std::fs::read_to_string(&path).unwrap().contains("<title>Fish &amp; chips</title>"));
}
