//! Rename batches over temporary projects

use dita_content::{href_file_name, DocumentTree};
use dita_project::{MigrationConfig, ProjectGraph};
use dita_rename::{rename_images, rename_topics, BatchSlot, FileOutcome, RenameError, SkipReason};
use dita_test_utils::{roller_project, sidecar_xml, task_xml, topic_xml, ProjectFixture, MAP_NAME};
use pretty_assertions::assert_eq;

fn discover(fixture: &ProjectFixture) -> ProjectGraph {
    ProjectGraph::discover(fixture.map_path(), &MigrationConfig::new()).unwrap()
}

/// Every map entry and local link resolves to a file that exists
fn assert_no_dangling_references(fixture: &ProjectFixture) {
    let map = DocumentTree::load(fixture.map_path()).unwrap();
    for topicref in map.elements_by_tag(map.root(), "topicref") {
        let href = map.attribute(topicref, "href").unwrap();
        let name = href_file_name(href);
        assert!(fixture.exists(name), "map entry {href} dangles");

        let topic = DocumentTree::load(fixture.path(name)).unwrap();
        for link in topic.local_links() {
            let target = href_file_name(topic.attribute(link, "href").unwrap());
            assert!(fixture.exists(target), "link {target} in {name} dangles");
        }
        for figure in topic.figures() {
            assert!(fixture.exists(&figure.href), "image {} in {name} dangles", figure.href);
        }
    }
}

#[test]
fn roller_project_end_to_end() {
    let fixture = roller_project();
    let mut graph = discover(&fixture);

    let report = rename_topics(&mut graph);
    assert_eq!(report.processed(), 3);
    assert_eq!(report.renamed(), 3);
    assert_eq!(report.renamed_to("clean_a.dita"), Some("t_Clean_the_Rollers.dita"));
    assert_eq!(report.renamed_to("clean_b.dita"), Some("t_Clean_the_Rollers_2.dita"));
    assert_eq!(report.renamed_to("station.dita"), Some("e_Cleaning_Station_Service.dita"));

    let map = fixture.read(MAP_NAME);
    assert!(map.contains(r#"href="t_Clean_the_Rollers.dita""#));
    assert!(map.contains(r#"href="t_Clean_the_Rollers_2.dita""#));
    assert!(!fixture.exists("clean_a.dita"));

    let station = fixture.read("e_Cleaning_Station_Service.dita");
    assert!(station.contains(r#"<xref href="t_Clean_the_Rollers.dita" scope="local">"#));
    assert!(station.contains(r#"<xref href="t_Clean_the_Rollers_2.dita#t" scope="local">"#));

    let images = rename_images(&mut graph, "acme");
    assert_eq!(images.renamed(), 1);
    assert_eq!(fixture.list("media"), vec!["img_acme_Roller_Assembly.png".to_string()]);
    let station = fixture.read("e_Cleaning_Station_Service.dita");
    assert!(station.contains(r#"<image href="media/img_acme_Roller_Assembly.png"/>"#));

    assert_no_dangling_references(&fixture);
}

fn snapshot(fixture: &ProjectFixture) -> Vec<(String, String)> {
    let mut files: Vec<_> = fixture
        .list("")
        .into_iter()
        .filter(|name| name != "media")
        .map(|name| {
            let text = fixture.read(&name);
            (name, text)
        })
        .collect();
    files.extend(fixture.list("media").into_iter().map(|name| (name, String::new())));
    files
}

#[test]
fn second_batch_is_a_no_op() {
    let fixture = roller_project();
    let mut graph = discover(&fixture);
    rename_topics(&mut graph);
    rename_images(&mut graph, "acme");
    let before = snapshot(&fixture);

    let mut graph = discover(&fixture);
    let topics = rename_topics(&mut graph);
    let images = rename_images(&mut graph, "acme");
    assert_eq!(topics.unchanged(), 3);
    assert_eq!(images.unchanged(), 1);
    assert_eq!(topics.renamed() + images.renamed(), 0);
    assert_eq!(snapshot(&fixture), before);
}

#[test]
fn collision_fails_without_overwriting() {
    let fixture = ProjectFixture::new();
    fixture.write("a.dita", &task_xml("Clean"));
    fixture.write_map(&["a.dita"]);
    let mut graph = discover(&fixture);
    fixture.write("t_Clean.dita", "not a topic of this map");

    let report = rename_topics(&mut graph);
    assert!(matches!(
        report.files()[0].outcome,
        FileOutcome::Failed(RenameError::NameCollision { .. })
    ));
    assert_eq!(fixture.read("t_Clean.dita"), "not a topic of this map");
    assert!(fixture.exists("a.dita"));
    assert!(fixture.read(MAP_NAME).contains(r#"href="a.dita""#));
}

#[test]
fn titles_that_normalize_alike_are_disambiguated() {
    let fixture = ProjectFixture::new();
    fixture.write("a.dita", &topic_xml("Safety: first", "<p>x</p>"));
    fixture.write("b.dita", &topic_xml("Safety first", "<p>x</p>"));
    fixture.write("c.dita", &topic_xml("Safety  first!", "<p>x</p>"));
    fixture.write_map(&["a.dita", "b.dita", "c.dita"]);

    let mut graph = discover(&fixture);
    let report = rename_topics(&mut graph);
    assert_eq!(report.renamed(), 3);
    assert_eq!(
        fixture.list(""),
        vec![
            "e_Safety_first.dita".to_string(),
            "e_Safety_first_2.dita".to_string(),
            "e_Safety_first_3.dita".to_string(),
            MAP_NAME.to_string(),
        ]
    );
}

#[test]
fn same_named_topics_in_other_folders_keep_their_references() {
    let fixture = ProjectFixture::new();
    fixture.write("a.dita", &topic_xml("Alpha", "<p>x</p>"));
    fixture.write(
        "sub/a.dita",
        &topic_xml("Beta", r#"<p><xref href="a.dita#b" scope="local"/></p>"#),
    );
    fixture.write(
        "sub/other.dita",
        &topic_xml(
            "Other",
            r#"<p><xref href="../a.dita" scope="local"/><xref href="a.dita" scope="local"/></p>"#,
        ),
    );
    fixture.write_map(&["a.dita", "sub/a.dita", "sub/other.dita"]);

    let mut graph = discover(&fixture);
    let report = rename_topics(&mut graph);
    assert_eq!(report.renamed(), 3);

    let map = fixture.read(MAP_NAME);
    assert!(map.contains(r#"href="e_Alpha.dita""#));
    assert!(map.contains(r#"href="sub/e_Beta.dita""#));
    assert!(map.contains(r#"href="sub/e_Other.dita""#));
    assert_eq!(fixture.list("sub"), vec!["e_Beta.dita".to_string(), "e_Other.dita".to_string()]);

    let beta = fixture.read("sub/e_Beta.dita");
    assert!(beta.contains(r#"<xref href="e_Beta.dita#b" scope="local"/>"#));
    let other = fixture.read("sub/e_Other.dita");
    assert!(other.contains(r#"<xref href="../e_Alpha.dita" scope="local"/>"#));
    assert!(other.contains(r#"<xref href="e_Beta.dita" scope="local"/>"#));

    let again = discover(&fixture);
    assert_eq!(again.topic_count(), 3);
    assert!(again.issues().is_empty());
}

#[test]
fn untitled_and_unnormalized_topics_are_skipped() {
    let fixture = ProjectFixture::new();
    fixture.write("untitled.dita", "<topic><body><p>x</p></body></topic>");
    fixture.write(
        "manual.dita",
        r#"<topic outputclass="procedure"><title>Manual</title><body><p>prose</p></body></topic>"#,
    );
    fixture.write_map(&["untitled.dita", "manual.dita"]);

    let mut graph = discover(&fixture);
    let report = rename_topics(&mut graph);
    assert!(matches!(report.files()[0].outcome, FileOutcome::Skipped(SkipReason::MissingTitle)));
    assert!(matches!(report.files()[1].outcome, FileOutcome::Skipped(SkipReason::NotNormalized)));
    assert!(fixture.exists("untitled.dita") && fixture.exists("manual.dita"));
}

#[test]
fn legal_information_gets_its_title_first() {
    let fixture = ProjectFixture::new();
    fixture.write(
        "legal.dita",
        r#"<topic outputclass="legalinformation"><title>MISSING TITLE</title><body><section outputclass="copyright"><p>Copyright 2024 ACME Corp.</p></section></body></topic>"#,
    );
    fixture.write_map(&["legal.dita"]);

    let mut graph = discover(&fixture);
    let report = rename_topics(&mut graph);
    assert_eq!(report.renamed_to("legal.dita"), Some("e_Legal_information.dita"));
    let text = fixture.read("e_Legal_information.dita");
    assert!(text.contains("<shortdesc>Copyright 2024 ACME Corp.</shortdesc>"));
    assert_eq!(text.matches("Copyright 2024 ACME Corp.").count(), 1);
}

#[test]
fn sidecar_follows_its_topic() {
    let fixture = ProjectFixture::new();
    fixture.write("a.dita", &task_xml("Replace the belt"));
    fixture.write("a.3sish", &sidecar_xml("a"));
    fixture.write_map(&["a.dita"]);

    let mut graph = discover(&fixture);
    rename_topics(&mut graph);

    assert!(!fixture.exists("a.3sish"));
    let sidecar = fixture.read("t_Replace_the_belt.3sish");
    assert!(sidecar.contains(">t_Replace_the_belt</ishfield>"));
}

#[test]
fn repeated_captions_are_numbered_and_untitled_images_marked() {
    let fixture = ProjectFixture::new();
    fixture.write("media/one.png", "1");
    fixture.write("media/two.png", "2");
    fixture.write("media/bare shot.jpg", "3");
    fixture.write(
        "a.dita",
        &topic_xml(
            "A",
            r#"<fig><title>Pump</title><image href="media/one.png"/></fig><fig><title>Pump</title><image href="media/two.png"/></fig><fig><image href="media/bare shot.jpg"/></fig>"#,
        ),
    );
    fixture.write_map(&["a.dita"]);

    let mut graph = discover(&fixture);
    let report = rename_images(&mut graph, "p");
    assert_eq!(report.renamed(), 3);
    assert_eq!(
        fixture.list("media"),
        vec![
            "img_p_Pump.png".to_string(),
            "img_p_Pump_2.png".to_string(),
            "img_p_bare_shot.jpg".to_string(),
        ]
    );
    assert_no_dangling_references(&fixture);
}

#[tokio::test]
async fn batches_run_on_the_worker() {
    let fixture = roller_project();
    let map = fixture.map_path();
    let slot = BatchSlot::new();

    let handle = slot
        .spawn(move || {
            let mut graph = ProjectGraph::discover(&map, &MigrationConfig::new())?;
            Ok::<_, dita_project::DiscoveryError>(rename_topics(&mut graph))
        })
        .unwrap();
    let report = handle.result().await.unwrap().unwrap();
    assert_eq!(report.renamed(), 3);
    assert!(!slot.is_running());
}
