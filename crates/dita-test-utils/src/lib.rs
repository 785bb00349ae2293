//! Testing utilities for the migration workspace
//!
//! Temporary project folders and small document builders.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const MAP_NAME: &str = "root.ditamap";

/// A project folder that is deleted on drop
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn map_path(&self) -> PathBuf {
        self.path(MAP_NAME)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture folder");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn write_map(&self, hrefs: &[&str]) -> PathBuf {
        self.write(MAP_NAME, &map_xml(hrefs))
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read fixture file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// File names in a folder of the project, sorted
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path(relative))
            .expect("list fixture folder")
            .filter_map(|e| e.ok()?.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A flat map referencing `hrefs` in order
pub fn map_xml(hrefs: &[&str]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<map>\n  <title>Manual</title>\n");
    for href in hrefs {
        let _ = writeln!(xml, "  <topicref href=\"{href}\"/>");
    }
    xml.push_str("</map>\n");
    xml
}

/// A legacy topic with the given title and body markup
pub fn topic_xml(title: &str, body: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<topic id=\"t\">\n  <title>{title}</title>\n  <body>{body}</body>\n</topic>\n")
}

/// A legacy procedure
pub fn task_xml(title: &str) -> String {
    topic_xml(title, "<p>1. Open the cover.</p><p>2. Wipe the roller.</p>")
}

/// A sidecar record whose FTITLE is `stem`
pub fn sidecar_xml(stem: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ishobject ishtype=\"ISHModule\"><ishfields><ishfield name=\"FTITLE\" level=\"logical\">{stem}</ishfield></ishfields></ishobject>\n")
}

/// Two procedures with the same title and a concept with one captioned
/// image in `media/`
pub fn roller_project() -> ProjectFixture {
    let fixture = ProjectFixture::new();
    fixture.write("clean_a.dita", &task_xml("Clean the Rollers"));
    fixture.write("clean_b.dita", &task_xml("Clean the Rollers"));
    fixture.write(
        "station.dita",
        &topic_xml(
            "Cleaning Station Service",
            "<p>See <xref href=\"clean_a.dita\" scope=\"local\">cleaning</xref> and <xref href=\"clean_b.dita#t\" scope=\"local\">again</xref>.</p>\
             <fig><title>Roller Assembly</title><image href=\"media/fig1.png\"/></fig>",
        ),
    );
    fixture.write("media/fig1.png", "png");
    fixture.write_map(&["clean_a.dita", "clean_b.dita", "station.dita"]);
    fixture
}
