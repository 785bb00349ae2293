//! Follow-up reporting and bulk short-description edits

use std::fmt::Write as _;
use std::path::PathBuf;

use dita_content::TopicType;

use crate::error::{ProjectError, ProjectResult};
use crate::graph::ProjectGraph;
use crate::topic::ProblemTopic;

impl ProjectGraph {
    /// Topics still missing a title or short description, or carrying draft
    /// comments, sorted by path
    #[must_use]
    pub fn problem_topics(&self) -> Vec<ProblemTopic> {
        let mut problems: Vec<ProblemTopic> = self
            .topics()
            .map(|(_, topic)| ProblemTopic {
                path: topic.path().to_path_buf(),
                missing_title: topic.title().is_missing(),
                missing_short_description: topic.short_description().is_missing(),
                has_draft_comments: topic.tree().draft_comment_count() > 0,
            })
            .filter(|p| p.missing_title || p.missing_short_description || p.has_draft_comments)
            .collect();
        problems.sort();
        problems
    }

    /// `status_<map stem>.txt` in the project folder
    #[must_use]
    pub fn status_file_path(&self) -> PathBuf {
        let stem = self
            .map_path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("map");
        self.folder()
            .join(format!("{}{}.txt", self.config().status_prefix, stem))
    }

    /// Write the problem list, one path per line. Returns the file written.
    pub fn write_status_file(&self) -> ProjectResult<PathBuf> {
        let path = self.status_file_path();
        let mut text = String::new();
        for problem in self.problem_topics() {
            let _ = writeln!(text, "{}", problem.path.display());
        }
        std::fs::write(&path, text).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote status file {}", path.display());
        Ok(path)
    }

    /// Set the configured short description on topics whose title has one
    /// and whose own is missing; document detail pages among references get
    /// theirs too. Returns the names of the files edited.
    pub fn fill_typical_short_descriptions(&mut self) -> Vec<String> {
        let config = self.config().clone();
        let mut edited = Vec::new();
        for (_, topic) in self.topics_mut() {
            let mut changed = false;
            if topic.short_description().is_missing() {
                let typical = topic
                    .title()
                    .as_deref()
                    .and_then(|title| config.typical_short_description(title))
                    .cloned();
                if let Some(typical) = typical {
                    if topic.tree_mut().set_short_description(&typical.short_description).is_ok() {
                        changed = true;
                        if typical.spacer_after_table {
                            topic.tree_mut().add_spacer_after_table();
                        }
                    }
                }
            }
            if topic.kind() == TopicType::Reference && topic.tree_mut().fill_document_details() {
                changed = true;
            }
            if !changed {
                continue;
            }
            match topic.write() {
                Ok(()) => {
                    tracing::info!("Filled short description of {}", topic.file_name());
                    edited.push(topic.file_name().to_string());
                }
                Err(e) => tracing::error!("Could not write {}: {}", topic.path().display(), e),
            }
        }
        edited
    }
}
