//! Topic renaming
//!
//! Each topic is renamed after its title, in map order. A rename moves the
//! file first, then rewrites every local link resolving to the old path, then
//! the map entries, then the sidecar. Propagation runs over the in-memory
//! graph, so no topic is re-read from disk mid-batch.

use std::path::{Path, PathBuf};

use dita_content::{TextField, TopicType};
use dita_project::{ProjectGraph, TopicId};

use crate::context::BatchContext;
use crate::error::{RenameError, SkipReason};
use crate::naming::base_name;
use crate::report::{BatchReport, FileOutcome};

/// Rename every topic of the graph after its title
pub fn rename_topics(graph: &mut ProjectGraph) -> BatchReport {
    let mut context = BatchContext::new();
    let mut report = BatchReport::new();
    tracing::info!("Renaming {} topics", graph.topic_count());

    for id in graph.topic_ids() {
        let path = graph.topic(id).path().to_path_buf();
        let outcome = rename_topic(graph, id, &mut context);
        match &outcome {
            FileOutcome::Renamed { from, to } => tracing::info!("Renamed {} -> {}", from, to),
            FileOutcome::Unchanged => tracing::debug!("{} already named", path.display()),
            FileOutcome::Skipped(reason) => tracing::info!("Skipped {}: {}", path.display(), reason),
            FileOutcome::Failed(err) => tracing::error!("Rename of {} failed: {}", path.display(), err),
        }
        report.push(path, outcome);
    }

    tracing::info!(
        "Topic batch done: {} processed, {} renamed, {} failed",
        report.processed(),
        report.renamed(),
        report.failed()
    );
    report
}

/// Rename one topic, counting its derived name in `context`
pub fn rename_topic(graph: &mut ProjectGraph, id: TopicId, context: &mut BatchContext) -> FileOutcome {
    let kind = graph.topic(id).kind();
    if !kind.is_canonical() {
        return FileOutcome::Skipped(SkipReason::NotCanonical(kind));
    }
    if !graph.topic(id).is_normalized() {
        return FileOutcome::Skipped(SkipReason::NotNormalized);
    }
    if kind == TopicType::LegalInfo {
        let topic = graph.topic_mut(id);
        if topic.tree_mut().synthesize_legal_title() {
            if let Err(e) = topic.write() {
                return FileOutcome::Failed(e.into());
            }
        }
    }

    let topic = graph.topic(id);
    let TextField::Present(title) = topic.title() else {
        return FileOutcome::Skipped(SkipReason::MissingTitle);
    };
    let Some(prefix) = kind.name_prefix(topic.is_container()) else {
        return FileOutcome::Skipped(SkipReason::NotCanonical(kind));
    };
    let Some(base) = base_name(&title) else {
        return FileOutcome::Skipped(SkipReason::EmptyName);
    };

    let stem = context.next_name(&format!("{prefix}{base}"));
    if stem == topic.stem() {
        return FileOutcome::Unchanged;
    }
    match move_topic(graph, id, &stem) {
        Ok((from, to)) => FileOutcome::Renamed { from, to },
        Err(e) => FileOutcome::Failed(e),
    }
}

fn with_stem(path: &Path, stem: &str) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_file_name(format!("{stem}.{ext}")),
        None => path.with_file_name(stem),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Move a topic to `stem`, then bring every reference along
fn move_topic(graph: &mut ProjectGraph, id: TopicId, stem: &str) -> Result<(String, String), RenameError> {
    let old_path = graph.topic(id).path().to_path_buf();
    let new_path = with_stem(&old_path, stem);
    if new_path.exists() {
        return Err(RenameError::NameCollision {
            from: old_path,
            to: new_path,
        });
    }
    let new_sidecar = graph.topic(id).sidecar().map(|s| with_stem(s.path(), stem));
    if let Some(sidecar_path) = new_sidecar.as_ref().filter(|p| p.exists()) {
        return Err(RenameError::NameCollision {
            from: old_path,
            to: sidecar_path.clone(),
        });
    }

    std::fs::rename(&old_path, &new_path).map_err(|e| RenameError::io_error(&old_path, e))?;
    graph.topic_mut(id).set_path(&new_path);
    let old_name = file_name(&old_path);
    let new_name = file_name(&new_path);

    for (_, topic) in graph.topics_mut() {
        let folder = topic.folder().to_path_buf();
        let rewritten = topic.tree_mut().update_local_links(&folder, &old_path, &new_name);
        if rewritten > 0 {
            tracing::debug!("Updated {} links in {}", rewritten, topic.file_name());
            topic.write()?;
        }
    }

    if graph.update_map_hrefs(&old_path, &new_name) > 0 {
        graph.write_map()?;
    }

    if let (Some(sidecar), Some(sidecar_path)) = (graph.topic_mut(id).sidecar_mut(), new_sidecar) {
        sidecar.set_title(stem);
        sidecar.move_to(sidecar_path)?;
    }

    Ok((old_name, new_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_replacement_keeps_extension_and_folder() {
        assert_eq!(with_stem(Path::new("p/a.dita"), "t_A"), PathBuf::from("p/t_A.dita"));
        assert_eq!(with_stem(Path::new("p/a"), "t_A"), PathBuf::from("p/t_A"));
    }
}
