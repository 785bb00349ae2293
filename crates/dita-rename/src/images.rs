//! Image renaming
//!
//! Two phases. Planning walks figures in map order and names each image once,
//! at its first encounter, from its caption (numbered when captions repeat).
//! Applying moves each file and rewrites every image reference in every topic.

use std::collections::HashSet;

use dita_project::ProjectGraph;

use crate::context::BatchContext;
use crate::error::RenameError;
use crate::naming::{image_marker, image_stem};
use crate::report::{BatchReport, FileOutcome};

/// Target name computed for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedImage {
    /// Current file name
    pub from: String,
    /// Target file name
    pub to: String,
}

/// Phase one: compute every target name before anything moves
pub fn plan_image_names(graph: &ProjectGraph, prefix: &str, context: &mut BatchContext) -> Vec<PlannedImage> {
    let marker = image_marker(prefix);
    let mut seen = HashSet::new();
    let mut plan = Vec::new();

    for (_, topic) in graph.topics() {
        for figure in topic.tree().figures() {
            let Some(image) = graph.image_for_href(topic.folder(), &figure.href) else {
                continue;
            };
            let name = image.file_name();
            if !seen.insert(name.to_string()) {
                continue;
            }
            let stem = match image.title() {
                Some(title) => image_stem(prefix, &context.next_image_title(title)),
                None if image.stem().starts_with(&marker) => image.stem().to_string(),
                None => image_stem(prefix, image.stem()),
            };
            plan.push(PlannedImage {
                from: name.to_string(),
                to: format!("{stem}{}", image.extension()),
            });
        }
    }
    plan
}

/// Rename every image referenced from a figure
pub fn rename_images(graph: &mut ProjectGraph, prefix: &str) -> BatchReport {
    let mut context = BatchContext::new();
    let plan = plan_image_names(graph, prefix, &mut context);
    tracing::info!("Renaming {} images with prefix {}", plan.len(), prefix);

    let mut report = BatchReport::new();
    for planned in plan {
        let Some(path) = graph.images().get(&planned.from).map(|i| i.path().to_path_buf()) else {
            continue;
        };
        let outcome = if planned.from == planned.to {
            FileOutcome::Unchanged
        } else {
            match move_image(graph, &planned) {
                Ok(()) => {
                    tracing::info!("Renamed image {} -> {}", planned.from, planned.to);
                    FileOutcome::Renamed {
                        from: planned.from,
                        to: planned.to,
                    }
                }
                Err(e) => {
                    tracing::error!("Rename of {} failed: {}", path.display(), e);
                    FileOutcome::Failed(e)
                }
            }
        };
        report.push(path, outcome);
    }
    report
}

fn move_image(graph: &mut ProjectGraph, planned: &PlannedImage) -> Result<(), RenameError> {
    let Some(old_path) = graph.images().get(&planned.from).map(|i| i.path().to_path_buf()) else {
        return Ok(());
    };
    let new_path = old_path.with_file_name(&planned.to);
    if new_path.exists() {
        return Err(RenameError::NameCollision {
            from: old_path,
            to: new_path,
        });
    }
    std::fs::rename(&old_path, &new_path).map_err(|e| RenameError::io_error(&old_path, e))?;
    graph.rename_image(&planned.from, new_path);

    for (_, topic) in graph.topics_mut() {
        let folder = topic.folder().to_path_buf();
        if topic.tree_mut().rewrite_image_hrefs(&folder, &old_path, &planned.to) > 0 {
            topic.write()?;
        }
    }
    Ok(())
}
