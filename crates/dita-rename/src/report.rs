//! Batch reports

use std::fmt;
use std::path::PathBuf;

use crate::error::{RenameError, SkipReason};

/// What happened to one file
#[derive(Debug)]
pub enum FileOutcome {
    /// Moved to a new name; all references follow
    Renamed {
        /// Old file name
        from: String,
        /// New file name
        to: String,
    },
    /// Already carries its derived name
    Unchanged,
    /// Deliberately left alone
    Skipped(SkipReason),
    /// The rename failed; see the error
    Failed(RenameError),
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renamed { from, to } => write!(f, "renamed {from} -> {to}"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// One line of a report
#[derive(Debug)]
pub struct FileReport {
    /// File as it was when the batch reached it
    pub path: PathBuf,
    /// Result
    pub outcome: FileOutcome,
}

/// Result of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    files: Vec<FileReport>,
}

impl BatchReport {
    /// Empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file
    pub fn push(&mut self, path: impl Into<PathBuf>, outcome: FileOutcome) {
        self.files.push(FileReport {
            path: path.into(),
            outcome,
        });
    }

    /// Per-file lines in processing order
    #[must_use]
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    /// Files the batch went through
    #[must_use]
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    /// Files moved to a new name
    #[must_use]
    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Renamed { .. }))
    }

    /// Files already correctly named
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Unchanged))
    }

    /// Files left alone
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped(_)))
    }

    /// Files whose rename failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    /// True when any file failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }

    /// New name recorded for an old file name
    #[must_use]
    pub fn renamed_to(&self, old_name: &str) -> Option<&str> {
        self.files.iter().find_map(|f| match &f.outcome {
            FileOutcome::Renamed { from, to } if from == old_name => Some(to.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            writeln!(f, "{}: {}", file.path.display(), file.outcome)?;
        }
        write!(
            f,
            "{} processed: {} renamed, {} unchanged, {} skipped, {} failed",
            self.processed(),
            self.renamed(),
            self.unchanged(),
            self.skipped(),
            self.failed()
        )
    }
}
