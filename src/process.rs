//! Batch driver: normalize every candidate in a directory.
//!
//! Files are handled one at a time in sorted path order. A failure on one file
//! (unreadable, corrupt, encoder error, failed rename) is captured into that
//! file's report and the run moves on. Only a bad root directory stops the run,
//! and it does so before any file is touched.
//!
//! Each report is handed to a callback as soon as the file is done, so the CLI
//! can print progress line by line while tests collect reports into a `Vec`.

use crate::imaging::ImageBackend;
use crate::normalize::{Normalizer, Outcome};
use crate::scan::{ScanError, find_images};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Changed(String),
    WouldChange(String),
    Unchanged,
    /// Error message; the file on disk is as it was.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Counts for the closing line. `changed` includes dry-run would-changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub total: usize,
}

impl Summary {
    fn record(&mut self, status: &FileStatus) {
        match status {
            FileStatus::Changed(_) | FileStatus::WouldChange(_) => self.changed += 1,
            FileStatus::Unchanged => self.unchanged += 1,
            FileStatus::Failed(_) => self.failed += 1,
        }
    }
}

/// Normalize every candidate under `root`, reporting each file through `on_report`.
pub fn process_directory<B, F>(
    normalizer: &Normalizer<B>,
    root: &Path,
    mut on_report: F,
) -> Result<Summary, ProcessError>
where
    B: ImageBackend,
    F: FnMut(&FileReport),
{
    let paths = find_images(root, normalizer.policy().recursive)?;
    debug!(root = %root.display(), candidates = paths.len(), "scanned");

    let mut summary = Summary {
        total: paths.len(),
        ..Summary::default()
    };

    for path in paths {
        let status = match normalizer.normalize_file(&path) {
            Ok(Outcome::Changed { description }) => FileStatus::Changed(description),
            Ok(Outcome::WouldChange { description }) => FileStatus::WouldChange(description),
            Ok(Outcome::Unchanged) => FileStatus::Unchanged,
            Err(e) => {
                debug!(path = %path.display(), error = ?e, "failed");
                FileStatus::Failed(e.to_string())
            }
        };
        summary.record(&status);
        on_report(&FileReport { path, status });
    }

    Ok(summary)
}
