//! Candidate discovery.
//!
//! Lists the files under a directory whose extension is one of
//! `.jpg`, `.jpeg`, `.png`, `.webp` (any case). Only immediate children are
//! listed unless recursion is requested. Results are sorted by path so runs
//! are reproducible and output lines come in a stable order.
//!
//! Symlinks are not followed. Directories, sockets and other non-regular
//! entries are skipped even when their name looks like an image.
//!
//! Only the root itself must be listable. A subdirectory that cannot be read
//! is logged and skipped so the rest of the tree is still processed.

use crate::imaging::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Find candidate images under `root`, sorted by path.
pub fn find_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut paths = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() > 0 => {
                let path = source.path().unwrap_or(root);
                warn!(path = %path.display(), error = %source, "skipping unreadable entry");
                continue;
            }
            Err(source) => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };
        if entry.file_type().is_file() && ImageFormat::from_path(entry.path()).is_some() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}
