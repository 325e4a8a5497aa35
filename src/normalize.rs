//! Per-file normalization: decide, reorient, resize, re-encode, replace.
//!
//! The normalizer looks at one file and answers a single question: does it
//! carry anything besides pixels, or is it larger than the bounding box? If
//! neither, the file is left alone and not even opened for writing. Otherwise
//! the pixels are detached from their container, the EXIF orientation is baked
//! in, the image is shrunk with Lanczos3, re-encoded in its own format and
//! swapped in atomically.
//!
//! ## Change Descriptions
//!
//! ```text
//! stripped metadata
//! resized 3000x2000 -> 1600x1067
//! stripped metadata, resized 3000x2000 -> 1600x1067
//! would strip-metadata, resize 3000x2000 -> 1600x1067      (dry run)
//! ```
//!
//! The left side of a resize is the stored size, the right side the final
//! size after orientation was applied.
//!
//! ## Atomic Replacement
//!
//! New bytes go to a hidden temporary sibling which is then renamed over the
//! original, so a reader sees either the old file or the new one. The original
//! permissions are carried over. If anything fails before the rename, the
//! temporary file is removed when its handle drops.

use crate::config::TidyConfig;
use crate::imaging::{
    Ancillary, BackendError, EncodeOptions, ImageBackend, Orientation, OrientationSupport,
    Quality, exceeds, fit_within,
};
use image::imageops::FilterType;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What to enforce on every file of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Neither side of an output image may exceed this.
    pub max_edge: u32,
    pub encode: EncodeOptions,
    /// Report what would change, write nothing.
    pub dry_run: bool,
    pub recursive: bool,
}

impl Policy {
    pub fn from_config(config: &TidyConfig, dry_run: bool) -> Self {
        Self {
            max_edge: config.max_size.max(1),
            encode: EncodeOptions {
                quality: Quality::new(config.quality),
                optimize: config.optimize,
                progressive: config.progressive,
            },
            dry_run,
            recursive: config.recursive,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_config(&TidyConfig::default(), false)
    }
}

/// Whether a file needs rewriting, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub needs_resize: bool,
    pub needs_strip: bool,
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        !self.needs_resize && !self.needs_strip
    }
}

/// Decide from stored dimensions and the ancillary record alone.
pub fn decide(width: u32, height: u32, ancillary: &Ancillary, max_edge: u32) -> Decision {
    Decision {
        needs_resize: exceeds(width, height, max_edge),
        needs_strip: !ancillary.is_empty(),
    }
}

/// Result of normalizing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to strip, nothing to shrink. The file was not touched.
    Unchanged,
    /// The file was replaced.
    Changed { description: String },
    /// Dry run: the file would have been replaced.
    WouldChange { description: String },
}

pub struct Normalizer<B: ImageBackend> {
    backend: B,
    policy: Policy,
    orientation: OrientationSupport,
}

impl<B: ImageBackend> Normalizer<B> {
    pub fn new(backend: B, policy: Policy, orientation: OrientationSupport) -> Self {
        Self {
            backend,
            policy,
            orientation,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn normalize_file(&self, path: &Path) -> Result<Outcome, NormalizeError> {
        let source = self.backend.load(path)?;
        let (width, height) = (source.width(), source.height());
        let decision = decide(width, height, &source.ancillary, self.policy.max_edge);

        if decision.is_noop() {
            debug!(path = %path.display(), width, height, "clean and within bounds");
            return Ok(Outcome::Unchanged);
        }
        if decision.needs_strip {
            debug!(
                path = %path.display(),
                fields = ?source.ancillary.present_fields(),
                "carries metadata"
            );
        }

        let orientation = source
            .ancillary
            .exif
            .as_deref()
            .and_then(|exif| self.orientation.read(exif))
            .unwrap_or(Orientation::Normal);
        let (oriented_w, oriented_h) = orientation.oriented_dimensions(width, height);
        let (new_w, new_h) = fit_within(oriented_w, oriented_h, self.policy.max_edge);

        if self.policy.dry_run {
            let mut items = Vec::new();
            if decision.needs_strip {
                items.push("strip-metadata".to_string());
            }
            if decision.needs_resize {
                items.push(format!("resize {width}x{height} -> {new_w}x{new_h}"));
            }
            return Ok(Outcome::WouldChange {
                description: format!("would {}", items.join(", ")),
            });
        }

        let mut pixels = orientation.apply(source.pixels);
        if (new_w, new_h) != (oriented_w, oriented_h) {
            pixels = pixels.resize_exact(new_w, new_h, FilterType::Lanczos3);
        }
        debug!(
            path = %path.display(),
            ?orientation,
            width = new_w,
            height = new_h,
            "re-encoding as {}",
            source.format
        );

        let bytes = self
            .backend
            .encode(&pixels, source.format, &self.policy.encode)?;
        write_atomic(path, &bytes).map_err(|source| NormalizeError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        let mut items = Vec::new();
        if decision.needs_strip {
            items.push("stripped metadata".to_string());
        }
        if decision.needs_resize {
            items.push(format!("resized {width}x{height} -> {new_w}x{new_h}"));
        }
        Ok(Outcome::Changed {
            description: items.join(", "),
        })
    }
}

/// Replace `path` with `bytes` via a temporary sibling and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).ok().map(|m| m.permissions());

    let mut tmp = tempfile::Builder::new()
        .prefix(".imgtidy-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
