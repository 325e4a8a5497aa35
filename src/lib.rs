//! # imgtidy
//!
//! Keeps a folder of README images small and clean. Every JPEG, PNG and WebP
//! file in the folder is checked; files that carry metadata or exceed a
//! bounding box are re-encoded in place, everything else is left byte for
//! byte as it was.
//!
//! # Pipeline (per file)
//!
//! ```text
//! load      bytes → ancillary record + decoded pixels
//! decide    needs_strip? needs_resize?         (no → done, file untouched)
//! orient    bake EXIF orientation into pixels
//! resize    Lanczos3 into the bounding box     (never upscales)
//! encode    same format, nothing but pixels
//! replace   temp sibling + rename
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists candidate files under a directory, sorted |
//! | [`normalize`] | Per-file decision, transformation and atomic replacement |
//! | [`process`] | Batch driver: runs the normalizer over a directory, collects a summary |
//! | [`config`] | `TidyConfig` defaults, TOML loading and validation |
//! | [`imaging`] | Metadata detection, orientation, dimension math, codecs |
//! | [`output`] | CLI output formatting: per-file lines and the closing summary |
//!
//! # Design Decisions
//!
//! ## Detect Metadata From the Container
//!
//! The `image` crate decodes pixels and hides everything else. Deciding whether
//! a file is dirty needs the opposite view, so [`imaging::ancillary`] walks
//! JPEG markers, PNG chunks and RIFF chunks directly and records what it finds.
//! Fields the encoders themselves write (a JFIF header without physical
//! density, PNG transparency, WebP extended headers) do not count, which is
//! what makes a second run over the same folder a no-op.
//!
//! ## Unchanged Means Untouched
//!
//! A file that needs nothing is never opened for writing. A file that needs
//! something is replaced through a rename, so readers never see a half-written
//! image and a failed encode leaves the original in place.

pub mod config;
pub mod imaging;
pub mod normalize;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
