//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the normalizer needs:
//! `load` (read a file once, detect its ancillary metadata and decode its
//! pixels) and `encode` (produce the bytes of a metadata-free replacement).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use a recording
//! mock so normalizer logic can be checked without real codecs.

use super::ancillary::Ancillary;
use super::params::{EncodeOptions, ImageFormat};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {format}: {reason}")]
    Decode { format: ImageFormat, reason: String },
    #[error("Failed to encode {format}: {reason}")]
    Encode { format: ImageFormat, reason: String },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// A decoded file: its pixels, its container format and what else it carried.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub format: ImageFormat,
    pub ancillary: Ancillary,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Read and decode a candidate file. The format comes from the extension.
    fn load(&self, path: &Path) -> Result<SourceImage, BackendError>;

    /// Encode pixels as `format`, writing nothing but image data.
    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, BackendError>;
}
