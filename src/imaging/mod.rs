//! Image processing: decode, reorient, resize, re-encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect metadata** | custom container walker (JPEG markers, PNG chunks, RIFF) |
//! | **Orientation** | `kamadak-exif` (optional `exif-orientation` feature) |
//! | **Resize** | `image::imageops::FilterType::Lanczos3` |
//! | **JPEG** | `jpeg-encoder` (progressive, optimized Huffman, 4:2:0) |
//! | **PNG** | `image` PNG encoder + `oxipng` |
//! | **WebP** | `webp` (libwebp, lossy) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Formats, quality and encoder switches
//! - **Ancillary**: What a file carries besides pixels
//! - **Orientation**: EXIF orientation tag and how to bake it into pixels
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod ancillary;
pub mod backend;
mod calculations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use ancillary::Ancillary;
pub use backend::{BackendError, ImageBackend, SourceImage};
pub use calculations::{exceeds, fit_within};
pub use orientation::{Orientation, OrientationSupport};
pub use params::{EncodeOptions, ImageFormat, Quality, SUPPORTED_EXTENSIONS};
pub use rust_backend::RustBackend;
