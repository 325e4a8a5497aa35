//! Pure Rust decode path with native encoders where `image` falls short.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory_with_format` |
//! | Metadata detection | [`ancillary::scan`](super::ancillary::scan) on the same bytes |
//! | Encode → JPEG | `jpeg-encoder` (progressive, optimized Huffman, 4:2:0) |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, then `oxipng` when optimizing |
//! | Encode → WebP | `webp` (libwebp, lossy, method 6) |
//!
//! No encoder here is handed any metadata, so whatever they write is pixels
//! plus the structural headers [`ancillary`](super::ancillary) ignores.

use super::ancillary;
use super::backend::{BackendError, ImageBackend, SourceImage};
use super::params::{EncodeOptions, ImageFormat};
use image::DynamicImage;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use jpeg_encoder::{ColorType, Encoder as JpegEncoder, SamplingFactor};
use std::path::Path;

/// libwebp effort level: 0 = fastest, 6 = smallest output.
const WEBP_METHOD: i32 = 6;

/// oxipng preset used when PNG optimization is on.
const OXIPNG_PRESET: u8 = 2;

/// Backend built on the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(format: ImageFormat, reason: impl ToString) -> BackendError {
    BackendError::Encode {
        format,
        reason: reason.to_string(),
    }
}

/// Encode as JPEG. Grayscale stays grayscale; every other mode, alpha
/// included, is flattened to RGB.
fn encode_jpeg(img: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
    let too_large = || {
        encode_error(
            ImageFormat::Jpeg,
            format!(
                "{}x{} exceeds the 65535px JPEG limit",
                img.width(),
                img.height()
            ),
        )
    };
    let width = u16::try_from(img.width()).map_err(|_| too_large())?;
    let height = u16::try_from(img.height()).map_err(|_| too_large())?;

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new(&mut out, options.quality.value() as u8);
    encoder.set_progressive(options.progressive);
    encoder.set_optimized_huffman_tables(options.optimize);
    encoder.set_sampling_factor(SamplingFactor::R_4_2_0);

    let result = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
            let luma = img.to_luma8();
            encoder.encode(luma.as_raw(), width, height, ColorType::Luma)
        }
        _ => {
            let rgb = img.to_rgb8();
            encoder.encode(rgb.as_raw(), width, height, ColorType::Rgb)
        }
    };
    result.map_err(|e| encode_error(ImageFormat::Jpeg, e))?;

    Ok(out)
}

/// Encode as PNG. With `optimize`, compress at the highest level and run the
/// result through oxipng's lossless reductions.
fn encode_png(img: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
    let compression = if options.optimize {
        CompressionType::Best
    } else {
        CompressionType::Default
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, PngFilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| encode_error(ImageFormat::Png, e))?;

    if options.optimize {
        let mut oxi = oxipng::Options::from_preset(OXIPNG_PRESET);
        oxi.strip = oxipng::StripChunks::All;
        out = oxipng::optimize_from_memory(&out, &oxi)
            .map_err(|e| encode_error(ImageFormat::Png, e))?;
    }

    Ok(out)
}

/// Encode as lossy WebP at the requested quality and maximum effort.
fn encode_webp(img: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (img.width(), img.height());

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        encode_webp_with(webp::Encoder::from_rgba(rgba.as_raw(), width, height), options)
    } else {
        let rgb = img.to_rgb8();
        encode_webp_with(webp::Encoder::from_rgb(rgb.as_raw(), width, height), options)
    }
}

fn encode_webp_with(
    encoder: webp::Encoder<'_>,
    options: &EncodeOptions,
) -> Result<Vec<u8>, BackendError> {
    let mut config = webp::WebPConfig::new()
        .map_err(|_| encode_error(ImageFormat::WebP, "libwebp rejected its default config"))?;
    config.lossless = 0;
    config.quality = options.quality.value() as f32;
    config.method = WEBP_METHOD;

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| encode_error(ImageFormat::WebP, format!("{e:?}")))?;
    Ok(memory.to_vec())
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<SourceImage, BackendError> {
        let format = ImageFormat::from_path(path)
            .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;

        // One read serves both the metadata scan and the decoder; the handle
        // is closed before any pixel work starts.
        let data = std::fs::read(path)?;
        let ancillary = ancillary::scan(format, &data);
        let pixels = image::load_from_memory_with_format(&data, format.codec()).map_err(|e| {
            BackendError::Decode {
                format,
                reason: e.to_string(),
            }
        })?;

        Ok(SourceImage {
            pixels,
            format,
            ancillary,
        })
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, BackendError> {
        match format {
            ImageFormat::Jpeg => encode_jpeg(image, options),
            ImageFormat::Png => encode_png(image, options),
            ImageFormat::WebP => encode_webp(image, options),
        }
    }
}
