//! Shared test utilities for the imgtidy test suite.
//!
//! Builds small in-memory JPEG/PNG/WebP files and splices metadata into them
//! at the byte level, so tests can exercise detection and stripping without
//! binary fixtures checked into the repo.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let jpeg = insert_jpeg_segment(&jpeg_bytes(64, 48), 0xE1, &exif_app1_payload(6));
//! let path = write_file(tmp.path(), "rotated.jpg", &jpeg);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Pixels and encoded images
// =========================================================================

/// An RGB gradient, so resampling has something to chew on.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// A baseline JPEG as written by the `image` crate: SOI, JFIF, tables, scan.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A PNG with only IHDR, IDAT and IEND.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A simple-format lossless WebP: RIFF header and a single VP8L chunk.
pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

// =========================================================================
// EXIF
// =========================================================================

/// Minimal big-endian TIFF structure with one IFD0 entry: Orientation.
pub fn exif_tiff_orientation(value: u16) -> Vec<u8> {
    let mut tiff = b"MM\0\x2a".to_vec();
    tiff.extend_from_slice(&8u32.to_be_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_be_bytes()); // entry count
    tiff.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_be_bytes()); // count
    tiff.extend_from_slice(&value.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]); // value padding
    tiff.extend_from_slice(&0u32.to_be_bytes()); // no next IFD
    tiff
}

/// JPEG APP1 payload carrying [`exif_tiff_orientation`].
pub fn exif_app1_payload(orientation: u16) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&exif_tiff_orientation(orientation));
    payload
}

// =========================================================================
// Container splicing
// =========================================================================

/// Insert a marker segment right after SOI.
pub fn insert_jpeg_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Standard CRC-32 (IEEE, reflected), as PNG chunks require.
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Insert a chunk right after IHDR, with a valid CRC.
pub fn insert_png_chunk(png: &[u8], chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    // signature (8) + IHDR length/type (8) + IHDR body (13) + CRC (4)
    let after_ihdr = 33;
    assert_eq!(&png[12..16], b"IHDR", "not a PNG");

    let mut crc_input = chunk_type.to_vec();
    crc_input.extend_from_slice(data);

    let mut out = png[..after_ihdr].to_vec();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(&crc_input).to_be_bytes());
    out.extend_from_slice(&png[after_ihdr..]);
    out
}

/// Wrap bytes in a zlib stream of one stored (uncompressed) deflate block.
pub fn zlib_stored(data: &[u8]) -> Vec<u8> {
    assert!(data.len() <= u16::MAX as usize);
    let len = data.len() as u16;
    let mut out = vec![0x78, 0x01, 0x01];
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);

    let (mut a, mut b) = (1u32, 0u32);
    for &byte in data {
        a = (a + byte as u32) % 65521;
        b = (b + a) % 65521;
    }
    out.extend_from_slice(&((b << 16) | a).to_be_bytes());
    out
}

/// A well-formed `iCCP` chunk body: profile name, method 0, zlib data.
pub fn iccp_body(profile: &[u8]) -> Vec<u8> {
    let mut body = b"ICC Profile\0\0".to_vec();
    body.extend_from_slice(&zlib_stored(profile));
    body
}

/// Rebuild a simple WebP as extended format (VP8X) with extra chunks.
///
/// `ICCP` goes before the image data, everything else after it, which is
/// the order the RIFF layout requires. VP8X flags are set to match.
pub fn webp_with_chunks(width: u32, height: u32, chunks: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let simple = webp_bytes(width, height);
    let image_data = &simple[12..];

    let mut flags = 0u8;
    for (fourcc, _) in chunks {
        flags |= match fourcc {
            b"ICCP" => 0x20,
            b"EXIF" => 0x08,
            b"XMP " => 0x04,
            _ => 0,
        };
    }

    let write_chunk = |out: &mut Vec<u8>, fourcc: &[u8; 4], data: &[u8]| {
        out.extend_from_slice(fourcc);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        if data.len() % 2 == 1 {
            out.push(0);
        }
    };

    let mut vp8x = vec![flags, 0, 0, 0];
    vp8x.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    vp8x.extend_from_slice(&(height - 1).to_le_bytes()[..3]);

    let mut body = b"WEBP".to_vec();
    write_chunk(&mut body, b"VP8X", &vp8x);
    for (fourcc, data) in chunks.iter().filter(|(f, _)| f == b"ICCP") {
        write_chunk(&mut body, fourcc, data);
    }
    body.extend_from_slice(image_data);
    for (fourcc, data) in chunks.iter().filter(|(f, _)| f != b"ICCP") {
        write_chunk(&mut body, fourcc, data);
    }

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

// =========================================================================
// Filesystem
// =========================================================================

/// Write bytes to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}
