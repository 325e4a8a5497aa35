//! Ancillary metadata detection for JPEG, PNG and WebP containers.
//!
//! Walks the container structure of the raw file bytes and records every
//! non-pixel field into an [`Ancillary`] record:
//!
//! | Field | JPEG | PNG | WebP |
//! |---|---|---|---|
//! | `exif` | APP1 `Exif\0\0` | `eXIf` | `EXIF` |
//! | `icc_profile` | APP2 `ICC_PROFILE` (chunks joined) | `iCCP` | `ICCP` |
//! | `xmp` | APP1 XMP namespace | - | `XMP ` |
//! | `density` | APP0 JFIF with units 1/2 | `pHYs` | - |
//! | `gamma` | - | `gAMA` | - |
//! | `annotations` | COM, APP13 IPTC | `tEXt` `zTXt` `iTXt` | - |
//! | `other` | remaining APPn | remaining ancillary chunks | unknown chunks |
//!
//! Structural fields the encoders write themselves (JFIF without a physical
//! density, Adobe APP14, PNG `tRNS`, WebP `VP8X`/`ALPH`/animation chunks) are
//! not metadata. Malformed containers are not an error here: scanning stops at
//! the first inconsistency and keeps what it found. The decoder is the one
//! that reports corruption.

use super::params::ImageFormat;

/// Physical pixel density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Density {
    pub x: u32,
    pub y: u32,
    pub unit: DensityUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    /// Aspect ratio only (PNG `pHYs` unit 0).
    Unknown,
    PerInch,
    PerCentimeter,
    PerMeter,
}

/// A free-text field: PNG text chunk, JPEG comment, or IPTC dataset.
///
/// `text` is `None` when the value is compressed and not worth inflating just
/// to throw it away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub key: String,
    pub text: Option<String>,
}

/// Every removable field found in one image file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancillary {
    /// TIFF-structured EXIF payload (without the JPEG `Exif\0\0` prefix).
    pub exif: Option<Vec<u8>>,
    pub icc_profile: Option<Vec<u8>>,
    pub xmp: Option<Vec<u8>>,
    pub density: Option<Density>,
    /// PNG `gAMA`, gamma × 100000.
    pub gamma: Option<u32>,
    pub annotations: Vec<Annotation>,
    /// Tags of ancillary segments/chunks with no dedicated field, e.g. `APP12`, `tIME`.
    pub other: Vec<String>,
}

impl Ancillary {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none()
            && self.icc_profile.is_none()
            && self.xmp.is_none()
            && self.density.is_none()
            && self.gamma.is_none()
            && self.annotations.is_empty()
            && self.other.is_empty()
    }

    /// Names of the present fields, for diagnostics.
    pub fn present_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.exif.is_some() {
            fields.push("exif".to_string());
        }
        if self.icc_profile.is_some() {
            fields.push("icc_profile".to_string());
        }
        if self.xmp.is_some() {
            fields.push("xmp".to_string());
        }
        if self.density.is_some() {
            fields.push("density".to_string());
        }
        if self.gamma.is_some() {
            fields.push("gamma".to_string());
        }
        fields.extend(self.annotations.iter().map(|a| format!("text:{}", a.key)));
        fields.extend(self.other.iter().cloned());
        fields
    }
}

/// Scan raw file bytes for ancillary metadata, dispatching on container format.
pub fn scan(format: ImageFormat, data: &[u8]) -> Ancillary {
    match format {
        ImageFormat::Jpeg => scan_jpeg(data),
        ImageFormat::Png => scan_png(data),
        ImageFormat::WebP => scan_webp(data),
    }
}

fn be_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn append(slot: &mut Option<Vec<u8>>, bytes: &[u8]) {
    slot.get_or_insert_with(Vec::new).extend_from_slice(bytes);
}

// ---------------------------------------------------------------------------
// JPEG: marker segments between SOI and SOS
// ---------------------------------------------------------------------------

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const XMP_EXTENSION_HEADER: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";

fn scan_jpeg(data: &[u8]) -> Ancillary {
    let mut found = Ancillary::default();
    if !data.starts_with(&[0xFF, 0xD8]) {
        return found;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS: entropy-coded data follows, no more header segments. EOI: done.
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        if pos + 4 > data.len() {
            break;
        }
        let seg_len = be_u16(&data[pos + 2..]) as usize;
        let seg_end = pos + 2 + seg_len;
        if seg_len < 2 || seg_end > data.len() {
            break;
        }
        let payload = &data[pos + 4..seg_end];

        match marker {
            0xE0 => scan_app0(payload, &mut found),
            0xE1 => {
                if let Some(exif) = payload.strip_prefix(EXIF_HEADER) {
                    append(&mut found.exif, exif);
                } else if let Some(xmp) = payload.strip_prefix(XMP_HEADER) {
                    append(&mut found.xmp, xmp);
                } else if let Some(xmp) = payload.strip_prefix(XMP_EXTENSION_HEADER) {
                    append(&mut found.xmp, xmp);
                } else {
                    found.other.push("APP1".to_string());
                }
            }
            0xE2 => match payload.strip_prefix(ICC_HEADER) {
                // Two bytes of sequence number / chunk count precede each chunk
                Some(icc) if icc.len() >= 2 => append(&mut found.icc_profile, &icc[2..]),
                _ => found.other.push("APP2".to_string()),
            },
            0xED => {
                let iptc = find_iptc_in_app13(payload)
                    .map(parse_iptc_iim)
                    .unwrap_or_default();
                if iptc.is_empty() {
                    found.other.push("APP13".to_string());
                } else {
                    found.annotations.extend(iptc);
                }
            }
            0xEE if payload.starts_with(b"Adobe") => {}
            0xE3..=0xEF => found.other.push(format!("APP{}", marker - 0xE0)),
            0xFE => found.annotations.push(Annotation {
                key: "comment".to_string(),
                text: Some(String::from_utf8_lossy(payload).trim_end_matches('\0').to_string()),
            }),
            _ => {}
        }

        pos = seg_end;
    }

    found
}

/// JFIF is written by every JPEG encoder; only a physical density makes it metadata.
fn scan_app0(payload: &[u8], found: &mut Ancillary) {
    if payload.starts_with(b"JFIF\0") {
        if payload.len() < 12 {
            return;
        }
        let unit = match payload[7] {
            1 => DensityUnit::PerInch,
            2 => DensityUnit::PerCentimeter,
            _ => return,
        };
        found.density = Some(Density {
            x: be_u16(&payload[8..]) as u32,
            y: be_u16(&payload[10..]) as u32,
            unit,
        });
    } else if payload.starts_with(b"JFXX\0") {
        found.other.push("JFXX".to_string());
    } else {
        found.other.push("APP0".to_string());
    }
}

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Find the raw IPTC-IIM bytes inside an APP13 payload.
///
/// Structure: optional `Photoshop 3.0\0` header, then 8BIM resource blocks:
/// "8BIM" (4) + resource id (2) + pascal name padded to even + length (4) + data.
/// Resource 0x0404 holds the IPTC-IIM datasets.
fn find_iptc_in_app13(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;
        let resource_id = be_u16(&data[pos..]);
        pos += 2;

        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len = be_u32(&data[pos..]) as usize;
        pos += 4;
        if pos + res_len > data.len() {
            break;
        }

        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }
        pos += res_len + (res_len % 2);
    }
    None
}

/// Turn IPTC-IIM datasets into annotations.
///
/// Each dataset: 0x1C, record, dataset number, big-endian u16 length, data.
/// Only the application record (2) carries user-visible text; the record
/// version dataset (2:00) is bookkeeping and skipped.
fn parse_iptc_iim(data: &[u8]) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }
        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = be_u16(&data[pos + 3..]) as usize;
        pos += 5;
        if pos + length > data.len() {
            break;
        }

        if record == 2 && dataset != 0 {
            let key = match dataset {
                5 => "iptc:title".to_string(),
                25 => "iptc:keyword".to_string(),
                80 => "iptc:byline".to_string(),
                116 => "iptc:copyright".to_string(),
                120 => "iptc:caption".to_string(),
                n => format!("iptc:2:{n}"),
            };
            annotations.push(Annotation {
                key,
                text: Some(String::from_utf8_lossy(&data[pos..pos + length]).trim().to_string()),
            });
        }
        pos += length;
    }

    annotations
}

// ---------------------------------------------------------------------------
// PNG: length/type/data/CRC chunks after the 8-byte signature
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn scan_png(data: &[u8]) -> Ancillary {
    let mut found = Ancillary::default();
    if !data.starts_with(&PNG_SIGNATURE) {
        return found;
    }

    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let length = be_u32(&data[pos..]) as usize;
        let chunk_type: [u8; 4] = [data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]];
        let body_start = pos + 8;
        let Some(body_end) = body_start.checked_add(length) else {
            break;
        };
        if body_end + 4 > data.len() {
            break;
        }
        let body = &data[body_start..body_end];

        match &chunk_type {
            b"IEND" => break,
            b"iCCP" => found.icc_profile = Some(body.to_vec()),
            b"eXIf" => found.exif = Some(body.to_vec()),
            b"pHYs" if body.len() >= 9 => {
                found.density = Some(Density {
                    x: be_u32(body),
                    y: be_u32(&body[4..]),
                    unit: if body[8] == 1 {
                        DensityUnit::PerMeter
                    } else {
                        DensityUnit::Unknown
                    },
                });
            }
            b"gAMA" if body.len() >= 4 => found.gamma = Some(be_u32(body)),
            b"tEXt" => found.annotations.push(png_text(body)),
            b"zTXt" => found.annotations.push(Annotation {
                key: png_keyword(body).0,
                text: None,
            }),
            b"iTXt" => found.annotations.push(png_itxt(body)),
            // Transparency is pixel data, not metadata
            b"tRNS" => {}
            // Ancillary bit: lower-case first letter
            t if t[0].is_ascii_lowercase() => {
                found.other.push(String::from_utf8_lossy(t).into_owned());
            }
            _ => {}
        }

        pos = body_end + 4;
    }

    found
}

/// Split a Latin-1 keyword off the NUL-terminated start of a text chunk.
fn png_keyword(body: &[u8]) -> (String, &[u8]) {
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    // Latin-1: every byte maps to the same code point
    let key = body[..end].iter().map(|&b| b as char).collect();
    (key, body.get(end + 1..).unwrap_or_default())
}

/// `tEXt`: keyword, NUL, Latin-1 text.
fn png_text(body: &[u8]) -> Annotation {
    let (key, rest) = png_keyword(body);
    let text = Some(rest.iter().map(|&b| b as char).collect());
    Annotation { key, text }
}

/// `iTXt`: keyword, NUL, compression flag, method, language tag, NUL,
/// translated keyword, NUL, UTF-8 text.
fn png_itxt(body: &[u8]) -> Annotation {
    let (key, rest) = png_keyword(body);
    let text = match rest {
        [0, _, tail @ ..] => {
            let mut parts = tail.splitn(3, |&b| b == 0);
            let _language = parts.next();
            let _translated = parts.next();
            parts.next().map(|t| String::from_utf8_lossy(t).into_owned())
        }
        _ => None,
    };
    Annotation { key, text }
}

// ---------------------------------------------------------------------------
// WebP: RIFF chunks after "RIFF" size "WEBP"
// ---------------------------------------------------------------------------

const WEBP_STRUCTURAL: &[&[u8; 4]] = &[b"VP8 ", b"VP8L", b"VP8X", b"ALPH", b"ANIM", b"ANMF"];

fn scan_webp(data: &[u8]) -> Ancillary {
    let mut found = Ancillary::default();
    if data.len() < 12 || !data.starts_with(b"RIFF") || &data[8..12] != b"WEBP" {
        return found;
    }

    let mut pos = 12;
    while pos + 8 <= data.len() {
        let fourcc: [u8; 4] = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
        let size = le_u32(&data[pos + 4..]) as usize;
        let body_start = pos + 8;
        let Some(body_end) = body_start.checked_add(size) else {
            break;
        };
        if body_end > data.len() {
            break;
        }
        let body = &data[body_start..body_end];

        match &fourcc {
            b"ICCP" => found.icc_profile = Some(body.to_vec()),
            // Some writers keep the JPEG-style prefix
            b"EXIF" => found.exif = Some(body.strip_prefix(EXIF_HEADER).unwrap_or(body).to_vec()),
            b"XMP " => found.xmp = Some(body.to_vec()),
            f if WEBP_STRUCTURAL.contains(&f) => {}
            f => found
                .other
                .push(String::from_utf8_lossy(f).trim_end().to_string()),
        }

        // Chunks are padded to even length
        pos = body_end + (size & 1);
    }

    found
}
