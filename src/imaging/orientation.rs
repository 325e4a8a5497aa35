//! EXIF orientation handling.
//!
//! Stripping EXIF would silently rotate photos whose pixels are stored sideways,
//! so the transform the tag describes is applied to the pixels first.
//!
//! Reading the tag is an optional capability (the `exif-orientation` feature,
//! backed by `kamadak-exif`). It is resolved once at startup into an
//! [`OrientationSupport`] value. When unavailable, EXIF is still stripped but
//! pixels keep whatever orientation they were stored in.

use image::DynamicImage;

/// The eight EXIF orientations (tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1
    Normal,
    /// 2
    FlipHorizontal,
    /// 3
    Rotate180,
    /// 4
    FlipVertical,
    /// 5: mirrored along the top-left/bottom-right diagonal
    Transpose,
    /// 6
    Rotate90,
    /// 7: mirrored along the top-right/bottom-left diagonal
    Transverse,
    /// 8
    Rotate270,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Whether applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    /// Dimensions after [`apply`](Self::apply), without touching pixels.
    pub fn oriented_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Bake the orientation into the pixel data.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::FlipHorizontal => img.fliph(),
            Self::Rotate180 => img.rotate180(),
            Self::FlipVertical => img.flipv(),
            Self::Transpose => img.rotate90().fliph(),
            Self::Rotate90 => img.rotate90(),
            Self::Transverse => img.rotate270().fliph(),
            Self::Rotate270 => img.rotate270(),
        }
    }
}

/// Whether EXIF orientation can be read in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationSupport {
    Available,
    Unavailable,
}

impl OrientationSupport {
    pub fn detect() -> Self {
        if cfg!(feature = "exif-orientation") {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    /// Read the orientation tag from a TIFF-structured EXIF payload.
    ///
    /// Returns `None` when unsupported, when the payload does not parse, or when
    /// the tag is absent or out of range. None of these are errors: the image is
    /// simply left as stored.
    pub fn read(self, exif: &[u8]) -> Option<Orientation> {
        match self {
            Self::Available => read_orientation(exif),
            Self::Unavailable => None,
        }
    }
}

#[cfg(feature = "exif-orientation")]
fn read_orientation(exif: &[u8]) -> Option<Orientation> {
    use exif::{In, Reader, Tag};

    let parsed = Reader::new().read_raw(exif.to_vec()).ok()?;
    let field = parsed.get_field(Tag::Orientation, In::PRIMARY)?;
    Orientation::from_exif(field.value.get_uint(0)?)
}

#[cfg(not(feature = "exif-orientation"))]
fn read_orientation(_exif: &[u8]) -> Option<Orientation> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 2x1 image: red on the left, blue on the right.
    fn two_pixels() -> DynamicImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        DynamicImage::ImageRgb8(img)
    }

    fn pixel(img: &DynamicImage, x: u32, y: u32) -> [u8; 3] {
        img.to_rgb8().get_pixel(x, y).0
    }

    #[test]
    fn from_exif_covers_all_eight() {
        for v in 1..=8 {
            assert!(Orientation::from_exif(v).is_some(), "{v}");
        }
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
    }

    #[test]
    fn rotate90_moves_left_pixel_to_top() {
        let out = Orientation::Rotate90.apply(two_pixels());
        assert_eq!((out.width(), out.height()), (1, 2));
        assert_eq!(pixel(&out, 0, 0), [255, 0, 0]);
        assert_eq!(pixel(&out, 0, 1), [0, 0, 255]);
    }

    #[test]
    fn rotate270_moves_left_pixel_to_bottom() {
        let out = Orientation::Rotate270.apply(two_pixels());
        assert_eq!((out.width(), out.height()), (1, 2));
        assert_eq!(pixel(&out, 0, 1), [255, 0, 0]);
    }

    #[test]
    fn flip_horizontal_swaps_pixels() {
        let out = Orientation::FlipHorizontal.apply(two_pixels());
        assert_eq!(pixel(&out, 0, 0), [0, 0, 255]);
        assert_eq!(pixel(&out, 1, 0), [255, 0, 0]);
    }

    #[test]
    fn oriented_dimensions_match_applied_image() {
        for v in 1..=8 {
            let o = Orientation::from_exif(v).unwrap();
            let out = o.apply(two_pixels());
            assert_eq!(o.oriented_dimensions(2, 1), (out.width(), out.height()), "{v}");
        }
    }

    #[test]
    fn unavailable_support_reads_nothing() {
        let tiff = crate::test_helpers::exif_tiff_orientation(6);
        assert_eq!(OrientationSupport::Unavailable.read(&tiff), None);
    }

    #[cfg(feature = "exif-orientation")]
    #[test]
    fn available_support_reads_tag() {
        assert_eq!(OrientationSupport::detect(), OrientationSupport::Available);
        let tiff = crate::test_helpers::exif_tiff_orientation(6);
        assert_eq!(
            OrientationSupport::Available.read(&tiff),
            Some(Orientation::Rotate90)
        );
    }

    #[cfg(feature = "exif-orientation")]
    #[test]
    fn garbage_exif_reads_as_none() {
        assert_eq!(OrientationSupport::Available.read(b"nonsense"), None);
    }
}
