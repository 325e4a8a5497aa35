//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Whether either dimension exceeds the bounding box.
pub fn exceeds(width: u32, height: u32, max_edge: u32) -> bool {
    width > max_edge || height > max_edge
}

/// Fit dimensions inside a square bounding box of `max_edge`, never upscaling.
///
/// The longer side becomes exactly `max_edge`; the shorter side is scaled by the
/// same ratio, rounded, and floored at 1 so extreme panoramas never collapse to
/// a zero-sized axis. Square images scale both sides to `max_edge`.
///
/// # Examples
/// ```
/// # use imgtidy::imaging::fit_within;
/// // 3000x2000 landscape into 1600 → 1600x1067
/// assert_eq!(fit_within(3000, 2000, 1600), (1600, 1067));
///
/// // Already inside the box → unchanged
/// assert_eq!(fit_within(800, 600, 1600), (800, 600));
/// ```
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if !exceeds(width, height, max_edge) {
        return (width, height);
    }

    let scale_short = |short: u32, long: u32| -> u32 {
        let scaled = (short as f64 * max_edge as f64 / long as f64).round() as u32;
        scaled.max(1)
    };

    if width >= height {
        // Landscape or square: width is the longer edge
        (max_edge, scale_short(height, width))
    } else {
        // Portrait
        (scale_short(width, height), max_edge)
    }
}
