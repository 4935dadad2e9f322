//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// A square region of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Centered square crop of a `width × height` image.
///
/// The side is the shorter edge; the box is centered along the longer axis
/// (offset = `|width − height| / 2`) and spans the full shorter axis.
///
/// # Examples
/// ```
/// # use photofolio::imaging::square_crop;
/// // 4000x3000 landscape → 3000px square, 500px in from the left
/// let crop = square_crop(4000, 3000);
/// assert_eq!((crop.x, crop.y, crop.size), (500, 0, 3000));
/// ```
pub fn square_crop(width: u32, height: u32) -> CropBox {
    let size = width.min(height);
    let offset = width.abs_diff(height) / 2;
    if width >= height {
        CropBox { x: offset, y: 0, size }
    } else {
        CropBox { x: 0, y: offset, size }
    }
}

/// Dimensions of a preview fitting inside a `bound × bound` square.
///
/// Aspect ratio is preserved and images already inside the bound keep their
/// size. Neither edge rounds down to zero.
pub fn preview_dimensions(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= bound {
        return (w, h);
    }

    let ratio = bound as f64 / longer as f64;
    if w >= h {
        (bound, ((h as f64 * ratio).round() as u32).max(1))
    } else {
        (((w as f64 * ratio).round() as u32).max(1), bound)
    }
}
