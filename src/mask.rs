//! Binary mask rasterization for inpainting requests.
//!
//! The inpainting service reads a single-channel image the same size as the
//! source: black pixels are left alone, white pixels are regenerated.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};

use crate::error::Result;
use crate::geometry::{ImageDimensions, SelectionRect};

/// Mask value for pixels the service must not touch.
pub const PRESERVE: Luma<u8> = Luma([0]);

/// Mask value for pixels the service should regenerate.
pub const EDIT: Luma<u8> = Luma([255]);

/// Rasterize a selection into a mask of the given size.
///
/// Pixels covered by the rectangle (see [`SelectionRect::pixel_bounds`]) are
/// [`EDIT`], all others [`PRESERVE`]. A missing or empty selection yields an
/// all-[`PRESERVE`] mask. The output depends only on the inputs.
#[must_use]
pub fn rasterize(dims: ImageDimensions, selection: Option<&SelectionRect>) -> GrayImage {
    let mut mask = GrayImage::from_pixel(dims.width(), dims.height(), PRESERVE);

    let Some(rect) = selection.filter(|r| !r.is_empty()) else {
        return mask;
    };

    let (x0, y0, x1, y1) = rect.pixel_bounds(dims);
    for y in y0..y1 {
        for x in x0..x1 {
            mask.put_pixel(x, y, EDIT);
        }
    }
    mask
}

/// Encode a mask as PNG bytes.
///
/// # Errors
///
/// Returns [`Error::Image`](crate::Error::Image) if encoding fails.
pub fn encode_png(mask: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    mask.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Number of [`EDIT`] pixels in a mask.
#[must_use]
pub fn edit_pixel_count(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| **p == EDIT).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> ImageDimensions {
        ImageDimensions::new(w, h).unwrap()
    }

    #[test]
    fn mask_matches_image_dimensions() {
        let mask = rasterize(dims(37, 11), None);
        assert_eq!(mask.dimensions(), (37, 11));
    }

    #[test]
    fn missing_selection_preserves_everything() {
        let mask = rasterize(dims(20, 10), None);
        assert!(mask.pixels().all(|p| *p == PRESERVE));
    }

    #[test]
    fn empty_selection_preserves_everything() {
        let rect = SelectionRect {
            x: 5.0,
            y: 5.0,
            width: 0.0,
            height: 3.0,
        };
        let mask = rasterize(dims(20, 10), Some(&rect));
        assert_eq!(edit_pixel_count(&mask), 0);
    }

    #[test]
    fn full_selection_edits_everything() {
        let d = dims(16, 9);
        let mask = rasterize(d, Some(&SelectionRect::full(d)));
        assert!(mask.pixels().all(|p| *p == EDIT));
    }

    #[test]
    fn rect_edges_are_half_open() {
        let rect = SelectionRect {
            x: 2.0,
            y: 3.0,
            width: 4.0,
            height: 2.0,
        };
        let mask = rasterize(dims(10, 10), Some(&rect));
        assert_eq!(edit_pixel_count(&mask), 8);
        assert_eq!(*mask.get_pixel(2, 3), EDIT);
        assert_eq!(*mask.get_pixel(5, 4), EDIT);
        assert_eq!(*mask.get_pixel(6, 4), PRESERVE);
        assert_eq!(*mask.get_pixel(5, 5), PRESERVE);
        assert_eq!(*mask.get_pixel(1, 3), PRESERVE);
    }

    #[test]
    fn rasterizing_twice_is_byte_identical() {
        let d = dims(64, 48);
        let rect = SelectionRect {
            x: 3.7,
            y: 9.1,
            width: 20.2,
            height: 11.9,
        };
        let a = encode_png(&rasterize(d, Some(&rect))).unwrap();
        let b = encode_png(&rasterize(d, Some(&rect))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn encoded_mask_decodes_to_same_pixels() {
        let d = dims(12, 12);
        let rect = SelectionRect {
            x: 4.0,
            y: 4.0,
            width: 4.0,
            height: 4.0,
        };
        let mask = rasterize(d, Some(&rect));
        let png = encode_png(&mask).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded, mask);
    }
}
