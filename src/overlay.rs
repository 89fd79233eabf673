//! Preview rendering: the source image with the live selection drawn on top.

use image::{Rgba, RgbaImage};

use crate::geometry::SelectionRect;

/// Colours and line width of the selection overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Outline colour (RGB).
    pub stroke: [u8; 3],
    /// Outline opacity in `[0, 1]`.
    pub stroke_alpha: f32,
    /// Outline width in image pixels, centred on the rectangle edge.
    pub line_width: f32,
    /// Interior colour (RGB).
    pub fill: [u8; 3],
    /// Interior opacity in `[0, 1]`.
    pub fill_alpha: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: [26, 115, 232],
            stroke_alpha: 0.9,
            line_width: 3.0,
            fill: [26, 115, 232],
            fill_alpha: 0.2,
        }
    }
}

/// Blend `color` over `px` with opacity `alpha`.
fn blend(px: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    for ch in 0..3 {
        let under = f32::from(px[ch]);
        let over = f32::from(color[ch]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            px[ch] = (alpha * over + (1.0 - alpha) * under).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Pixel centre test against a half-open float box.
fn centre_inside(px: u32, py: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
    cx >= x0 && cx < x1 && cy >= y0 && cy < y1
}

/// Draw the selection onto `frame`: translucent fill, then the outline.
pub fn draw_selection(frame: &mut RgbaImage, rect: &SelectionRect, style: &OverlayStyle) {
    let half = style.line_width / 2.0;
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);

    for (px, py, pixel) in frame.enumerate_pixels_mut() {
        if !rect.is_empty() && centre_inside(px, py, x0, y0, x1, y1) {
            blend(pixel, style.fill, style.fill_alpha);
        }
        let in_outer = centre_inside(px, py, x0 - half, y0 - half, x1 + half, y1 + half);
        let in_inner = centre_inside(px, py, x0 + half, y0 + half, x1 - half, y1 - half);
        if in_outer && !in_inner {
            blend(pixel, style.stroke, style.stroke_alpha);
        }
    }
}
