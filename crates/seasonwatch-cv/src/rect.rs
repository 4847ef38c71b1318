//! Search regions expressed as fractions of the frame size.

use serde::{Deserialize, Serialize};

/// Rectangle in normalized coordinates: every field is a fraction (0..1) of
/// the frame width or height. Regions stay valid across capture resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Pixel-space rectangle produced from a [`NormalizedRect`] for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl NormalizedRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Map to pixel coordinates for a frame of the given size.
    ///
    /// Fractions are rounded, the origin is clamped into the frame and the
    /// extent is clamped to the remaining frame with a floor of one pixel in
    /// both dimensions.
    pub fn to_pixels(&self, frame_w: u32, frame_h: u32) -> PixelRect {
        if frame_w == 0 || frame_h == 0 {
            return PixelRect { x: 0, y: 0, w: 1, h: 1 };
        }

        let x = clamp((self.x * frame_w as f64).round() as i64, 0, frame_w as i64 - 1);
        let y = clamp((self.y * frame_h as f64).round() as i64, 0, frame_h as i64 - 1);
        let w = clamp((self.w * frame_w as f64).round() as i64, 1, frame_w as i64 - x);
        let h = clamp((self.h * frame_h as f64).round() as i64, 1, frame_h as i64 - y);

        PixelRect {
            x: x as u32,
            y: y as u32,
            w: w as u32,
            h: h as u32,
        }
    }
}

fn clamp(v: i64, min: i64, max: i64) -> i64 {
    v.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_fractions_by_rounding() {
        let rect = NormalizedRect::new(0.44, 0.905, 0.14, 0.07);
        let px = rect.to_pixels(1920, 1080);

        assert_eq!(px.x, 845); // round(0.44 * 1920)
        assert_eq!(px.y, 977); // round(0.905 * 1080)
        assert_eq!(px.w, 269); // round(0.14 * 1920)
        assert_eq!(px.h, 76); // round(0.07 * 1080)
    }

    #[test]
    fn clamps_origin_and_extent_into_frame() {
        let rect = NormalizedRect::new(0.9, 0.9, 0.5, 0.5);
        let px = rect.to_pixels(100, 100);

        assert_eq!((px.x, px.y), (90, 90));
        assert_eq!((px.w, px.h), (10, 10));
    }

    #[test]
    fn enforces_one_pixel_minimum_extent() {
        let rect = NormalizedRect::new(0.5, 0.5, 0.0, 0.0);
        let px = rect.to_pixels(200, 200);

        assert_eq!((px.w, px.h), (1, 1));
    }

    #[test]
    fn degenerate_frame_yields_unit_rect() {
        let rect = NormalizedRect::new(0.3, 0.3, 0.2, 0.2);
        let px = rect.to_pixels(0, 0);

        assert_eq!(px, PixelRect { x: 0, y: 0, w: 1, h: 1 });
    }
}
