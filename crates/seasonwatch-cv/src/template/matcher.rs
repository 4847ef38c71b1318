//! Normalized cross-correlation over a cropped search region.

use crate::rect::NormalizedRect;
use image::GrayImage;

/// Score returned when the search region cannot contain the template.
/// Sits below every realistic threshold, so undersized regions simply fail
/// their gate instead of erroring.
pub const UNMATCHABLE: f64 = -1.0;

/// Maximum zero-mean normalized cross-correlation of `template` slid over
/// the region of `gray` selected by `rect`.
///
/// Scores range roughly -1..1 with 1.0 an exact match. Only the magnitude is
/// reported; the best position inside the region is not needed. When the
/// mapped pixel rectangle is smaller than the template in either dimension
/// the function returns [`UNMATCHABLE`]; this is the expected path whenever
/// the capture resolution drops below the resolution the template was tuned
/// for. Placements with near-zero contrast score 0.
pub fn match_score(gray: &GrayImage, rect: &NormalizedRect, template: &GrayImage) -> f64 {
    let roi = rect.to_pixels(gray.width(), gray.height());
    let (tw, th) = template.dimensions();

    if tw == 0 || th == 0 || roi.w < tw || roi.h < th {
        return UNMATCHABLE;
    }

    let n = (tw as f64) * (th as f64);

    // Template statistics are placement-invariant; compute them once.
    let mut t_sum = 0.0;
    for p in template.pixels() {
        t_sum += p[0] as f64;
    }
    let t_mean = t_sum / n;

    let mut t_dev = Vec::with_capacity((tw * th) as usize);
    let mut t_sq = 0.0;
    for p in template.pixels() {
        let d = p[0] as f64 - t_mean;
        t_sq += d * d;
        t_dev.push(d);
    }
    let t_norm = t_sq.sqrt();
    if t_norm <= f64::EPSILON {
        // Flat template: correlation is undefined against any patch.
        return 0.0;
    }

    let mut best = UNMATCHABLE;
    for oy in 0..=(roi.h - th) {
        for ox in 0..=(roi.w - tw) {
            let mut sum_p = 0.0;
            let mut sum_pp = 0.0;
            let mut sum_pt = 0.0;

            for ty in 0..th {
                for tx in 0..tw {
                    let p = gray.get_pixel(roi.x + ox + tx, roi.y + oy + ty)[0] as f64;
                    let t = t_dev[(ty * tw + tx) as usize];
                    sum_p += p;
                    sum_pp += p * p;
                    sum_pt += p * t;
                }
            }

            // sum_pt already equals the zero-mean covariance because the
            // template deviations sum to zero.
            let patch_var = (sum_pp - sum_p * sum_p / n).max(0.0);
            let denom = patch_var.sqrt() * t_norm;
            let score = if denom <= f64::EPSILON {
                0.0
            } else {
                sum_pt / denom
            };

            if score > best {
                best = score;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn patterned(w: u32, h: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let mut v = seed ^ x.wrapping_mul(0x9E37_79B9) ^ y.wrapping_mul(0x85EB_CA6B);
            v ^= v >> 13;
            v = v.wrapping_mul(0xC2B2_AE35);
            Luma([(v >> 8) as u8])
        })
    }

    #[test]
    fn exact_match_scores_one() {
        let frame = patterned(100, 100, 7);
        let rect = NormalizedRect::new(0.2, 0.2, 0.4, 0.4);
        let roi = rect.to_pixels(100, 100);
        let template = image::imageops::crop_imm(&frame, roi.x, roi.y, 12, 12).to_image();

        let score = match_score(&frame, &rect, &template);
        assert!(score > 0.999, "expected near-perfect score, got {score}");
    }

    #[test]
    fn undersized_region_returns_sentinel() {
        let frame = patterned(100, 100, 7);
        // Maps to a 10x10 region, smaller than the 12x12 template.
        let rect = NormalizedRect::new(0.1, 0.1, 0.1, 0.1);
        let template = patterned(12, 12, 3);

        assert_eq!(match_score(&frame, &rect, &template), UNMATCHABLE);
    }

    #[test]
    fn sentinel_applies_regardless_of_content() {
        let frame = GrayImage::from_pixel(50, 50, Luma([200]));
        let rect = NormalizedRect::new(0.0, 0.0, 0.1, 0.1);
        let template = patterned(30, 30, 11);

        assert_eq!(match_score(&frame, &rect, &template), UNMATCHABLE);
    }

    #[test]
    fn flat_patch_scores_zero() {
        let frame = GrayImage::from_pixel(100, 100, Luma([128]));
        let rect = NormalizedRect::new(0.1, 0.1, 0.5, 0.5);
        let template = patterned(8, 8, 5);

        assert_eq!(match_score(&frame, &rect, &template), 0.0);
    }

    #[test]
    fn finds_template_anywhere_inside_region() {
        let mut frame = GrayImage::from_pixel(120, 120, Luma([10]));
        let template = patterned(10, 10, 21);
        // Paste the template off-center inside the search region.
        image::imageops::replace(&mut frame, &template, 47, 33);

        let rect = NormalizedRect::new(0.2, 0.2, 0.4, 0.4);
        let score = match_score(&frame, &rect, &template);
        assert!(score > 0.999, "expected sliding max to find paste, got {score}");
    }
}
