//! Composite gated sign detector.

use super::config::SignConfig;
use crate::rect::NormalizedRect;
use crate::template::{match_score, Template, TemplateError, TemplateStore};
use image::GrayImage;
use std::path::Path;

/// One gate of a composite sign, bound to its decoded template.
#[derive(Debug, Clone)]
pub struct GateSpec {
    pub name: String,
    pub rect: NormalizedRect,
    pub template: Template,
    pub threshold: f64,
    pub required: bool,
}

/// Outcome of evaluating one frame against a sign.
///
/// `reason` carries every gate score evaluated up to the decision point plus
/// roi/template/frame dimensions. It exists for the log only and is never
/// used for control flow.
#[derive(Debug, Clone)]
pub struct Detection {
    pub hit: bool,
    pub reason: String,
}

impl Detection {
    pub fn ok(reason: impl Into<String>) -> Self {
        Self {
            hit: true,
            reason: reason.into(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            hit: false,
            reason: reason.into(),
        }
    }
}

/// Evaluates an ordered gate list with AND logic over one grayscale frame.
///
/// The first failing required gate short-circuits evaluation; optional gates
/// are scored into the reason string but never gate. Construction fails
/// permanently when any reference template cannot be loaded.
#[derive(Debug)]
pub struct SignDetector {
    name: String,
    gates: Vec<GateSpec>,
}

impl SignDetector {
    pub fn new(name: impl Into<String>, gates: Vec<GateSpec>) -> Self {
        Self {
            name: name.into(),
            gates,
        }
    }

    /// Build a detector from configuration, resolving template file names
    /// against `assets_dir` through the shared store.
    pub fn from_config(
        config: &SignConfig,
        store: &TemplateStore,
        assets_dir: &Path,
    ) -> Result<Self, TemplateError> {
        let mut gates = Vec::with_capacity(config.gates.len());
        for gate in &config.gates {
            let template = store.load(assets_dir.join(&gate.template))?;
            gates.push(GateSpec {
                name: gate.name.clone(),
                rect: gate.rect,
                template,
                threshold: gate.threshold,
                required: gate.required,
            });
        }
        Ok(Self::new(config.name.clone(), gates))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate all gates against an already-grayscale frame.
    pub fn detect(&self, gray: &GrayImage) -> Detection {
        if gray.width() == 0 || gray.height() == 0 {
            return Detection::fail("frame empty");
        }

        let frame_size = format!("{}x{}", gray.width(), gray.height());
        let mut scores: Vec<String> = Vec::with_capacity(self.gates.len());

        for gate in &self.gates {
            let roi = gate.rect.to_pixels(gray.width(), gray.height());
            let score = match_score(gray, &gate.rect, &gate.template.image);

            if gate.required && score < gate.threshold {
                let dims = format!(
                    "roi={}x{}, tpl={}x{}",
                    roi.w,
                    roi.h,
                    gate.template.width(),
                    gate.template.height()
                );
                let reason = if scores.is_empty() {
                    format!("{}<{:.3}> {} frame={}", gate.name, score, dims, frame_size)
                } else {
                    format!(
                        "{}<{:.3}> ({}) {} frame={}",
                        gate.name,
                        score,
                        scores.join(", "),
                        dims,
                        frame_size
                    )
                };
                return Detection::fail(reason);
            }

            scores.push(format!("{}={:.3}", gate.name, score));
        }

        Detection::ok(format!("hit {} frame={}", scores.join(", "), frame_size))
    }
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

    fn gate_from_frame(
        name: &str,
        frame: &GrayImage,
        rect: NormalizedRect,
        threshold: f64,
        required: bool,
    ) -> GateSpec {
        let roi = rect.to_pixels(frame.width(), frame.height());
        let tpl = image::imageops::crop_imm(frame, roi.x, roi.y, roi.w.min(12), roi.h.min(12))
            .to_image();
        GateSpec {
            name: name.to_string(),
            rect,
            template: Template::new(name, tpl),
            threshold,
            required,
        }
    }

    #[test]
    fn all_required_gates_passing_yields_hit() {
        let frame = patterned(200, 200, 1);
        let detector = SignDetector::new(
            "end",
            vec![
                gate_from_frame("confirm", &frame, NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9, true),
                gate_from_frame("reward", &frame, NormalizedRect::new(0.6, 0.1, 0.2, 0.2), 0.9, true),
            ],
        );

        let result = detector.detect(&frame);
        assert!(result.hit, "unexpected miss: {}", result.reason);
        assert!(result.reason.contains("confirm="));
        assert!(result.reason.contains("reward="));
        assert!(result.reason.contains("frame=200x200"));
    }

    #[test]
    fn one_failing_required_gate_fails_the_sign() {
        let frame = patterned(200, 200, 1);
        let other = patterned(200, 200, 99);
        let detector = SignDetector::new(
            "end",
            vec![
                gate_from_frame("confirm", &frame, NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9, true),
                // Template sampled from an unrelated frame: scores low even
                // though the first gate is a perfect match.
                gate_from_frame("reward", &other, NormalizedRect::new(0.6, 0.1, 0.2, 0.2), 0.9, true),
            ],
        );

        let result = detector.detect(&frame);
        assert!(!result.hit);
        assert!(result.reason.starts_with("reward<"), "reason: {}", result.reason);
        // The passing gate's score is carried for observability.
        assert!(result.reason.contains("confirm="), "reason: {}", result.reason);
    }

    #[test]
    fn required_gate_failure_short_circuits() {
        let frame = patterned(200, 200, 1);
        let other = patterned(200, 200, 99);
        let detector = SignDetector::new(
            "end",
            vec![
                gate_from_frame("confirm", &other, NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9, true),
                gate_from_frame("reward", &frame, NormalizedRect::new(0.6, 0.1, 0.2, 0.2), 0.9, true),
            ],
        );

        let result = detector.detect(&frame);
        assert!(!result.hit);
        // Later gates are not evaluated, so their scores never appear.
        assert!(!result.reason.contains("reward="), "reason: {}", result.reason);
    }

    #[test]
    fn optional_gate_below_threshold_does_not_gate() {
        let frame = patterned(200, 200, 1);
        let other = patterned(200, 200, 99);
        let detector = SignDetector::new(
            "league_news",
            vec![
                gate_from_frame("title", &frame, NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9, true),
                gate_from_frame("next", &other, NormalizedRect::new(0.6, 0.6, 0.2, 0.2), 0.9, false),
            ],
        );

        let result = detector.detect(&frame);
        assert!(result.hit, "optional gate must not gate: {}", result.reason);
        assert!(result.reason.contains("next="), "reason: {}", result.reason);
    }

    #[test]
    fn oversized_template_forces_a_miss() {
        let frame = patterned(200, 200, 1);
        let big = patterned(120, 120, 1);
        let detector = SignDetector::new(
            "end",
            vec![GateSpec {
                name: "confirm".to_string(),
                rect: NormalizedRect::new(0.1, 0.1, 0.2, 0.2),
                template: Template::new("confirm", big),
                threshold: 0.9,
                required: true,
            }],
        );

        let result = detector.detect(&frame);
        assert!(!result.hit);
        assert!(result.reason.contains("confirm<-1.000>"), "reason: {}", result.reason);
    }

    #[test]
    fn empty_frame_is_a_miss() {
        let frame = patterned(200, 200, 1);
        let detector = SignDetector::new(
            "end",
            vec![gate_from_frame("confirm", &frame, NormalizedRect::new(0.1, 0.1, 0.2, 0.2), 0.9, true)],
        );

        let empty = GrayImage::new(0, 0);
        let result = detector.detect(&empty);
        assert!(!result.hit);
        assert_eq!(result.reason, "frame empty");
    }
}
