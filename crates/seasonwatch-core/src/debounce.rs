//! Consecutive-hit debouncing.

/// Converts a stream of per-frame detections into a confirmed signal only
/// after an unbroken run of positives. Any miss discards accumulated
/// progress, so single-frame noise never confirms.
#[derive(Debug)]
pub struct Debouncer {
    confirm_count: u32,
    current: u32,
}

impl Debouncer {
    /// `confirm_count` is the length of the unbroken positive run required
    /// to confirm.
    pub fn new(confirm_count: u32) -> Self {
        Self {
            confirm_count: confirm_count.max(1),
            current: 0,
        }
    }

    /// Feed one detection result; returns true exactly when the run
    /// completes. Confirming resets the counter for the next run.
    pub fn check(&mut self, detected: bool) -> bool {
        if detected {
            self.current += 1;
            if self.current >= self.confirm_count {
                self.reset();
                return true;
            }
        } else {
            self.reset();
        }
        false
    }

    /// Discard accumulated detections, e.g. on a state transition.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirms_only_after_unbroken_run() {
        let mut debounce = Debouncer::new(3);
        let inputs = [true, true, false, true, true, true];
        let outputs: Vec<bool> = inputs.iter().map(|&hit| debounce.check(hit)).collect();

        assert_eq!(outputs, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn confirming_starts_a_fresh_run() {
        let mut debounce = Debouncer::new(3);
        for _ in 0..2 {
            assert!(!debounce.check(true));
            assert!(!debounce.check(true));
            assert!(debounce.check(true));
        }
    }

    #[test]
    fn reset_discards_progress() {
        let mut debounce = Debouncer::new(3);
        assert!(!debounce.check(true));
        assert!(!debounce.check(true));
        debounce.reset();
        assert!(!debounce.check(true));
        assert!(!debounce.check(true));
        assert!(debounce.check(true));
    }

    #[test]
    fn count_has_a_floor_of_one() {
        let mut debounce = Debouncer::new(0);
        assert!(debounce.check(true));
    }
}
