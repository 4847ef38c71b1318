//! Frame capture collaborator.
//!
//! The actual screen grab is owned by the hosting environment; the loop only
//! depends on this trait. `None` means the frame was unavailable this
//! iteration and detection work is skipped. Implementations must not fail
//! loudly: an unavailable screen is an operational condition, not an error.

use image::RgbaImage;
use std::collections::VecDeque;
use tracing::warn;

pub trait FrameSource: Send {
    /// Grab one frame, or `None` when no frame is available.
    fn capture_frame(&mut self) -> Option<RgbaImage>;
}

/// Source that never produces a frame. Stands in for the platform capture
/// backend in dry-run mode and wherever no backend is compiled in.
pub struct StubSource;

impl FrameSource for StubSource {
    fn capture_frame(&mut self) -> Option<RgbaImage> {
        None
    }
}

/// Fixed queue of prepared frames. Test fixture: each call pops the next
/// entry, and an exhausted queue behaves like an unavailable screen.
pub struct ScriptedSource {
    frames: VecDeque<Option<RgbaImage>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Option<RgbaImage>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn capture_frame(&mut self) -> Option<RgbaImage> {
        self.frames.pop_front().flatten()
    }
}

/// Create the frame source for the selected mode.
pub fn create_frame_source(dry_run: bool) -> Box<dyn FrameSource> {
    if !dry_run {
        // Platform grab backends hook in here; the daemon itself only ships
        // the stub, so a plain run observes an always-empty screen.
        warn!("no capture backend compiled in; frames will be unavailable");
    }
    Box::new(StubSource)
}
