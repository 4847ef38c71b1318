//! Composite AND-gated sign detection.

pub mod config;
pub mod detector;

pub use config::{GateConfig, SignConfig};
pub use detector::{Detection, GateSpec, SignDetector};
