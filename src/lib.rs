//! seasonwatch daemon internals: compiled-in configuration, the capture and
//! notification collaborators, and the watch loop that ties them to the
//! detection and session crates.

pub mod capture;
pub mod config;
pub mod notify;
pub mod watcher;
