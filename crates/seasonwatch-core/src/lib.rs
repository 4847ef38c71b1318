//! Seasonwatch session core
//!
//! Pure watch-session logic: consecutive-hit debouncing, the watch state
//! machine and per-cycle session bookkeeping. No I/O of any kind; the watch
//! loop owns and drives everything here from a single worker.

pub mod debounce;
pub mod state;

pub use debounce::Debouncer;
pub use state::{StateMachine, WatchSession, WatchState};
