//! Watch state machine and per-cycle session bookkeeping.

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// The three session states. Idle performs no capture or detection work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WatchState {
    Idle,
    WatchingEnd,
    WaitLeagueNews,
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatchState::Idle => "IDLE",
            WatchState::WatchingEnd => "WATCHING_END",
            WatchState::WaitLeagueNews => "WAIT_LEAGUE_NEWS",
        };
        f.write_str(name)
    }
}

/// Guarded transitions over [`WatchState`].
///
/// Every method applies one trigger and reports whether the transition was
/// legal from the current state; illegal triggers leave the state untouched.
/// Idle is only ever left via `start`, and only `stop` returns to Idle.
#[derive(Debug)]
pub struct StateMachine {
    state: WatchState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Start watching (IDLE -> WATCHING_END).
    pub fn start(&mut self) -> bool {
        if self.state != WatchState::Idle {
            return false;
        }
        self.state = WatchState::WatchingEnd;
        true
    }

    /// Stop watching (any active state -> IDLE).
    pub fn stop(&mut self) -> bool {
        if self.state == WatchState::Idle {
            return false;
        }
        self.state = WatchState::Idle;
        true
    }

    /// End sign confirmed (WATCHING_END -> WAIT_LEAGUE_NEWS).
    pub fn confirm_end(&mut self) -> bool {
        if self.state != WatchState::WatchingEnd {
            return false;
        }
        self.state = WatchState::WaitLeagueNews;
        true
    }

    /// League sign confirmed or wait timed out
    /// (WAIT_LEAGUE_NEWS -> WATCHING_END).
    pub fn back_to_watching(&mut self) -> bool {
        if self.state != WatchState::WaitLeagueNews {
            return false;
        }
        self.state = WatchState::WatchingEnd;
        true
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable session owned by the watch loop: the state machine, the
/// WAIT_LEAGUE_NEWS entry timestamp and the per-cycle notification flags.
/// Never shared across workers, so no locking applies.
#[derive(Debug, Default)]
pub struct WatchSession {
    machine: StateMachine,
    wait_entered_at: Option<Instant>,
    pub sent_end_detected: bool,
    pub sent_league_detected: bool,
}

impl WatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatchState {
        self.machine.state()
    }

    pub fn start(&mut self) -> bool {
        self.machine.start()
    }

    /// Stop clears the wait timestamp along with the state.
    pub fn stop(&mut self) -> bool {
        if !self.machine.stop() {
            return false;
        }
        self.wait_entered_at = None;
        true
    }

    /// Apply the EndConfirmed trigger, recording the wait entry timestamp.
    pub fn enter_wait(&mut self) -> bool {
        if !self.machine.confirm_end() {
            return false;
        }
        self.wait_entered_at = Some(Instant::now());
        true
    }

    /// True when the session has sat in WAIT_LEAGUE_NEWS at least `timeout`.
    pub fn wait_timed_out(&self, timeout: Duration) -> bool {
        match (self.state(), self.wait_entered_at) {
            (WatchState::WaitLeagueNews, Some(entered)) => entered.elapsed() >= timeout,
            _ => false,
        }
    }

    /// Apply LeagueConfirmed or Timeout: back to WATCHING_END, timestamp
    /// cleared, per-cycle notification flags cleared so the next cycle can
    /// notify again.
    pub fn leave_wait(&mut self) -> bool {
        if !self.machine.back_to_watching() {
            return false;
        }
        self.wait_entered_at = None;
        self.sent_end_detected = false;
        self.sent_league_detected = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_only_leaves_idle() {
        let mut machine = StateMachine::new();
        assert!(machine.start());
        assert_eq!(machine.state(), WatchState::WatchingEnd);
        assert!(!machine.start());
        assert_eq!(machine.state(), WatchState::WatchingEnd);
    }

    #[test]
    fn stop_returns_to_idle_from_any_active_state() {
        let mut machine = StateMachine::new();
        machine.start();
        assert!(machine.stop());
        assert_eq!(machine.state(), WatchState::Idle);

        machine.start();
        machine.confirm_end();
        assert!(machine.stop());
        assert_eq!(machine.state(), WatchState::Idle);

        assert!(!machine.stop());
    }

    #[test]
    fn end_confirmation_requires_watching_end() {
        let mut machine = StateMachine::new();
        assert!(!machine.confirm_end());
        machine.start();
        assert!(machine.confirm_end());
        assert_eq!(machine.state(), WatchState::WaitLeagueNews);
        assert!(!machine.confirm_end());
    }

    #[test]
    fn session_timeout_matches_league_confirmation_resets() {
        let mut session = WatchSession::new();
        session.start();
        session.sent_end_detected = true;
        assert!(session.enter_wait());

        // Zero timeout: elapsed immediately.
        assert!(session.wait_timed_out(Duration::ZERO));
        assert!(session.leave_wait());

        assert_eq!(session.state(), WatchState::WatchingEnd);
        assert!(!session.sent_end_detected);
        assert!(!session.sent_league_detected);
        assert!(!session.wait_timed_out(Duration::ZERO));
    }

    #[test]
    fn timeout_never_fires_outside_wait_state() {
        let mut session = WatchSession::new();
        assert!(!session.wait_timed_out(Duration::ZERO));
        session.start();
        assert!(!session.wait_timed_out(Duration::ZERO));
    }

    #[test]
    fn stop_clears_wait_timestamp() {
        let mut session = WatchSession::new();
        session.start();
        session.enter_wait();
        assert!(session.stop());
        assert_eq!(session.state(), WatchState::Idle);

        // Re-entering the cycle starts from a clean wait state.
        session.start();
        assert!(!session.wait_timed_out(Duration::ZERO));
    }
}
