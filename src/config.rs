//! Compiled-in watch configuration.
//!
//! Nothing here is runtime-editable: the defaults carry the tuned values the
//! product ships with. Thresholds and rectangles for the two signs live in
//! the sign presets ([`SignConfig`]), cadence and delivery policy here.

use seasonwatch_cv::SignConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Screen observation cadence (ms).
    pub poll_interval_ms: u64,
    /// Consecutive detections required to confirm the end sign.
    pub confirm_count: u32,
    /// Maximum time to sit in WAIT_LEAGUE_NEWS before falling back (ms).
    pub wait_league_news_timeout_ms: u64,
    pub notify: NotifyConfig,
    pub end_sign: SignConfig,
    pub league_news: SignConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Maximum delivery attempts per message. A floor of 2 is applied so
    /// every message gets at least one retry.
    pub max_attempts: u32,
    /// Linear backoff unit between attempts (ms).
    pub backoff_unit_ms: u64,
    /// Per-call transport timeout (ms).
    pub request_timeout_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            confirm_count: 3,
            wait_league_news_timeout_ms: 300_000, // 5 minutes
            notify: NotifyConfig::default(),
            end_sign: SignConfig::end_sign(),
            league_news: SignConfig::league_news(false),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit_ms: 250,
            request_timeout_ms: 10_000,
        }
    }
}
