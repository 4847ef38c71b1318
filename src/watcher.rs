//! The watch loop: sleep -> capture -> detect -> debounce -> transition ->
//! notify, on one worker.
//!
//! All mutable session state lives here. Cancellation is cooperative: the
//! shutdown channel is sampled only at the sleep boundary, so an iteration
//! is never interrupted mid-capture or mid-match. Notification sends are
//! awaited inline - a retrying send delays the next poll, trading cadence
//! for delivery.

use crate::capture::FrameSource;
use crate::config::WatchConfig;
use crate::notify::Notifier;
use image::{DynamicImage, GrayImage, RgbaImage};
use seasonwatch_core::{Debouncer, WatchSession, WatchState};
use seasonwatch_cv::{SignDetector, TemplateError, TemplateStore};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

pub const MSG_WATCH_ON: &str = "season watch ON";
pub const MSG_WATCH_OFF: &str = "season watch OFF";
pub const MSG_END_DETECTED: &str = "season match ended";
pub const MSG_LEAGUE_DETECTED: &str = "league news shown - watching for the next match";
pub const MSG_LEAGUE_TIMEOUT: &str = "league news wait timed out - watching for the next match";

/// Minimum spacing between repeated capture/iteration error log lines.
const ERROR_LOG_INTERVAL: Duration = Duration::from_millis(2000);

/// Build both sign detectors from configuration, sharing one template store
/// so identical template files decode once. Any load failure is fatal to
/// startup.
pub fn load_detectors(
    config: &WatchConfig,
    assets_dir: &Path,
) -> Result<(SignDetector, SignDetector), TemplateError> {
    let store = TemplateStore::new();
    let end = SignDetector::from_config(&config.end_sign, &store, assets_dir)?;
    let league = SignDetector::from_config(&config.league_news, &store, assets_dir)?;
    Ok((end, league))
}

pub struct Watcher {
    config: WatchConfig,
    source: Box<dyn FrameSource>,
    notifier: Notifier,
    end_detector: SignDetector,
    league_detector: SignDetector,
    end_debounce: Debouncer,
    session: WatchSession,
    last_capture_warn: Option<Instant>,
    last_iteration_error: Option<Instant>,
}

impl Watcher {
    pub fn new(
        config: WatchConfig,
        source: Box<dyn FrameSource>,
        notifier: Notifier,
        end_detector: SignDetector,
        league_detector: SignDetector,
    ) -> Self {
        let end_debounce = Debouncer::new(config.confirm_count);
        Self {
            config,
            source,
            notifier,
            end_detector,
            league_detector,
            end_debounce,
            session: WatchSession::new(),
            last_capture_warn: None,
            last_iteration_error: None,
        }
    }

    /// Run until the shutdown channel fires. The session auto-starts into
    /// WATCHING_END and announces itself; shutdown announces best-effort.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        self.session.start();
        info!("[state] IDLE -> {} | trigger=start", self.session.state());
        self.notifier.send(MSG_WATCH_ON).await;

        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let wait_timeout = Duration::from_millis(self.config.wait_league_news_timeout_ms);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sleep(poll) => {}
            }

            if let Err(e) = self.tick(wait_timeout).await {
                let now = Instant::now();
                if self
                    .last_iteration_error
                    .is_none_or(|t| now.duration_since(t) >= ERROR_LOG_INTERVAL)
                {
                    self.last_iteration_error = Some(now);
                    error!("watch iteration failed: {e:#}");
                }
            }
        }

        self.session.stop();
        info!("watch loop cancelled; state -> {}", self.session.state());
        self.notifier.send(MSG_WATCH_OFF).await;
    }

    /// One iteration. Errors are contained by the caller; nothing here may
    /// terminate the loop.
    async fn tick(&mut self, wait_timeout: Duration) -> anyhow::Result<()> {
        if self.session.state() == WatchState::Idle {
            return Ok(());
        }

        let Some(frame) = self.capture() else {
            return Ok(());
        };
        let gray = to_gray(frame);

        match self.session.state() {
            WatchState::WatchingEnd => self.watch_end(&gray).await,
            WatchState::WaitLeagueNews => self.watch_league(&gray, wait_timeout).await,
            WatchState::Idle => {}
        }

        Ok(())
    }

    /// Grab one frame, treating empty frames as unavailable. Repeated
    /// failures are logged at most once per [`ERROR_LOG_INTERVAL`].
    fn capture(&mut self) -> Option<RgbaImage> {
        match self.source.capture_frame() {
            Some(frame) if frame.width() > 0 && frame.height() > 0 => Some(frame),
            _ => {
                let now = Instant::now();
                if self
                    .last_capture_warn
                    .is_none_or(|t| now.duration_since(t) >= ERROR_LOG_INTERVAL)
                {
                    self.last_capture_warn = Some(now);
                    warn!("frame unavailable; skipping detection this iteration");
                }
                None
            }
        }
    }

    async fn watch_end(&mut self, gray: &GrayImage) {
        let result = self.end_detector.detect(gray);
        if !self.end_debounce.check(result.hit) {
            return;
        }

        info!("END sign confirmed: {}", result.reason);
        if !self.session.sent_end_detected {
            self.session.sent_end_detected = true;
            self.notifier.send(MSG_END_DETECTED).await;
        }

        let from = self.session.state();
        self.session.enter_wait();
        info!(
            "[state] {} -> {} | trigger=end-confirmed",
            from,
            self.session.state()
        );
    }

    async fn watch_league(&mut self, gray: &GrayImage, wait_timeout: Duration) {
        // Checked before any detection work so a stuck wait never depends on
        // what the screen shows.
        if self.session.wait_timed_out(wait_timeout) {
            error!(
                "WAIT_LEAGUE_NEWS timed out after {}ms; falling back to WATCHING_END",
                wait_timeout.as_millis()
            );
            self.notifier.send(MSG_LEAGUE_TIMEOUT).await;

            let from = self.session.state();
            self.session.leave_wait();
            self.end_debounce.reset();
            info!(
                "[state] {} -> {} | trigger=wait-timeout",
                from,
                self.session.state()
            );
            return;
        }

        let result = self.league_detector.detect(gray);
        // Single-hit confirmation: the league screen stays up for seconds
        // and the wait state already implies a triple-confirmed end sign.
        if !result.hit {
            return;
        }

        info!("LEAGUE_NEWS sign detected: {}", result.reason);
        if !self.session.sent_league_detected {
            self.session.sent_league_detected = true;
            self.notifier.send(MSG_LEAGUE_DETECTED).await;
        }

        let from = self.session.state();
        self.session.leave_wait();
        self.end_debounce.reset();
        info!(
            "[state] {} -> {} | trigger=league-detected",
            from,
            self.session.state()
        );
    }
}

/// Convert a captured frame to the single-channel intensity image shared by
/// every gate evaluated this iteration.
fn to_gray(frame: RgbaImage) -> GrayImage {
    DynamicImage::ImageRgba8(frame).to_luma8()
}
