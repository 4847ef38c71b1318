use anyhow::Result;
use clap::Parser;
use image::{GrayImage, Luma};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

use seasonwatch::capture::create_frame_source;
use seasonwatch::config::WatchConfig;
use seasonwatch::notify::{create_transport, Notifier};
use seasonwatch::watcher::{load_detectors, Watcher};
use seasonwatch_cv::{GateSpec, SignConfig, SignDetector, Template};

#[derive(Parser, Debug)]
#[command(name = "seasonwatch")]
#[command(about = "Watches captured game frames for end/league-news signs and pushes notifications")]
struct Args {
    /// Directory holding the grayscale reference templates
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Dry-run mode: stub capture, placeholder templates, notifications only logged
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    info!("seasonwatch v{} starting", env!("CARGO_PKG_VERSION"));

    let config = WatchConfig::default();
    if args.dry_run {
        warn!("dry-run mode - capture and notifications are stubbed");
    }

    // Everything constructed here is fatal on failure; nothing after the
    // loop starts may bring the process down.
    let transport = create_transport(&config.notify, args.dry_run)?;
    let notifier = Notifier::new(&config.notify, transport);
    let source = create_frame_source(args.dry_run);

    let (end_detector, league_detector) = if args.dry_run {
        (
            placeholder_detector(&config.end_sign),
            placeholder_detector(&config.league_news),
        )
    } else {
        load_detectors(&config, &args.assets)?
    };
    info!(
        "detectors ready: {} / {}",
        end_detector.name(),
        league_detector.name()
    );

    let watcher = Watcher::new(config, source, notifier, end_detector, league_detector);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker = tokio::spawn(watcher.run(shutdown_rx));

    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("failed to wait for shutdown signal: {e}"),
    }

    // Cooperative stop: the worker observes this at its next sleep boundary.
    let _ = shutdown_tx.send(true);

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, worker).await {
        Ok(_) => info!("watch worker stopped"),
        Err(_) => warn!("timed out waiting for the watch worker"),
    }

    info!("seasonwatch exited");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}

/// Detector over synthetic templates, so dry-run works without asset files.
/// The stub capture never yields a frame, so these only exercise wiring.
fn placeholder_detector(config: &SignConfig) -> SignDetector {
    let gates = config
        .gates
        .iter()
        .map(|gate| GateSpec {
            name: gate.name.clone(),
            rect: gate.rect,
            template: Template::new(gate.name.clone(), checkerboard(8, 8)),
            threshold: gate.threshold,
            required: gate.required,
        })
        .collect();
    SignDetector::new(config.name.clone(), gates)
}

fn checkerboard(w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
