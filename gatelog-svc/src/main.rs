//! gatelog-svc - Main entry point
//!
//! Attendance logger: polls a token reader, resolves each presented token
//! against the identity store, appends to the UTF-8 CSV attendance log,
//! and broadcasts scan events to web clients over SSE.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gatelog_common::config::{ClockKind, Config};
use gatelog_common::events::EventBus;
use gatelog_common::{Clock, UptimeClock, WallClock};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatelog_svc::attendance::AttendanceLog;
use gatelog_svc::scanner::{self, ConsoleFeedback, LineReader};
use gatelog_svc::store::IdentityStore;
use gatelog_svc::{build_router, AppState};

/// Command-line arguments for gatelog-svc
#[derive(Parser, Debug)]
#[command(name = "gatelog-svc")]
#[command(about = "Token-scan attendance service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GATELOG_PORT")]
    port: Option<u16>,

    /// Data folder holding identity records and the attendance log
    #[arg(short, long, env = "GATELOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file path (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatelog_svc=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gatelog-svc v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::resolve(args.data_dir, args.port, args.config);
    info!("Data folder: {}", config.data_dir.display());

    config
        .ensure_directories()
        .context("Failed to create data directories")?;

    // Identity store: full reload at startup, files are the source of truth
    let store = Arc::new(IdentityStore::new(config.users_dir()));
    let loaded = store.load().context("Failed to load identity records")?;
    info!("Loaded {} identity record(s)", loaded);

    let log = Arc::new(AttendanceLog::new(config.attendance_csv()));
    log.ensure_initialized()
        .context("Failed to initialize attendance log")?;

    let events = EventBus::new(256);

    let clock: Arc<dyn Clock> = match config.clock {
        ClockKind::Uptime => Arc::new(UptimeClock::new()),
        ClockKind::Wall => Arc::new(WallClock),
    };

    let state = AppState::new(
        store,
        log,
        events,
        clock,
        config.data_dir.clone(),
    );

    // Spawn the scan loop when a reader is configured; without one the
    // service still runs the web UI (identities can be managed ahead of
    // wiring up a reader).
    let scan_shutdown = Arc::new(AtomicBool::new(false));
    match config.reader_path.clone() {
        Some(path) => {
            info!("Token reader: {}", path.display());
            let loop_state = state.clone();
            let loop_shutdown = scan_shutdown.clone();
            let poll = Duration::from_millis(config.poll_interval_ms);
            let debounce = Duration::from_millis(config.debounce_ms);
            // Opening a FIFO blocks until the reader side has a writer, so
            // the open happens on the blocking task, not before bind.
            tokio::task::spawn_blocking(move || match LineReader::open(&path) {
                Ok(reader) => {
                    scanner::run_scan_loop(
                        loop_state,
                        Box::new(reader),
                        Box::new(ConsoleFeedback),
                        poll,
                        debounce,
                        loop_shutdown,
                    );
                }
                Err(e) => {
                    error!("Failed to open token reader at {}: {}", path.display(), e);
                }
            });
        }
        None => {
            warn!("No reader_path configured; running web-only");
        }
    }

    let app = build_router(state);

    // Preferred bind is all interfaces; if that fails (interface down,
    // port policy), fall back to loopback on the same port so the local
    // UI keeps working.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("Failed to bind {}: {} - falling back to loopback", addr, e);
            let fallback = SocketAddr::from(([127, 0, 0, 1], config.port));
            tokio::net::TcpListener::bind(fallback)
                .await
                .with_context(|| format!("Failed to bind to {}", fallback))?
        }
    };
    info!("gatelog-svc listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    scan_shutdown.store(true, Ordering::Relaxed);
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
