// Live standings viewer entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Create mpsc channels
// 4. Spawn the snapshot poller (when enabled)
// 5. Queue a file load if one was named on the command line
// 6. Spawn the app loop
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use standings_app::app::{self, AppContext};
use standings_app::config;
use standings_app::protocol::UserCommand;
use standings_app::source::{self, HttpSource};
use standings_core::ledger::SystemClock;
use standings_tui::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Standings viewer starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: poll {} every {}ms (enabled={}), ledger ttl {}ms",
        config.poll.url, config.poll.interval_ms, config.poll.enabled, config.ledger.ttl_ms
    );

    let (source_tx, source_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let poller_handle = if config.poll.enabled {
        let http = HttpSource::new(config.poll.url.clone());
        let interval = config.poll_interval();
        Some(tokio::spawn(source::run_poller(http, interval, source_tx)))
    } else {
        info!("Polling disabled");
        drop(source_tx);
        None
    };

    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        info!("Opening {} from command line", path.display());
        cmd_tx
            .send(UserCommand::LoadFile(path))
            .await
            .context("app command channel closed before startup")?;
    }

    let ctx = AppContext::new(config, Arc::new(SystemClock));
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(source_rx, cmd_rx, ui_tx, ctx).await {
            error!("Application loop error: {}", e);
        }
    });

    // Blocks until the user quits.
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    // The poller loops until its channel closes; don't wait on an in-flight
    // request.
    if let Some(handle) = poller_handle {
        handle.abort();
    }

    info!("Standings viewer shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("standings.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("standings=info,standings_tui=info,standings_app=info,standings_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
