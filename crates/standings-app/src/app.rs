// Application state and orchestration logic.
//
// The event loop owns the reconciler, the change ledger, and the sort state.
// It consumes snapshots from the poller, commands from the TUI, and the
// ledger's own expiry deadlines, and pushes UI updates to the TUI render loop.
// Everything that mutates view-related state runs on this one task.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use standings_core::ledger::{ChangeLedger, Clock};
use standings_core::reconcile::{ReconcileOutcome, Reconciler, RenderMode};
use standings_core::snapshot::Snapshot;
use standings_core::sort::{SortField, SortState};

use crate::config::Config;
use crate::protocol::{FullRender, SourceEvent, UiUpdate, UserCommand};
use crate::source::{display_name, FileSource, SnapshotSource};

/// File status shown after a successful bootstrap load.
pub const AUTO_LOADED: &str = "Auto-loaded";
pub const FILE_LOADING: &str = "Loading...";
pub const FILE_LOADED: &str = "Loaded successfully";
pub const FILE_FAILED: &str = "Error loading file";

// ---------------------------------------------------------------------------
// AppContext
// ---------------------------------------------------------------------------

/// All state owned by the app loop.
pub struct AppContext {
    pub config: Config,
    pub reconciler: Reconciler,
    pub ledger: ChangeLedger,
    pub sort: SortState,
}

impl AppContext {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let ledger = ChangeLedger::with_limits(clock, config.ledger_ttl(), config.ledger.capacity);
        AppContext {
            config,
            reconciler: Reconciler::new(),
            ledger,
            sort: SortState::default(),
        }
    }

    /// Reconcile a new snapshot and produce the UI updates for it.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Vec<UiUpdate> {
        let outcome = self.reconciler.reconcile(snapshot, &mut self.ledger);

        let mut updates = vec![UiUpdate::ClearError];
        match outcome.mode {
            RenderMode::Full => {
                updates.extend(self.full_render());
            }
            RenderMode::Patch => {
                updates.extend(self.patch_updates(outcome));
            }
        }
        if let Some(metadata) = &snapshot.metadata {
            updates.push(UiUpdate::Metadata(Box::new(metadata.clone())));
        }
        updates
    }

    /// Change the sort column and re-render if there is anything to show.
    pub fn select_sort(&mut self, field: SortField) -> Vec<UiUpdate> {
        self.sort.select(field);
        info!(
            "Sort changed to {:?} {:?}",
            self.sort.field, self.sort.direction
        );
        self.full_render()
    }

    /// Rows of the retained snapshot in display order, followed by the
    /// change bars of every player that still has visible events.
    pub fn full_render(&self) -> Vec<UiUpdate> {
        let Some(retained) = self.reconciler.retained() else {
            return Vec::new();
        };

        let mut updates = vec![UiUpdate::FullRender(Box::new(FullRender {
            players: self.sort.apply(&retained.players),
            sort: self.sort,
        }))];

        let now = self.ledger.now();
        for player_id in self.ledger.players() {
            let events = self.ledger.list_active(player_id, now);
            if !events.is_empty() {
                updates.push(UiUpdate::ChangeBar { player_id, events });
            }
        }
        updates
    }

    fn patch_updates(&self, outcome: ReconcileOutcome) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        if !outcome.patches.is_empty() {
            updates.push(UiUpdate::Patch(outcome.patches));
        }

        let touched: BTreeSet<u32> = outcome.events.iter().map(|e| e.player_id).collect();
        let now = self.ledger.now();
        for player_id in touched {
            updates.push(UiUpdate::ChangeBar {
                player_id,
                events: self.ledger.list_active(player_id, now),
            });
        }
        updates
    }

    /// Time until the earliest change event expires.
    pub fn next_expiry_delay(&self) -> Option<Duration> {
        let deadline = self.ledger.next_expiry()?;
        let remaining = deadline - self.ledger.now();
        Some(remaining.to_std().unwrap_or(Duration::ZERO))
    }

    /// Drop expired change events and re-render the affected change bars.
    pub fn expire_change_events(&mut self) -> Vec<UiUpdate> {
        let now = self.ledger.now();
        self.ledger
            .prune_expired(now)
            .into_iter()
            .map(|player_id| UiUpdate::ChangeBar {
                player_id,
                events: self.ledger.list_active(player_id, now),
            })
            .collect()
    }

    /// One-time best-effort load of the bootstrap snapshot. Any failure is
    /// silently skipped.
    pub async fn bootstrap(&mut self) -> Vec<UiUpdate> {
        let source = FileSource::new(self.config.bootstrap.path.clone());
        match source.fetch().await {
            Ok(snapshot) => {
                info!("Bootstrapped from {}", source.describe());
                let mut updates = self.apply_snapshot(&snapshot);
                updates.push(UiUpdate::FileStatus {
                    name: display_name(source.path()),
                    status: AUTO_LOADED.to_string(),
                });
                updates
            }
            Err(e) => {
                debug!("No bootstrap snapshot: {}", e);
                Vec::new()
            }
        }
    }

    /// Load a snapshot from a user-chosen file, reporting progress as it goes.
    pub async fn load_file(&mut self, path: &Path, ui_tx: &mpsc::Sender<UiUpdate>) {
        let name = display_name(path);
        info!("Loading snapshot file {}", path.display());
        let _ = ui_tx.send(UiUpdate::Loading(true)).await;
        let _ = ui_tx
            .send(UiUpdate::FileStatus {
                name: name.clone(),
                status: FILE_LOADING.to_string(),
            })
            .await;

        let source = FileSource::new(path);
        match source.fetch().await {
            Ok(snapshot) => {
                send_all(ui_tx, self.apply_snapshot(&snapshot)).await;
                let _ = ui_tx
                    .send(UiUpdate::FileStatus {
                        name,
                        status: FILE_LOADED.to_string(),
                    })
                    .await;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                let _ = ui_tx
                    .send(UiUpdate::Error(format!("Error loading file: {e}")))
                    .await;
                let _ = ui_tx
                    .send(UiUpdate::FileStatus {
                        name,
                        status: FILE_FAILED.to_string(),
                    })
                    .await;
            }
        }

        let _ = ui_tx.send(UiUpdate::Loading(false)).await;
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens using `tokio::select!` on:
/// 1. Snapshots from the poller
/// 2. User commands from the TUI
/// 3. The ledger's next expiry deadline
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut source_rx: mpsc::Receiver<SourceEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut ctx: AppContext,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    send_all(&ui_tx, ctx.bootstrap().await).await;

    // When the poller goes away (or was never started) stop selecting on its
    // channel so the loop does not spin on a closed receiver.
    let mut source_open = true;

    loop {
        let expiry = ctx.next_expiry_delay();

        tokio::select! {
            // --- Polled snapshots ---
            event = source_rx.recv(), if source_open => {
                match event {
                    Some(SourceEvent::Snapshot { snapshot, ack }) => {
                        send_all(&ui_tx, ctx.apply_snapshot(&snapshot)).await;
                        let _ = ack.send(());
                    }
                    Some(SourceEvent::Rejected { reason }) => {
                        let _ = ui_tx.send(UiUpdate::Error(reason)).await;
                    }
                    None => {
                        info!("Snapshot source closed");
                        source_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut ctx, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Change event expiry ---
            _ = tokio::time::sleep(expiry.unwrap_or_default()), if expiry.is_some() => {
                send_all(&ui_tx, ctx.expire_change_events()).await;
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(
    ctx: &mut AppContext,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::SortBy(field) => {
            send_all(ui_tx, ctx.select_sort(field)).await;
        }
        UserCommand::LoadFile(path) => {
            ctx.load_file(&path, ui_tx).await;
        }
        UserCommand::Quit => {}
    }
}

async fn send_all(ui_tx: &mpsc::Sender<UiUpdate>, updates: Vec<UiUpdate>) {
    for update in updates {
        if ui_tx.send(update).await.is_err() {
            debug!("UI channel closed, dropping update");
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
