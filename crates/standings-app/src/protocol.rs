// Message types passed between the snapshot sources, the app loop, and the TUI.

use std::path::PathBuf;

use tokio::sync::oneshot;

use standings_core::ledger::ChangeEvent;
use standings_core::reconcile::PatchInstruction;
use standings_core::snapshot::{Metadata, Player, Snapshot};
use standings_core::sort::{SortField, SortState};

/// Input to the app loop from a snapshot source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A parsed snapshot. The sender waits on `ack` before scheduling its
    /// next fetch, so updates never overlap.
    Snapshot {
        snapshot: Box<Snapshot>,
        ack: oneshot::Sender<()>,
    },
    /// The source produced a document that could not be used.
    Rejected { reason: String },
}

/// Everything the TUI needs for a full table rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct FullRender {
    /// Players in display order.
    pub players: Vec<Player>,
    pub sort: SortState,
}

/// Update pushed from the app loop to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    FullRender(Box<FullRender>),
    Patch(Vec<PatchInstruction>),
    /// Current visible change events for one player, most recent first.
    ChangeBar {
        player_id: u32,
        events: Vec<ChangeEvent>,
    },
    Metadata(Box<Metadata>),
    Error(String),
    ClearError,
    FileStatus {
        name: String,
        status: String,
    },
    Loading(bool),
}

/// Command sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    SortBy(SortField),
    LoadFile(PathBuf),
    Quit,
}
