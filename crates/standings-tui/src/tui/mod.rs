// TUI scoreboard: view state, layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the rendered rows. The app loop pushes
// `UiUpdate` messages over an mpsc channel; the TUI applies them to
// `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod rows;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::debug;

use standings_app::protocol::{UiUpdate, UserCommand};
use standings_core::ledger::ChangeEvent;
use standings_core::snapshot::Metadata;
use standings_core::sort::SortState;

use layout::{build_layout, AppLayout};
use rows::{apply_patch, build_rows, DetailRow, PrefixRow};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Name and load status of the most recent snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub status: String,
}

/// All data the TUI needs to render a frame.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Pinned columns, in display order.
    pub prefix_rows: Vec<PrefixRow>,
    /// Scrollable columns, parallel to `prefix_rows`.
    pub detail_rows: Vec<DetailRow>,
    /// Visible change events per player id, most recent first.
    pub change_bars: HashMap<u32, Vec<ChangeEvent>>,
    pub sort: SortState,
    pub metadata: Option<Metadata>,
    /// Error banner text; dismissed with Esc or cleared by the next good
    /// snapshot.
    pub error: Option<String>,
    pub file: Option<FileInfo>,
    pub loading: bool,
    /// First visible row.
    pub scroll_offset: usize,

    // Modal state
    pub path_input_mode: bool,
    pub path_input: String,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.prefix_rows.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }
}

/// Apply a UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::FullRender(render) => {
            let (prefix, detail) = build_rows(&render.players);
            state.prefix_rows = prefix;
            state.detail_rows = detail;
            state.sort = render.sort;
            // The app loop re-sends bars that are still active.
            state.change_bars.clear();
            let max = state.prefix_rows.len().saturating_sub(1);
            state.scroll_offset = state.scroll_offset.min(max);
        }
        UiUpdate::Patch(patches) => {
            for patch in &patches {
                if !apply_patch(&mut state.prefix_rows, &mut state.detail_rows, patch) {
                    debug!("patch for unknown player {}", patch.player_id());
                }
            }
        }
        UiUpdate::ChangeBar { player_id, events } => {
            if events.is_empty() {
                state.change_bars.remove(&player_id);
            } else {
                state.change_bars.insert(player_id, events);
            }
        }
        UiUpdate::Metadata(metadata) => {
            state.metadata = Some(*metadata);
        }
        UiUpdate::Error(message) => {
            state.error = Some(message);
        }
        UiUpdate::ClearError => {
            state.error = None;
        }
        UiUpdate::FileStatus { name, status } => {
            state.file = Some(FileInfo { name, status });
        }
        UiUpdate::Loading(loading) => {
            state.loading = loading;
        }
    }
}

// ---------------------------------------------------------------------------
// Frame rendering
// ---------------------------------------------------------------------------

/// Render the full frame from the current ViewState.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let AppLayout {
        status_bar,
        message,
        metadata,
        prefix,
        detail,
        help_bar,
    } = build_layout(frame.area());

    widgets::status_bar::render(frame, status_bar, state);
    widgets::status_bar::render_message(frame, message, state);
    widgets::metadata::render(frame, metadata, state);
    widgets::scoreboard::render(frame, prefix, detail, state);
    widgets::status_bar::render_help(frame, help_bar, state);

    if state.path_input_mode {
        widgets::prompt::render_path_input(frame, frame.area(), &state.path_input);
    }
    if state.confirm_quit {
        widgets::prompt::render_quit_confirm(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App loop is gone.
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(e.into());
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use standings_app::protocol::FullRender;
    use standings_core::ledger::ChangeKind;
    use standings_core::reconcile::PatchInstruction;
    use standings_core::snapshot::{Player, StatField};
    use standings_core::sort::{SortDirection, SortField};

    fn player(row: u32, gold: i64) -> Player {
        Player {
            row_number: row,
            player_name: Some(format!("P{row}")),
            position: Some(row as i64 + 1),
            gold: Some(gold),
            health: Some(60),
            level: Some(4),
            wins: None,
            losses: None,
            networth: None,
            crew: None,
            bench: None,
        }
    }

    fn full_render(players: Vec<Player>) -> UiUpdate {
        UiUpdate::FullRender(Box::new(FullRender {
            players,
            sort: SortState {
                field: SortField::Health,
                direction: SortDirection::Descending,
            },
        }))
    }

    fn event(player_id: u32) -> ChangeEvent {
        ChangeEvent {
            player_id,
            kind: ChangeKind::Gold,
            delta: 5,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.prefix_rows.is_empty());
        assert!(state.change_bars.is_empty());
        assert_eq!(state.sort, SortState::default());
        assert!(state.error.is_none());
        assert!(state.file.is_none());
        assert!(!state.loading);
        assert!(!state.path_input_mode);
        assert!(!state.confirm_quit);
    }

    #[test]
    fn full_render_rebuilds_rows_and_clears_bars() {
        let mut state = ViewState::default();
        state.change_bars.insert(0, vec![event(0)]);
        state.scroll_offset = 9;

        apply_ui_update(&mut state, full_render(vec![player(1, 3), player(0, 7)]));

        assert_eq!(state.prefix_rows.len(), 2);
        assert_eq!(state.prefix_rows[0].player_id, 1);
        assert_eq!(state.prefix_rows[0].place, 1);
        assert_eq!(state.detail_rows[1].player_id, 0);
        assert_eq!(state.sort.field, SortField::Health);
        assert!(state.change_bars.is_empty());
        assert_eq!(state.scroll_offset, 1);
    }

    #[test]
    fn patch_updates_matching_row() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, full_render(vec![player(0, 7), player(1, 3)]));

        apply_ui_update(
            &mut state,
            UiUpdate::Patch(vec![
                PatchInstruction::SetValue {
                    player_id: 1,
                    field: StatField::Gold,
                    value: 40,
                },
                PatchInstruction::SetValue {
                    player_id: 9,
                    field: StatField::Gold,
                    value: 1,
                },
            ]),
        );

        assert_eq!(state.prefix_rows[0].gold, 7);
        assert_eq!(state.prefix_rows[1].gold, 40);
    }

    #[test]
    fn change_bar_inserts_and_removes() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::ChangeBar {
                player_id: 2,
                events: vec![event(2)],
            },
        );
        assert_eq!(state.change_bars.get(&2).map(Vec::len), Some(1));

        apply_ui_update(
            &mut state,
            UiUpdate::ChangeBar {
                player_id: 2,
                events: Vec::new(),
            },
        );
        assert!(!state.change_bars.contains_key(&2));
    }

    #[test]
    fn status_updates_set_fields() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Loading(true));
        apply_ui_update(&mut state, UiUpdate::Error("Invalid data format".into()));
        apply_ui_update(
            &mut state,
            UiUpdate::FileStatus {
                name: "a.json".into(),
                status: "Loaded".into(),
            },
        );
        apply_ui_update(
            &mut state,
            UiUpdate::Metadata(Box::new(Metadata {
                total_players: Some(8),
                ..Default::default()
            })),
        );
        assert!(state.loading);
        assert_eq!(state.error.as_deref(), Some("Invalid data format"));
        assert_eq!(
            state.file,
            Some(FileInfo {
                name: "a.json".into(),
                status: "Loaded".into()
            })
        );
        assert_eq!(state.metadata.as_ref().and_then(|m| m.total_players), Some(8));

        apply_ui_update(&mut state, UiUpdate::ClearError);
        assert!(state.error.is_none());
    }

    #[test]
    fn render_frame_does_not_panic() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, full_render(vec![player(0, 7), player(1, 3)]));
        state.change_bars.insert(1, vec![event(1)]);
        state.confirm_quit = true;

        let backend = ratatui::backend::TestBackend::new(140, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }

    #[test]
    fn render_frame_on_tiny_terminal() {
        let state = ViewState::default();
        let backend = ratatui::backend::TestBackend::new(20, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }
}
