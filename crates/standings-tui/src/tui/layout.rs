// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Message Line (1 row)                              |
// +--------------------------------------------------+
// | Metadata (3 rows)                                 |
// +---------------------+----------------------------+
// | Prefix Table (fixed) | Detail Table (fill)        |
// +---------------------+----------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the pinned prefix table: place, change bar, name, level, gold.
pub const PREFIX_WIDTH: u16 = 62;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Title, loaded file, loading indicator.
    pub status_bar: Rect,
    /// Error banner when one is active.
    pub message: Rect,
    /// Snapshot summary.
    pub metadata: Rect,
    /// Pinned left half of the scoreboard.
    pub prefix: Rect,
    /// Right half of the scoreboard.
    pub detail: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // message line
            Constraint::Length(3), // metadata
            Constraint::Min(5),    // scoreboard
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let board = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PREFIX_WIDTH), Constraint::Min(20)])
        .split(vertical[3]);

    AppLayout {
        status_bar: vertical[0],
        message: vertical[1],
        metadata: vertical[2],
        prefix: board[0],
        detail: board[1],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
