// Sort selector: display ordering of players, independent of received order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::snapshot::Player;

/// Key used for players whose record cannot be computed.
const UNKNOWN_RECORD: i64 = -999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Position,
    Health,
    Record,
    Networth,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Position,
        SortField::Health,
        SortField::Record,
        SortField::Networth,
    ];

    /// Column header label.
    pub fn label(self) -> &'static str {
        match self {
            SortField::Position => "#",
            SortField::Health => "HP",
            SortField::Record => "Record",
            SortField::Networth => "Net Worth",
        }
    }

    /// Numeric key for `player`, with a fixed substitute for unknown values.
    pub fn key(self, player: &Player) -> i64 {
        match self {
            SortField::Position => player.position.unwrap_or(0),
            SortField::Health => player.health.unwrap_or(-1),
            SortField::Record => player.record().unwrap_or(UNKNOWN_RECORD),
            SortField::Networth => player.networth.unwrap_or(-1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// The active sort. Starts at position, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    /// Choose a sort column. Re-selecting the active column flips the
    /// direction; any other column starts out descending.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }

    pub fn apply(&self, players: &[Player]) -> Vec<Player> {
        sort_players(players, self.field, self.direction)
    }
}

/// Return a sorted copy of `players`. Ties keep their received order.
pub fn sort_players(players: &[Player], field: SortField, direction: SortDirection) -> Vec<Player> {
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| compare(a, b, field, direction));
    sorted
}

fn compare(a: &Player, b: &Player, field: SortField, direction: SortDirection) -> Ordering {
    let ordering = field.key(a).cmp(&field.key(b));
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
