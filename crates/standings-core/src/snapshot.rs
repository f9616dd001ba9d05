// Snapshot model: one scoreboard reading as produced by the extractor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Hero name shown when the extractor could not identify a unit.
pub const UNKNOWN_HERO: &str = "unknown";

/// Star icons are capped at this many regardless of the reported rank.
pub const MAX_DISPLAYED_STARS: u32 = 3;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid data format: missing `players`")]
    Malformed,

    #[error("failed to parse snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Field selectors
// ---------------------------------------------------------------------------

/// Integer stats that are diffed value-by-value and carried forward when a
/// tick reports them as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    Gold,
    Health,
    Level,
}

impl StatField {
    pub const ALL: [StatField; 3] = [StatField::Gold, StatField::Health, StatField::Level];
}

/// Unit-list columns, compared structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitColumn {
    Crew,
    Bench,
}

impl UnitColumn {
    pub const ALL: [UnitColumn; 2] = [UnitColumn::Crew, UnitColumn::Bench];
}

// ---------------------------------------------------------------------------
// Snapshot document
// ---------------------------------------------------------------------------

/// A single unit on a player's crew or bench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub hero_name: Option<String>,
    #[serde(default)]
    pub star_level: Option<u32>,
}

impl Unit {
    /// Hero identifier, falling back to [`UNKNOWN_HERO`].
    pub fn hero(&self) -> &str {
        match self.hero_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_HERO,
        }
    }

    /// Number of star icons to draw (rank clamped to [`MAX_DISPLAYED_STARS`]).
    pub fn displayed_stars(&self) -> u32 {
        self.star_level.unwrap_or(0).min(MAX_DISPLAYED_STARS)
    }
}

/// One row of the scoreboard.
///
/// `row_number` is stable for the whole session and is the reconciliation
/// key. Every other field may be `None` when the extractor had no reading
/// this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub row_number: u32,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub gold: Option<i64>,
    #[serde(default)]
    pub health: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub wins: Option<i64>,
    #[serde(default)]
    pub losses: Option<i64>,
    #[serde(default)]
    pub networth: Option<i64>,
    #[serde(default)]
    pub crew: Option<Vec<Unit>>,
    #[serde(default)]
    pub bench: Option<Vec<Unit>>,
}

impl Player {
    /// Display name, or "Unknown" when the name was not read.
    pub fn display_name(&self) -> &str {
        match self.player_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown",
        }
    }

    pub fn stat(&self, field: StatField) -> Option<i64> {
        match field {
            StatField::Gold => self.gold,
            StatField::Health => self.health,
            StatField::Level => self.level,
        }
    }

    pub fn set_stat(&mut self, field: StatField, value: Option<i64>) {
        match field {
            StatField::Gold => self.gold = value,
            StatField::Health => self.health = value,
            StatField::Level => self.level = value,
        }
    }

    pub fn units(&self, column: UnitColumn) -> Option<&Vec<Unit>> {
        match column {
            UnitColumn::Crew => self.crew.as_ref(),
            UnitColumn::Bench => self.bench.as_ref(),
        }
    }

    /// Win/loss differential, or `None` unless both sides were read and the
    /// difference fits in an `i64`.
    pub fn record(&self) -> Option<i64> {
        match (self.wins, self.losses) {
            (Some(wins), Some(losses)) => wins.checked_sub(losses),
            _ => None,
        }
    }
}

/// Aggregate unit counts reported by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    #[serde(default)]
    pub total_crew_units: Option<u32>,
    #[serde(default)]
    pub total_bench_units: Option<u32>,
    #[serde(default)]
    pub players_with_names: Option<u32>,
    #[serde(default)]
    pub players_with_health: Option<u32>,
    #[serde(default)]
    pub players_with_record: Option<u32>,
    #[serde(default)]
    pub players_with_networth: Option<u32>,
}

/// Summary block that accompanies a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub total_players: Option<u32>,
    /// Extraction duration in seconds.
    #[serde(default)]
    pub extraction_time: Option<f64>,
    #[serde(default)]
    pub extraction_summary: Option<ExtractionSummary>,
    #[serde(default)]
    pub headers_found: Option<Vec<String>>,
    #[serde(default)]
    pub extracted_at: Option<String>,
}

/// One complete scoreboard reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Players in received order (not necessarily display order).
    pub players: Vec<Player>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Snapshot {
    /// Parse a snapshot document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build a snapshot from an already-parsed JSON value.
    ///
    /// A missing or null `players` key is reported as
    /// [`SnapshotError::Malformed`] rather than a generic parse error so the
    /// caller can surface it distinctly.
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value.get("players") {
            None | Some(Value::Null) => return Err(SnapshotError::Malformed),
            Some(_) => {}
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Sequence of row numbers in received order.
    pub fn row_order(&self) -> impl Iterator<Item = u32> + '_ {
        self.players.iter().map(|p| p.row_number)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
