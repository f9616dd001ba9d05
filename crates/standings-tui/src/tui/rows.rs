// Rendered scoreboard rows and targeted cell replacement.
//
// A full render rebuilds two parallel row sets in display order: the pinned
// prefix (place, name, level, gold) and the scrollable detail (health,
// record, net worth, crew, bench). Patches replace one cell of one row,
// addressed by `player_id` (the snapshot's `row_number`).

use standings_core::reconcile::PatchInstruction;
use standings_core::snapshot::{Player, StatField, Unit, UnitColumn};

/// Shown in place of a value the extractor never read.
pub const MISSING: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRow {
    pub player_id: u32,
    /// 1-based place in the current display order.
    pub place: usize,
    pub name: String,
    pub level: i64,
    pub gold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub player_id: u32,
    pub health: Option<i64>,
    pub record: String,
    pub networth: Option<i64>,
    pub crew: Vec<Unit>,
    pub bench: Vec<Unit>,
}

/// Build both row sets from players already in display order.
pub fn build_rows(players: &[Player]) -> (Vec<PrefixRow>, Vec<DetailRow>) {
    players
        .iter()
        .enumerate()
        .map(|(i, p)| (prefix_row(p, i + 1), detail_row(p)))
        .unzip()
}

fn prefix_row(player: &Player, place: usize) -> PrefixRow {
    PrefixRow {
        player_id: player.row_number,
        place,
        name: player.display_name().to_string(),
        level: player.level.unwrap_or(0),
        gold: player.gold.unwrap_or(0),
    }
}

fn detail_row(player: &Player) -> DetailRow {
    DetailRow {
        player_id: player.row_number,
        health: player.health,
        record: format_record(player),
        networth: player.networth,
        crew: player.crew.clone().unwrap_or_default(),
        bench: player.bench.clone().unwrap_or_default(),
    }
}

/// "W-L", or a dash unless both sides are known.
pub fn format_record(player: &Player) -> String {
    match (player.wins, player.losses) {
        (Some(wins), Some(losses)) => format!("{wins}-{losses}"),
        _ => MISSING.to_string(),
    }
}

pub fn format_optional(value: Option<i64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Apply one patch to the matching row. Returns false when no row carries
/// the instruction's player id.
pub fn apply_patch(
    prefix: &mut [PrefixRow],
    detail: &mut [DetailRow],
    patch: &PatchInstruction,
) -> bool {
    match patch {
        PatchInstruction::SetValue {
            player_id,
            field,
            value,
        } => match field {
            StatField::Gold | StatField::Level => {
                let Some(row) = prefix.iter_mut().find(|r| r.player_id == *player_id) else {
                    return false;
                };
                if *field == StatField::Gold {
                    row.gold = *value;
                } else {
                    row.level = *value;
                }
                true
            }
            StatField::Health => {
                let Some(row) = detail.iter_mut().find(|r| r.player_id == *player_id) else {
                    return false;
                };
                row.health = Some(*value);
                true
            }
        },
        PatchInstruction::ReplaceUnits {
            player_id,
            column,
            units,
        } => {
            let Some(row) = detail.iter_mut().find(|r| r.player_id == *player_id) else {
                return false;
            };
            match column {
                UnitColumn::Crew => row.crew = units.clone(),
                UnitColumn::Bench => row.bench = units.clone(),
            }
            true
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
