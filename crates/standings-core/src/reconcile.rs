// Snapshot reconciliation: full-render vs patch decision and per-field diffing.
//
// The reconciler retains the last snapshot it saw (with unknown stats carried
// forward) and compares each new snapshot against it. A change in player
// count or row order forces a full render; otherwise rows are paired by
// index and every changed field becomes one patch instruction.

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::ledger::{ChangeEvent, ChangeLedger};
use crate::snapshot::{Player, Snapshot, StatField, Unit, UnitColumn};

/// Delta recorded for crew/bench changes. Roster changes carry no numeric
/// magnitude; the indicator only says that the column changed.
pub const ROSTER_CHANGE_DELTA: i64 = 1;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Full,
    Patch,
}

/// Why a full render was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullRenderReason {
    NoPreviousState,
    PlayerCountChanged { previous: usize, current: usize },
    PlayerOrderChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeDecision {
    Full(FullRenderReason),
    Patch,
}

impl ModeDecision {
    pub fn mode(&self) -> RenderMode {
        match self {
            ModeDecision::Full(_) => RenderMode::Full,
            ModeDecision::Patch => RenderMode::Patch,
        }
    }
}

/// An atomic update of one displayed field for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchInstruction {
    SetValue {
        player_id: u32,
        field: StatField,
        value: i64,
    },
    ReplaceUnits {
        player_id: u32,
        column: UnitColumn,
        units: Vec<Unit>,
    },
}

impl PatchInstruction {
    pub fn player_id(&self) -> u32 {
        match self {
            PatchInstruction::SetValue { player_id, .. }
            | PatchInstruction::ReplaceUnits { player_id, .. } => *player_id,
        }
    }
}

/// The result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub mode: RenderMode,
    /// Set when `mode` is `Full`.
    pub reason: Option<FullRenderReason>,
    /// Empty when `mode` is `Full`.
    pub patches: Vec<PatchInstruction>,
    /// Change events recorded in the ledger during this pass.
    pub events: Vec<ChangeEvent>,
}

/// Heroes that entered or left a unit list, counted as a multiset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RosterChange {
    pub fn between(previous: &[Unit], current: &[Unit]) -> Self {
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for unit in previous {
            *counts.entry(unit.hero()).or_default() -= 1;
        }
        for unit in current {
            *counts.entry(unit.hero()).or_default() += 1;
        }

        let mut change = RosterChange::default();
        for (hero, count) in counts {
            for _ in 0..count.max(0) {
                change.added.push(hero.to_string());
            }
            for _ in 0..(-count).max(0) {
                change.removed.push(hero.to_string());
            }
        }
        change.added.sort();
        change.removed.sort();
        change
    }

    /// True when only star levels or ordering changed.
    pub fn is_reshuffle(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mode decision
// ---------------------------------------------------------------------------

/// Decide whether `next` can be applied as a patch over `previous`.
pub fn decide_mode(previous: Option<&Snapshot>, next: &Snapshot) -> ModeDecision {
    let Some(previous) = previous else {
        return ModeDecision::Full(FullRenderReason::NoPreviousState);
    };

    if previous.players.len() != next.players.len() {
        return ModeDecision::Full(FullRenderReason::PlayerCountChanged {
            previous: previous.players.len(),
            current: next.players.len(),
        });
    }

    if !previous.row_order().eq(next.row_order()) {
        return ModeDecision::Full(FullRenderReason::PlayerOrderChanged);
    }

    ModeDecision::Patch
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Holds the retained "last state" between passes.
#[derive(Debug, Default)]
pub struct Reconciler {
    retained: Option<Snapshot>,
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler { retained: None }
    }

    /// The snapshot the next pass will diff against.
    pub fn retained(&self) -> Option<&Snapshot> {
        self.retained.as_ref()
    }

    /// Forget the retained state so the next pass renders in full.
    pub fn reset(&mut self) {
        self.retained = None;
    }

    /// Reconcile `next` against the retained state, recording change events
    /// in `ledger`, and retain the result for the next pass.
    pub fn reconcile(&mut self, next: &Snapshot, ledger: &mut ChangeLedger) -> ReconcileOutcome {
        let Some(previous) = self.retained.take() else {
            return self.full_render(next, FullRenderReason::NoPreviousState);
        };
        if let ModeDecision::Full(reason) = decide_mode(Some(&previous), next) {
            return self.full_render(next, reason);
        }

        let mut patches = Vec::new();
        let mut events = Vec::new();
        for (last, current) in previous.players.iter().zip(&next.players) {
            diff_stats(last, current, ledger, &mut patches, &mut events);
            diff_units(last, current, ledger, &mut patches, &mut events);
        }

        self.retained = Some(carry_forward(&previous, next));

        debug!(
            "Patch pass: {} instructions, {} change events",
            patches.len(),
            events.len()
        );
        ReconcileOutcome {
            mode: RenderMode::Patch,
            reason: None,
            patches,
            events,
        }
    }

    fn full_render(&mut self, next: &Snapshot, reason: FullRenderReason) -> ReconcileOutcome {
        info!("Full render: {:?}", reason);
        self.retained = Some(next.clone());
        ReconcileOutcome {
            mode: RenderMode::Full,
            reason: Some(reason),
            patches: Vec::new(),
            events: Vec::new(),
        }
    }
}

fn diff_stats(
    last: &Player,
    current: &Player,
    ledger: &mut ChangeLedger,
    patches: &mut Vec<PatchInstruction>,
    events: &mut Vec<ChangeEvent>,
) {
    let player_id = current.row_number;
    for field in StatField::ALL {
        // No reading this tick: keep showing the last known value.
        let Some(value) = current.stat(field) else {
            continue;
        };
        let previous = last.stat(field);
        if previous == Some(value) {
            continue;
        }

        patches.push(PatchInstruction::SetValue {
            player_id,
            field,
            value,
        });

        if let Some(previous) = previous {
            let delta = value.saturating_sub(previous);
            log_stat_change(current, field, delta, value);
            events.push(ledger.record(player_id, field.into(), delta));
        }
    }
}

fn diff_units(
    last: &Player,
    current: &Player,
    ledger: &mut ChangeLedger,
    patches: &mut Vec<PatchInstruction>,
    events: &mut Vec<ChangeEvent>,
) {
    let player_id = current.row_number;
    for column in UnitColumn::ALL {
        let Some(units) = current.units(column) else {
            continue;
        };
        let previous = last.units(column);
        if previous == Some(units) {
            continue;
        }

        patches.push(PatchInstruction::ReplaceUnits {
            player_id,
            column,
            units: units.clone(),
        });

        if let Some(previous) = previous {
            let change = RosterChange::between(previous, units);
            if change.is_reshuffle() {
                debug!("{} rearranged {:?}", current.display_name(), column);
            } else {
                debug!(
                    "{} {:?} changed: added {:?}, removed {:?}",
                    current.display_name(),
                    column,
                    change.added,
                    change.removed
                );
            }
            events.push(ledger.record(player_id, column.into(), ROSTER_CHANGE_DELTA));
        }
    }
}

fn log_stat_change(player: &Player, field: StatField, delta: i64, value: i64) {
    let name = player.display_name();
    match field {
        StatField::Gold if delta > 0 => debug!("{} gained {} gold", name, delta),
        StatField::Gold => debug!("{} spent {} gold", name, delta.unsigned_abs()),
        StatField::Health if delta < 0 => debug!("{} lost {} HP", name, delta.unsigned_abs()),
        StatField::Health => debug!("{} gained {} HP", name, delta),
        StatField::Level if delta > 0 => debug!("{} leveled up to {}", name, value),
        StatField::Level => debug!("{} level dropped to {}", name, value),
    }
}

/// Deep-copy `next`, filling unknown stats from `previous` (same row order).
fn carry_forward(previous: &Snapshot, next: &Snapshot) -> Snapshot {
    let mut retained = next.clone();
    for (player, last) in retained.players.iter_mut().zip(&previous.players) {
        for field in StatField::ALL {
            if player.stat(field).is_some() {
                continue;
            }
            if let Some(value) = last.stat(field) {
                trace!(
                    "Preserving {:?}: {} for {}",
                    field,
                    value,
                    player.display_name()
                );
                player.set_stat(field, Some(value));
            }
        }
    }
    retained
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
