// Change event ledger: per-player, bounded, time-decaying log of field deltas.
//
// Events are stored most-recent-first. Expiry is driven by an explicit
// deadline queue rather than per-event timers: the owner asks for
// `next_expiry()`, sleeps until then, and calls `prune_expired()`. The clock
// is injected so expiry can be tested without wall-clock sleeps.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::snapshot::{StatField, UnitColumn};

/// How long a change event stays visible.
pub const DEFAULT_TTL_MS: i64 = 4000;

/// Maximum number of events retained per player.
pub const DEFAULT_CAPACITY: usize = 10;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for the ledger.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance_ms(&self, ms: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += Duration::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// Which field a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Gold,
    Health,
    Level,
    Bench,
    Crew,
}

impl From<StatField> for ChangeKind {
    fn from(field: StatField) -> Self {
        match field {
            StatField::Gold => ChangeKind::Gold,
            StatField::Health => ChangeKind::Health,
            StatField::Level => ChangeKind::Level,
        }
    }
}

impl From<UnitColumn> for ChangeKind {
    fn from(column: UnitColumn) -> Self {
        match column {
            UnitColumn::Crew => ChangeKind::Crew,
            UnitColumn::Bench => ChangeKind::Bench,
        }
    }
}

/// A transient annotation for a just-observed field delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub player_id: u32,
    pub kind: ChangeKind,
    pub delta: i64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ChangeLedger
// ---------------------------------------------------------------------------

pub struct ChangeLedger {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
    events: HashMap<u32, VecDeque<ChangeEvent>>,
    /// Pending (deadline, player) prunes, earliest first.
    deadlines: BinaryHeap<Reverse<(DateTime<Utc>, u32)>>,
}

impl ChangeLedger {
    /// Create a ledger with the default 4s TTL and 10-event capacity.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(clock, Duration::milliseconds(DEFAULT_TTL_MS), DEFAULT_CAPACITY)
    }

    pub fn with_limits(clock: Arc<dyn Clock>, ttl: Duration, capacity: usize) -> Self {
        ChangeLedger {
            clock,
            ttl,
            capacity,
            events: HashMap::new(),
            deadlines: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Record a new event for `player_id` and return it.
    ///
    /// Prunes the player's log first, inserts the event at the front, and
    /// queues a prune at `created_at + ttl`.
    pub fn record(&mut self, player_id: u32, kind: ChangeKind, delta: i64) -> ChangeEvent {
        let now = self.clock.now();
        self.prune(player_id, now);

        let event = ChangeEvent {
            player_id,
            kind,
            delta,
            created_at: now,
        };
        let log = self.events.entry(player_id).or_default();
        log.push_front(event.clone());
        log.truncate(self.capacity);

        self.deadlines.push(Reverse((now + self.ttl, player_id)));
        trace!(player_id, ?kind, delta, "recorded change event");
        event
    }

    /// Drop events for `player_id` that are expired at `now` or beyond the
    /// capacity. Idempotent.
    pub fn prune(&mut self, player_id: u32, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let capacity = self.capacity;
        let now_empty = match self.events.get_mut(&player_id) {
            Some(log) => {
                log.retain(|e| now - e.created_at < ttl);
                log.truncate(capacity);
                log.is_empty()
            }
            None => return,
        };
        if now_empty {
            self.events.remove(&player_id);
        }
    }

    /// Active events for `player_id`, most recent first.
    pub fn list_active(&self, player_id: u32, now: DateTime<Utc>) -> Vec<ChangeEvent> {
        self.events
            .get(&player_id)
            .map(|log| {
                log.iter()
                    .filter(|e| now - e.created_at < self.ttl)
                    .take(self.capacity)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The earliest pending prune deadline, if any.
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.deadlines.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Run every prune whose deadline has passed.
    ///
    /// Returns the affected player ids (sorted, deduplicated) so the caller
    /// can refresh their indicators.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> Vec<u32> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, player_id))) = self.deadlines.peek().copied() {
            if deadline > now {
                break;
            }
            self.deadlines.pop();
            due.push(player_id);
        }
        due.sort_unstable();
        due.dedup();
        for player_id in &due {
            self.prune(*player_id, now);
        }
        due
    }

    /// Players that currently hold at least one stored event.
    pub fn players(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.events.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
