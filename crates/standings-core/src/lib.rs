// Library root: the scoreboard domain with no I/O. Snapshot parsing,
// reconciliation, the change ledger, and display ordering.

pub mod ledger;
pub mod reconcile;
pub mod snapshot;
pub mod sort;
