// Snapshot sources and the polling task.
//
// A source produces one parsed `Snapshot` per `fetch`. The poller drives a
// source in a fetch / hand-off / wait-for-ack / sleep cycle so that the next
// fetch is only scheduled after the previous snapshot has been reconciled.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CACHE_CONTROL};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use standings_core::snapshot::{Snapshot, SnapshotError};

use crate::protocol::SourceEvent;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl SourceError {
    /// True when the document arrived but had no `players` list.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SourceError::Snapshot(SnapshotError::Malformed))
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Polls an HTTP endpoint that serves the latest snapshot.
pub struct HttpSource {
    http: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let response = self
            .http
            .get(&self.url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(Snapshot::from_json(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a snapshot document from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(Snapshot::from_json(&text)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// File name shown in the status line for `path`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Repeatedly fetch from `source` and forward snapshots to the app loop.
///
/// Each successful fetch is handed off together with a oneshot ack; the
/// poller waits for the ack, then sleeps for `interval` before fetching
/// again. Fetch failures count as "no update this tick". Returns when the
/// app loop stops listening.
pub async fn run_poller<S>(source: S, interval: Duration, tx: mpsc::Sender<SourceEvent>)
where
    S: SnapshotSource,
{
    info!(
        "Polling {} every {}ms",
        source.describe(),
        interval.as_millis()
    );

    loop {
        match source.fetch().await {
            Ok(snapshot) => {
                let (ack_tx, ack_rx) = oneshot::channel();
                let event = SourceEvent::Snapshot {
                    snapshot: Box::new(snapshot),
                    ack: ack_tx,
                };
                if tx.send(event).await.is_err() {
                    break;
                }
                // A dropped ack means the loop went away mid-update.
                if ack_rx.await.is_err() {
                    debug!("Snapshot ack dropped");
                }
            }
            Err(e) if e.is_malformed() => {
                warn!("Polled snapshot rejected: {}", e);
                let event = SourceEvent::Rejected {
                    reason: "Invalid data format".to_string(),
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Poll of {} failed: {}", source.describe(), e);
            }
        }

        if tx.is_closed() {
            break;
        }
        tokio::time::sleep(interval).await;
    }

    info!("Poller for {} stopped", source.describe());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed list of fetch results, then reports 503 forever.
    struct ScriptedSource {
        results: Mutex<VecDeque<Result<Snapshot, SourceError>>>,
        calls: Arc<Mutex<u32>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<Snapshot, SourceError>>) -> (Self, Arc<Mutex<u32>>) {
            let calls = Arc::new(Mutex::new(0));
            let source = ScriptedSource {
                results: Mutex::new(results.into()),
                calls: calls.clone(),
            };
            (source, calls)
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<Snapshot, SourceError> {
            *self.calls.lock().unwrap() += 1;
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SourceError::Status(503)))
        }

        fn describe(&self) -> String {
            "scripted".into()
        }
    }

    fn snapshot_json(rows: &[u32]) -> Snapshot {
        let players: Vec<String> = rows
            .iter()
            .map(|r| format!(r#"{{"row_number": {r}}}"#))
            .collect();
        Snapshot::from_json(&format!(r#"{{"players": [{}]}}"#, players.join(","))).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn poller_waits_for_ack_before_next_fetch() {
        let (source, calls) = ScriptedSource::new(vec![
            Ok(snapshot_json(&[0])),
            Ok(snapshot_json(&[0, 1])),
        ]);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(run_poller(source, Duration::from_millis(1000), tx));

        let first = rx.recv().await.unwrap();
        let SourceEvent::Snapshot { snapshot, ack } = first else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.players.len(), 1);

        // Without an ack the poller must not fetch again, however long we wait.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*calls.lock().unwrap(), 1);

        ack.send(()).unwrap();
        let second = rx.recv().await.unwrap();
        let SourceEvent::Snapshot { snapshot, ack } = second else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(*calls.lock().unwrap(), 2);

        drop(ack);
        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_are_swallowed() {
        let (source, calls) = ScriptedSource::new(vec![
            Err(SourceError::Status(500)),
            Ok(snapshot_json(&[3])),
        ]);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(run_poller(source, Duration::from_millis(1000), tx));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SourceEvent::Snapshot { .. }));
        assert_eq!(*calls.lock().unwrap(), 2);

        drop(event);
        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_snapshot_is_reported() {
        let (source, _) = ScriptedSource::new(vec![Err(SourceError::Snapshot(
            SnapshotError::Malformed,
        ))]);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(run_poller(source, Duration::from_millis(1000), tx));

        match rx.recv().await.unwrap() {
            SourceEvent::Rejected { reason } => assert_eq!(reason, "Invalid data format"),
            other => panic!("expected rejection, got {other:?}"),
        }

        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn file_source_reads_and_parses() {
        let path = std::env::temp_dir().join("standings_file_source.json");
        tokio::fs::write(&path, r#"{"players": [{"row_number": 7, "gold": 3}]}"#)
            .await
            .unwrap();

        let source = FileSource::new(&path);
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.players[0].row_number, 7);
        assert_eq!(display_name(source.path()), "standings_file_source.json");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn file_source_missing_file_is_io_error() {
        let source = FileSource::new(std::env::temp_dir().join("standings_does_not_exist.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(!err.is_malformed());
    }
}
