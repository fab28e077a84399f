//! Aggregates many [`Tailer`]s behind a single mutex and delivers new lines
//! to a sink, one poll pass at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::event::LogSource;
use crate::tailer::Tailer;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Receives `(line, log_source)` pairs as the multi-reader drains tailers.
/// Implementations MUST NOT panic; an error should be returned and is
/// logged without interrupting the poll pass.
#[async_trait]
pub trait LineSink: Send + Sync {
    async fn handle_line(&self, line: &str, log_source: LogSource) -> Result<(), String>;
}

struct TailerEntry {
    tailer: Tailer,
    log_source: LogSource,
}

/// Per-path snapshot reported by [`MultiReader::status`].
#[derive(Debug, Clone)]
pub struct TailerStatus {
    pub log_source: LogSource,
    pub position: u64,
    pub inode: u64,
    pub readable: bool,
}

pub struct MultiReader {
    tailers: Arc<Mutex<HashMap<PathBuf, TailerEntry>>>,
    sink: Arc<dyn LineSink>,
    poll_interval: Duration,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MultiReader {
    pub fn new(sink: Arc<dyn LineSink>, poll_interval: Duration) -> Self {
        Self {
            tailers: Arc::new(Mutex::new(HashMap::new())),
            sink,
            poll_interval,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Registers a new file for tailing, seeking to its current end.
    /// Returns `false` if the path is already registered or cannot be
    /// opened (permission denied, does not exist) — the caller should log
    /// the latter once and move on, per the tailer's permanent-failure
    /// disposition.
    pub async fn add(&self, path: impl Into<PathBuf>, log_source: LogSource) -> bool {
        let path = path.into();
        let mut tailers = self.tailers.lock().await;
        if tailers.contains_key(&path) {
            return false;
        }
        match Tailer::open(&path, true) {
            Ok(tailer) => {
                info!(path = %path.display(), %log_source, "registered log file for tailing");
                tailers.insert(path, TailerEntry { tailer, log_source });
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "log file not readable, not enrolled");
                false
            }
        }
    }

    pub async fn remove(&self, path: &Path) {
        let mut tailers = self.tailers.lock().await;
        if let Some(mut entry) = tailers.remove(path) {
            entry.tailer.close();
        }
    }

    pub async fn status(&self) -> HashMap<PathBuf, TailerStatus> {
        let tailers = self.tailers.lock().await;
        tailers
            .iter()
            .map(|(path, entry)| {
                (
                    path.clone(),
                    TailerStatus {
                        log_source: entry.log_source,
                        position: entry.tailer.position(),
                        inode: entry.tailer.inode(),
                        readable: true,
                    },
                )
            })
            .collect()
    }

    /// Starts the background poll loop. A second call while already running
    /// is a no-op.
    pub async fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let (tx, mut rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(tx);

        let tailers = Arc::clone(&self.tailers);
        let sink = Arc::clone(&self.sink);
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            info!(poll_interval_ms = poll_interval.as_millis() as u64, "multi-reader started");
            loop {
                tokio::select! {
                    _ = rx.recv() => {
                        info!("multi-reader received stop signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        Self::poll_once(&tailers, sink.as_ref()).await;
                    }
                }
            }
        });
        self.handle = Some(handle);
    }

    async fn poll_once(tailers: &Arc<Mutex<HashMap<PathBuf, TailerEntry>>>, sink: &dyn LineSink) {
        let mut guard = tailers.lock().await;
        for (path, entry) in guard.iter_mut() {
            let lines = entry.tailer.read_new_lines();
            if lines.is_empty() {
                continue;
            }
            debug!(path = %path.display(), count = lines.len(), "drained lines from tailer");
            for line in lines {
                if let Err(e) = sink.handle_line(&line, entry.log_source).await {
                    error!(path = %path.display(), error = %e, "sink failed on line, continuing");
                }
            }
        }
    }

    /// Stops the poll loop, waiting up to 2 seconds for it to observe the
    /// shutdown signal and exit.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            match tokio::time::timeout(Duration::from_secs(2), handle).await {
                Ok(Ok(())) => info!("multi-reader stopped cleanly"),
                Ok(Err(e)) => error!(error = %e, "multi-reader task panicked"),
                Err(_) => warn!("multi-reader did not stop within 2s, abandoning"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LineSink for CountingSink {
        async fn handle_line(&self, _line: &str, _log_source: LogSource) -> Result<(), String> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn polls_and_delivers_new_lines() {
        let dir = std::env::temp_dir().join(format!("multireader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.log");
        std::fs::write(&path, "").unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(CountingSink { count: count.clone() });
        let mut reader = MultiReader::new(sink, Duration::from_millis(50));
        assert!(reader.add(&path, LogSource::Syslog).await);

        reader.start().await;

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "line one").unwrap();
        writeln!(f, "line two").unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        reader.stop().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let dir = std::env::temp_dir().join(format!("multireader-dup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.log");
        std::fs::write(&path, "").unwrap();

        let sink = Arc::new(CountingSink { count: Arc::new(AtomicUsize::new(0)) });
        let reader = MultiReader::new(sink, Duration::from_millis(50));
        assert!(reader.add(&path, LogSource::Syslog).await);
        assert!(!reader.add(&path, LogSource::Syslog).await);
    }
}
