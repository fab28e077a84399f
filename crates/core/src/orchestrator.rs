//! Wires the tailer set, the store, and the rule engine together, and owns
//! the process lifecycle: discovery at startup, signal-triggered shutdown
//! in reverse start order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::event::LogSource;
use crate::multireader::{LineSink, MultiReader, DEFAULT_POLL_INTERVAL};
use crate::parsers;
use crate::rules;
use crate::store::Store;
use crate::engine::RuleEngine;

/// The well-known log paths this host agent watches, in the order listed
/// in the external interfaces table. Additional distribution-specific
/// paths (fail2ban, apache, nginx) may be appended by callers but are not
/// enumerated here.
pub const WELL_KNOWN_LOG_PATHS: &[(&str, LogSource)] = &[
    ("/var/log/auth.log", LogSource::Auth),
    ("/var/log/secure", LogSource::Auth),
    ("/var/log/syslog", LogSource::Syslog),
    ("/var/log/messages", LogSource::Syslog),
    ("/var/log/kern.log", LogSource::Kernel),
    ("/var/log/ufw.log", LogSource::Firewall),
    ("/var/log/audit/audit.log", LogSource::Audit),
];

/// Enumerates the well-known paths table and returns only the ones that
/// currently exist and are readable. Kept separate from the orchestrator's
/// own wiring so it can be unit-tested in isolation.
pub fn get_available_log_files() -> Vec<(PathBuf, LogSource)> {
    WELL_KNOWN_LOG_PATHS
        .iter()
        .filter_map(|(path, source)| {
            let path = PathBuf::from(path);
            if is_readable(&path) {
                Some((path, *source))
            } else {
                None
            }
        })
        .collect()
}

fn is_readable(path: &Path) -> bool {
    std::fs::File::open(path).is_ok()
}

struct StoreSink {
    store: Arc<Store>,
}

#[async_trait]
impl LineSink for StoreSink {
    async fn handle_line(&self, line: &str, log_source: LogSource) -> std::result::Result<(), String> {
        let Some(event) = parsers::parse(line, log_source) else {
            return Ok(());
        };
        self.store
            .insert_event(&event)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    store: Arc<Store>,
    multireader: MultiReader,
    engine: RuleEngine,
}

impl Orchestrator {
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let store = Arc::new(Store::open(&config.database.path).await?);
        let sink: Arc<dyn LineSink> = Arc::new(StoreSink { store: Arc::clone(&store) });
        let multireader = MultiReader::new(sink, DEFAULT_POLL_INTERVAL);
        let engine = RuleEngine::new(Arc::clone(&store), Arc::clone(&config));

        Ok(Self {
            config,
            store,
            multireader,
            engine,
        })
    }

    pub fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Parses a line with the matching parser and, on a non-null event,
    /// inserts it into the store. Exposed so callers (and tests) can feed
    /// lines directly without going through a tailer.
    pub async fn handle_line(&self, line: &str, log_source: LogSource) {
        if let Some(event) = parsers::parse(line, log_source) {
            if let Err(e) = self.store.insert_event(&event).await {
                tracing::error!(error = %e, "failed to store parsed event");
            }
        }
    }

    /// Discovers readable well-known log files, registers a tailer for
    /// each, and starts the multi-reader and rule engine. If no log paths
    /// are readable (common when unprivileged) proceeds anyway, relying on
    /// the rule engine running over an empty store.
    pub async fn start(&mut self) -> Result<()> {
        let available = get_available_log_files();
        if available.is_empty() {
            warn!("no well-known log paths are readable; running with no tailed sources");
        }
        for (path, source) in available {
            self.multireader.add(&path, source).await;
        }

        self.multireader.start().await;
        self.engine
            .start(Duration::from_secs(self.config.analysis.interval_seconds))
            .await;
        info!("orchestrator started");
        Ok(())
    }

    /// Stops components in reverse start order (engine, then reader).
    pub async fn stop(&mut self) {
        self.engine.stop().await;
        self.multireader.stop().await;
        info!("orchestrator stopped");
    }

    /// Runs until SIGINT or SIGTERM is received, then stops in reverse
    /// order. Returns once shutdown is complete.
    pub async fn run_until_signal(&mut self) -> Result<()> {
        self.start().await?;
        wait_for_shutdown_signal().await;
        self.stop().await;
        Ok(())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        rules::catalog().iter().map(|r| r.name()).collect()
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received SIGINT"); },
        _ = terminate => { info!("received SIGTERM"); },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_paths_match_external_interface_table() {
        assert_eq!(WELL_KNOWN_LOG_PATHS.len(), 7);
        assert!(WELL_KNOWN_LOG_PATHS.iter().any(|(p, s)| *p == "/var/log/auth.log" && *s == LogSource::Auth));
        assert!(WELL_KNOWN_LOG_PATHS.iter().any(|(p, s)| *p == "/var/log/audit/audit.log" && *s == LogSource::Audit));
    }

    #[tokio::test]
    async fn handle_line_inserts_parsed_event() {
        let config = Config {
            database: crate::config::DatabaseConfig { path: ":memory:".to_string() },
            ..Config::default()
        };
        // `Store::open` expects a filesystem path; exercise the in-memory
        // path directly instead for this unit test.
        let store = Arc::new(Store::open_in_memory().await.unwrap());
        let sink: Arc<dyn LineSink> = Arc::new(StoreSink { store: Arc::clone(&store) });
        let multireader = MultiReader::new(sink, DEFAULT_POLL_INTERVAL);
        let engine = RuleEngine::new(Arc::clone(&store), Arc::new(config));
        let orchestrator = Orchestrator {
            config: Arc::new(Config::default()),
            store: Arc::clone(&store),
            multireader,
            engine,
        };

        orchestrator
            .handle_line(
                "Jan 5 03:14:15 myhost sshd[1]: Failed password for admin from 10.0.0.1",
                LogSource::Auth,
            )
            .await;

        let (events, total) = store.query_events(&Default::default(), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(events[0].user.as_deref(), Some("admin"));
    }
}
