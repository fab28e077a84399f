//! Periodic rule evaluator. Wakes on an interval, pulls a bounded slice of
//! recent events, runs the catalog, and inserts any alert not already
//! present in the recent alert history.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::rules::{self, Rule};
use crate::store::{AlertFilter, Store};

const ANALYSIS_WINDOW_MINUTES: i64 = 15;
const ANALYSIS_ROW_LIMIT: i64 = 1000;
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RuleEngine {
    store: Arc<Store>,
    config: Arc<Config>,
    catalog: Arc<Vec<Box<dyn Rule>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RuleEngine {
    pub fn new(store: Arc<Store>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            catalog: Arc::new(rules::catalog()),
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Starts the periodic evaluator. A second call while already running
    /// is a no-op.
    pub async fn start(&mut self, interval: Duration) {
        if self.handle.is_some() {
            return;
        }
        let (tx, mut rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(tx);

        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let catalog = Arc::clone(&self.catalog);

        let handle = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "rule engine started");
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = rx.recv() => {
                        info!("rule engine received stop signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = Self::run_once(&store, &config, &catalog).await {
                            error!(error = %e, "rule engine evaluation pass failed");
                        }
                    }
                }
            }
        });
        self.handle = Some(handle);
    }

    async fn run_once(store: &Arc<Store>, config: &Arc<Config>, catalog: &[Box<dyn Rule>]) -> Result<()> {
        let events = store
            .recent_events_for_analysis(ANALYSIS_WINDOW_MINUTES, ANALYSIS_ROW_LIMIT)
            .await?;

        for rule in catalog {
            let candidates = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                rule.evaluate(&events, config)
            }))
            .unwrap_or_else(|_| {
                error!(rule = rule.name(), "rule evaluation panicked, skipping");
                Vec::new()
            });

            for candidate in candidates {
                match Self::is_duplicate(store, &candidate).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        if let Err(e) = store.insert_alert(&candidate).await {
                            error!(rule = rule.name(), error = %e, "failed to persist alert");
                        }
                    }
                    Err(e) => {
                        error!(rule = rule.name(), error = %e, "failed to check alert dedup history");
                    }
                }
            }
        }
        Ok(())
    }

    /// An alert is a duplicate if an identical `(alert_type, description)`
    /// pair already exists among alerts from the last 15 minutes.
    async fn is_duplicate(store: &Arc<Store>, candidate: &crate::event::Alert) -> Result<bool> {
        let filter = AlertFilter::new()
            .alert_type(candidate.alert_type)
            .since_minutes(ANALYSIS_WINDOW_MINUTES);
        let (recent, _) = store.query_alerts(&filter, ANALYSIS_ROW_LIMIT, 0).await?;
        Ok(recent.iter().any(|a| a.description == candidate.description))
    }

    /// Stops the evaluator cooperatively, joining within 5 seconds.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            match tokio::time::timeout(STOP_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => info!("rule engine stopped cleanly"),
                Ok(Err(e)) => error!(error = %e, "rule engine task panicked"),
                Err(_) => warn!("rule engine did not stop within 5s, abandoning"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventType, LogSource, Severity};
    use chrono::Utc;

    #[tokio::test]
    async fn repeated_pass_without_new_events_adds_no_new_alerts() {
        let store = Arc::new(Store::open_in_memory().await.unwrap());
        let config = Arc::new(Config::default());
        let catalog = rules::catalog();

        for i in 0..5 {
            let event = Event::new(
                Utc::now(),
                EventType::AuthFailure,
                Severity::Warning,
                LogSource::Auth,
                format!("Failed password for admin from 10.0.0.{i}"),
            )
            .with_user("admin")
            .with_src_ip(format!("10.0.0.{i}"));
            store.insert_event(&event).await.unwrap();
        }

        RuleEngine::run_once(&store, &config, &catalog).await.unwrap();
        let (alerts_after_first, _) = store.query_alerts(&Default::default(), 100, 0).await.unwrap();
        assert!(!alerts_after_first.is_empty());

        RuleEngine::run_once(&store, &config, &catalog).await.unwrap();
        let (alerts_after_second, _) = store.query_alerts(&Default::default(), 100, 0).await.unwrap();
        assert_eq!(alerts_after_first.len(), alerts_after_second.len());
    }
}
