use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::event_ids;
use super::Rule;

pub struct ServiceFailure;

impl Rule for ServiceFailure {
    fn name(&self) -> &'static str {
        "service_failure"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.service_failure;
        if !cfg.enabled {
            return Vec::new();
        }

        let failures: Vec<&Event> = events
            .iter()
            .filter(|e| e.event_type == EventType::ServiceFailure)
            .collect();

        if failures.len() < cfg.max_failures {
            return Vec::new();
        }

        vec![Alert::new(
            AlertType::ServiceFailures,
            Severity::High,
            format!("{} service failures observed", failures.len()),
            event_ids(&failures),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogSource;
    use chrono::Utc;

    #[test]
    fn three_failures_trigger_alert() {
        let mut events: Vec<Event> = (0..3)
            .map(|_| Event::new(Utc::now(), EventType::ServiceFailure, Severity::Error, LogSource::Syslog, "Failed to start Apache."))
            .collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = ServiceFailure.evaluate(&events, &config);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn two_failures_do_not_trigger() {
        let mut events: Vec<Event> = (0..2)
            .map(|_| Event::new(Utc::now(), EventType::ServiceFailure, Severity::Error, LogSource::Syslog, "Failed to start Apache."))
            .collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = ServiceFailure.evaluate(&events, &config);
        assert!(alerts.is_empty());
    }
}
