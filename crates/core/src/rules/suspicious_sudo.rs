use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::event_ids;
use super::Rule;

/// Flags any sudo activity (success, command execution, or failure) by a
/// watch-listed user, plus a separate alert for users with repeated sudo
/// failures. The original catalog also names a distinct `SUDO_COMMAND` tag;
/// this implementation's parser folds that case into `SUDO_SUCCESS` (the
/// `COMMAND=` sudo line), so the two are treated as the same signal here.
pub struct SuspiciousSudo;

impl Rule for SuspiciousSudo {
    fn name(&self) -> &'static str {
        "suspicious_sudo"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.suspicious_sudo;
        if !cfg.enabled {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        let watchlist: Vec<String> = cfg.watchlist.iter().map(|s| s.to_ascii_lowercase()).collect();

        for event in events {
            if !matches!(event.event_type, EventType::SudoSuccess | EventType::SudoFailure) {
                continue;
            }
            let Some(user) = &event.user else { continue };
            if watchlist.contains(&user.to_ascii_lowercase()) {
                alerts.push(Alert::new(
                    AlertType::SuspiciousSudo,
                    Severity::Critical,
                    format!("suspicious sudo activity by watch-listed user={user}"),
                    vec![event.id],
                ));
            }
        }

        let failures: Vec<&Event> = events
            .iter()
            .filter(|e| e.event_type == EventType::SudoFailure)
            .collect();
        let mut by_user: std::collections::HashMap<String, Vec<&Event>> = std::collections::HashMap::new();
        let mut order = Vec::new();
        for e in failures {
            let Some(user) = e.user.clone() else { continue };
            if !by_user.contains_key(&user) {
                order.push(user.clone());
            }
            by_user.entry(user).or_default().push(e);
        }
        for user in order {
            let group = &by_user[&user];
            if group.len() >= cfg.max_failures {
                alerts.push(Alert::new(
                    AlertType::SudoAbuse,
                    Severity::High,
                    format!("repeated sudo failures by user={user} ({} attempts)", group.len()),
                    event_ids(group),
                ));
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogSource;
    use chrono::Utc;

    #[test]
    fn watchlisted_user_triggers_alert() {
        let mut event = Event::new(Utc::now(), EventType::SudoSuccess, Severity::Info, LogSource::Auth, "www-data : COMMAND=/bin/bash")
            .with_user("www-data");
        event.id = 1;
        let config = Config::default();
        let alerts = SuspiciousSudo.evaluate(&[event], &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::SuspiciousSudo);
    }

    #[test]
    fn repeated_failures_trigger_abuse_alert() {
        let mut events: Vec<Event> = (0..3)
            .map(|i| {
                let mut e = Event::new(Utc::now(), EventType::SudoFailure, Severity::Warning, LogSource::Auth, "incorrect password")
                    .with_user("bob");
                e.id = i + 1;
                e
            })
            .collect();
        events.iter_mut().for_each(|_| {});
        let config = Config::default();
        let alerts = SuspiciousSudo.evaluate(&events, &config);
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::SudoAbuse));
    }
}
