use chrono::Timelike;

use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

/// Flags successful logins during an unusual hour range. Disabled by
/// default per the catalog.
pub struct AnomalousLogin;

impl super::Rule for AnomalousLogin {
    fn name(&self) -> &'static str {
        "anomalous_login"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.anomalous_login;
        if !cfg.enabled {
            return Vec::new();
        }

        events
            .iter()
            .filter(|e| e.event_type == EventType::AuthSuccess)
            .filter(|e| {
                let hour = e.event_time.hour();
                hour >= cfg.start_hour && hour < cfg.end_hour
            })
            .map(|e| {
                Alert::new(
                    AlertType::AnomalousLogin,
                    Severity::Medium,
                    format!(
                        "login outside normal hours for user={}",
                        e.user.as_deref().unwrap_or("unknown")
                    ),
                    vec![e.id],
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogSource;
    use chrono::{TimeZone, Utc};

    #[test]
    fn disabled_by_default() {
        let config = Config::default();
        assert!(!config.rules.anomalous_login.enabled);
    }

    #[test]
    fn flags_login_in_window_when_enabled() {
        let mut config = Config::default();
        config.rules.anomalous_login.enabled = true;
        let event_time = Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap();
        let mut event = Event::new(event_time, EventType::AuthSuccess, Severity::Info, LogSource::Auth, "Accepted password for alice from 1.2.3.4")
            .with_user("alice");
        event.id = 1;
        let alerts = AnomalousLogin.evaluate(&[event], &config);
        assert_eq!(alerts.len(), 1);
    }
}
