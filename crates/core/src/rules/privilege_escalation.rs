use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::Rule;

/// Flags sudo success by a service-account-like user, and user/group
/// changes that mention `sudo` or `wheel` in their raw message.
pub struct PrivilegeEscalation;

impl Rule for PrivilegeEscalation {
    fn name(&self) -> &'static str {
        "privilege_escalation"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.privilege_escalation;
        if !cfg.enabled {
            return Vec::new();
        }

        let watchlist: Vec<String> = cfg.watchlist.iter().map(|s| s.to_ascii_lowercase()).collect();
        let mut alerts = Vec::new();

        for event in events {
            if event.event_type == EventType::SudoSuccess {
                if let Some(user) = &event.user {
                    if watchlist.contains(&user.to_ascii_lowercase()) {
                        alerts.push(Alert::new(
                            AlertType::PrivilegeEscalation,
                            Severity::Critical,
                            format!("privilege escalation: sudo success by service-account user={user}"),
                            vec![event.id],
                        ));
                    }
                }
            }

            if matches!(event.event_type, EventType::UserCreated | EventType::GroupMembershipChange) {
                let lower = event.raw_message.to_ascii_lowercase();
                if lower.contains("sudo") || lower.contains("wheel") {
                    alerts.push(Alert::new(
                        AlertType::PrivilegeEscalation,
                        Severity::Critical,
                        "privilege escalation: user/group change referencing sudo or wheel".to_string(),
                        vec![event.id],
                    ));
                }
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
    fn sudo_success_by_www_data_is_escalation() {
        let mut event = Event::new(Utc::now(), EventType::SudoSuccess, Severity::Info, LogSource::Auth, "www-data : COMMAND=/bin/bash")
            .with_user("www-data");
        event.id = 1;
        let config = Config::default();
        let alerts = PrivilegeEscalation.evaluate(&[event], &config);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn group_change_mentioning_wheel_is_escalation() {
        let mut event = Event::new(Utc::now(), EventType::GroupMembershipChange, Severity::Warning, LogSource::Auth, "add 'bob' to group 'wheel'")
            .with_user("bob");
        event.id = 1;
        let config = Config::default();
        let alerts = PrivilegeEscalation.evaluate(&[event], &config);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn ordinary_user_sudo_is_not_flagged() {
        let mut event = Event::new(Utc::now(), EventType::SudoSuccess, Severity::Info, LogSource::Auth, "alice : COMMAND=/bin/ls")
            .with_user("alice");
        event.id = 1;
        let config = Config::default();
        let alerts = PrivilegeEscalation.evaluate(&[event], &config);
        assert!(alerts.is_empty());
    }
}
