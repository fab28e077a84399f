use std::collections::HashSet;

use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::{event_ids, group_by};
use super::Rule;

pub struct RapidLogin;

impl Rule for RapidLogin {
    fn name(&self) -> &'static str {
        "rapid_login"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.rapid_login;
        if !cfg.enabled {
            return Vec::new();
        }

        let successes: Vec<Event> = events
            .iter()
            .filter(|e| e.event_type == EventType::AuthSuccess)
            .cloned()
            .collect();

        let mut alerts = Vec::new();
        for (user, group) in group_by(&successes, |e| e.user.clone()) {
            if group.len() < cfg.max_logins {
                continue;
            }
            let distinct_ips: HashSet<&str> = group.iter().filter_map(|e| e.src_ip.as_deref()).collect();
            if distinct_ips.len() >= cfg.min_distinct_ips {
                alerts.push(Alert::new(
                    AlertType::RapidLogin,
                    Severity::High,
                    format!(
                        "rapid login for user={user}: {} logins from {} distinct IPs",
                        group.len(),
                        distinct_ips.len()
                    ),
                    event_ids(&group),
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

    fn login(user: &str, ip: &str) -> Event {
        Event::new(Utc::now(), EventType::AuthSuccess, Severity::Info, LogSource::Auth, "Accepted password")
            .with_user(user)
            .with_src_ip(ip)
    }

    #[test]
    fn five_logins_two_ips_triggers_alert() {
        let ips = ["1.1.1.1", "1.1.1.1", "2.2.2.2", "2.2.2.2", "2.2.2.2"];
        let mut events: Vec<Event> = ips.iter().map(|ip| login("alice", ip)).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = RapidLogin.evaluate(&events, &config);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].description.contains("alice"));
    }

    #[test]
    fn five_logins_one_ip_does_not_trigger() {
        let mut events: Vec<Event> = (0..5).map(|_| login("alice", "1.1.1.1")).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = RapidLogin.evaluate(&events, &config);
        assert!(alerts.is_empty());
    }
}
