use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::{event_ids, group_by};
use super::Rule;

/// Over failed auth events, groups by `user` and by `src_ip` independently;
/// any group at or above the threshold emits one alert naming that
/// dimension and its count.
pub struct BruteForce;

impl Rule for BruteForce {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.brute_force;
        if !cfg.enabled {
            return Vec::new();
        }

        let failures: Vec<Event> = events
            .iter()
            .filter(|e| e.event_type.is_auth_failure_like())
            .cloned()
            .collect();

        let mut alerts = Vec::new();

        for (user, group) in group_by(&failures, |e| e.user.clone()) {
            if group.len() >= cfg.max_attempts {
                alerts.push(Alert::new(
                    AlertType::BruteForce,
                    Severity::Critical,
                    format!("brute force detected: user={user} ({} attempts)", group.len()),
                    event_ids(&group),
                ));
            }
        }

        for (ip, group) in group_by(&failures, |e| e.src_ip.clone()) {
            if group.len() >= cfg.max_attempts {
                alerts.push(Alert::new(
                    AlertType::BruteForce,
                    Severity::Critical,
                    format!("brute force detected: src_ip={ip} ({} attempts)", group.len()),
                    event_ids(&group),
                ));
            }
        }

        alerts
    }
}
