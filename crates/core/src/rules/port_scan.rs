use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::{event_ids, extract_dport, group_by};
use super::Rule;

/// Standalone port-scan detector: scans `FIREWALL_BLOCK`/`FIREWALL_EVENT`
/// events only (not `FIREWALL_ALLOW`/`FIREWALL_AUDIT` — an allowed or
/// audited connection is not a scan signal) and flags a source IP that has
/// touched enough distinct destination ports.
pub struct PortScan;

impl Rule for PortScan {
    fn name(&self) -> &'static str {
        "port_scan"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.port_scan;
        if !cfg.enabled {
            return Vec::new();
        }

        let firewall_events: Vec<Event> = events
            .iter()
            .filter(|e| matches!(e.event_type, EventType::FirewallBlock | EventType::FirewallEvent))
            .cloned()
            .collect();

        let mut alerts = Vec::new();
        for (src_ip, group) in group_by(&firewall_events, |e| e.src_ip.clone()) {
            let ports: std::collections::HashSet<String> =
                group.iter().filter_map(|e| extract_dport(e)).collect();
            if ports.len() >= cfg.min_ports {
                alerts.push(Alert::new(
                    AlertType::PortScan,
                    Severity::Critical,
                    format!("port scan from src_ip={src_ip} ({} distinct ports)", ports.len()),
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

    fn blocked(ip: &str, port: u32) -> Event {
        Event::new(
            Utc::now(),
            EventType::FirewallBlock,
            Severity::Warning,
            LogSource::Firewall,
            format!("[UFW BLOCK] SRC={ip} DST=10.0.0.5 PROTO=TCP DPT={port}"),
        )
        .with_src_ip(ip)
    }

    fn allowed(ip: &str, port: u32) -> Event {
        Event::new(
            Utc::now(),
            EventType::FirewallAllow,
            Severity::Info,
            LogSource::Firewall,
            format!("[UFW ALLOW] SRC={ip} DST=10.0.0.5 PROTO=TCP DPT={port}"),
        )
        .with_src_ip(ip)
    }

    #[test]
    fn fifteen_distinct_ports_triggers_alert() {
        let mut events: Vec<Event> = (80..95).map(|p| blocked("203.0.113.7", p)).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = PortScan.evaluate(&events, &config);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].description.contains("203.0.113.7"));
        assert!(alerts[0].description.contains("15"));
    }

    #[test]
    fn allowed_traffic_across_many_ports_does_not_trigger() {
        let mut events: Vec<Event> = (80..95).map(|p| allowed("198.51.100.1", p)).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = PortScan.evaluate(&events, &config);
        assert!(alerts.is_empty());
    }
}
