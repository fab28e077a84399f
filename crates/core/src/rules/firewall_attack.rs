use std::collections::HashSet;

use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::{event_ids, extract_dport, group_by};
use super::Rule;

/// Groups `FIREWALL_BLOCK` events by source IP; a high-volume source is
/// reclassified as a port scan if it touched many distinct destination
/// ports, otherwise as a generic firewall attack.
pub struct FirewallAttack;

impl Rule for FirewallAttack {
    fn name(&self) -> &'static str {
        "firewall_attack"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.firewall_attack;
        if !cfg.enabled {
            return Vec::new();
        }

        let blocks: Vec<Event> = events
            .iter()
            .filter(|e| e.event_type == EventType::FirewallBlock)
            .cloned()
            .collect();

        let mut alerts = Vec::new();
        for (src_ip, group) in group_by(&blocks, |e| e.src_ip.clone()) {
            if group.len() < cfg.max_blocks {
                continue;
            }
            let ports: HashSet<String> = group.iter().filter_map(|e| extract_dport(e)).collect();
            if ports.len() > cfg.port_scan_threshold {
                alerts.push(Alert::new(
                    AlertType::PortScan,
                    Severity::Critical,
                    format!("port scan from src_ip={src_ip} ({} distinct ports)", ports.len()),
                    event_ids(&group),
                ));
            } else {
                alerts.push(Alert::new(
                    AlertType::FirewallAttack,
                    Severity::High,
                    format!("firewall attack from src_ip={src_ip} ({} blocks)", group.len()),
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

    fn block(ip: &str, port: u32) -> Event {
        Event::new(
            Utc::now(),
            EventType::FirewallBlock,
            Severity::Warning,
            LogSource::Firewall,
            format!("[UFW BLOCK] SRC={ip} DST=10.0.0.5 PROTO=TCP DPT={port}"),
        )
        .with_src_ip(ip)
    }

    #[test]
    fn high_volume_many_ports_is_port_scan() {
        let mut events: Vec<Event> = (0..20).map(|i| block("203.0.113.7", 1000 + i)).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = FirewallAttack.evaluate(&events, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::PortScan);
    }

    #[test]
    fn high_volume_single_port_is_firewall_attack() {
        let mut events: Vec<Event> = (0..20).map(|_| block("203.0.113.7", 80)).collect();
        for (i, e) in events.iter_mut().enumerate() {
            e.id = i as i64 + 1;
        }
        let config = Config::default();
        let alerts = FirewallAttack.evaluate(&events, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::FirewallAttack);
    }
}
