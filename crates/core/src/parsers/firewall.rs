//! Parses `/var/log/ufw.log` and generic firewall lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{Event, EventType, LogSource, Severity};

use super::common::parse_syslog_line;

static UFW_ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[UFW (?P<action>[A-Z]+)\]").unwrap());
static GENERIC_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(BLOCK|DROP|REJECT)\b").unwrap());
static GENERIC_ALLOW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(ALLOW|ACCEPT)\b").unwrap());
static SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r"SRC=(?P<ip>\S+)").unwrap());
static DST: Lazy<Regex> = Lazy::new(|| Regex::new(r"DST=(?P<ip>\S+)").unwrap());

pub fn parse(line: &str) -> Option<Event> {
    let prefix = parse_syslog_line(line)?;
    let msg = prefix.message.as_str();

    let (event_type, severity) = if let Some(c) = UFW_ACTION.captures(msg) {
        match &c["action"] {
            "BLOCK" => (EventType::FirewallBlock, Severity::Warning),
            "ALLOW" => (EventType::FirewallAllow, Severity::Info),
            "AUDIT" => (EventType::FirewallAudit, Severity::Info),
            _ => (EventType::FirewallEvent, Severity::Info),
        }
    } else if GENERIC_BLOCK.is_match(msg) {
        (EventType::FirewallBlock, Severity::Warning)
    } else if GENERIC_ALLOW.is_match(msg) {
        (EventType::FirewallAllow, Severity::Info)
    } else {
        (EventType::FirewallEvent, Severity::Info)
    };

    let mut event = Event::new(prefix.event_time, event_type, severity, LogSource::Firewall, line)
        .with_host(prefix.host)
        .with_process(prefix.tag);
    if let Some(c) = SRC.captures(msg) {
        event = event.with_src_ip(c["ip"].to_string());
    }
    if let Some(c) = DST.captures(msg) {
        event = event.with_dst_ip(c["ip"].to_string());
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ufw_block_extracts_ips() {
        let line = "Jan 5 03:14:15 myhost kernel: [UFW BLOCK] IN=eth0 OUT= SRC=203.0.113.7 DST=10.0.0.5 PROTO=TCP SPT=4444 DPT=80";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::FirewallBlock);
        assert_eq!(e.severity, Severity::Warning);
        assert_eq!(e.src_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(e.dst_ip.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn ufw_allow_is_info() {
        let line = "Jan 5 03:14:15 myhost kernel: [UFW ALLOW] IN=eth0 SRC=1.2.3.4 DST=5.6.7.8 PROTO=UDP";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::FirewallAllow);
    }

    #[test]
    fn generic_drop_line_is_firewall_block() {
        let line = "Jan 5 03:14:15 myhost iptables: DROP SRC=9.9.9.9 DST=1.1.1.1";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::FirewallBlock);
    }

    #[test]
    fn unrecognized_ufw_action_is_firewall_event() {
        let line = "Jan 5 03:14:15 myhost kernel: [UFW NOTIFY] IN=eth0 SRC=1.2.3.4 DST=5.6.7.8";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::FirewallEvent);
    }

    #[test]
    fn generic_line_with_no_action_keyword_is_firewall_event() {
        let line = "Jan 5 03:14:15 myhost iptables: SRC=1.2.3.4 DST=5.6.7.8 PROTO=TCP";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::FirewallEvent);
    }
}
