//! Parses generic `/var/log/syslog` / `/var/log/messages` lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{Event, EventType, LogSource, Severity};

use super::common::parse_syslog_line;

static FAILED_TO_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"Failed to start (?P<unit>.+)\.").unwrap());
static STARTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Started (?P<unit>.+)\.$").unwrap());
static STOPPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Stopped (?P<unit>.+)\.$").unwrap());

pub fn parse(line: &str) -> Option<Event> {
    let prefix = parse_syslog_line(line)?;
    let msg = prefix.message.as_str();

    let (event_type, severity) = if FAILED_TO_START.is_match(msg) {
        (EventType::ServiceFailure, Severity::Error)
    } else if STARTED.is_match(msg) {
        (EventType::ServiceStart, Severity::Info)
    } else if STOPPED.is_match(msg) {
        (EventType::ServiceStop, Severity::Info)
    } else {
        let lower = msg.to_ascii_lowercase();
        if lower.contains("error") || lower.contains("failed") {
            (EventType::SystemError, Severity::Error)
        } else if lower.contains("warning") || lower.contains("warn") {
            (EventType::SystemWarning, Severity::Warning)
        } else {
            return None;
        }
    };

    let mut event = Event::new(prefix.event_time, event_type, severity, LogSource::Syslog, line)
        .with_host(prefix.host)
        .with_process(prefix.tag);
    if let Some(pid) = prefix.pid {
        event = event.with_pid(pid);
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_to_start_is_error() {
        let line = "Jan 5 03:14:15 myhost systemd[1]: Failed to start Apache.";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::ServiceFailure);
        assert_eq!(e.severity, Severity::Error);
    }

    #[test]
    fn started_is_info() {
        let line = "Jan 5 03:14:15 myhost systemd[1]: Started Session 1 of user root.";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::ServiceStart);
    }

    #[test]
    fn keyword_scan_catches_error() {
        let line = "Jan 5 03:14:15 myhost myapp[1]: something error occurred during init";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::SystemError);
    }

    #[test]
    fn keyword_scan_catches_warning() {
        let line = "Jan 5 03:14:15 myhost myapp[1]: disk usage warning at 90%";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::SystemWarning);
    }

    #[test]
    fn benign_line_is_dropped() {
        let line = "Jan 5 03:14:15 myhost myapp[1]: heartbeat ok";
        assert!(parse(line).is_none());
    }
}
