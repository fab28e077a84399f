//! Parses `/var/log/audit/audit.log` (Linux audit subsystem) lines.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{Event, EventType, LogSource, Severity};

const UID_SENTINEL: &str = "4294967295";

static AUDIT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"type=(?P<type>\S+)\s+msg=audit\((?P<secs>\d+)\.(?P<millis>\d+):(?P<id>\d+)\):\s*(?P<details>.*)$")
        .unwrap()
});
static RES_SUCCESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bres=success\b").unwrap());
static UID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\buid=(?P<uid>\d+)").unwrap());
static AUID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bauid=(?P<auid>\d+)").unwrap());

pub fn parse(line: &str) -> Option<Event> {
    let caps = AUDIT_LINE.captures(line)?;
    let audit_type = &caps["type"];
    let details = &caps["details"];
    let secs: i64 = caps["secs"].parse().ok()?;
    let event_time: DateTime<Utc> = Utc.timestamp_opt(secs, 0).single()?;

    let (event_type, severity) = match audit_type {
        "USER_AUTH" => {
            if RES_SUCCESS.is_match(details) {
                (EventType::AuditAuthSuccess, Severity::Info)
            } else {
                (EventType::AuditAuthFailure, Severity::Warning)
            }
        }
        "USER_LOGIN" => (EventType::AuditUserLogin, Severity::Info),
        "USER_CMD" => (EventType::AuditUserCmd, Severity::Info),
        "EXECVE" => (EventType::AuditExecve, Severity::Info),
        "ADD_USER" => (EventType::AuditAddUser, Severity::Warning),
        "DEL_USER" => (EventType::AuditDelUser, Severity::Warning),
        "ADD_GROUP" => (EventType::AuditAddGroup, Severity::Warning),
        "DEL_GROUP" => (EventType::AuditDelGroup, Severity::Warning),
        "ANOM_ABEND" => (EventType::AuditCrash, Severity::Error),
        "AVC" => (EventType::AuditSelinuxDenial, Severity::Warning),
        other => (EventType::AuditOther(format!("AUDIT_{other}")), Severity::Info),
    };

    let mut event = Event::new(event_time, event_type, severity, LogSource::Audit, line);
    if let Some(c) = UID.captures(details) {
        if c["uid"] != *UID_SENTINEL {
            event = event.with_user(c["uid"].to_string());
        }
    } else if let Some(c) = AUID.captures(details) {
        if c["auid"] != *UID_SENTINEL {
            event = event.with_user(c["auid"].to_string());
        }
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_auth_success() {
        let line = "type=USER_AUTH msg=audit(1700000000.123:456): pid=1 uid=1000 auid=1000 res=success";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuditAuthSuccess);
        assert_eq!(e.user.as_deref(), Some("1000"));
    }

    #[test]
    fn user_auth_failure_default() {
        let line = "type=USER_AUTH msg=audit(1700000000.123:456): pid=1 uid=1000 auid=1000 res=failed";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuditAuthFailure);
        assert_eq!(e.severity, Severity::Warning);
    }

    #[test]
    fn sentinel_uid_is_skipped() {
        let line = "type=USER_LOGIN msg=audit(1700000000.123:456): pid=1 uid=4294967295 auid=4294967295 res=success";
        let e = parse(line).unwrap();
        assert_eq!(e.user, None);
    }

    #[test]
    fn anom_abend_is_crash() {
        let line = "type=ANOM_ABEND msg=audit(1700000000.123:456): pid=1 uid=0 sig=11";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuditCrash);
        assert_eq!(e.severity, Severity::Error);
    }

    #[test]
    fn unknown_type_falls_back_to_generic_audit_tag() {
        let line = "type=CONFIG_CHANGE msg=audit(1700000000.123:456): op=add-rule";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuditOther("AUDIT_CONFIG_CHANGE".to_string()));
        assert_eq!(e.severity, Severity::Info);
    }
}
