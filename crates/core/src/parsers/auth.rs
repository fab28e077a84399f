//! Parses `/var/log/auth.log` / `/var/log/secure` style lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{Event, EventType, LogSource, Severity};

use super::common::parse_syslog_line;

static FAILED_PASSWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Failed password for (?:invalid user )?(?P<user>\S+) from (?P<ip>\S+)").unwrap()
});
static ACCEPTED_PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Accepted password for (?P<user>\S+) from (?P<ip>\S+)").unwrap());
static ACCEPTED_PUBKEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Accepted publickey for (?P<user>\S+) from (?P<ip>\S+)").unwrap());
static INVALID_USER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Invalid user (?P<user>\S+) from (?P<ip>\S+)").unwrap());
static SUDO_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<user>\S+)\s*:\s*TTY=.*;\s*PWD=.*;\s*USER=.*;\s*COMMAND=").unwrap()
});
static SUDO_INCORRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<user>\S+)\s*:\s*\d+ incorrect password attempt").unwrap());
static SUDO_PAM_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"pam_unix\(sudo:auth\): authentication failure.*user=(?P<user>\S+)").unwrap()
});
static SESSION_OPENED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pam_unix\(\S+:session\): session opened for user (?P<user>\S+)").unwrap());
static SESSION_CLOSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pam_unix\(\S+:session\): session closed for user (?P<user>\S+)").unwrap());
static USER_CREATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"new user: name=(?P<user>\S+)").unwrap());
static PASSWORD_CHANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"password changed for (?P<user>\S+)").unwrap());
static GROUP_MEMBERSHIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"add '(?P<user>\S+)' to group '(?P<group>\S+)'").unwrap());
static DISCONNECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Disconnected|Connection closed).*from (?P<ip>\S+)").unwrap()
});

/// Parses a single auth-log line; returns `None` if it matches no known
/// pattern. First matching pattern wins, per the documented table.
pub fn parse(line: &str) -> Option<Event> {
    let prefix = parse_syslog_line(line)?;
    let msg = prefix.message.as_str();

    let (event_type, severity, user, ip): (EventType, Severity, Option<String>, Option<String>) =
        if let Some(c) = FAILED_PASSWORD.captures(msg) {
            (
                EventType::AuthFailure,
                Severity::Warning,
                Some(c["user"].to_string()),
                Some(c["ip"].to_string()),
            )
        } else if let Some(c) = ACCEPTED_PASSWORD.captures(msg) {
            (
                EventType::AuthSuccess,
                Severity::Info,
                Some(c["user"].to_string()),
                Some(c["ip"].to_string()),
            )
        } else if let Some(c) = ACCEPTED_PUBKEY.captures(msg) {
            (
                EventType::AuthSuccess,
                Severity::Info,
                Some(c["user"].to_string()),
                Some(c["ip"].to_string()),
            )
        } else if let Some(c) = INVALID_USER.captures(msg) {
            (
                EventType::AuthFailure,
                Severity::Warning,
                Some(c["user"].to_string()),
                Some(c["ip"].to_string()),
            )
        } else if let Some(c) = SUDO_COMMAND.captures(msg) {
            (EventType::SudoSuccess, Severity::Info, Some(c["user"].to_string()), None)
        } else if let Some(c) = SUDO_INCORRECT.captures(msg) {
            (EventType::SudoFailure, Severity::Warning, Some(c["user"].to_string()), None)
        } else if let Some(c) = SUDO_PAM_FAILURE.captures(msg) {
            (EventType::SudoFailure, Severity::Warning, Some(c["user"].to_string()), None)
        } else if let Some(c) = SESSION_OPENED.captures(msg) {
            (EventType::SessionStart, Severity::Info, Some(c["user"].to_string()), None)
        } else if let Some(c) = SESSION_CLOSED.captures(msg) {
            (EventType::SessionEnd, Severity::Info, Some(c["user"].to_string()), None)
        } else if let Some(c) = USER_CREATED.captures(msg) {
            (EventType::UserCreated, Severity::Warning, Some(c["user"].to_string()), None)
        } else if let Some(c) = PASSWORD_CHANGE.captures(msg) {
            (EventType::PasswordChange, Severity::Info, Some(c["user"].to_string()), None)
        } else if let Some(c) = GROUP_MEMBERSHIP.captures(msg) {
            (
                EventType::GroupMembershipChange,
                Severity::Warning,
                Some(c["user"].to_string()),
                None,
            )
        } else if let Some(c) = DISCONNECTED.captures(msg) {
            (EventType::ConnectionClosed, Severity::Info, None, Some(c["ip"].to_string()))
        } else {
            return None;
        };

    let mut event = Event::new(prefix.event_time, event_type, severity, LogSource::Auth, line)
        .with_host(prefix.host)
        .with_process(prefix.tag);
    if let Some(pid) = prefix.pid {
        event = event.with_pid(pid);
    }
    if let Some(user) = user {
        event = event.with_user(user);
    }
    if let Some(ip) = ip {
        event = event.with_src_ip(ip);
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_password_for_known_user() {
        let line = "Jan 5 03:14:15 myhost sshd[1]: Failed password for admin from 10.0.0.1 port 4242 ssh2";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuthFailure);
        assert_eq!(e.severity, Severity::Warning);
        assert_eq!(e.user.as_deref(), Some("admin"));
        assert_eq!(e.src_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn failed_password_for_invalid_user() {
        let line = "Jan 5 03:14:15 myhost sshd[1]: Failed password for invalid user root from 10.0.0.2 port 1 ssh2";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuthFailure);
        assert_eq!(e.user.as_deref(), Some("root"));
    }

    #[test]
    fn accepted_publickey() {
        let line = "Jan 5 03:14:15 myhost sshd[1]: Accepted publickey for alice from 10.0.0.3 port 1 ssh2";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::AuthSuccess);
        assert_eq!(e.user.as_deref(), Some("alice"));
    }

    #[test]
    fn sudo_command() {
        let line = "Jan 5 03:14:15 myhost sudo: www-data : TTY=pts/0 ; PWD=/ ; USER=root ; COMMAND=/bin/bash";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::SudoSuccess);
        assert_eq!(e.user.as_deref(), Some("www-data"));
    }

    #[test]
    fn sudo_pam_failure() {
        let line = "Jan 5 03:14:15 myhost sudo: pam_unix(sudo:auth): authentication failure; logname= uid=0 user=bob";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::SudoFailure);
        assert_eq!(e.user.as_deref(), Some("bob"));
    }

    #[test]
    fn unrelated_line_is_not_parsed() {
        let line = "Jan 5 03:14:15 myhost cron[1]: (root) CMD (run-parts)";
        assert!(parse(line).is_none());
    }
}
