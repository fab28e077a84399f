//! Routes a raw log line to the parser family for its first matching token.

use crate::event::{Event, LogSource};

use super::{audit, auth, firewall, kernel, syslog};

/// Picks a [`LogSource`] by inspecting the line's content, independent of
/// which file it came from. Used when a source file's kind is not known in
/// advance (e.g. a generic `/var/log/messages` that happens to carry audit
/// records).
pub fn detect_log_source(line: &str) -> LogSource {
    if line.contains("[UFW") {
        LogSource::Firewall
    } else if line.contains("type=") && line.contains("msg=audit") {
        LogSource::Audit
    } else if line.contains("kernel:") {
        LogSource::Kernel
    } else if line.contains("sshd") || line.contains("sudo") || line.contains("pam_unix") || line.contains("passwd") || line.contains("useradd") {
        LogSource::Auth
    } else {
        LogSource::Syslog
    }
}

/// Parses a line using the parser for the given log source.
pub fn parse(line: &str, log_source: LogSource) -> Option<Event> {
    match log_source {
        LogSource::Auth => auth::parse(line),
        LogSource::Syslog => syslog::parse(line),
        LogSource::Kernel => kernel::parse(line),
        LogSource::Firewall => firewall::parse(line),
        LogSource::Audit => audit::parse(line),
    }
}

/// Detects the log source from content, then parses with that family.
pub fn parse_auto(line: &str) -> Option<Event> {
    parse(line, detect_log_source(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_firewall() {
        let line = "Jan 5 03:14:15 myhost kernel: [UFW BLOCK] SRC=1.2.3.4 DST=5.6.7.8";
        assert_eq!(detect_log_source(line), LogSource::Firewall);
    }

    #[test]
    fn detects_audit() {
        let line = "type=USER_AUTH msg=audit(1700000000.123:1): res=success";
        assert_eq!(detect_log_source(line), LogSource::Audit);
    }

    #[test]
    fn detects_kernel() {
        let line = "Jan 5 03:14:15 myhost kernel: segfault at 0";
        assert_eq!(detect_log_source(line), LogSource::Kernel);
    }

    #[test]
    fn detects_auth() {
        let line = "Jan 5 03:14:15 myhost sshd[1]: Accepted password for alice from 1.2.3.4";
        assert_eq!(detect_log_source(line), LogSource::Auth);
    }

    #[test]
    fn falls_back_to_syslog() {
        let line = "Jan 5 03:14:15 myhost cron[1]: job ran";
        assert_eq!(detect_log_source(line), LogSource::Syslog);
    }
}
