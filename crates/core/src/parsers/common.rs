//! Shared syslog prefix parsing used by the auth, syslog, kernel, and
//! firewall parser families.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed `MMM D HH:MM:SS HOST TAG[PID]: MESSAGE` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct SyslogLine {
    pub event_time: DateTime<Utc>,
    pub host: String,
    pub tag: String,
    pub pid: Option<i64>,
    pub message: String,
}

static SYSLOG_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<mon>[A-Za-z]{3})\s+(?P<day>\d{1,2})\s+
        (?P<time>\d{2}:\d{2}:\d{2})\s+
        (?P<host>\S+)\s+
        (?P<tag>[^:\[\s]+)(?:\[(?P<pid>\d+)\])?:\s*
        (?P<message>.*)$
        ",
    )
    .expect("static syslog prefix regex is valid")
});

/// Reconstructs a full timestamp from a syslog-style `MMM D HH:MM:SS`
/// fragment, attaching the current year and rolling back one year if the
/// result would land in the future (syslog timestamps omit the year).
pub fn reconstruct_timestamp(month: &str, day: u32, time: &str) -> Option<DateTime<Utc>> {
    let month_num = month_name_to_number(month)?;
    let now = Utc::now();
    let candidate = build_timestamp(now.year(), month_num, day, time)?;
    if candidate > now + chrono::Duration::minutes(5) {
        build_timestamp(now.year() - 1, month_num, day, time)
    } else {
        Some(candidate)
    }
}

fn build_timestamp(year: i32, month: u32, day: u32, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let mut parts = time.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = parts.next()?.parse().ok()?;
    let naive = NaiveDateTime::new(date, chrono::NaiveTime::from_hms_opt(hour, minute, second)?);
    Some(Utc.from_utc_datetime(&naive))
}

fn month_name_to_number(month: &str) -> Option<u32> {
    let m = match month.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// Parses the common `MMM D HH:MM:SS HOST TAG[PID]: MESSAGE` prefix shared
/// by auth, syslog, kernel, and firewall log lines.
pub fn parse_syslog_line(line: &str) -> Option<SyslogLine> {
    let caps = SYSLOG_PREFIX.captures(line)?;
    let event_time = reconstruct_timestamp(
        &caps["mon"],
        caps["day"].parse().ok()?,
        &caps["time"],
    )?;
    Some(SyslogLine {
        event_time,
        host: caps["host"].to_string(),
        tag: caps["tag"].to_string(),
        pid: caps.name("pid").and_then(|m| m.as_str().parse().ok()),
        message: caps["message"].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_prefix() {
        let line = "Jan 5 03:14:15 myhost sshd[1234]: Failed password for admin from 10.0.0.1";
        let parsed = parse_syslog_line(line).expect("should parse");
        assert_eq!(parsed.host, "myhost");
        assert_eq!(parsed.tag, "sshd");
        assert_eq!(parsed.pid, Some(1234));
        assert_eq!(parsed.message, "Failed password for admin from 10.0.0.1");
    }

    #[test]
    fn tag_without_pid() {
        let line = "Jan 5 03:14:15 myhost systemd: Started Session.";
        let parsed = parse_syslog_line(line).expect("should parse");
        assert_eq!(parsed.tag, "systemd");
        assert_eq!(parsed.pid, None);
    }

    #[test]
    fn future_timestamp_rolls_back_a_year() {
        let now = Utc::now();
        let next_year = now.year() + 1;
        // Construct a month/day combination that, with the *current* year
        // attached, would be in the future relative to `now` only if we
        // picked a date after today; instead verify indirectly that a
        // fixed known-past month resolves to this year or last.
        let parsed = reconstruct_timestamp("Dec", 31, "23:59:59");
        if let Some(ts) = parsed {
            assert!(ts.year() == now.year() || ts.year() == now.year() - 1);
            assert!(ts.year() < next_year);
        }
    }
}
