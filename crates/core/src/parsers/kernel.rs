//! Parses `/var/log/kern.log` lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{Event, EventType, LogSource, Severity};

use super::common::parse_syslog_line;

static KERNEL_TIMESTAMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\s*\d+\.\d+\]\s*").unwrap());
static OOM_KILL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Out of memory: Kill(?:ed)? process (?P<pid>\d+)").unwrap());
static USB_DEVICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"usb .*new .*USB device").unwrap());

pub fn parse(line: &str) -> Option<Event> {
    let prefix = parse_syslog_line(line)?;
    if !prefix.tag.to_ascii_lowercase().contains("kernel") {
        return None;
    }
    let msg = KERNEL_TIMESTAMP.replace(prefix.message.as_str(), "");
    let msg_lower = msg.to_ascii_lowercase();

    let (event_type, severity) = if msg_lower.contains("segfault") {
        (EventType::KernelSegfault, Severity::Error)
    } else if OOM_KILL.is_match(&msg) {
        (EventType::KernelOom, Severity::Critical)
    } else if USB_DEVICE.is_match(&msg_lower) {
        (EventType::UsbDeviceConnected, Severity::Info)
    } else if msg_lower.contains("error") {
        (EventType::KernelError, Severity::Error)
    } else if msg_lower.contains("warning") || msg_lower.contains("warn") {
        (EventType::KernelWarning, Severity::Warning)
    } else {
        return None;
    };

    let event = Event::new(prefix.event_time, event_type, severity, LogSource::Kernel, line)
        .with_host(prefix.host)
        .with_process(prefix.tag);
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segfault_is_error() {
        let line = "Jan 5 03:14:15 myhost kernel: [12345.678] myapp[1234]: segfault at 0 ip 0 sp 0 error 4";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::KernelSegfault);
        assert_eq!(e.severity, Severity::Error);
    }

    #[test]
    fn oom_kill_is_critical() {
        let line = "Jan 5 03:14:15 myhost kernel: Out of memory: Kill process 1234 (myapp) score 900";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::KernelOom);
        assert_eq!(e.severity, Severity::Critical);
    }

    #[test]
    fn usb_device_connected() {
        let line = "Jan 5 03:14:15 myhost kernel: usb 1-1: new high-speed USB device number 2";
        let e = parse(line).unwrap();
        assert_eq!(e.event_type, EventType::UsbDeviceConnected);
    }

    #[test]
    fn non_kernel_tag_is_skipped() {
        let line = "Jan 5 03:14:15 myhost sshd[1]: segfault should not classify here";
        assert!(parse(line).is_none());
    }
}
