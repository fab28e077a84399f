//! The normalized security event and alert types persisted by the [`crate::store::Store`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity shared by events and alerts. `medium` and `high` only ever
/// appear on alerts; `error` only ever appears on events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    /// Normalizes any case variant (`WARNING`, `Critical`, ...) to the
    /// canonical lowercase set. Legacy severities observed in the wild
    /// collapse onto the nearest canonical member.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Auth,
    Syslog,
    Kernel,
    Firewall,
    Audit,
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogSource::Auth => "auth",
            LogSource::Syslog => "syslog",
            LogSource::Kernel => "kernel",
            LogSource::Firewall => "firewall",
            LogSource::Audit => "audit",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LogSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(LogSource::Auth),
            "syslog" => Ok(LogSource::Syslog),
            "kernel" => Ok(LogSource::Kernel),
            "firewall" => Ok(LogSource::Firewall),
            "audit" => Ok(LogSource::Audit),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Macos,
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Linux
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Macos => "macos",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::Macos),
            _ => Err(()),
        }
    }
}

/// Event type tags. Stored as opaque strings; the literal spelling matters
/// to consumers, hence `SCREAMING_SNAKE_CASE` rather than a derived rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    AuthFailure,
    AuthSuccess,
    SudoSuccess,
    SudoFailure,
    SessionStart,
    SessionEnd,
    UserCreated,
    PasswordChange,
    GroupMembershipChange,
    ConnectionClosed,
    ServiceFailure,
    ServiceStart,
    ServiceStop,
    SystemError,
    SystemWarning,
    KernelSegfault,
    KernelOom,
    UsbDeviceConnected,
    KernelError,
    KernelWarning,
    FirewallBlock,
    FirewallAllow,
    FirewallAudit,
    /// Any UFW action or generic firewall line that isn't block/allow/audit
    /// (the original's `UFWLogParser` fallback event type).
    FirewallEvent,
    AuditAuthSuccess,
    AuditAuthFailure,
    AuditUserLogin,
    AuditUserCmd,
    AuditExecve,
    AuditAddUser,
    AuditDelUser,
    AuditAddGroup,
    AuditDelGroup,
    AuditCrash,
    AuditSelinuxDenial,
    /// Generic audit catch-all for any `type=` not otherwise enumerated;
    /// carries the full computed tag, e.g. `AUDIT_CONFIG_CHANGE`.
    AuditOther(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::AuthFailure => "AUTH_FAILURE",
            EventType::AuthSuccess => "AUTH_SUCCESS",
            EventType::SudoSuccess => "SUDO_SUCCESS",
            EventType::SudoFailure => "SUDO_FAILURE",
            EventType::SessionStart => "SESSION_START",
            EventType::SessionEnd => "SESSION_END",
            EventType::UserCreated => "USER_CREATED",
            EventType::PasswordChange => "PASSWORD_CHANGE",
            EventType::GroupMembershipChange => "GROUP_MEMBERSHIP_CHANGE",
            EventType::ConnectionClosed => "CONNECTION_CLOSED",
            EventType::ServiceFailure => "SERVICE_FAILURE",
            EventType::ServiceStart => "SERVICE_START",
            EventType::ServiceStop => "SERVICE_STOP",
            EventType::SystemError => "SYSTEM_ERROR",
            EventType::SystemWarning => "SYSTEM_WARNING",
            EventType::KernelSegfault => "KERNEL_SEGFAULT",
            EventType::KernelOom => "KERNEL_OOM",
            EventType::UsbDeviceConnected => "USB_DEVICE_CONNECTED",
            EventType::KernelError => "KERNEL_ERROR",
            EventType::KernelWarning => "KERNEL_WARNING",
            EventType::FirewallBlock => "FIREWALL_BLOCK",
            EventType::FirewallAllow => "FIREWALL_ALLOW",
            EventType::FirewallAudit => "FIREWALL_AUDIT",
            EventType::FirewallEvent => "FIREWALL_EVENT",
            EventType::AuditAuthSuccess => "AUDIT_AUTH_SUCCESS",
            EventType::AuditAuthFailure => "AUDIT_AUTH_FAILURE",
            EventType::AuditUserLogin => "AUDIT_LOGIN",
            EventType::AuditUserCmd => "AUDIT_COMMAND",
            EventType::AuditExecve => "AUDIT_EXEC",
            EventType::AuditAddUser => "AUDIT_ADD_USER",
            EventType::AuditDelUser => "AUDIT_DEL_USER",
            EventType::AuditAddGroup => "AUDIT_ADD_GROUP",
            EventType::AuditDelGroup => "AUDIT_DEL_GROUP",
            EventType::AuditCrash => "AUDIT_CRASH",
            EventType::AuditSelinuxDenial => "AUDIT_SELINUX_DENIAL",
            EventType::AuditOther(tag) => tag.as_str(),
        }
    }

    /// Treats `AUTH_FAILURE` and the legacy `FAILED_LOGIN` tag as synonyms
    /// for rule input, per the design-note decision on that ambiguity.
    pub fn is_auth_failure_like(&self) -> bool {
        matches!(self, EventType::AuthFailure)
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Some(match s {
            "AUTH_FAILURE" | "FAILED_LOGIN" => EventType::AuthFailure,
            "AUTH_SUCCESS" => EventType::AuthSuccess,
            "SUDO_SUCCESS" => EventType::SudoSuccess,
            "SUDO_FAILURE" => EventType::SudoFailure,
            "SESSION_START" => EventType::SessionStart,
            "SESSION_END" => EventType::SessionEnd,
            "USER_CREATED" => EventType::UserCreated,
            "PASSWORD_CHANGE" => EventType::PasswordChange,
            "GROUP_MEMBERSHIP_CHANGE" => EventType::GroupMembershipChange,
            "CONNECTION_CLOSED" => EventType::ConnectionClosed,
            "SERVICE_FAILURE" => EventType::ServiceFailure,
            "SERVICE_START" => EventType::ServiceStart,
            "SERVICE_STOP" => EventType::ServiceStop,
            "SYSTEM_ERROR" => EventType::SystemError,
            "SYSTEM_WARNING" => EventType::SystemWarning,
            "KERNEL_SEGFAULT" => EventType::KernelSegfault,
            "KERNEL_OOM" => EventType::KernelOom,
            "USB_DEVICE_CONNECTED" => EventType::UsbDeviceConnected,
            "KERNEL_ERROR" => EventType::KernelError,
            "KERNEL_WARNING" => EventType::KernelWarning,
            "FIREWALL_BLOCK" => EventType::FirewallBlock,
            "FIREWALL_ALLOW" => EventType::FirewallAllow,
            "FIREWALL_AUDIT" => EventType::FirewallAudit,
            "FIREWALL_EVENT" => EventType::FirewallEvent,
            "AUDIT_AUTH_SUCCESS" => EventType::AuditAuthSuccess,
            "AUDIT_AUTH_FAILURE" => EventType::AuditAuthFailure,
            "AUDIT_LOGIN" => EventType::AuditUserLogin,
            "AUDIT_COMMAND" => EventType::AuditUserCmd,
            "AUDIT_EXEC" => EventType::AuditExecve,
            "AUDIT_ADD_USER" => EventType::AuditAddUser,
            "AUDIT_DEL_USER" => EventType::AuditDelUser,
            "AUDIT_ADD_GROUP" => EventType::AuditAddGroup,
            "AUDIT_DEL_GROUP" => EventType::AuditDelGroup,
            "AUDIT_CRASH" => EventType::AuditCrash,
            "AUDIT_SELINUX_DENIAL" => EventType::AuditSelinuxDenial,
            s if s.starts_with("AUDIT_") => EventType::AuditOther(s.to_string()),
            _ => return None,
        })
    }
}

impl std::str::FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::parse_str(s).ok_or(())
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    BruteForce,
    SuspiciousSudo,
    SudoAbuse,
    FirewallAttack,
    PortScan,
    SystemInstability,
    ServiceFailures,
    PrivilegeEscalation,
    AnomalousLogin,
    RapidLogin,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::BruteForce => "BRUTE_FORCE",
            AlertType::SuspiciousSudo => "SUSPICIOUS_SUDO",
            AlertType::SudoAbuse => "SUDO_ABUSE",
            AlertType::FirewallAttack => "FIREWALL_ATTACK",
            AlertType::PortScan => "PORT_SCAN",
            AlertType::SystemInstability => "SYSTEM_INSTABILITY",
            AlertType::ServiceFailures => "SERVICE_FAILURES",
            AlertType::PrivilegeEscalation => "PRIVILEGE_ESCALATION",
            AlertType::AnomalousLogin => "ANOMALOUS_LOGIN",
            AlertType::RapidLogin => "RAPID_LOGIN",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlertType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRUTE_FORCE" => Ok(AlertType::BruteForce),
            "SUSPICIOUS_SUDO" => Ok(AlertType::SuspiciousSudo),
            "SUDO_ABUSE" => Ok(AlertType::SudoAbuse),
            "FIREWALL_ATTACK" => Ok(AlertType::FirewallAttack),
            "PORT_SCAN" => Ok(AlertType::PortScan),
            "SYSTEM_INSTABILITY" => Ok(AlertType::SystemInstability),
            "SERVICE_FAILURES" => Ok(AlertType::ServiceFailures),
            "PRIVILEGE_ESCALATION" => Ok(AlertType::PrivilegeEscalation),
            "ANOMALOUS_LOGIN" => Ok(AlertType::AnomalousLogin),
            "RAPID_LOGIN" => Ok(AlertType::RapidLogin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Dismissed,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertStatus::Active => "active",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Dismissed => "dismissed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            "dismissed" => Ok(AlertStatus::Dismissed),
            _ => Err(()),
        }
    }
}

/// A single observation of interest, produced by a parser and immutable
/// once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub event_time: DateTime<Utc>,
    pub host: Option<String>,
    pub process: Option<String>,
    pub pid: Option<i64>,
    pub event_type: EventType,
    pub severity: Severity,
    pub user: Option<String>,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub log_source: LogSource,
    pub platform: Platform,
    pub raw_message: String,
}

impl Event {
    /// Builds an unpersisted event; the store assigns `id` and `created_at`
    /// on insert.
    pub fn new(
        event_time: DateTime<Utc>,
        event_type: EventType,
        severity: Severity,
        log_source: LogSource,
        raw_message: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            event_time,
            host: None,
            process: None,
            pid: None,
            event_type,
            severity,
            user: None,
            src_ip: None,
            dst_ip: None,
            log_source,
            platform: Platform::default(),
            raw_message: raw_message.into(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_src_ip(mut self, ip: impl Into<String>) -> Self {
        self.src_ip = Some(ip.into());
        self
    }

    pub fn with_dst_ip(mut self, ip: impl Into<String>) -> Self {
        self.dst_ip = Some(ip.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = Some(process.into());
        self
    }

    pub fn with_pid(mut self, pid: i64) -> Self {
        self.pid = Some(pid);
        self
    }
}

/// A detection emitted by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub description: String,
    pub related_event_ids: Vec<i64>,
    pub status: AlertStatus,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        description: impl Into<String>,
        related_event_ids: Vec<i64>,
    ) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            alert_type,
            severity,
            description: description.into(),
            related_event_ids,
            status: AlertStatus::Active,
        }
    }
}
