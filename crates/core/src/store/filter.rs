//! Query filters for events and alerts, built fluently like this
//! codebase's `AuditFilterBuilder`.

use chrono::{DateTime, Utc};

use crate::event::{AlertType, EventType, LogSource, Platform, Severity};

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub platform: Option<Platform>,
    pub user: Option<String>,
    pub src_ip: Option<String>,
    pub severity: Option<Severity>,
    pub log_source: Option<LogSource>,
    pub search: Option<String>,
    pub since_minutes: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_type(mut self, v: EventType) -> Self {
        self.event_type = Some(v);
        self
    }

    pub fn platform(mut self, v: Platform) -> Self {
        self.platform = Some(v);
        self
    }

    pub fn user(mut self, v: impl Into<String>) -> Self {
        self.user = Some(v.into());
        self
    }

    pub fn src_ip(mut self, v: impl Into<String>) -> Self {
        self.src_ip = Some(v.into());
        self
    }

    pub fn severity(mut self, v: Severity) -> Self {
        self.severity = Some(v);
        self
    }

    pub fn log_source(mut self, v: LogSource) -> Self {
        self.log_source = Some(v);
        self
    }

    pub fn search(mut self, v: impl Into<String>) -> Self {
        self.search = Some(v.into());
        self
    }

    pub fn since_minutes(mut self, minutes: i64) -> Self {
        self.since_minutes = Some(minutes);
        self
    }

    pub fn from(mut self, v: DateTime<Utc>) -> Self {
        self.from = Some(v);
        self
    }

    pub fn to(mut self, v: DateTime<Utc>) -> Self {
        self.to = Some(v);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub alert_type: Option<AlertType>,
    pub severity: Option<Severity>,
    pub status: Option<crate::event::AlertStatus>,
    pub since_minutes: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AlertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_type(mut self, v: AlertType) -> Self {
        self.alert_type = Some(v);
        self
    }

    pub fn severity(mut self, v: Severity) -> Self {
        self.severity = Some(v);
        self
    }

    pub fn status(mut self, v: crate::event::AlertStatus) -> Self {
        self.status = Some(v);
        self
    }

    pub fn since_minutes(mut self, minutes: i64) -> Self {
        self.since_minutes = Some(minutes);
        self
    }

    pub fn from(mut self, v: DateTime<Utc>) -> Self {
        self.from = Some(v);
        self
    }

    pub fn to(mut self, v: DateTime<Utc>) -> Self {
        self.to = Some(v);
        self
    }
}
