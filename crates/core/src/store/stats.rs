//! The aggregate statistics shape returned by [`super::Store::stats`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourlyCount {
    pub hour: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_events: i64,
    pub total_alerts: i64,
    pub events_by_type: HashMap<String, i64>,
    pub events_by_os: HashMap<String, i64>,
    pub events_by_severity: HashMap<String, i64>,
    pub alerts_by_severity: HashMap<String, i64>,
    pub alerts_by_status: HashMap<String, i64>,
    pub top_source_ips: Vec<NamedCount>,
    pub top_users: Vec<NamedCount>,
    pub hourly_events: Vec<HourlyCount>,
    pub failed_logins: i64,
    pub successful_logins: i64,
    pub unique_ips: i64,
}
