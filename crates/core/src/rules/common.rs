//! Shared helpers used by several catalog rules.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::event::Event;

static DPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"DPT=(?P<port>\d+)").unwrap());

/// Extracts the destination port from a firewall event's raw message, if
/// present.
pub fn extract_dport(event: &Event) -> Option<String> {
    DPT.captures(&event.raw_message).map(|c| c["port"].to_string())
}

/// Groups events by a key, preserving first-seen order of the keys.
pub fn group_by<'a, F>(events: &'a [Event], mut key_of: F) -> Vec<(String, Vec<&'a Event>)>
where
    F: FnMut(&'a Event) -> Option<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&'a Event>> = HashMap::new();
    for event in events {
        if let Some(key) = key_of(event) {
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(event);
        }
    }
    order.into_iter().map(|k| { let v = groups.remove(&k).unwrap_or_default(); (k, v) }).collect()
}

pub fn event_ids(events: &[&Event]) -> Vec<i64> {
    events.iter().map(|e| e.id).collect()
}
