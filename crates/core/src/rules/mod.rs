//! The rule catalog: named detectors evaluated in declaration order against
//! a slice of recently stored events.

mod anomalous_login;
mod brute_force;
mod common;
mod firewall_attack;
mod port_scan;
mod privilege_escalation;
mod rapid_login;
mod service_failure;
mod suspicious_sudo;
mod system_instability;

use crate::config::Config;
use crate::event::{Alert, Event};

/// A pure function over a slice of recent events, returning zero or more
/// candidate alerts. Implementations must never panic; a rule that would
/// raise is expected to return an empty vector and let the engine log the
/// failure via `catch_unwind` at the call site.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert>;
}

/// Returns the catalog in the declaration order from the rule catalog
/// specification. Order matters: privilege-escalation and suspicious-sudo
/// share predicates and must run in this sequence for stable test output.
pub fn catalog() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(brute_force::BruteForce),
        Box::new(suspicious_sudo::SuspiciousSudo),
        Box::new(firewall_attack::FirewallAttack),
        Box::new(port_scan::PortScan),
        Box::new(system_instability::SystemInstability),
        Box::new(service_failure::ServiceFailure),
        Box::new(privilege_escalation::PrivilegeEscalation),
        Box::new(anomalous_login::AnomalousLogin),
        Box::new(rapid_login::RapidLogin),
    ]
}
