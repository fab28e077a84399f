use crate::config::Config;
use crate::event::{Alert, AlertType, Event, EventType, Severity};

use super::common::event_ids;
use super::Rule;

pub struct SystemInstability;

impl Rule for SystemInstability {
    fn name(&self) -> &'static str {
        "system_instability"
    }

    fn evaluate(&self, events: &[Event], config: &Config) -> Vec<Alert> {
        let cfg = &config.rules.system_instability;
        if !cfg.enabled {
            return Vec::new();
        }

        let kernel_class: Vec<&Event> = events
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    EventType::KernelError
                        | EventType::KernelWarning
                        | EventType::KernelSegfault
                        | EventType::KernelOom
                        | EventType::SystemError
                )
            })
            .collect();

        if kernel_class.len() < cfg.max_errors {
            return Vec::new();
        }

        let severe = kernel_class
            .iter()
            .any(|e| matches!(e.event_type, EventType::KernelSegfault | EventType::KernelOom));
        let severity = if severe { Severity::Critical } else { Severity::High };

        vec![Alert::new(
            AlertType::SystemInstability,
            severity,
            format!("system instability: {} kernel/system errors observed", kernel_class.len()),
            event_ids(&kernel_class),
        )]
    }
}
