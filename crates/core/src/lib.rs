pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod multireader;
pub mod orchestrator;
pub mod parsers;
pub mod rules;
pub mod store;
pub mod tailer;

pub use config::Config;
pub use error::{Error, ErrorCode, Result};
pub use event::{Alert, AlertStatus, AlertType, Event, EventType, LogSource, Platform, Severity};
pub use orchestrator::Orchestrator;
pub use store::Store;

pub use chrono::{DateTime, Utc};
