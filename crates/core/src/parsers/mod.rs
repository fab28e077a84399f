//! Log-line parser families. Each is a pure function from a raw line to
//! either a normalized [`crate::event::Event`] or nothing.

pub mod audit;
pub mod auth;
pub mod autodetect;
pub mod common;
pub mod firewall;
pub mod kernel;
pub mod syslog;

pub use autodetect::{detect_log_source, parse, parse_auto};
