//! Plain configuration bag consumed by the pipeline core.
//!
//! This struct carries no file-loading logic of its own — per the core's
//! contract it is handed a ready-made `Config`, the same way this codebase
//! separates its layered `config`-crate loading (environment file + env var
//! overrides) from the struct the rest of the application actually reads.
//! The daemon binary owns that loading step.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub use_mock_data: bool,
    pub analysis: AnalysisConfig,
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            use_mock_data: false,
            analysis: AnalysisConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "security_events.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub interval_seconds: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub brute_force: BruteForceConfig,
    pub suspicious_sudo: SuspiciousSudoConfig,
    pub firewall_attack: FirewallAttackConfig,
    pub port_scan: PortScanConfig,
    pub system_instability: SystemInstabilityConfig,
    pub service_failure: ServiceFailureConfig,
    pub privilege_escalation: PrivilegeEscalationConfig,
    pub anomalous_login: AnomalousLoginConfig,
    pub rapid_login: RapidLoginConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            brute_force: BruteForceConfig::default(),
            suspicious_sudo: SuspiciousSudoConfig::default(),
            firewall_attack: FirewallAttackConfig::default(),
            port_scan: PortScanConfig::default(),
            system_instability: SystemInstabilityConfig::default(),
            service_failure: ServiceFailureConfig::default(),
            privilege_escalation: PrivilegeEscalationConfig::default(),
            anomalous_login: AnomalousLoginConfig::default(),
            rapid_login: RapidLoginConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForceConfig {
    pub enabled: bool,
    pub max_attempts: usize,
    pub window_minutes: u32,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            window_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspiciousSudoConfig {
    pub enabled: bool,
    pub watchlist: Vec<String>,
    pub max_failures: usize,
}

impl Default for SuspiciousSudoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watchlist: vec!["www-data".to_string(), "nobody".to_string(), "guest".to_string()],
            max_failures: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallAttackConfig {
    pub enabled: bool,
    pub max_blocks: usize,
    pub port_scan_threshold: usize,
}

impl Default for FirewallAttackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_blocks: 20,
            port_scan_threshold: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortScanConfig {
    pub enabled: bool,
    pub min_ports: usize,
}

impl Default for PortScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_ports: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInstabilityConfig {
    pub enabled: bool,
    pub max_errors: usize,
}

impl Default for SystemInstabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_errors: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceFailureConfig {
    pub enabled: bool,
    pub max_failures: usize,
}

impl Default for ServiceFailureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failures: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegeEscalationConfig {
    pub enabled: bool,
    pub watchlist: Vec<String>,
}

impl Default for PrivilegeEscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watchlist: vec![
                "www-data", "nobody", "guest", "daemon", "apache", "nginx", "mysql", "postgres",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalousLoginConfig {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for AnomalousLoginConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 0,
            end_hour: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RapidLoginConfig {
    pub enabled: bool,
    pub max_logins: usize,
    pub min_distinct_ips: usize,
}

impl Default for RapidLoginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_logins: 5,
            min_distinct_ips: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog() {
        let cfg = Config::default();
        assert_eq!(cfg.rules.brute_force.max_attempts, 5);
        assert_eq!(cfg.rules.port_scan.min_ports, 10);
        assert!(!cfg.rules.anomalous_login.enabled);
        assert_eq!(cfg.analysis.interval_seconds, 60);
    }
}
