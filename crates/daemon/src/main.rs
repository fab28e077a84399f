//! Host-resident security event pipeline daemon.
//!
//! Loads configuration, wires up the orchestrator (tailer set, store, rule
//! engine), and runs until SIGINT/SIGTERM triggers an orderly shutdown.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentrylog_core::config::Config;
use sentrylog_core::orchestrator::Orchestrator;

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    info!("starting sentrylog daemon");

    let mut orchestrator = match Orchestrator::new(config).await {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "failed to build orchestrator");
            std::process::exit(1);
        }
    };

    if let Err(e) = orchestrator.run_until_signal().await {
        error!(error = %e, "orchestrator exited with an error");
        std::process::exit(1);
    }

    info!("shutdown complete");
}

/// Layered configuration: a default file, an optional environment-specific
/// file, then environment variable overrides (`SENTRYLOG__DATABASE__PATH`,
/// etc.) — the same precedence order this codebase's other binaries use,
/// via the `config` crate.
fn load_config() -> Result<Config, config::ConfigError> {
    let run_env = std::env::var("SENTRYLOG_ENV").unwrap_or_else(|_| "development".into());

    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(config::Environment::with_prefix("SENTRYLOG").separator("__"))
        .build()?;

    settings.try_deserialize()
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("sentrylog_core={level},sentrylog_daemon={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
