use crate::config::AppConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Returns an error when a global subscriber is already set.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let layer = fmt::layer().json().with_target(true).with_ansi(false);
        registry.with(layer).try_init()?;
    } else {
        let layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(layer).try_init()?;
    }

    Ok(())
}
