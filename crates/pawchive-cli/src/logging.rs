//! Tracing subscriber setup
//!
//! Logs go to stderr so command output on stdout stays parseable.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber; `RUST_LOG` wins over the configured filter
pub(crate) fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter '{}'", config.filter))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.context("failed to install tracing subscriber")
}
