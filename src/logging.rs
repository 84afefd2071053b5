//! Process-wide `tracing` setup shared by both binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Filter directive (`info`, `linkshelf=debug`, ...). `RUST_LOG` wins when set.
    pub level: String,
    pub include_targets: bool,
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_targets: true,
            ansi: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Builds the filter, preferring `RUST_LOG` and falling back to `info`
    /// when the configured directive does not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Output goes to stderr so stdout stays free
/// for JSON-RPC responses and CLI results.
pub fn init(config: LoggerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_targets)
        .with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console_layer)
        .try_init()?;

    tracing::debug!(level = %config.level, "logging initialized");
    Ok(())
}
