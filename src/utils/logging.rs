//! Structured logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global subscriber built from `config`.
///
/// `RUST_LOG` wins over `config.log_level` when set. Returns `false` when a
/// subscriber was already installed or console output is disabled.
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.log_to_console {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let fmt_layer = fmt::layer().with_target(true).with_line_number(true);

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    }
    installed
}
