//! Logging setup emitting JSON lines (or human readable text) via `tracing`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::common::config::{AppCfg, LogFormat};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `cfg.log_filter` when set. Returns `false` if a
/// subscriber was already installed, which happens when a host calls init twice.
pub fn init(cfg: &AppCfg) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match cfg.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    };
    installed.is_ok()
}
