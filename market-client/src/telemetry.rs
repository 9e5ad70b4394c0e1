//! Tracing subscriber setup for applications embedding the client
//!
//! The library only emits events; installing a subscriber is up to the
//! binary.

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{ClientError, ClientResult};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,market_client=debug,tungstenite=warn";

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// `RUST_LOG` if set and valid, otherwise `default_filter`
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stdout subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(default_filter: &str, json_format: bool) -> ClientResult<()> {
    let filter = env_filter(default_filter);

    let result = if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_timer(LocalTimer).with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(LocalTimer)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()
    };

    result.map_err(|e| ClientError::Config(format!("Failed to install tracing subscriber: {e}")))
}
