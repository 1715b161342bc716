//! Tracing/logging initialization for the gateway binary.
//!
//! Log lines go through `tracing_subscriber` with an env-filter; the
//! output is either human-readable or one JSON object per line for log
//! aggregation.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Pretty }
    }
}

/// Build the env-filter, preferring `RUST_LOG` over `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global tracing subscriber.
///
/// * `default_filter` -- filter used when `RUST_LOG` is unset or invalid
///   (e.g. `"gptweb_server=info,tower_http=info"`).
/// * `format` -- pretty or JSON output.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_selects_format() {
        assert_eq!(LogFormat::from_json_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_json_flag(false), LogFormat::Pretty);
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
