//! Tracing subscriber initialization.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

/// Builds the event filter: `RUST_LOG` wins, the configured directive is the fallback.
fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), config)
}

fn build_filter(directives: Option<&str>, config: &TelemetryConfig) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(&config.filter))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: &str) -> TelemetryConfig {
        TelemetryConfig {
            filter: filter.to_string(),
            json: false,
        }
    }

    #[test]
    fn test_fallback_filter_is_used_without_env() {
        assert_eq!(build_filter(None, &config("folio=debug")).to_string(), "folio=debug");
    }

    #[test]
    fn test_env_directives_win() {
        assert_eq!(
            build_filter(Some("folio_core=trace"), &config("folio=debug")).to_string(),
            "folio_core=trace"
        );
    }

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
