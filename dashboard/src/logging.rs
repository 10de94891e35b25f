//! Structured logging for the dashboard, built on `tracing-subscriber`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xdr_core::error::AppError;

use crate::config::LoggingConfig;

/// Filter applied when `RUST_LOG` is not set.
pub fn default_directives(config: &LoggingConfig) -> String {
    format!(
        "xdr_core={level},xdr_dashboard={level}",
        level = config.level
    )
}

/// Installs the global subscriber. A second call leaves the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(config)).map_err(|e| {
            AppError::new("LOGGING_INIT_FAILED", "Invalid log filter")
                .with_details(e.to_string())
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        tracing::debug!(err = %e, "logging already initialised");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_both_crates() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            json: false,
        };
        assert_eq!(
            default_directives(&config),
            "xdr_core=debug,xdr_dashboard=debug"
        );
    }

    #[test]
    fn init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init_logging(&config).expect("first");
        init_logging(&config).expect("second");
    }
}
