//! Tracing setup driven by [`LoggingConfig`].
//!
//! The filter sits behind a reload layer: `main` installs the subscriber
//! with defaults before the config file is read, then swaps in the
//! configured filter. `RUST_LOG`, when set, wins over both.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Builds the filter described by `logging`, ignoring `RUST_LOG`.
///
/// # Errors
/// Returns a message naming the offending directive when a level does not
/// parse.
pub fn build_filter(logging: &LoggingConfig) -> Result<EnvFilter, String> {
    let directives = logging.directives();
    EnvFilter::try_new(&directives)
        .map_err(|e| format!("logging filter {directives:?} is invalid: {e}"))
}

fn active_filter(logging: &LoggingConfig) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    build_filter(logging).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Later calls leave the first one in place.
pub fn init_tracing(logging: &LoggingConfig) {
    let (filter, handle) = reload::Layer::new(active_filter(logging));
    let _ = FILTER_HANDLE.set(handle);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Replaces the active filter with the one `logging` describes.
///
/// A no-op while `RUST_LOG` is set or before [`init_tracing`] ran.
///
/// # Errors
/// Returns the [`build_filter`] error for an unparsable level; the active
/// filter is kept.
pub fn apply_logging_config(logging: &LoggingConfig) -> Result<(), String> {
    let filter = build_filter(logging)?;
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(());
    }
    if let Some(handle) = FILTER_HANDLE.get() {
        handle
            .modify(|f| *f = filter)
            .map_err(|e| format!("failed to reload log filter: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str, targets: &[(&str, &str)]) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            targets: targets
                .iter()
                .map(|(t, l)| (t.to_string(), l.to_string()))
                .collect(),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_directives_include_target_overrides() {
        let cfg = logging("WARN", &[("portal_auth", "debug"), ("tower_http", "Info")]);
        assert_eq!(cfg.directives(), "warn,portal_auth=debug,tower_http=info");
        assert!(build_filter(&cfg).is_ok());
    }

    #[test]
    fn test_bad_target_level_rejected() {
        let cfg = logging("info", &[("portal_server", "loud")]);
        let err = build_filter(&cfg).unwrap_err();
        assert!(err.contains("portal_server=loud"));
        assert!(apply_logging_config(&cfg).is_err());
    }

    #[test]
    fn test_init_then_apply() {
        init_tracing(&LoggingConfig::default());
        init_tracing(&LoggingConfig::default());
        assert!(apply_logging_config(&logging("debug", &[("portal_server", "trace")])).is_ok());
    }
}
