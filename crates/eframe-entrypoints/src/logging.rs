//! Logging initialization
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`. When the
//! variable is unset a build-dependent default is used. With the `profiling`
//! feature, `profiling::scope!` markers become tracing spans and show up in
//! the same output at `trace` level.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,eframe::native=warn,egui::context=warn,hyper_util=info,reqwest::connect=info,walkers=info"
    } else {
        "info,eframe=warn,walkers=info"
    }
}

/// Initialize the global subscriber. Calling it twice only logs a warning.
pub fn setup_logging() {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_filter()), false),
    };

    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    if let Err(e) = registry.try_init() {
        tracing::warn!("Logging already initialized: {}", e);
        return;
    }

    if !from_env {
        tracing::info!("RUST_LOG not set, using default: {}", default_filter());
    }
    #[cfg(feature = "profiling")]
    tracing::info!("Profiling scopes are reported as tracing spans");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_valid() {
        assert!(EnvFilter::try_new(default_filter()).is_ok());
    }
}
