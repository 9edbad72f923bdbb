//! Log telemetry for the driver.
//!
//! Events are emitted through `tracing` and rendered by a fmt layer;
//! `RUST_LOG` controls the filter and defaults to `info`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: an env-filtered fmt layer.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
