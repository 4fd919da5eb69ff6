//! Tracing setup.
//!
//! The library crates only emit `tracing` events; whoever hosts them picks
//! a subscriber. These helpers install the usual one: an env-driven filter
//! (`RUST_LOG`) over the fmt layer.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "algoscope=info,algoscope_trace=info,algoscope_algos=info,algoscope_playback=info";

/// Install the global subscriber with [`DEFAULT_DIRECTIVES`] as fallback.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    init_with(DEFAULT_DIRECTIVES)
}

/// Install the global subscriber, falling back to `directives` when
/// `RUST_LOG` is unset or unparsable.
pub fn init_with(directives: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let fmt_layer = fmt::layer().with_target(true).compact();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(directives, "tracing initialized");
    }
    installed
}

/// Debug-level output captured by the test harness. Safe to call from every
/// test; only the first call installs anything.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_for_tests();
        assert!(!init());
        tracing::info!("still logging");
    }
}
