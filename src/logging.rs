//! Tracing subscriber setup for the binary.
//!
//! Events go to stderr so stdout stays clean for JSON output.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding an `EnvFilter` directive, e.g. `mapf_replay=debug`.
pub const LOG_ENV: &str = "MAPF_REPLAY_LOG";

/// The filter directive to use when [`LOG_ENV`] is unset or blank.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Install the global subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let directive = std::env::var(LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());
    let filter = directive
        .as_deref()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level(verbose)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
        tracing::info!("still alive");
    }
}
