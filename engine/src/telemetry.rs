//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging.
//! The filter comes from `RUST_LOG` when set, else from `core.log_level`
//! (or the `--log` flag). Output is pretty in debug builds and JSON in release.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose events follow the configured level
const OWN_TARGETS: [&str; 3] = ["raggit_engine", "api_server", "sdk"];

/// Build the default filter directive for `log_level`.
///
/// Dependencies stay at `warn` so HTTP client chatter doesn't drown pipeline logs.
pub fn default_filter(log_level: &str) -> String {
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{}={}", target, log_level));
    }
    directive
}

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}
