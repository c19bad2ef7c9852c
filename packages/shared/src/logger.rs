//! Logging setup for the Kaiwa binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LIBRARY_TARGET: &str = "kaiwa_server";

/// Build the default filter directive for the given binary.
///
/// The server library and the binary target both get `default_log_level`;
/// `tower_http` stays at `info`.
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    if binary == LIBRARY_TARGET {
        format!("{LIBRARY_TARGET}={default_log_level},tower_http=info")
    } else {
        format!("{LIBRARY_TARGET}={default_log_level},{binary}={default_log_level},tower_http=info")
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the default directive when it is set.
///
/// # Examples
///
/// ```no_run
/// use kaiwa_shared::logger::setup_logger;
///
/// setup_logger("kaiwa-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
