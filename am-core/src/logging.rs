//! Logging setup using the `tracing` ecosystem.
//!
//! The client crates only emit events through the `tracing` macros and never
//! install a subscriber themselves. This helper wires up a minimal console
//! subscriber for binaries and tests that do not bring their own.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize a console-only tracing subscriber.
///
/// `level` accepts any `EnvFilter` directive ("debug", "am_api=trace", ...);
/// invalid directives fall back to "info". Subsequent calls are no-ops.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_new(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .compact(),
        )
        .try_init();
}
