use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr log subscriber
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Stdout is
/// reserved for observation lines.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}
