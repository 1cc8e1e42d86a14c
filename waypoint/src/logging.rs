//! Development-time tracing for the compiler and traversal commands.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: Dev diagnostics via `RUST_LOG`, output to stderr.
//!   Not persisted, not part of waypoint product output.
//!
//! - **Waypoint log (`io/log_sink`)**: The append-only journey log that progress
//!   is reconstructed from. Always written, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset, so skipped files and
/// validation issues still reach stderr.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=waypoint=debug waypoint compile ./curriculum -o curriculum.json
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
