//! Diagnostic tracing for developers.
//!
//! Operator-facing narration lives in `ui::formatter`; this module only
//! configures the `tracing` subscriber, which writes to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` when set. Otherwise defaults to `warn`, or to
/// `tagger=debug` with `verbose`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=tagger=trace tagger 2.1.0.0
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "tagger=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
