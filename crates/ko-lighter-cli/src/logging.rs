//! Tracing setup
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=ko_lighter=debug` - caret and marker decisions
//! - `RUST_LOG=ko_lighter::walker=trace` - every walk step

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a stderr subscriber; warnings only unless RUST_LOG says otherwise.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
