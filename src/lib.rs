pub mod config;
pub mod error;
pub mod explain;
pub mod features;
pub mod handlers;
pub mod location;
pub mod metrics;
pub mod model;
pub mod presenter;
pub mod server;
pub mod signals;
pub mod valuation;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Console log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize tracing/logging
///
/// Note: This function can only be called once. Logs go to stderr so that
/// command output on stdout (e.g. `estimate --json`) stays machine-readable.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}
