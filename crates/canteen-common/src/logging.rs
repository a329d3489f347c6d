//! Shared tracing bootstrap for every service binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a stdout `tracing` subscriber honoring `RUST_LOG`, defaulting
/// to `info` for our own crates and `warn` for dependencies.
pub fn init_tracing(service_name: &str) {
    let default_filter = format!("info,{service_name}=debug");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
