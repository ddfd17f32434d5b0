//! Collects email addresses submitted by several marketing sites into one shared store.

pub mod app;
pub mod collector;
pub mod config;
mod error;
pub mod model;
mod utils;
pub mod web;

use tracing_subscriber::EnvFilter;

// re-exports
pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;

/// Compact console logging for development. Defaults to `debug` unless `RUST_LOG` is set.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// Plain logging for deployments. Defaults to `info` unless `RUST_LOG` is set.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
