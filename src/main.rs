//! sidebar: calendar, bin schedule and weather panels for a home-automation
//! dashboard, drawn on a Wayland layer-shell surface.
//!
//! Run with:  `RUST_LOG=info sidebar`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging: RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("sidebar v{} starting", env!("CARGO_PKG_VERSION"));

    sidebar_wayland::run().map_err(Into::into)
}
