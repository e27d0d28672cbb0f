//! # Xytopia
//!
//! Entry point for the Xytopia tile world.
//!
//! This crate ties together all subsystems:
//! - World: terrain generation and tile placement
//! - Kernel: the headless stage, arcade physics and camera
//! - Gameplay: input, avatar, scenes and the portfolio signal
//! - Shell: switching between the game and the portfolio view

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod script;
mod shell;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("xytopia=info".parse()?))
        .init();

    info!("Xytopia starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("--write-config") {
        let path = args.next().unwrap_or_else(|| "xytopia.toml".to_string());
        app::write_default_config(std::path::Path::new(&path))?;
        info!("Wrote default config to {path}");
        return Ok(());
    }

    let summary = app::run()?;

    info!(
        frames = summary.frames,
        steps = summary.steps,
        portfolio_visits = summary.portfolio_visits,
        view = ?summary.final_view,
        "Xytopia shutdown complete"
    );
    Ok(())
}
