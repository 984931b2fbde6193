mod app;
mod config;
mod input;
mod logging;
mod phase;
mod render;
mod sim;
mod table;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "stellarevo")]
#[command(about = "Watch a star of a chosen mass live and die in your terminal", long_about = None)]
pub(crate) struct Args {
    /// Initial stellar mass in solar masses (0.5 to 50, step 0.5)
    #[arg(long)]
    mass: Option<f64>,

    /// Simulation tick in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Wall-clock time each phase is shown for, in milliseconds
    #[arg(long)]
    phase_ms: Option<u64>,

    /// FPS cap (render rate). The clock ticks at a fixed rate regardless.
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for the background star field
    #[arg(long)]
    seed: Option<u64>,

    /// Monochrome output
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Draw with plain characters instead of braille dots
    #[arg(long, default_value_t = false)]
    ascii: bool,

    /// Write tracing output to this file (RUST_LOG filters it)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Begin evolving immediately
    #[arg(long, default_value_t = false)]
    autostart: bool,

    /// Do not write display toggles back to the settings file
    #[arg(long, default_value_t = false)]
    no_save: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    app::run(&args)
}
