mod app;
mod chain;
mod config;
mod input;
mod logging;
mod render;
mod solver;

use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let settings = config::Settings::from_args(config::Args::parse()).context("invalid arguments")?;
    logging::init(settings.log_file.as_deref())?;
    app::run(settings)
}
