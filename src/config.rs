use crate::render::Rgba;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

// Tentacle geometry, in braille sub-pixels (2×4 per terminal cell).
pub(crate) const SEGMENT_COUNT: usize = 30;
pub(crate) const SEGMENT_LENGTH: f32 = 3.0;
pub(crate) const BASE_WIDTH: f32 = 5.0;
pub(crate) const TENTACLE_HUE: f32 = 180.0;

/// Painted over the whole surface every tick; low alpha leaves a motion trail.
pub(crate) const TRAIL: Rgba = Rgba {
    r: 17,
    g: 17,
    b: 17,
    a: 0.25,
};

pub(crate) const MIN_FPS: u32 = 10;
pub(crate) const MAX_FPS: u32 = 240;

/// A tentacle that chases the mouse pointer around the terminal.
#[derive(Parser, Debug)]
#[command(name = "tentacle", version)]
pub(crate) struct Args {
    /// frame cap (clamped to 10..=240)
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    /// monochrome braille output
    #[arg(long)]
    pub(crate) no_color: bool,

    /// write tracing output here (filtered by RUST_LOG, default info)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// extra safety rows to not use at the bottom
    #[arg(long, default_value_t = 0)]
    pub(crate) margin_rows: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("fps must be greater than zero")]
    ZeroFps,
    #[error("margin of {margin} rows leaves nothing to draw on a {rows}-row terminal")]
    NoDrawableRows { margin: u16, rows: u16 },
}

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) margin_rows: u16,
    pub(crate) log_file: Option<PathBuf>,
}

impl Settings {
    pub(crate) fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        Ok(Self {
            fps_cap: args.fps.clamp(MIN_FPS, MAX_FPS),
            enable_color: !args.no_color,
            margin_rows: args.margin_rows,
            log_file: args.log_file,
        })
    }

    /// The margin is only checkable once the terminal size is known.
    pub(crate) fn check_fits(&self, rows: u16) -> Result<(), ConfigError> {
        if self.margin_rows >= rows {
            return Err(ConfigError::NoDrawableRows {
                margin: self.margin_rows,
                rows,
            });
        }
        Ok(())
    }
}
