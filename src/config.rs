//! Command line and the validated settings built from it.

use clap::Parser;

use crate::{
    engine::BubbleStyle,
    error::ConfigError,
    packer::PackParams,
};

pub const DEFAULT_WIDTH: u32 = 540;
pub const DEFAULT_HEIGHT: u32 = 960;
pub const DEFAULT_MIN_RADIUS: i32 = 20;
pub const DEFAULT_MAX_RADIUS: i32 = 250;
pub const DEFAULT_PADDING: i32 = 50;
pub const DEFAULT_RETRIES: u32 = 50;
pub const DEFAULT_FPS: u32 = 60;

#[derive(Parser, Debug)]
#[command(about = "Animated bubble wallpaper", version)]
pub struct Args {
    /// Initial surface size as WIDTHxHEIGHT
    #[arg(long, default_value = "540x960")]
    pub size: String,

    /// Smallest bubble radius in pixels
    #[arg(long, default_value_t = DEFAULT_MIN_RADIUS, allow_negative_numbers = true)]
    pub min_radius: i32,

    /// Largest bubble radius in pixels
    #[arg(long, default_value_t = DEFAULT_MAX_RADIUS, allow_negative_numbers = true)]
    pub max_radius: i32,

    /// Minimum gap between bubbles and to the surface edge
    #[arg(long, default_value_t = DEFAULT_PADDING, allow_negative_numbers = true)]
    pub padding: i32,

    /// Placement attempts per bubble before the surface counts as full
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    #[arg(long, value_enum, default_value_t = BubbleStyle::Themed)]
    pub style: BubbleStyle,

    /// Index into the accent color table
    #[arg(long, default_value_t = 0)]
    pub theme: usize,

    /// Start in night mode
    #[arg(long)]
    pub night: bool,

    /// Frame rate cap of the window host
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Seed for a reproducible layout
    #[arg(long)]
    pub seed: Option<u64>,

    /// Draw into the terminal instead of a window
    #[arg(long)]
    pub terminal: bool,
}

/// Everything a host needs to set up an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub params: PackParams,
    pub style: BubbleStyle,
    pub theme: usize,
    pub night: bool,
    pub fps: u32,
    pub seed: Option<u64>,
    pub terminal: bool,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let (width, height) = parse_size(&args.size)?;

        if args.fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }

        let params = PackParams::new(args.min_radius, args.max_radius, args.padding, args.retries)?;

        Ok(Self {
            width,
            height,
            params,
            style: args.style,
            theme: args.theme,
            night: args.night,
            fps: args.fps,
            seed: args.seed,
            terminal: args.terminal,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            params: PackParams::default(),
            style: BubbleStyle::Themed,
            theme: 0,
            night: false,
            fps: DEFAULT_FPS,
            seed: None,
            terminal: false,
        }
    }
}

/// Parses `WIDTHxHEIGHT`. Both sides must be non-zero.
pub fn parse_size(s: &str) -> Result<(u32, u32), ConfigError> {
    let bad = || ConfigError::BadSize(s.to_string());

    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
    let w = w.trim().parse::<u32>().map_err(|_| bad())?;
    let h = h.trim().parse::<u32>().map_err(|_| bad())?;

    if w == 0 || h == 0 {
        return Err(bad());
    }

    Ok((w, h))
}
