//! Command-line configuration.
//!
//! This module contains the `clap` definition of the command line and the [`Settings`] it resolves
//! to once validated.

use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;

use crate::{
    clock::{FixedTimestep, DEFAULT_TICK_RATE},
    grid::Position,
    motion::{MotionConfig, DEFAULT_SPEED, DEFAULT_TILE_SIZE},
};

/// Command-line arguments for the simulator.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Map file to start with instead of the built-in maze.
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,
    /// Pixels the agent moves per tick. Must divide the tile size.
    #[arg(
        long,
        value_name = "PIXELS",
        default_value_t = DEFAULT_SPEED,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub speed: i32,
    /// Edge length of a tile in pixels.
    #[arg(
        long = "tile-size",
        value_name = "PIXELS",
        default_value_t = DEFAULT_TILE_SIZE,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub tile_size: i32,
    /// Simulation ticks per second.
    #[arg(
        long = "tick-rate",
        value_name = "HZ",
        default_value_t = DEFAULT_TICK_RATE,
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub tick_rate: u32,
    /// File to write logs to. Logging is off without it.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
    /// Headless action to run instead of the interface.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Headless actions.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Finds a path on the map and prints it.
    Solve {
        /// Tile to start from. Defaults to the agent's spawn tile.
        #[arg(long, value_name = "X,Y")]
        from: Option<CoordArg>,
        /// Tile to walk to.
        #[arg(long, value_name = "X,Y")]
        to: CoordArg,
    },
}

/// Tile coordinate parsed from an `X,Y` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordArg(pub Position);

impl FromStr for CoordArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .split_once(',')
            .ok_or_else(|| "expected format X,Y".to_owned())?;
        let x = x
            .trim()
            .parse::<usize>()
            .map_err(|error| format!("invalid x: {error}"))?;
        let y = y
            .trim()
            .parse::<usize>()
            .map_err(|error| format!("invalid y: {error}"))?;

        Ok(Self(Position::new(x, y)))
    }
}

impl Cli {
    /// Validates the arguments into settings.
    ///
    /// # Errors
    ///
    /// This function returns an error if the speed doesn't divide the tile size.
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            motion: MotionConfig::new(self.tile_size, self.speed)?,
            clock: FixedTimestep::new(self.tick_rate)?,
            map_file: self.map.clone(),
        })
    }
}

/// Validated runtime settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Tile size and speed handed to every new motion controller.
    pub motion: MotionConfig,
    /// Clock template handed to every new session.
    pub clock: FixedTimestep,
    /// Map file to start with, if any.
    pub map_file: Option<PathBuf>,
}

impl Settings {
    /// Switches to the next speed that divides the tile size, wrapping back to one.
    ///
    /// The options menu uses this to let the speed be changed without leaving the interface.
    pub fn cycle_speed(&mut self) {
        let tile_size = self.motion.tile_size();
        let next = (self.motion.speed() + 1..=tile_size)
            .find(|speed| tile_size % speed == 0)
            .unwrap_or(1);
        if let Ok(motion) = MotionConfig::new(tile_size, next) {
            self.motion = motion;
        }
    }
}
