//! A tile-grid agent simulator.
//!
//! The core of the crate is free of any interface concerns: [`grid::Grid`] holds an immutable
//! walkability matrix, [`pathfinding::Pathfinder`] runs A* over it and
//! [`motion::MotionController`] moves an agent along the resulting [`pathfinding::Path`] a few
//! pixels per tick. [`clock::FixedTimestep`] turns frame time into those ticks.
//!
//! [`App`] wraps the core in a terminal interface built on Ratatui, where the agent walks to
//! whatever tile the cursor picks.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod app;
pub mod clock;
pub mod config;
mod events;
mod file_loader;
pub mod grid;
pub mod logging;
mod map;
pub mod motion;
pub mod pathfinding;
mod session;
mod types;
mod ui;

pub use app::App;
