//! In-game simulation state.
//!
//! This module ties the core together for the interface: it owns the grid built from the selected
//! map, the agent's motion controller, the goal cursor and the clock that converts frame time into
//! ticks.

use std::time::{Duration, Instant};

use color_eyre::eyre::{OptionExt as _, Result};
use tracing::{info, warn};

use crate::{
    clock::FixedTimestep,
    config::Settings,
    grid::{Grid, Position},
    map::Map,
    motion::MotionController,
    pathfinding::Pathfinder,
    types::Direction,
};

/// Running simulation for one map.
#[derive(Debug)]
pub(crate) struct Session {
    /// Walkability of the map being played.
    pub(crate) grid: Grid,
    /// The agent.
    pub(crate) controller: MotionController,
    /// Tile the next walk request targets.
    pub(crate) cursor: Position,
    /// Converts frame time into ticks.
    pub(crate) clock: FixedTimestep,
    /// Timestamp of the last clock update.
    pub(crate) last_update_time: Instant,
    /// Message shown in the status line, if any.
    pub(crate) status: Option<String>,
}

impl Session {
    /// Starts a session on `map` with the agent on the map's first walkable tile.
    ///
    /// # Errors
    ///
    /// This function returns an error if the map is not rectangular or has no walkable tile.
    pub(crate) fn new(map: &Map, settings: &Settings) -> Result<Self> {
        let grid = map.grid()?;
        let spawn = grid
            .first_walkable()
            .ok_or_eyre("map has no walkable tile to spawn on")?;
        info!(map = %map.key, x = spawn.x, y = spawn.y, "session started");

        Ok(Self {
            grid,
            controller: MotionController::new(spawn, settings.motion),
            cursor: spawn,
            clock: settings.clock,
            last_update_time: Instant::now(),
            status: None,
        })
    }

    /// Moves the cursor one tile, staying inside the grid.
    pub(crate) fn move_cursor(&mut self, direction: Direction) {
        let (dx, dy) = direction.delta();
        if let Some(next) = self.cursor.offset(dx, dy) {
            if self.grid.contains(next) {
                self.cursor = next;
            }
        }
    }

    /// Sends the agent towards the cursor.
    ///
    /// A blocked target is refused with a status message. Otherwise the path from the agent's
    /// tile is computed and handed to the controller, replacing whatever it was doing.
    ///
    /// # Errors
    ///
    /// This function returns an error if the search or the controller rejects its input, which
    /// would mean the cursor or the agent left the grid.
    pub(crate) fn request_walk(&mut self) -> Result<()> {
        let target = self.cursor;
        if !self.grid.is_walkable(target.x, target.y) {
            warn!(x = target.x, y = target.y, "refused walk to blocked tile");
            self.status = Some("can't walk to that tile".to_owned());
            return Ok(());
        }

        let start = self.controller.tile();
        let path = Pathfinder::new(&self.grid).find_path(start, target)?;
        self.status = if path.is_empty() && start != target {
            Some(format!("no path to ({}, {})", target.x, target.y))
        } else {
            None
        };
        info!(
            from_x = start.x,
            from_y = start.y,
            to_x = target.x,
            to_y = target.y,
            steps = path.len(),
            "walk requested"
        );

        self.controller.follow_path(path)
    }

    /// Feeds `elapsed` into the clock and runs the ticks it yields.
    ///
    /// Returns the number of ticks that ran.
    pub(crate) fn advance(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            self.controller.update();
        }

        ticks
    }

    /// Advances the simulation by the wall-clock time since the last update.
    pub(crate) fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update_time);
        self.last_update_time = now;
        let _ = self.advance(elapsed);
    }
}
