//! Path-following motion module.
//!
//! This module contains the state machine that turns a discrete [`Path`] into continuous movement:
//! the agent keeps a tile position plus a pixel offset inside that tile, and every simulation tick
//! nudges the offset towards the next waypoint until a whole tile has been crossed.

use std::collections::VecDeque;

use color_eyre::eyre::{bail, Result};
use tracing::debug;

use crate::{grid::Position, pathfinding::Path};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: i32 = 32;

/// Default sub-tile step in pixels per tick.
pub const DEFAULT_SPEED: i32 = 2;

/// Tile size and speed of a motion controller.
///
/// The speed has to divide the tile size evenly. Offsets only ever change by whole steps, so this
/// guarantees they land exactly on the tile boundary where a waypoint is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionConfig {
    /// Tile edge length in pixels.
    tile_size: i32,
    /// Offset change per tick in pixels.
    speed: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            speed: DEFAULT_SPEED,
        }
    }
}

impl MotionConfig {
    /// Builds a validated motion configuration.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - The tile size or the speed is not positive
    /// - The speed does not divide the tile size evenly
    pub fn new(tile_size: i32, speed: i32) -> Result<Self> {
        if tile_size <= 0 {
            bail!("tile size must be positive, got {tile_size}");
        }
        if speed <= 0 {
            bail!("speed must be positive, got {speed}");
        }
        if tile_size % speed != 0 {
            bail!("speed {speed} does not divide the tile size {tile_size}");
        }

        Ok(Self { tile_size, speed })
    }

    /// Returns the tile edge length in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Returns the offset change per tick in pixels.
    #[must_use]
    pub const fn speed(&self) -> i32 {
        self.speed
    }
}

/// Phase of the motion state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    /// No active path; both offsets are zero.
    Idle,
    /// Advancing along the current path.
    Walking,
    /// Driving the offsets back to zero before walking a path that replaced the previous one.
    Reconciling,
}

/// Moves a stepped pixel offset towards zero without overshooting.
const fn settle(offset: i32, speed: i32) -> i32 {
    if offset > 0 {
        if offset > speed {
            offset - speed
        } else {
            0
        }
    } else if offset < -speed {
        offset + speed
    } else {
        0
    }
}

/// Agent that follows paths one tick at a time.
///
/// This structure owns the agent's position: the tile it is on and the pixel offset it has moved
/// away from that tile towards the next waypoint. Horizontal movement towards a waypoint always
/// finishes before vertical movement starts.
#[derive(Clone, Debug)]
pub struct MotionController {
    /// Tile size and speed.
    config: MotionConfig,
    /// Current phase.
    state: MotionState,
    /// Tile the agent is on.
    tile: Position,
    /// Horizontal pixel offset from the tile.
    offset_x: i32,
    /// Vertical pixel offset from the tile.
    offset_y: i32,
    /// Waypoints still to walk, next one first.
    waypoints: VecDeque<Position>,
}

impl MotionController {
    /// Creates an idle controller standing on `tile`.
    #[must_use]
    pub const fn new(tile: Position, config: MotionConfig) -> Self {
        Self {
            config,
            state: MotionState::Idle,
            tile,
            offset_x: 0,
            offset_y: 0,
            waypoints: VecDeque::new(),
        }
    }

    /// Returns the motion configuration.
    #[must_use]
    pub const fn config(&self) -> MotionConfig {
        self.config
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn state(&self) -> MotionState {
        self.state
    }

    /// Returns the tile the agent is on.
    #[must_use]
    pub const fn tile(&self) -> Position {
        self.tile
    }

    /// Returns the pixel offset from the tile as `(x, y)`.
    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Returns the waypoints still to walk.
    #[must_use]
    pub const fn remaining(&self) -> &VecDeque<Position> {
        &self.waypoints
    }

    /// Returns the agent's position in pixels, which is what a renderer draws.
    #[must_use]
    pub fn pixel_position(&self) -> (i64, i64) {
        let tile_size = i64::from(self.config.tile_size);
        let to_pixels = |coord: usize| i64::try_from(coord).map_or(i64::MAX, |coord| coord * tile_size);

        (
            to_pixels(self.tile.x) + i64::from(self.offset_x),
            to_pixels(self.tile.y) + i64::from(self.offset_y),
        )
    }

    /// Starts following a new path.
    ///
    /// While walking, the controller first reconciles: it drives its offset back to the current
    /// tile and only then starts on the new path. When idle, or already reconciling, it switches
    /// to walking the new path right away.
    ///
    /// # Errors
    ///
    /// This function returns an error if the path does not start from the agent's tile. The
    /// controller is left untouched in that case.
    pub fn follow_path(&mut self, path: Path) -> Result<()> {
        let origin = path.origin();
        if origin != self.tile {
            bail!(
                "path starts at ({}, {}) but the agent is on ({}, {})",
                origin.x,
                origin.y,
                self.tile.x,
                self.tile.y
            );
        }

        self.waypoints = path.into_steps().into();
        let next = match self.state {
            MotionState::Walking => MotionState::Reconciling,
            MotionState::Idle | MotionState::Reconciling => MotionState::Walking,
        };
        self.transition(next);

        Ok(())
    }

    /// Advances the agent by one simulation tick.
    pub fn update(&mut self) {
        match self.state {
            MotionState::Idle => {}
            MotionState::Reconciling => self.reconcile(),
            MotionState::Walking => self.walk(),
        }
    }

    /// Changes phase, logging the change.
    fn transition(&mut self, next: MotionState) {
        if self.state != next {
            debug!(
                from = ?self.state,
                to = ?next,
                tile_x = self.tile.x,
                tile_y = self.tile.y,
                "motion state changed"
            );
            self.state = next;
        }
    }

    /// Moves both offsets one step closer to zero, then resumes walking once both are there.
    fn reconcile(&mut self) {
        self.offset_x = settle(self.offset_x, self.config.speed);
        self.offset_y = settle(self.offset_y, self.config.speed);

        if self.offset_x == 0 && self.offset_y == 0 {
            self.transition(MotionState::Walking);
        }
    }

    /// Moves one step towards the next waypoint, committing it once a whole tile is crossed.
    fn walk(&mut self) {
        let speed = self.config.speed;
        let Some(&next) = self.waypoints.front() else {
            if self.offset_x == 0 && self.offset_y == 0 {
                self.transition(MotionState::Idle);
            } else {
                self.offset_x = settle(self.offset_x, speed);
                self.offset_y = settle(self.offset_y, speed);
            }
            return;
        };

        if next.x != self.tile.x {
            if self.offset_y != 0 {
                self.offset_y = settle(self.offset_y, speed);
                return;
            }
            self.offset_x += if next.x < self.tile.x { -speed } else { speed };
            if self.offset_x.abs() >= self.config.tile_size {
                self.offset_x %= self.config.tile_size;
                self.commit();
            }
        } else if next.y != self.tile.y {
            if self.offset_x != 0 {
                self.offset_x = settle(self.offset_x, speed);
                return;
            }
            self.offset_y += if next.y < self.tile.y { -speed } else { speed };
            if self.offset_y.abs() >= self.config.tile_size {
                self.offset_y %= self.config.tile_size;
                self.commit();
            }
        } else {
            let _ = self.waypoints.pop_front();
        }
    }

    /// Pops the next waypoint and moves onto it.
    fn commit(&mut self) {
        if let Some(next) = self.waypoints.pop_front() {
            self.tile = next;
        }
    }
}
