//! Pathfinding algorithm module.
//!
//! This module contains the A* search over a [`Grid`] and the [`Path`] type it produces. The search
//! is four-directional with a uniform step cost and the Manhattan distance as its heuristic.

use std::{cmp::Reverse, collections::BinaryHeap};

use color_eyre::eyre::{bail, OptionExt as _, Result};
use tracing::debug;

use crate::grid::{Grid, Position};

/// Neighbour offsets in expansion order: left, right, up, down.
///
/// The order matters for which of several equally short paths the search returns, so it must not
/// be shuffled.
const NEIGHBOUR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Ordered sequence of tiles to walk.
///
/// This structure holds the steps from the tile next to the origin up to and including the goal.
/// The origin itself is not a step; it is kept alongside so that a consumer can check the path
/// applies to where the agent actually stands. Every step is orthogonally adjacent to the previous
/// one, the first step being adjacent to the origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    /// Tile the path starts from.
    origin: Position,
    /// Tiles to walk through, in order, ending with the goal.
    steps: Vec<Position>,
}

impl Path {
    /// Builds a path from an origin and its steps.
    ///
    /// # Errors
    ///
    /// This function returns an error if any step is not orthogonally adjacent to its predecessor,
    /// the origin being the predecessor of the first step.
    pub fn new(origin: Position, steps: Vec<Position>) -> Result<Self> {
        let mut previous = origin;
        for (idx, &step) in steps.iter().enumerate() {
            if !previous.is_adjacent(step) {
                bail!(
                    "path step {idx} at ({}, {}) is not adjacent to ({}, {})",
                    step.x,
                    step.y,
                    previous.x,
                    previous.y
                );
            }
            previous = step;
        }

        Ok(Self { origin, steps })
    }

    /// Builds a path with no steps.
    #[must_use]
    pub const fn empty(origin: Position) -> Self {
        Self {
            origin,
            steps: Vec::new(),
        }
    }

    /// Returns the tile the path starts from.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Returns the steps of the path.
    #[must_use]
    pub fn steps(&self) -> &[Position] {
        &self.steps
    }

    /// Returns the last step, which is the goal, if the path has any steps.
    #[must_use]
    pub fn goal(&self) -> Option<Position> {
        self.steps.last().copied()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Checks whether the path has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consumes the path and returns its steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<Position> {
        self.steps
    }
}

/// Search bookkeeping for a single tile.
///
/// A record exists only for tiles the search has discovered, and only for the duration of one
/// [`Pathfinder::find_path`] call.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    /// Tile this record belongs to. Two records are the same node if their positions match.
    position: Position,
    /// Cost from the start tile.
    g: usize,
    /// Manhattan distance to the goal. Set once on discovery and never revisited.
    h: usize,
    /// Arena index of the node this one was reached from. Only the start node has none.
    parent: Option<usize>,
    /// Order in which the node first entered the open set, used to break ties on `f`.
    rank: usize,
    /// Whether the node has been finalized.
    closed: bool,
}

impl SearchNode {
    /// Estimated total cost of a path through this node.
    const fn f(&self) -> usize {
        self.g + self.h
    }
}

/// Transient state of one search.
///
/// The records live in an arena and are found through a table indexed like the grid, which stands
/// in for open and closed set membership checks. The frontier is a min-heap keyed by `(f, rank)`;
/// lowering a node's cost pushes a second entry and the outdated one is skipped when popped.
struct Search<'grid> {
    /// Grid being searched.
    grid: &'grid Grid,
    /// Tile the search is heading to.
    goal: Position,
    /// Arena of discovered nodes.
    nodes: Vec<SearchNode>,
    /// Arena index for every grid tile that has been discovered.
    slots: Vec<Option<usize>>,
    /// Frontier entries as `(f, rank, arena index)`.
    frontier: BinaryHeap<Reverse<(usize, usize, usize)>>,
}

impl<'grid> Search<'grid> {
    /// Creates an empty search towards `goal`.
    fn new(grid: &'grid Grid, goal: Position) -> Self {
        Self {
            grid,
            goal,
            nodes: Vec::new(),
            slots: vec![None; grid.len()],
            frontier: BinaryHeap::new(),
        }
    }

    /// Adds a newly discovered tile to the open set.
    fn open(&mut self, position: Position, g: usize, parent: Option<usize>) -> Result<()> {
        let slot = self
            .grid
            .index_of(position)
            .and_then(|idx| self.slots.get_mut(idx))
            .ok_or_eyre("search position lies outside the grid")?;
        let idx = self.nodes.len();
        *slot = Some(idx);

        let node = SearchNode {
            position,
            g,
            h: position.manhattan(self.goal),
            parent,
            rank: idx,
            closed: false,
        };
        self.frontier.push(Reverse((node.f(), node.rank, idx)));
        self.nodes.push(node);

        Ok(())
    }

    /// Pops the open node with the lowest `f` and moves it to the closed set.
    ///
    /// Ties go to the node that entered the open set first. Returns [`None`] once the open set is
    /// exhausted.
    fn close_lowest(&mut self) -> Option<usize> {
        while let Some(Reverse((f, _, idx))) = self.frontier.pop() {
            let Some(node) = self.nodes.get_mut(idx) else {
                continue;
            };
            if node.closed || node.f() != f {
                continue;
            }
            node.closed = true;
            return Some(idx);
        }

        None
    }

    /// Considers reaching `position` from the node at `current`.
    ///
    /// Undiscovered tiles are opened with `current` as their parent. Open tiles are reparented if
    /// the route through `current` is strictly cheaper; their rank and heuristic stay as they were.
    fn relax(&mut self, current: usize, position: Position) -> Result<()> {
        let g = self
            .nodes
            .get(current)
            .ok_or_eyre("search node missing from arena")?
            .g
            + 1;
        let slot = self
            .grid
            .index_of(position)
            .and_then(|idx| self.slots.get(idx).copied())
            .ok_or_eyre("search position lies outside the grid")?;

        let Some(idx) = slot else {
            return self.open(position, g, Some(current));
        };
        let node = self
            .nodes
            .get_mut(idx)
            .ok_or_eyre("search node missing from arena")?;
        if !node.closed && g < node.g {
            node.g = g;
            node.parent = Some(current);
            self.frontier.push(Reverse((node.f(), node.rank, idx)));
        }

        Ok(())
    }

    /// Checks whether the tile at `position` has been finalized.
    fn is_closed(&self, position: Position) -> bool {
        self.grid
            .index_of(position)
            .and_then(|idx| self.slots.get(idx).copied().flatten())
            .and_then(|idx| self.nodes.get(idx))
            .is_some_and(|node| node.closed)
    }

    /// Walks parent links back from `end` and returns the path from `origin`.
    fn reconstruct(&self, origin: Position, end: usize) -> Result<Path> {
        let mut steps = Vec::new();
        let mut node = self
            .nodes
            .get(end)
            .ok_or_eyre("search node missing from arena")?;
        while let Some(parent) = node.parent {
            steps.push(node.position);
            node = self
                .nodes
                .get(parent)
                .ok_or_eyre("search node missing from arena")?;
        }
        steps.reverse();

        Path::new(origin, steps)
    }
}

/// A* search over a grid.
///
/// This structure borrows the grid it searches. Every call to [`find_path`](Pathfinder::find_path)
/// builds its own bookkeeping, so the pathfinder itself holds no mutable state and may be shared
/// freely.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder<'grid> {
    /// Grid to search.
    grid: &'grid Grid,
}

impl<'grid> Pathfinder<'grid> {
    /// Creates a pathfinder over the given grid.
    #[must_use]
    pub const fn new(grid: &'grid Grid) -> Self {
        Self { grid }
    }

    /// Finds a shortest path from `start` to `goal`.
    ///
    /// The returned path excludes the start tile and ends at the goal. It is empty when the start
    /// already is the goal and when the goal can't be reached. Among several shortest paths the
    /// one returned is fixed by the expansion order (left, right, up, down) and by the open set's
    /// tie-break, which prefers the node discovered first.
    ///
    /// # Errors
    ///
    /// This function returns an error if either `start` or `goal` lies outside the grid.
    pub fn find_path(&self, start: Position, goal: Position) -> Result<Path> {
        for (name, position) in [("start", start), ("goal", goal)] {
            if !self.grid.contains(position) {
                bail!(
                    "{name} ({}, {}) lies outside the {}x{} grid",
                    position.x,
                    position.y,
                    self.grid.width(),
                    self.grid.height()
                );
            }
        }

        if start == goal {
            return Ok(Path::empty(start));
        }

        let mut search = Search::new(self.grid, goal);
        search.open(start, 0, None)?;

        while let Some(current) = search.close_lowest() {
            let position = search
                .nodes
                .get(current)
                .ok_or_eyre("search node missing from arena")?
                .position;

            if position == goal {
                let path = search.reconstruct(start, current)?;
                debug!(
                    discovered = search.nodes.len(),
                    steps = path.len(),
                    "path found from ({}, {}) to ({}, {})",
                    start.x,
                    start.y,
                    goal.x,
                    goal.y
                );
                return Ok(path);
            }

            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let Some(neighbour) = position.offset(dx, dy) else {
                    continue;
                };
                if !self.grid.is_walkable(neighbour.x, neighbour.y) || search.is_closed(neighbour)
                {
                    continue;
                }
                search.relax(current, neighbour)?;
            }
        }

        debug!(
            discovered = search.nodes.len(),
            "no path from ({}, {}) to ({}, {})",
            start.x,
            start.y,
            goal.x,
            goal.y
        );

        Ok(Path::empty(start))
    }
}
