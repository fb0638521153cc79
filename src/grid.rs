//! Walkability grid module.
//!
//! This module contains the immutable tile grid the simulator walks on, along with the coordinate
//! type shared by the pathfinder and the motion controller.

use color_eyre::eyre::{bail, OptionExt as _, Result};

/// Tile coordinate on the grid.
///
/// This structure identifies a single tile by its column (`x`) and row (`y`). Coordinates are
/// unsigned, so a tile left of or above the grid can't be expressed at all; the remaining bounds
/// checks happen against the grid's width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Column of the tile, counted from the left edge.
    pub x: usize,
    /// Row of the tile, counted from the top edge.
    pub y: usize,
}

impl Position {
    /// Builds a new position from a column and a row.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the Manhattan distance between two positions.
    ///
    /// This is the number of orthogonal moves between both tiles on an empty grid, which makes it
    /// an admissible heuristic for the four-directional search.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Checks whether two positions are orthogonal neighbours.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }

    /// Returns the position shifted by the given signed deltas.
    ///
    /// This function returns [`None`] when the shift would leave the non-negative quadrant. The
    /// upper bounds are not checked here since the position doesn't know the grid it lives on.
    #[must_use]
    pub const fn offset(self, dx: isize, dy: isize) -> Option<Self> {
        let Some(x) = self.x.checked_add_signed(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add_signed(dy) else {
            return None;
        };

        Some(Self { x, y })
    }
}

/// Single tile of the grid.
///
/// This structure is what a bounds-checked lookup hands back. It is a plain copy of the grid's
/// data, so holding on to it never borrows the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Position of the tile on the grid.
    pub position: Position,
    /// Whether an agent may stand on or traverse the tile.
    pub walkable: bool,
}

/// Immutable walkability table.
///
/// This structure holds the walkability of every tile. It is built once from a row-major integer
/// matrix and stored column-major, so that lookups read as `walkable[x][y]`. Nothing mutates it
/// after construction, which makes sharing it between concurrent searches safe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Flattened column-major walkability table, indexed by `x * height + y`.
    walkable: Vec<bool>,
}

impl Grid {
    /// Builds a grid from a row-major integer matrix.
    ///
    /// Each element `matrix[row][col]` becomes the tile at `(col, row)`. A tile is walkable if and
    /// only if its source value is exactly zero.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - The matrix has no rows or its first row has no columns
    /// - Any row has a different length than the first one
    pub fn from_matrix<R: AsRef<[i32]>>(matrix: &[R]) -> Result<Self> {
        let height = matrix.len();
        let width = matrix
            .first()
            .ok_or_eyre("grid matrix has no rows")?
            .as_ref()
            .len();
        if width == 0 {
            bail!("grid matrix has no columns");
        }

        for (row_idx, row) in matrix.iter().enumerate() {
            let len = row.as_ref().len();
            if len != width {
                bail!("grid matrix row {row_idx} has {len} columns, expected {width}");
            }
        }

        let mut walkable = Vec::with_capacity(width * height);
        for x in 0..width {
            for row in matrix {
                walkable.push(row.as_ref().get(x).is_some_and(|&value| value == 0));
            }
        }

        Ok(Self {
            width,
            height,
            walkable,
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Checks whether a position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Returns the flattened table index of an in-bounds position.
    pub(crate) const fn index_of(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.x * self.height + position.y)
        } else {
            None
        }
    }

    /// Number of tiles on the grid.
    pub(crate) fn len(&self) -> usize {
        self.walkable.len()
    }

    /// Looks up the tile at the given coordinates.
    ///
    /// This function returns [`None`] for coordinates outside the grid instead of failing.
    #[must_use]
    pub fn cell_at(&self, x: usize, y: usize) -> Option<Cell> {
        let position = Position::new(x, y);
        let walkable = *self.walkable.get(self.index_of(position)?)?;

        Some(Cell { position, walkable })
    }

    /// Checks whether the tile at the given coordinates may be walked on.
    ///
    /// Out-of-bounds coordinates are never walkable.
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        self.cell_at(x, y).is_some_and(|cell| cell.walkable)
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Returns the first walkable tile in row-major order.
    ///
    /// The simulator spawns its agent on this tile.
    #[must_use]
    pub fn first_walkable(&self) -> Option<Position> {
        self.positions()
            .find(|position| self.is_walkable(position.x, position.y))
    }

    /// Renders the grid as text.
    ///
    /// Every tile takes two characters: blocked tiles print as ` #`, tiles in `marked` as ` @`
    /// and free tiles as blanks. Rows are separated by newlines.
    #[must_use]
    pub fn render_ascii(&self, marked: &[Position]) -> String {
        let mut out = String::with_capacity((self.width * 2 + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_walkable(x, y) {
                    out.push_str(" #");
                } else if marked.contains(&Position::new(x, y)) {
                    out.push_str(" @");
                } else {
                    out.push_str("  ");
                }
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_grid() -> Grid {
        Grid::from_matrix(&[[1, 0, 1, 1], [0, 0, 0, 1], [1, 1, 0, 0]])
            .expect("test matrix should be valid")
    }

    #[test]
    fn test_from_matrix_transposes_rows_and_columns() {
        let grid = create_test_grid();

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.is_walkable(1, 0));
        assert!(!grid.is_walkable(0, 0));
        assert!(grid.is_walkable(0, 1));
        assert!(grid.is_walkable(3, 2));
        assert!(!grid.is_walkable(3, 1));
    }

    #[test]
    fn test_any_nonzero_value_blocks() {
        let grid = Grid::from_matrix(&[[0, -1, 7, 2]]).expect("test matrix should be valid");

        assert!(grid.is_walkable(0, 0));
        assert!(!grid.is_walkable(1, 0));
        assert!(!grid.is_walkable(2, 0));
        assert!(!grid.is_walkable(3, 0));
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let grid = create_test_grid();

        assert_eq!(grid.cell_at(4, 0), None);
        assert_eq!(grid.cell_at(0, 3), None);
        assert_eq!(grid.cell_at(usize::MAX, usize::MAX), None);
        assert!(!grid.is_walkable(10, 10));
    }

    #[test]
    fn test_cell_at_in_bounds() {
        let grid = create_test_grid();

        assert_eq!(
            grid.cell_at(2, 1),
            Some(Cell {
                position: Position::new(2, 1),
                walkable: true,
            })
        );
        assert_eq!(
            grid.cell_at(2, 0),
            Some(Cell {
                position: Position::new(2, 0),
                walkable: false,
            })
        );
    }

    #[test]
    fn test_from_matrix_rejects_ragged() {
        let matrix = vec![vec![0, 0, 0], vec![0, 0], vec![0, 0, 0]];

        assert!(Grid::from_matrix(&matrix).is_err());
    }

    #[test]
    fn test_from_matrix_rejects_empty() {
        let no_rows: Vec<Vec<i32>> = Vec::new();
        let no_columns: Vec<Vec<i32>> = vec![Vec::new()];

        assert!(Grid::from_matrix(&no_rows).is_err());
        assert!(Grid::from_matrix(&no_columns).is_err());
    }

    #[test]
    fn test_first_walkable_is_row_major() {
        let grid = create_test_grid();

        assert_eq!(grid.first_walkable(), Some(Position::new(1, 0)));

        let blocked = Grid::from_matrix(&[[1, 1], [1, 1]]).expect("test matrix should be valid");
        assert_eq!(blocked.first_walkable(), None);
    }

    #[test]
    fn test_positions_cover_grid() {
        let grid = create_test_grid();
        let positions: Vec<Position> = grid.positions().collect();

        assert_eq!(positions.len(), 12);
        assert_eq!(positions.first(), Some(&Position::new(0, 0)));
        assert_eq!(positions.get(4), Some(&Position::new(0, 1)));
        assert_eq!(positions.last(), Some(&Position::new(3, 2)));
    }

    #[test]
    fn test_render_ascii() {
        let grid = create_test_grid();
        let rendered = grid.render_ascii(&[Position::new(1, 1), Position::new(2, 1)]);

        assert_eq!(rendered, " #   # #\n   @ @ #\n # #    \n");
    }

    #[test]
    fn test_position_helpers() {
        let origin = Position::new(2, 3);

        assert_eq!(origin.manhattan(Position::new(5, 1)), 5);
        assert!(origin.is_adjacent(Position::new(2, 4)));
        assert!(!origin.is_adjacent(Position::new(3, 4)));
        assert!(!origin.is_adjacent(origin));
        assert_eq!(origin.offset(-2, 1), Some(Position::new(0, 4)));
        assert_eq!(origin.offset(-3, 0), None);
        assert_eq!(origin.offset(0, -4), None);
    }
}
