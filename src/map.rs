//! Map data and management module.
//!
//! This module contains the `Map` struct holding a named walkability matrix, the built-in maps and
//! the parsing of the textual map format.

use std::{ffi::OsString, sync::LazyLock};

use color_eyre::eyre::{eyre, OptionExt as _, Result};

use crate::grid::Grid;

/// File extension of map files, without the leading dot.
pub(crate) const MAP_EXTENSION: &str = "tilemap";

/// Named walkability matrix.
///
/// This structure represents a map as listed in the map menu. The matrix is row-major and uses the
/// grid's convention: `0` is walkable, any other value is blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Map {
    /// Display name of the map.
    ///
    /// This field holds the file name of the map without its extension.
    pub(crate) key: String,
    /// Row-major cell values.
    pub(crate) matrix: Vec<Vec<i32>>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new(format!("Maze.{MAP_EXTENSION}").into(), *MAZE_MAP)
            .expect("failed to create default map")
    }
}

impl Map {
    /// Builds a new map from a file name and its textual content.
    ///
    /// Every non-blank line is a row, and every character of a row a digit giving the cell value.
    /// The extension is stripped from the file name to get the display key.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The `OsString` cannot be converted to a string slice
    /// - The file name doesn't end with the map extension
    /// - A row contains anything but digits
    pub(crate) fn new(key: OsString, data: &str) -> Result<Self> {
        let file_name = key
            .to_str()
            .ok_or_eyre("failed to convert osstring to string slice")?;
        let key = file_name
            .strip_suffix(MAP_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .ok_or_eyre("failed to find extension in file name")?
            .to_owned();

        Ok(Self {
            key,
            matrix: parse_matrix(data)?,
        })
    }

    /// Returns every map that ships with the simulator.
    pub(crate) fn builtin() -> Vec<Self> {
        let mut maps = vec![Self::default()];
        if let Ok(open_field) = Self::new(format!("Open field.{MAP_EXTENSION}").into(), *OPEN_FIELD_MAP)
        {
            maps.push(open_field);
        }

        maps
    }

    /// Builds the walkability grid of the map.
    ///
    /// # Errors
    ///
    /// This function returns an error if the matrix is empty or not rectangular.
    pub(crate) fn grid(&self) -> Result<Grid> {
        Grid::from_matrix(&self.matrix)
    }

    /// Returns the size of the map as `(columns, rows)`.
    pub(crate) fn dimensions(&self) -> (usize, usize) {
        (
            self.matrix.first().map_or(0, Vec::len),
            self.matrix.len(),
        )
    }
}

/// Parses rows of digit characters into a cell matrix.
///
/// Blank lines are skipped and surrounding whitespace on each line is ignored.
///
/// # Errors
///
/// This function returns an error if a row holds a character that isn't a decimal digit.
pub(crate) fn parse_matrix(data: &str) -> Result<Vec<Vec<i32>>> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(row, line)| {
            line.chars()
                .map(|cell| {
                    cell.to_digit(10)
                        .and_then(|value| i32::try_from(value).ok())
                        .ok_or_else(|| eyre!("invalid cell {cell:?} in row {row}"))
                })
                .collect::<Result<Vec<i32>>>()
        })
        .collect()
}

/// Walled maze used as the default map.
///
/// The agent spawns on the first walkable tile in reading order, which is `(1, 1)` here.
static MAZE_MAP: LazyLock<&str> = LazyLock::new(|| {
    "\
1111111111111
1010101000001
1010001011101
1000111000001
1010000011101
1010111010001
1010100011101
1010111010101
1000000000101
1111111111111"
});

/// Open field crossed by a single wall segment.
static OPEN_FIELD_MAP: LazyLock<&str> = LazyLock::new(|| {
    "\
0000000
0001000
0001000
0001000
0000000"
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_default() {
        let map = Map::default();

        assert_eq!(map.key, "Maze");
        assert_eq!(map.dimensions(), (13, 10));
        assert_eq!(
            map.matrix.get(1).and_then(|row| row.get(1)),
            Some(&0),
            "maze should be open at (1, 1)"
        );
    }

    #[test]
    fn test_builtin_maps() {
        let maps = Map::builtin();
        let keys: Vec<&str> = maps.iter().map(|map| map.key.as_str()).collect();

        assert_eq!(keys, vec!["Maze", "Open field"]);
        assert_eq!(maps.get(1).map(Map::dimensions), Some((7, 5)));
    }

    #[test]
    fn test_map_new_valid_input() {
        let map = Map::new(OsString::from("test.tilemap"), "010\n000\n")
            .expect("failed to create map");

        assert_eq!(map.key, "test");
        assert_eq!(map.matrix, vec![vec![0, 1, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn test_map_new_skips_blank_lines() {
        let map = Map::new(OsString::from("gaps.tilemap"), "\n  09 \n\n90\n")
            .expect("failed to create map");

        assert_eq!(map.matrix, vec![vec![0, 9], vec![9, 0]]);
    }

    #[test]
    fn test_map_new_missing_extension() {
        assert!(Map::new(OsString::from("noextension"), "0").is_err());
        assert!(Map::new(OsString::from("test.txt"), "0").is_err());
        assert!(Map::new(OsString::from("tilemap"), "0").is_err());
    }

    #[test]
    fn test_map_new_multiple_extensions() {
        let map = Map::new(OsString::from("test.backup.tilemap"), "00")
            .expect("failed to create map");

        assert_eq!(map.key, "test.backup");
    }

    #[test]
    fn test_parse_matrix_rejects_non_digits() {
        assert!(parse_matrix("00\n0x").is_err());
        assert!(parse_matrix("0 0").is_err());
    }

    #[test]
    fn test_map_grid() {
        let map = Map::default();
        let grid = map.grid().expect("default map should be rectangular");

        assert_eq!((grid.width(), grid.height()), (13, 10));
        assert!(grid.is_walkable(1, 1));
        assert!(!grid.is_walkable(0, 0));
    }
}
