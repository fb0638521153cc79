//! File loading and validation utilities for map files.

use std::{fs, path::Path};

use color_eyre::eyre::{bail, OptionExt as _, Result};
use tracing::{debug, warn};

use crate::map::{self, Map, MAP_EXTENSION};

/// Scans the current directory for map files and loads them.
///
/// This function searches the current working directory for files with the map extension,
/// validates their contents and appends the valid ones to the catalogue. Invalid files are logged
/// and skipped so that a single bad file doesn't hide the others.
pub(crate) fn fetch_files(maps: &mut Vec<Map>) -> Result<()> {
    fetch_files_in(Path::new("."), maps)
}

/// Loads every valid map file found directly inside `dir`.
///
/// Only failing to list the directory is an error. Files that can't be read, aren't UTF-8 or fail
/// validation are skipped with a warning.
pub(crate) fn fetch_files_in(dir: &Path, maps: &mut Vec<Map>) -> Result<()> {
    let extension = format!(".{MAP_EXTENSION}");

    for file in fs::read_dir(dir)? {
        let file = file?;
        let path = file.path();
        let name = file.file_name();
        let Some(is_map) = name.to_str().map(|name| name.ends_with(&extension)) else {
            warn!(file = ?path, "skipping file with a non UTF-8 name");
            continue;
        };
        if !is_map || file.file_type().map_or(true, |kind| kind.is_dir()) {
            continue;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(file = ?path, %err, "skipping unreadable map file");
                continue;
            }
        };
        if !parse_file_contents(&contents) {
            warn!(file = ?path, "skipping malformed map file");
            continue;
        }
        match Map::new(name, &contents) {
            Ok(map) => maps.push(map),
            Err(err) => warn!(file = ?path, %err, "skipping map file"),
        }
    }
    debug!(count = maps.len(), "map catalogue loaded");

    Ok(())
}

/// Loads a single map file.
///
/// # Errors
///
/// This function returns an error if the file can't be read, its name lacks the map extension, or
/// its contents fail validation.
pub(crate) fn load_file(path: &Path) -> Result<Map> {
    let contents = fs::read_to_string(path)?;
    if !parse_file_contents(&contents) {
        bail!("{} is not a valid map file", path.display());
    }
    let name = path
        .file_name()
        .ok_or_eyre("map path has no file name")?
        .to_os_string();

    Map::new(name, &contents)
}

/// Validates the contents of a map file.
///
/// This function checks that the map:
/// - Has at least one row
/// - Contains only decimal digits
/// - Has rows of equal length
/// - Has at least one walkable (`0`) cell for the agent to spawn on
pub(crate) fn parse_file_contents(input: &str) -> bool {
    let Ok(matrix) = map::parse_matrix(input) else {
        return false;
    };
    let Some(width) = matrix.first().map(Vec::len) else {
        return false;
    };

    width > 0
        && matrix.iter().all(|row| row.len() == width)
        && matrix.iter().flatten().any(|&cell| cell == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_contents_valid_map() {
        assert!(parse_file_contents("111\n101\n111"));
    }

    #[test]
    fn test_parse_file_contents_single_cell() {
        assert!(parse_file_contents("0"));
    }

    #[test]
    fn test_parse_file_contents_trailing_newline() {
        assert!(parse_file_contents("000\n010\n"));
    }

    #[test]
    fn test_parse_file_contents_inconsistent_row_lengths() {
        assert!(!parse_file_contents("000\n00\n000"));
    }

    #[test]
    fn test_parse_file_contents_invalid_characters() {
        assert!(!parse_file_contents("000\n0#0\n000"));
    }

    #[test]
    fn test_parse_file_contents_no_walkable_cell() {
        assert!(!parse_file_contents("12\n34"));
    }

    #[test]
    fn test_parse_file_contents_empty_input() {
        assert!(!parse_file_contents(""));
        assert!(!parse_file_contents("\n\n"));
    }

    #[test]
    fn test_fetch_files_skips_unreadable() {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        fs::write(dir.path().join("broken.tilemap"), [0x30, 0xff, 0xfe])
            .expect("failed to write non UTF-8 map");
        fs::write(dir.path().join("walled.tilemap"), "111\n111\n")
            .expect("failed to write map without walkable tile");
        fs::write(dir.path().join("notes.txt"), "000\n").expect("failed to write unrelated file");
        fs::write(dir.path().join("good.tilemap"), "010\n000\n").expect("failed to write valid map");

        let mut maps = Vec::new();
        fetch_files_in(dir.path(), &mut maps).expect("bad files should be skipped, not fatal");

        assert_eq!(maps.len(), 1, "only the valid map should be loaded");
        assert_eq!(
            maps.first().map(|map| map.key.as_str()),
            Some("good"),
            "the valid map should keep its file stem as key"
        );
    }

    #[test]
    fn test_fetch_files_missing_directory() {
        let mut maps = Vec::new();

        assert!(
            fetch_files_in(Path::new("definitely-missing-directory"), &mut maps).is_err(),
            "a directory that can't be listed should be an error"
        );
    }

    #[test]
    fn test_load_file_missing() {
        assert!(load_file(Path::new("definitely-missing.tilemap")).is_err());
    }
}
