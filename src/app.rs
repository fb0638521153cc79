//! Core application state and logic for the simulator.

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::DefaultTerminal;

use crate::{
    config::Settings,
    events, file_loader,
    grid::Position,
    map::Map,
    pathfinding::Pathfinder,
    session::Session,
    types::{MainMenuItem, Screen},
    ui,
};

/// Application state container for the simulator.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui renders the interface and which Crossterm events write to.
pub struct App {
    /// Application exit flag.
    ///
    /// This field is set to `true` once the user asks to quit.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    pub(crate) screen: Screen,
    /// Map a new session starts on.
    ///
    /// This field always holds a map, either the built-in maze, the one given on the command line
    /// or one picked from the map list.
    pub(crate) map: Map,
    /// Catalogue of maps shown in the map list.
    ///
    /// This field holds the built-in maps followed by every valid map file found in the current
    /// working directory. It is refreshed each time the map list is opened.
    pub(crate) maps: Vec<Map>,
    /// Map currently under the cursor in the map list.
    pub(crate) viewport_map: Option<Map>,
    /// Scrolling offset for the map list viewport.
    ///
    /// This field holds the offset by which to scroll the sliding window into the
    /// [`maps`](App::maps) vector in the map list.
    pub(crate) viewport_offset: usize,
    /// Height of the map list rendering area, in terminal rows, as of the last redraw.
    pub(crate) viewport_height: usize,
    /// Speed, tile size and clock rate for new sessions.
    pub(crate) settings: Settings,
    /// Running simulation, present only on the in-game screen.
    pub(crate) session: Option<Session>,
}

impl Default for App {
    fn default() -> Self {
        Self::with_map(Map::default(), Settings::default())
    }
}

impl App {
    /// Creates the application from validated settings.
    ///
    /// # Errors
    ///
    /// This function returns an error if the settings name a map file that can't be loaded.
    pub fn new(settings: Settings) -> Result<Self> {
        let map = match &settings.map_file {
            Some(path) => file_loader::load_file(path)?,
            None => Map::default(),
        };

        Ok(Self::with_map(map, settings))
    }

    /// Creates the application with the given starting map.
    fn with_map(map: Map, settings: Settings) -> Self {
        Self {
            exit: false,
            screen: Screen::MainMenu(MainMenuItem::StartGame),
            map,
            maps: Vec::new(),
            viewport_map: None,
            viewport_offset: 0,
            viewport_height: 0,
            settings,
            session: None,
        }
    }

    /// Runs the main loop of the application.
    ///
    /// This function draws a frame, handles input and advances the simulation, repeating until
    /// the exit flag is set, after which it returns to the call site.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| {
                ui::draw(self, frame).map_err(std::io::Error::other)
            })?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// Finds a path on the starting map and renders it as text.
    ///
    /// The search starts from `from`, or from the agent's spawn tile when it is [`None`]. The
    /// output is a short summary line followed by the map, with blocked tiles as `#` and path
    /// tiles as `@`.
    ///
    /// # Errors
    ///
    /// This function returns an error if the map has no walkable tile or either coordinate lies
    /// outside it.
    pub fn solve(&self, from: Option<Position>, to: Position) -> Result<String> {
        let grid = self.map.grid()?;
        let start = match from {
            Some(start) => start,
            None => grid
                .first_walkable()
                .ok_or_eyre("map has no walkable tile to start from")?,
        };
        let path = Pathfinder::new(&grid).find_path(start, to)?;

        let mut output = if path.is_empty() && start != to {
            format!(
                "{}: no path from ({}, {}) to ({}, {})\n",
                self.map.key, start.x, start.y, to.x, to.y
            )
        } else {
            format!(
                "{}: {} steps from ({}, {}) to ({}, {})\n",
                self.map.key,
                path.len(),
                start.x,
                start.y,
                to.x,
                to.y
            )
        };

        output.push_str(&grid.render_ascii(path.steps()));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_starts_in_main_menu() {
        let app = App::default();

        assert!(!app.exit);
        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::StartGame));
        assert_eq!(app.map.key, "Maze");
        assert!(app.session.is_none());
    }

    #[test]
    fn test_new_with_missing_map_file() {
        let settings = Settings {
            map_file: Some("missing.tilemap".into()),
            ..Settings::default()
        };

        assert!(App::new(settings).is_err());
    }

    #[test]
    fn test_solve_prints_path() {
        let app = App::default();
        let output = app
            .solve(None, Position::new(5, 1))
            .expect("solve should succeed");
        let mut lines = output.lines();

        assert_eq!(lines.next(), Some("Maze: 8 steps from (1, 1) to (5, 1)"));
        assert_eq!(lines.next(), Some(" # # # # # # # # # # # # #"));
        assert_eq!(lines.next(), Some(" #   #   # @ #           #"));
        assert_eq!(lines.next(), Some(" # @ # @ @ @ #   # # #   #"));
        assert_eq!(lines.next(), Some(" # @ @ @ # # #           #"));
        assert_eq!(lines.next(), Some(" #   #           # # #   #"));
    }

    #[test]
    fn test_solve_unreachable_and_out_of_bounds() {
        let app = App::default();

        let output = app
            .solve(Some(Position::new(1, 1)), Position::new(0, 0))
            .expect("solve should succeed");
        assert!(output.starts_with("Maze: no path from (1, 1) to (0, 0)"));

        assert!(app.solve(None, Position::new(40, 0)).is_err());
    }
}
