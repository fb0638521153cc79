//! User interface rendering functions for all application screens.

use std::rc::Rc;

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    symbols::{Marker, DOT},
    text::Line,
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear,
    },
    Frame,
};

use crate::{
    grid::Position,
    session::Session,
    types::{MainMenuItem, MenuType, OptionsMenuItem, Screen},
    App,
};

/// Updates the application UI based on the persistent state.
///
/// This function renders different screens based on the current state stored in the [`App`]
/// structure, dispatching to the appropriate rendering function for each screen type.
///
/// # Errors
///
/// This function may return errors from drawing operations or data conversion failures.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    match &app.screen {
        Screen::MainMenu(item) => main_menu(frame, *item),
        Screen::OptionsMenu(item) => options_menu(frame, *item, app.settings.motion.speed()),
        Screen::InGame => in_game(app, frame)?,
        Screen::MapMenu => map_menu(app, frame)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function renders a clear widget over the entire area of the frame so that nothing from
/// the previous screen bleeds through.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Renders the bordered box shared by the main and options menus.
///
/// This function centers a rounded box sized for the menu's entries and returns one row per entry
/// inside it.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn init_menu(frame: &mut Frame, menu: &MenuType) -> Rc<[Rect]> {
    let space = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(40),
    ])
    .split(frame.area())[1];
    let space = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(30),
        Constraint::Percentage(35),
    ])
    .split(space)[1];

    let layout = Layout::vertical([Constraint::Max(u16::from(menu.value()) + 2)])
        .flex(Flex::Center)
        .split(space)[0];

    let block = Block::bordered()
        .title(menu.repr())
        .title_bottom("(j) down / (k) up / (l) select")
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);

    frame.render_widget(block, layout);

    Layout::vertical(vec![Constraint::Max(1); usize::from(menu.value())]).split(inner_space)
}

/// Renders a menu box with its entries, highlighting the one at `selected`.
pub(crate) fn render_menu(frame: &mut Frame, menu: &MenuType, entries: &[String], selected: usize) {
    clear(frame);

    let rows = init_menu(frame, menu);

    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    for (idx, (entry, row)) in entries.iter().zip(rows.iter()).enumerate() {
        let style = if idx == selected {
            active_content_style
        } else {
            content_style
        };
        frame.render_widget(Line::styled(entry.as_str(), style).centered(), *row);
    }
}

/// Renders the main menu screen.
pub(crate) fn main_menu(frame: &mut Frame, item: MainMenuItem) {
    let entries = ["Start Game", "Options", "Quit"].map(str::to_owned);
    let selected = MainMenuItem::ALL
        .iter()
        .position(|&entry| entry == item)
        .unwrap_or_default();

    render_menu(frame, &MenuType::MainMenu(3), &entries, selected);
}

/// Renders the options menu screen.
///
/// The speed entry shows the speed new sessions will use.
pub(crate) fn options_menu(frame: &mut Frame, item: OptionsMenuItem, speed: i32) {
    let entries = [
        "Map".to_owned(),
        format!("Speed: {speed}"),
        "Return".to_owned(),
    ];
    let selected = OptionsMenuItem::ALL
        .iter()
        .position(|&entry| entry == item)
        .unwrap_or_default();

    render_menu(frame, &MenuType::OptionsMenu(3), &entries, selected);
}

/// Renders the map selection menu with a scrollable list of available maps.
///
/// This function displays a viewport over the map catalogue. The entry under the cursor is
/// highlighted and the map new sessions start on is marked with a dot.
///
/// # Errors
///
/// This function may return errors if the viewport map cannot be retrieved.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn map_menu(app: &mut App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let space = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Fill(1),
        Constraint::Percentage(30),
    ])
    .split(frame.area())[1];
    let space = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Fill(1),
        Constraint::Percentage(40),
    ])
    .split(space)[1];

    let block = Block::bordered()
        .title_top("Map list")
        .title_bottom("(j) down / (k) up / (l) select / (h) return")
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(space);

    frame.render_widget(block, space);

    app.viewport_height = inner_space.height.into();

    let columns = Layout::horizontal([Constraint::Length(2), Constraint::Fill(1)]).split(inner_space);
    let rows_of = |area: Rect| {
        Layout::vertical(vec![Constraint::Length(1); inner_space.height.into()]).split(area)
    };
    let selectors = rows_of(columns[0]);
    let entries = rows_of(columns[1]);

    let viewport_map = app
        .viewport_map
        .as_ref()
        .ok_or_eyre("failed to retrieve cursor-selected map")?;

    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    let visible = app
        .maps
        .iter()
        .skip(app.viewport_offset)
        .zip(selectors.iter().zip(entries.iter()));
    for (map, (selector_area, entry_area)) in visible {
        let style = if map == viewport_map {
            active_content_style
        } else {
            content_style
        };
        let marker = if *map == app.map { DOT } else { " " };
        let (width, height) = map.dimensions();

        frame.render_widget(Line::styled(marker, style).centered(), *selector_area);
        frame.render_widget(
            Line::styled(format!("{} ({width}x{height})", map.key), style),
            *entry_area,
        );
    }

    Ok(())
}

/// Converts a tile index into a canvas coordinate.
fn tile_coord(value: usize) -> Result<f64> {
    Ok(f64::from(u16::try_from(value)?))
}

/// Converts tile positions into fractional tile coordinates.
fn positions_to_coords<I: IntoIterator<Item = Position>>(positions: I) -> Result<Vec<(f64, f64)>> {
    positions
        .into_iter()
        .map(|position| Ok((tile_coord(position.x)?, tile_coord(position.y)?)))
        .collect()
}

/// Transforms grid coordinates to screen coordinates for canvas rendering.
///
/// This function converts fractional grid coordinates (column, row) to screen coordinates centered
/// on the grid: `x = col - (columns - 1) / 2` and `y = (rows - 1) / 2 - row`, since rows grow
/// downwards while the canvas' y axis grows upwards.
///
/// # Errors
///
/// This function may return errors if the grid is too large to convert.
pub(crate) fn transform_grid_to_screen_coords(
    grid_coords: &[(f64, f64)],
    columns: usize,
    rows: usize,
) -> Result<Vec<(f64, f64)>> {
    let cols_n = tile_coord(columns)?;
    let rows_n = tile_coord(rows)?;

    Ok(grid_coords
        .iter()
        .map(|&(col, row)| (col - (cols_n - 1.) / 2., (rows_n - 1.) / 2. - row))
        .collect())
}

/// Returns the agent's fractional tile coordinates, derived from its pixel position.
fn agent_coords(session: &Session) -> Result<(f64, f64)> {
    let (pixel_x, pixel_y) = session.controller.pixel_position();
    let tile_size = f64::from(session.controller.config().tile_size());

    Ok((
        f64::from(i32::try_from(pixel_x)?) / tile_size,
        f64::from(i32::try_from(pixel_y)?) / tile_size,
    ))
}

/// Builds the status line text for the session.
fn status_text(session: &Session) -> String {
    if let Some(status) = &session.status {
        return status.clone();
    }

    let tile = session.controller.tile();
    let (offset_x, offset_y) = session.controller.offset();
    format!(
        "tile ({}, {}) offset ({offset_x}, {offset_y}) {:?}, {} steps left",
        tile.x,
        tile.y,
        session.controller.state(),
        session.controller.remaining().len()
    )
}

/// Builds a canvas centered over an area of the given size.
fn centered_canvas<F>(space: Rect, marker: Marker, paint: F) -> Canvas<'static, F>
where
    F: Fn(&mut ratatui::widgets::canvas::Context<'_>),
{
    Canvas::default()
        .x_bounds([
            (-rounded_div::i32(space.width.into(), 2)).into(),
            (rounded_div::i32(space.width.into(), 2)).into(),
        ])
        .y_bounds([
            (-rounded_div::i32(space.height.into(), 2)).into(),
            (rounded_div::i32(space.height.into(), 2)).into(),
        ])
        .marker(marker)
        .paint(paint)
}

/// Renders the in-game screen with the grid, the pending path and the agent.
///
/// This function draws walls, the remaining waypoints and the goal cursor one terminal cell per
/// tile, then overlays the agent on a braille canvas so that its sub-tile motion shows between
/// cells. A status line at the bottom reports the agent's state.
///
/// # Errors
///
/// This function may return errors from coordinate conversion operations or if no session is
/// running.
pub(crate) fn in_game(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let session = app
        .session
        .as_ref()
        .ok_or_eyre("failed to retrieve running session")?;
    let columns = session.grid.width();
    let rows = session.grid.height();

    // Create overall layout: grid area + status at bottom
    let overall_layout = Layout::vertical([
        Constraint::Min(1),    // Grid and padding area
        Constraint::Length(3), // Status block
    ])
    .split(frame.area());

    let grid_content_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get grid content area from layout")?;
    let status_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get status area from layout")?;

    let space = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(u16::try_from(rows)?),
        Constraint::Min(1),
    ])
    .split(grid_content_area)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get grid area from layout")?;
    let space = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(u16::try_from(columns)?),
        Constraint::Min(1),
    ])
    .split(space)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get grid space from horizontal layout")?;

    // Pre-compute screen coordinates to handle errors before closures
    let walls = positions_to_coords(
        session
            .grid
            .positions()
            .filter(|position| !session.grid.is_walkable(position.x, position.y)),
    )?;
    let waypoints = positions_to_coords(session.controller.remaining().iter().copied())?;
    let cursor = positions_to_coords([session.cursor])?;
    let agent = [agent_coords(session)?];

    let wall_screen_coords = transform_grid_to_screen_coords(&walls, columns, rows)?;
    let waypoint_screen_coords = transform_grid_to_screen_coords(&waypoints, columns, rows)?;
    let cursor_screen_coords = transform_grid_to_screen_coords(&cursor, columns, rows)?;
    let agent_screen_coords = transform_grid_to_screen_coords(&agent, columns, rows)?;

    let grid = centered_canvas(space, Marker::Dot, |ctx| {
        ctx.draw(&Points {
            coords: &wall_screen_coords,
            color: Color::Green,
        });
        ctx.layer();
        ctx.draw(&Points {
            coords: &waypoint_screen_coords,
            color: Color::Yellow,
        });
        ctx.layer();
        ctx.draw(&Points {
            coords: &cursor_screen_coords,
            color: Color::Cyan,
        });
    });
    let agent = centered_canvas(space, Marker::Braille, |ctx| {
        ctx.draw(&Points {
            coords: &agent_screen_coords,
            color: Color::Red,
        });
    });

    frame.render_widget(grid, space);
    frame.render_widget(agent, space);

    let status_block = Block::bordered()
        .title("(arrows) cursor / (enter) walk / (h) return to menu")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);
    let status_line = Line::raw(status_text(session)).centered();
    let status_inner = status_block.inner(status_area);

    frame.render_widget(status_block, status_area);
    frame.render_widget(status_line, status_inner);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsString, time::Duration};

    use super::*;
    use crate::{config::Settings, map::Map};
    use ratatui::{backend::TestBackend, Terminal};

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 30);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Creates a small test map for UI testing.
    fn create_test_map() -> Map {
        Map::new(OsString::from("test_map.tilemap"), "11111\n10001\n10101\n11111")
            .expect("failed to create test map")
    }

    /// Creates an app already inside a session on the test map.
    fn create_in_game_app() -> App {
        let mut app = App::default();
        app.map = create_test_map();
        app.session = Some(
            Session::new(&app.map, &Settings::default()).expect("failed to start test session"),
        );
        app.screen = Screen::InGame;
        app
    }

    /// Returns the rendered buffer as one string per row.
    fn buffer_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_owned()))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_draw_main_menu() {
        let mut app = App::default();
        let mut terminal = create_test_terminal();
        app.screen = Screen::MainMenu(MainMenuItem::StartGame);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing main menu should succeed");
        let rows = buffer_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("Start Game")),
            "main menu should list its entries"
        );
    }

    #[test]
    fn test_draw_options_menu_shows_speed() {
        let mut app = App::default();
        let mut terminal = create_test_terminal();
        app.screen = Screen::OptionsMenu(OptionsMenuItem::Speed);

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing options menu should succeed");
        let rows = buffer_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("Speed: 2")),
            "options menu should show the current speed"
        );
    }

    #[test]
    fn test_draw_map_menu() {
        let mut app = App::default();
        let mut terminal = create_test_terminal();
        app.screen = Screen::MapMenu;
        app.maps = vec![Map::default(), create_test_map()];
        app.viewport_map = app.maps.first().cloned();

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing map menu should succeed");
        assert!(app.viewport_height > 0, "map menu should record its height");
        let rows = buffer_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("test_map (5x4)")),
            "map menu should list map sizes"
        );
    }

    #[test]
    fn test_map_menu_empty_viewport_map_error() {
        let mut app = App::default();
        let mut terminal = create_test_terminal();

        app.maps = vec![create_test_map()];
        app.viewport_map = None;

        let result = terminal.draw(|frame| {
            let map_result = map_menu(&mut app, frame);
            assert!(
                map_result.is_err(),
                "map menu should fail with empty viewport_map"
            );
        });

        assert!(
            result.is_ok(),
            "terminal drawing should succeed even if map_menu fails"
        );
    }

    #[test]
    fn test_draw_in_game() {
        let mut app = create_in_game_app();
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing in-game screen should succeed");
        let rows = buffer_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("tile (1, 1) offset (0, 0) Idle")),
            "status line should describe the idle agent"
        );
    }

    #[test]
    fn test_draw_in_game_while_walking() {
        let mut app = create_in_game_app();
        let mut terminal = create_test_terminal();
        if let Some(session) = app.session.as_mut() {
            session.cursor = Position::new(3, 1);
            session.request_walk().expect("walk should be accepted");
            let _ = session.advance(session.clock.tick() * 3 + Duration::from_micros(1));
        }

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing a walking agent should succeed");
        let rows = buffer_rows(&terminal);
        assert!(
            rows.iter()
                .any(|row| row.contains("offset (6, 0) Walking, 2 steps left")),
            "status line should describe the walking agent"
        );
    }

    #[test]
    fn test_in_game_without_session_error() {
        let mut app = App::default();
        let mut terminal = create_test_terminal();
        app.screen = Screen::InGame;

        let result = terminal.draw(|frame| {
            let game_result = in_game(&mut app, frame);
            assert!(
                game_result.is_err(),
                "in-game should fail without a running session"
            );
        });

        assert!(
            result.is_ok(),
            "terminal drawing should succeed even if in_game fails"
        );
    }

    #[test]
    fn test_init_menu_rows() {
        let mut terminal = create_test_terminal();

        let result = terminal.draw(|frame| {
            let layout = init_menu(frame, &MenuType::OptionsMenu(3));
            assert_eq!(layout.len(), 3, "options menu should have 3 rows");
        });

        assert!(result.is_ok(), "initializing options menu should succeed");
    }

    #[test]
    fn test_agent_coords_follow_pixel_position() {
        let mut app = create_in_game_app();
        let session = app.session.as_mut().expect("session should be running");
        session.cursor = Position::new(1, 2);
        session.request_walk().expect("walk should be accepted");
        for _ in 0..4 {
            session.controller.update();
        }

        assert_eq!(
            session.controller.pixel_position(),
            (32, 40),
            "agent should be a quarter tile below its spawn"
        );
        assert_eq!(
            agent_coords(session).expect("coordinates should convert"),
            (1., 1.25),
            "drawn position should match the pixel position"
        );
    }

    #[test]
    fn test_transform_grid_to_screen_coords() {
        let coords = transform_grid_to_screen_coords(&[(0., 0.), (4., 2.), (1.5, 1.)], 5, 3)
            .expect("transform should succeed");

        assert_eq!(coords, vec![(-2., 1.), (2., -1.), (-0.5, 0.)]);
    }
}
