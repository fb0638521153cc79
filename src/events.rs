//! Event handling functions for user input and application state updates.

use std::time::Duration;

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::{
    file_loader,
    map::Map,
    session::Session,
    types::{next_item, previous_item, Direction, MainMenuItem, OptionsMenuItem, Screen},
    App,
};

/// How long to wait for input before moving on to the next frame.
///
/// This is roughly one frame at 60 Hz, which keeps the agent's motion smooth while idle in the
/// event queue.
pub(crate) const POLL_TIMEOUT: Duration = Duration::from_millis(16);

/// Handles input events and updates the application state accordingly.
///
/// This function polls for keyboard events, dispatches them through [`handle_key`] and then lets
/// the running session, if any, catch up with the time that has passed.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(POLL_TIMEOUT)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key.code)?;
            }
        }
    }

    // Advance the simulation if in-game
    if let Some(session) = app.session.as_mut() {
        session.update();
    }

    Ok(())
}

/// Dispatches a single key press to the handler for that key.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => app.exit = true,
        KeyCode::Char('j') => handle_j_events(app)?,
        KeyCode::Char('k') => handle_k_events(app)?,
        KeyCode::Char('l') => handle_l_events(app)?,
        KeyCode::Char('h') | KeyCode::Esc => handle_h_events(app),
        KeyCode::Left => handle_cursor_events(app, Direction::Left),
        KeyCode::Right => handle_cursor_events(app, Direction::Right),
        KeyCode::Up => handle_cursor_events(app, Direction::Up),
        KeyCode::Down => handle_cursor_events(app, Direction::Down),
        KeyCode::Enter | KeyCode::Char(' ') => handle_walk_events(app)?,
        _ => {}
    }

    Ok(())
}

/// Returns the index of the map under the cursor in the map list.
fn selected_map_index(app: &App) -> Result<usize> {
    let viewport_map = app
        .viewport_map
        .as_ref()
        .ok_or_eyre("failed to retrieve cursor-selected map")?;

    app.maps
        .iter()
        .position(|map| map == viewport_map)
        .ok_or_eyre("cursor-selected map is not in the map list")
}

/// Moves the map list cursor to `index`, scrolling the viewport to keep it visible.
fn select_map(app: &mut App, index: usize) {
    let Some(map) = app.maps.get(index) else {
        return;
    };
    app.viewport_map = Some(map.clone());

    let height = app.viewport_height.max(1);
    if index < app.viewport_offset {
        app.viewport_offset = index;
    } else if index >= app.viewport_offset + height {
        app.viewport_offset = index + 1 - height;
    }
}

/// Handles 'j' key press events for downward navigation.
///
/// This function moves the highlighted entry one down in the menus and the map list, stopping at
/// the last entry.
pub(crate) fn handle_j_events(app: &mut App) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => {
            app.screen = Screen::MainMenu(next_item(&MainMenuItem::ALL, item));
        }
        Screen::OptionsMenu(item) => {
            app.screen = Screen::OptionsMenu(next_item(&OptionsMenuItem::ALL, item));
        }
        Screen::MapMenu => {
            let index = selected_map_index(app)?;
            select_map(app, index + 1);
        }
        Screen::InGame => {}
    }

    Ok(())
}

/// Handles 'k' key press events for upward navigation.
///
/// This function moves the highlighted entry one up in the menus and the map list, stopping at the
/// first entry.
pub(crate) fn handle_k_events(app: &mut App) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => {
            app.screen = Screen::MainMenu(previous_item(&MainMenuItem::ALL, item));
        }
        Screen::OptionsMenu(item) => {
            app.screen = Screen::OptionsMenu(previous_item(&OptionsMenuItem::ALL, item));
        }
        Screen::MapMenu => {
            let index = selected_map_index(app)?;
            if let Some(previous) = index.checked_sub(1) {
                select_map(app, previous);
            }
        }
        Screen::InGame => {}
    }

    Ok(())
}

/// Handles 'l' key press events for selection and forward navigation.
///
/// This function activates the highlighted entry: it starts a session, opens a submenu, changes
/// the speed, or picks the map under the cursor as the one new sessions start on.
pub(crate) fn handle_l_events(app: &mut App) -> Result<()> {
    match app.screen {
        Screen::MainMenu(MainMenuItem::StartGame) => {
            app.session = Some(Session::new(&app.map, &app.settings)?);
            app.screen = Screen::InGame;
        }
        Screen::MainMenu(MainMenuItem::Options) => {
            app.screen = Screen::OptionsMenu(OptionsMenuItem::Map);
        }
        Screen::MainMenu(MainMenuItem::Quit) => {
            app.exit = true;
        }
        Screen::OptionsMenu(OptionsMenuItem::Map) => {
            app.screen = Screen::MapMenu;

            app.maps = Map::builtin();
            file_loader::fetch_files(&mut app.maps)?;
            if !app.maps.contains(&app.map) {
                app.maps.push(app.map.clone());
            }
            app.viewport_offset = 0;
            let current = app
                .maps
                .iter()
                .position(|map| *map == app.map)
                .unwrap_or_default();
            select_map(app, current);
        }
        Screen::OptionsMenu(OptionsMenuItem::Speed) => {
            app.settings.cycle_speed();
        }
        Screen::OptionsMenu(OptionsMenuItem::Back) => {
            app.screen = Screen::MainMenu(MainMenuItem::StartGame);
        }
        Screen::MapMenu => {
            app.map = app
                .viewport_map
                .clone()
                .ok_or_eyre("failed to retrieve cursor-selected map")?;
        }
        Screen::InGame => {}
    }

    Ok(())
}

/// Handles 'h' key press events for backward navigation.
///
/// This function returns from the in-game screen to the main menu, dropping the session, and from
/// the submenus to the menu they were opened from.
pub(crate) fn handle_h_events(app: &mut App) {
    match app.screen {
        Screen::InGame => {
            app.session = None;
            app.screen = Screen::MainMenu(MainMenuItem::StartGame);
        }
        Screen::MapMenu => {
            app.screen = Screen::OptionsMenu(OptionsMenuItem::Map);
        }
        Screen::OptionsMenu(_) => {
            app.screen = Screen::MainMenu(MainMenuItem::Options);
        }
        Screen::MainMenu(_) => {}
    }
}

/// Handles arrow key presses, which move the goal cursor in game.
pub(crate) fn handle_cursor_events(app: &mut App, direction: Direction) {
    if let (Screen::InGame, Some(session)) = (&app.screen, app.session.as_mut()) {
        session.move_cursor(direction);
    }
}

/// Handles 'enter' and space presses, which send the agent to the cursor in game.
pub(crate) fn handle_walk_events(app: &mut App) -> Result<()> {
    if let (Screen::InGame, Some(session)) = (&app.screen, app.session.as_mut()) {
        session.request_walk()?;
    }

    Ok(())
}
