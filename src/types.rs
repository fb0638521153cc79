//! Type definitions and enums for the application state and navigation.

/// Enumeration of available application screens.
///
/// This enumeration holds the screen currently shown. It decides what gets rendered and how key
/// presses are interpreted.
#[derive(Debug, PartialEq)]
pub(crate) enum Screen {
    /// Main menu with the given entry highlighted.
    MainMenu(MainMenuItem),
    /// Options menu with the given entry highlighted.
    OptionsMenu(OptionsMenuItem),
    /// Running simulation.
    ///
    /// This variant represents the screen where the grid is drawn and the agent walks to the tiles
    /// picked with the cursor.
    InGame,
    /// Map selection list.
    MapMenu,
}

/// Main menu entries, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MainMenuItem {
    /// Starts a session on the selected map.
    StartGame,
    /// Opens the options menu.
    Options,
    /// Leaves the application.
    Quit,
}

impl MainMenuItem {
    /// Entries in display order.
    pub(crate) const ALL: [Self; 3] = [Self::StartGame, Self::Options, Self::Quit];
}

/// Options menu entries, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum OptionsMenuItem {
    /// Opens the map list.
    Map,
    /// Cycles the agent speed through the divisors of the tile size.
    Speed,
    /// Returns to the main menu.
    Back,
}

impl OptionsMenuItem {
    /// Entries in display order.
    pub(crate) const ALL: [Self; 3] = [Self::Map, Self::Speed, Self::Back];
}

/// Menu layout configuration.
///
/// This enumeration carries what differs between the boxed menus: their title and how many
/// entries they list.
pub(crate) enum MenuType {
    /// Main menu with the given number of entries.
    MainMenu(u8),
    /// Options menu with the given number of entries.
    OptionsMenu(u8),
}

impl MenuType {
    /// Returns the title drawn in the menu's border.
    pub(crate) const fn repr(&self) -> &str {
        match self {
            Self::MainMenu(_) => "Main Menu",
            Self::OptionsMenu(_) => "Options Menu",
        }
    }

    /// Returns the number of entries, used to size the menu box.
    pub(crate) const fn value(&self) -> u8 {
        match self {
            Self::MainMenu(value) | Self::OptionsMenu(value) => *value,
        }
    }
}

/// Direction the in-game cursor moves in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Towards column zero.
    Left,
    /// Away from column zero.
    Right,
    /// Towards row zero.
    Up,
    /// Away from row zero.
    Down,
}

impl Direction {
    /// Returns the `(dx, dy)` tile offset of one step in this direction.
    pub(crate) const fn delta(self) -> (isize, isize) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }
}

/// Returns the entry after `current` in `items`, staying on the last one.
pub(crate) fn next_item<T: Copy + PartialEq>(items: &[T], current: T) -> T {
    items
        .iter()
        .position(|&item| item == current)
        .and_then(|idx| items.get(idx + 1))
        .copied()
        .unwrap_or(current)
}

/// Returns the entry before `current` in `items`, staying on the first one.
pub(crate) fn previous_item<T: Copy + PartialEq>(items: &[T], current: T) -> T {
    items
        .iter()
        .position(|&item| item == current)
        .and_then(|idx| idx.checked_sub(1))
        .and_then(|idx| items.get(idx))
        .copied()
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_type_repr_and_value() {
        let main_menu = MenuType::MainMenu(3);
        let options_menu = MenuType::OptionsMenu(2);

        assert_eq!(main_menu.repr(), "Main Menu");
        assert_eq!(options_menu.repr(), "Options Menu");
        assert_eq!(main_menu.value(), 3);
        assert_eq!(options_menu.value(), 2);
    }

    #[test]
    fn test_next_item_stops_at_end() {
        let items = MainMenuItem::ALL;

        assert_eq!(next_item(&items, MainMenuItem::StartGame), MainMenuItem::Options);
        assert_eq!(next_item(&items, MainMenuItem::Options), MainMenuItem::Quit);
        assert_eq!(next_item(&items, MainMenuItem::Quit), MainMenuItem::Quit);
    }

    #[test]
    fn test_previous_item_stops_at_start() {
        let items = OptionsMenuItem::ALL;

        assert_eq!(previous_item(&items, OptionsMenuItem::Back), OptionsMenuItem::Speed);
        assert_eq!(previous_item(&items, OptionsMenuItem::Speed), OptionsMenuItem::Map);
        assert_eq!(previous_item(&items, OptionsMenuItem::Map), OptionsMenuItem::Map);
    }

    #[test]
    fn test_direction_deltas_are_unit_steps() {
        for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            let (dx, dy) = direction.delta();
            assert_eq!(dx.abs() + dy.abs(), 1, "{direction:?} should move one tile");
        }
    }
}
