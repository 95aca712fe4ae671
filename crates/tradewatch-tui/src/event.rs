//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Keybindings
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q`, `Ctrl+c`           | `Quit`                     |
//! | `Tab`                   | `NextView`                 |
//! | `1` / `2`               | `ShowView(0)` / `ShowView(1)` |
//! | `/`                     | `SearchFocus`              |
//! | `p`, `Space`            | `TogglePause`              |
//! | `f`                     | `CycleFilter`              |
//! | `e`                     | `Export`                   |
//! | `[` / `]`               | `PrevPage` / `NextPage`    |
//! | `PageUp`, `Ctrl+u`      | `ScrollUp`                 |
//! | `PageDown`, `Ctrl+d`    | `ScrollDown`               |
//! | `G`                     | `ScrollToTail`             |
//! | `↑` / `k`, `↓` / `j`    | `Nav(Up)` / `Nav(Down)`    |
//! | `←` / `→`               | `Nav(Left)` / `Nav(Right)` |
//! | printable char          | `Char(c)`                  |
//! | `Backspace`, `Enter`, `Esc` | same-named events      |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! `?` and `:` arrive as `Char` and are interpreted by the app shell.
//!
//! ## Insert mode
//!
//! While the search bar or command line is focused the event loop calls
//! [`to_app_event_insert`]: every printable key becomes `Char`, arrows still
//! move the text cursor, and only `Ctrl+c`, `Esc`, `Enter` and `Backspace`
//! keep their special meaning.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Switch to the other view.
    NextView,
    /// Jump to a view by index (0 = dashboard, 1 = logs).
    ShowView(usize),
    /// Transfer focus to the search bar.
    SearchFocus,
    /// Pause or resume the live feed.
    TogglePause,
    /// Advance the history type filter.
    CycleFilter,
    /// Write the filtered history to CSV.
    Export,
    PrevPage,
    NextPage,
    ScrollUp,
    ScrollDown,
    /// Jump back to the newest live event and follow it.
    ScrollToTail,
    Nav(Direction),
    Char(char),
    Backspace,
    Enter,
    Escape,
    Resize(u16, u16),
}

/// Map a raw crossterm [`Event`] in normal (navigation) mode.
///
/// Returns `None` for mouse events and unbound keys.
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

/// Map a raw crossterm [`Event`] while a text input has focus.
pub fn to_app_event_insert(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key_insert(key),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    let plain = key.modifiers == Mod::NONE;
    match key.code {
        Char('q') if plain => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Tab if plain => Some(AppEvent::NextView),
        Char('1') if plain => Some(AppEvent::ShowView(0)),
        Char('2') if plain => Some(AppEvent::ShowView(1)),

        Char('/') if plain => Some(AppEvent::SearchFocus),
        Char('p') | Char(' ') if plain => Some(AppEvent::TogglePause),
        Char('f') if plain => Some(AppEvent::CycleFilter),
        Char('e') if plain => Some(AppEvent::Export),
        Char('[') if plain => Some(AppEvent::PrevPage),
        Char(']') if plain => Some(AppEvent::NextPage),

        PageUp => Some(AppEvent::ScrollUp),
        PageDown => Some(AppEvent::ScrollDown),
        Char('u') if key.modifiers == Mod::CONTROL => Some(AppEvent::ScrollUp),
        Char('d') if key.modifiers == Mod::CONTROL => Some(AppEvent::ScrollDown),

        // SHIFT may or may not be reported with an uppercase letter
        Char('G') => Some(AppEvent::ScrollToTail),

        Up | Char('k') if plain => Some(AppEvent::Nav(Direction::Up)),
        Down | Char('j') if plain => Some(AppEvent::Nav(Direction::Down)),
        Left if plain => Some(AppEvent::Nav(Direction::Left)),
        Right if plain => Some(AppEvent::Nav(Direction::Right)),

        Char(c) if plain || key.modifiers == Mod::SHIFT => Some(AppEvent::Char(c)),

        Backspace if plain => Some(AppEvent::Backspace),
        Enter if plain => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Up => Some(AppEvent::Nav(Direction::Up)),
        Down => Some(AppEvent::Nav(Direction::Down)),
        Left => Some(AppEvent::Nav(Direction::Left)),
        Right => Some(AppEvent::Nav(Direction::Right)),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
