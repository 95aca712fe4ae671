//! `:` command line: parsing and execution.
//!
//! | Command | Action |
//! |---------|--------|
//! | `q`, `quit` | Quit |
//! | `help` | Toggle the help popup |
//! | `theme <name>` | Switch theme (`default`, `gruvbox`) |
//! | `ts`, `timestamps` | Toggle timestamps in the live feed |
//! | `tail` | Jump to the newest live event |
//! | `pause`, `resume` | Stop or restart the live feed |
//! | `filter <type>` | Set the history type filter (`all`, `info`, ...) |
//! | `export [dir]` | Write the filtered history to CSV |
//! | `view <name>` | Show `dashboard` or `logs` |

use std::path::PathBuf;

use tradewatch_core::TypeFilter;

use crate::app::{AppState, View};
use crate::event::AppEvent;
use crate::theme::{Theme, THEME_NAMES};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Theme(String),
    Timestamps,
    Tail,
    Pause,
    Resume,
    Filter(TypeFilter),
    /// `None` exports into the configured directory.
    Export(Option<PathBuf>),
    View(View),
}

impl Command {
    /// Parse the text after the `:` prefix.
    ///
    /// An empty string returns `Err("")` as a sentinel meaning "close without
    /// acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "tail" => Ok(Command::Tail),
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "theme" => match Theme::by_name(rest) {
                Some(_) => Ok(Command::Theme(rest.to_string())),
                None => Err(format!("usage: theme <{}>", THEME_NAMES.join("|"))),
            },
            "filter" => rest
                .parse::<TypeFilter>()
                .map(Command::Filter)
                .map_err(|_| "usage: filter <all|info|success|warning|error|trade>".to_string()),
            "export" => Ok(Command::Export(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "view" => rest
                .parse::<View>()
                .map(Command::View)
                .map_err(|_| "usage: view <dashboard|logs>".to_string()),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => s.quit = true,
        Command::Help => s.show_help = !s.show_help,
        Command::Theme(name) => {
            if let Some(theme) = Theme::by_name(&name) {
                tracing::debug!(theme = theme.name, "theme switched");
                s.theme = theme;
            }
        }
        Command::Timestamps => s.feed_pane.show_timestamps = !s.feed_pane.show_timestamps,
        Command::Tail => s.feed_pane.handle(&AppEvent::ScrollToTail, s.feed.len()),
        Command::Pause => s.feed.pause(),
        Command::Resume => s.feed.resume(),
        Command::Filter(filter) => s.set_filter(filter),
        Command::Export(dir) => s.export_history(dir),
        Command::View(view) => s.view = view,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
