//! tradewatch TUI: ratatui application shell.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState, View};

use anyhow::Context;
use chrono::Utc;
use tradewatch_core::config::Config;
use tradewatch_core::fixtures::generate_history;
use tradewatch_core::HistoryStore;
use tradewatch_feeds::{FeedMode, FeedSettings, LiveFeed};

/// Start the TUI with the mock history and a live feed in `mode`.
///
/// Must be called from within a tokio runtime context (the feed's source
/// tasks are spawned onto it); the event loop itself blocks the calling
/// thread.
pub fn run(config: Config, mode: FeedMode) -> anyhow::Result<()> {
    tokio::runtime::Handle::try_current()
        .context("the TUI must run inside a tokio runtime")?;

    let theme = theme::Theme::load_default();
    let history = HistoryStore::new(generate_history(config.history.seed_count, Utc::now()));

    let mut feed = LiveFeed::new(mode, FeedSettings::from(&config.feed));
    feed.start();
    tracing::info!(mode = ?feed.mode(), capacity = feed.capacity(), "live feed started");

    App::new(AppState::new(config, theme, feed, history)).run()
}
