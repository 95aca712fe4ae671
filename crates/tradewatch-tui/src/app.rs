//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. All behaviour lives on
//! [`AppState`] so it can be exercised without a terminal.

use std::path::PathBuf;
use std::{io, time::Duration};

use chrono::{Local, Utc};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    Frame, Terminal,
};
use tradewatch_core::config::Config;
use tradewatch_core::export::write_export;
use tradewatch_core::history::{page, Page};
use tradewatch_core::{ConnectionState, HistoryStore, LogEvent, TypeFilter};
use tradewatch_feeds::{FeedMode, LiveFeed, PumpReport};

use crate::{
    commands::{execute_command, Command},
    event::{self, AppEvent},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        dashboard::{Dashboard, DashboardData},
        help::HelpPopup,
        history_table::HistoryTable,
        live_feed::{FeedView, LiveFeedPane, LiveFeedPaneState},
        search_bar::{SearchBar, SearchBarState},
        tab_bar::TabBar,
    },
};

// ---------------------------------------------------------------------------
// View + focus types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Logs,
}

impl View {
    pub const ALL: [View; 2] = [View::Dashboard, View::Logs];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Logs => "Logs",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Logs => 1,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "dash" | "1" => Ok(View::Dashboard),
            "logs" | "history" | "2" => Ok(View::Logs),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Navigation keys scroll the live feed.
    Feed,
    /// Keys edit the history search term.
    Search,
    /// Vim-style `:` command line is active.
    Command,
}

/// One-line message in the footer, replaced by the next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub error: bool,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), error: false }
    }

    fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), error: true }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub view: View,
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,

    pub feed: LiveFeed,
    pub feed_pane: LiveFeedPaneState,

    pub history: HistoryStore,
    pub search: SearchBarState,
    pub filter: TypeFilter,
    /// Zero-based history page; clamped when rendered.
    pub page: usize,

    pub dashboard: DashboardData,
    pub command_bar: CommandBarState,
    pub status: Option<StatusLine>,
    pub show_help: bool,
    pub quit: bool,
}

impl AppState {
    pub fn new(mut config: Config, theme: Theme, feed: LiveFeed, history: HistoryStore) -> Self {
        config.ui.sanitize();
        let feed_pane =
            LiveFeedPaneState::new(config.ui.show_timestamps, config.ui.timestamp_format.clone());
        Self {
            view: View::default(),
            focus: Focus::Feed,
            prev_focus: Focus::Feed,
            theme,
            config,
            feed,
            feed_pane,
            history,
            search: SearchBarState::default(),
            filter: TypeFilter::All,
            page: 0,
            dashboard: DashboardData::mock(),
            command_bar: CommandBarState::default(),
            status: None,
            show_help: false,
            quit: false,
        }
    }

    /// History rows matching the current search and filter.
    pub fn filtered(&self) -> Vec<&LogEvent> {
        self.history.query(&self.search.query, self.filter)
    }

    pub fn current_page(&self) -> Page<'_> {
        page(&self.filtered(), self.page, self.config.history.page_size)
    }

    pub fn set_filter(&mut self, filter: TypeFilter) {
        tracing::debug!(%filter, "history filter");
        self.filter = filter;
        self.page = 0;
    }

    /// Write the filtered history to `dir` (or the configured export
    /// directory) and report the outcome in the footer.
    pub fn export_history(&mut self, dir: Option<PathBuf>) {
        let dir = dir.unwrap_or_else(|| self.config.history.export_dir.clone());
        let rows = self.filtered();
        let count = rows.len();
        let status = match write_export(&dir, Local::now().date_naive(), rows) {
            Ok(path) => StatusLine::info(format!("exported {count} rows to {}", path.display())),
            Err(e) => {
                tracing::error!(error = %e, dir = %dir.display(), "export failed");
                StatusLine::error(format!("export failed: {e}"))
            }
        };
        self.status = Some(status);
    }

    /// Apply pending feed signals. Called once per frame.
    pub fn tick(&mut self) -> PumpReport {
        let report = self.feed.pump();
        self.feed_pane.on_appended(report.appended, self.feed.len());
        for status in &report.transitions {
            match status {
                ConnectionState::Disconnected if !self.feed.is_paused() => {
                    let retry = self.config.feed.retry_delay();
                    self.status = Some(StatusLine::error(format!(
                        "stream disconnected, retrying in {}s",
                        retry.as_secs_f32()
                    )));
                }
                ConnectionState::Connected => {
                    if self.status.as_ref().is_some_and(|s| s.error) {
                        self.status = None;
                    }
                }
                _ => {}
            }
        }
        report
    }

    pub fn handle(&mut self, event: AppEvent) {
        // Help popup intercepts all events; only close keys pass through.
        if self.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                self.show_help = false;
            }
            return;
        }

        if self.focus == Focus::Command {
            self.handle_command_key(event);
            return;
        }

        if self.focus == Focus::Search {
            match event {
                AppEvent::Escape | AppEvent::Enter => {
                    tracing::debug!(query = %self.search.query, "search closed");
                    self.focus = Focus::Feed;
                }
                AppEvent::Quit => self.quit = true,
                other => {
                    if self.search.handle(&other) {
                        self.page = 0;
                    }
                }
            }
            return;
        }

        match event {
            AppEvent::Char('?') => {
                tracing::debug!("help popup opened");
                self.show_help = true;
            }
            AppEvent::Char(':') => {
                tracing::debug!(prev_focus = ?self.focus, "entering command mode");
                self.prev_focus = self.focus;
                self.command_bar.clear();
                self.focus = Focus::Command;
            }
            AppEvent::Quit => {
                tracing::debug!("quit");
                self.quit = true;
            }
            AppEvent::NextView => self.view = self.view.next(),
            AppEvent::ShowView(i) => self.view = View::ALL[i.min(View::ALL.len() - 1)],
            AppEvent::SearchFocus => {
                self.view = View::Logs;
                self.focus = Focus::Search;
            }
            AppEvent::TogglePause => {
                self.feed.toggle_pause();
                let text = if self.feed.is_paused() { "feed paused" } else { "feed resumed" };
                self.status = Some(StatusLine::info(text));
            }
            AppEvent::CycleFilter => self.set_filter(self.filter.cycle()),
            AppEvent::Export => self.export_history(None),
            AppEvent::PrevPage | AppEvent::NextPage => {
                let (index, page_count) = {
                    let current = self.current_page();
                    (current.index, current.page_count)
                };
                self.page = if event == AppEvent::NextPage {
                    (index + 1).min(page_count - 1)
                } else {
                    index.saturating_sub(1)
                };
            }
            AppEvent::Escape => self.status = None,
            ev @ (AppEvent::Nav(_)
            | AppEvent::ScrollUp
            | AppEvent::ScrollDown
            | AppEvent::ScrollToTail) => self.feed_pane.handle(&ev, self.feed.len()),
            _ => {}
        }
    }

    fn handle_command_key(&mut self, event: AppEvent) {
        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.command_bar.clear();
                self.focus = self.prev_focus;
            }
            AppEvent::Enter => match Command::parse(&self.command_bar.input) {
                Ok(cmd) => {
                    tracing::debug!(command = ?cmd, "executing command");
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    execute_command(self, cmd);
                }
                Err(msg) if msg.is_empty() => {
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                }
                // Show the error; bar stays open
                Err(msg) => self.command_bar.error = Some(msg),
            },
            AppEvent::Quit => self.quit = true,
            other => self.command_bar.handle(&other),
        }
    }

    /// Mode description shown in the footer when there is no status message.
    fn idle_status(&self) -> String {
        let source = match self.feed.mode() {
            FeedMode::Synthetic => "synthetic feed".to_string(),
            FeedMode::External(endpoint) => format!("stream {endpoint}"),
        };
        let state = if self.feed.is_paused() { "paused" } else { "running" };
        format!("{source} · {state} · {} buffered", self.feed.len())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
}

impl App {
    pub fn new(state: AppState) -> Self {
        App { state }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on
    /// exit. The live feed is disposed before returning.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        self.state.feed.dispose();
        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.state.tick();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                let insert = matches!(self.state.focus, Focus::Search | Focus::Command);
                let app_event = if insert {
                    event::to_app_event_insert(raw)
                } else {
                    event::to_app_event(raw)
                };
                if let Some(ev) = app_event {
                    tracing::trace!(focus = ?self.state.focus, event = ?ev, "key event");
                    self.state.handle(ev);
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 1-line view bar | body | 1-line footer
    let [top, body, footer] = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1), Constraint::Length(1)])
        .areas(area);

    let pct = state.config.ui.feed_pane_width_pct.clamp(20, 80);
    let [main, side] = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Percentage(pct)])
        .areas(body);

    frame.render_widget(TabBar::new(state.view, &state.theme), top);

    let mut search_area = None;
    match state.view {
        View::Dashboard => frame.render_widget(Dashboard::new(&state.dashboard, &state.theme), main),
        View::Logs => {
            let [bar, table] = Layout::default()
                .direction(LayoutDir::Vertical)
                .constraints([Constraint::Length(3), Constraint::Fill(1)])
                .areas(main);
            frame.render_widget(
                SearchBar::new(&state.search, state.filter, state.focus == Focus::Search, &state.theme),
                bar,
            );
            let rows = state.filtered();
            let page = page(&rows, state.page, state.config.history.page_size);
            frame.render_widget(
                HistoryTable::new(
                    &page,
                    &state.search.query,
                    &state.config.ui.timestamp_format,
                    false,
                    &state.theme,
                ),
                table,
            );
            search_area = Some(bar);
        }
    }

    let feed = FeedView {
        events: state.feed.events(),
        status: state.feed.status(),
        paused: state.feed.is_paused(),
        ops_per_minute: state.feed.ops_per_minute(Utc::now()),
    };
    frame.render_widget(
        LiveFeedPane::new(&state.feed_pane, feed, state.focus == Focus::Feed, &state.theme),
        side,
    );

    draw_footer(frame, state, footer);

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the footer row
    if state.focus == Focus::Command {
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), footer);
        let col = state.command_bar.cursor_col(footer);
        frame.set_cursor_position((col, footer.y));
        return;
    }

    if let (Focus::Search, Some(bar)) = (state.focus, search_area) {
        let sb = SearchBar::new(&state.search, state.filter, true, &state.theme);
        frame.set_cursor_position(sb.cursor_position(bar));
    }
}

fn draw_footer(frame: &mut Frame, state: &AppState, area: Rect) {
    let line = match &state.status {
        Some(status) if status.error => Line::from(Span::styled(
            format!(" {}", status.text),
            state.theme.status_disconnected,
        )),
        Some(status) => Line::from(Span::styled(
            format!(" {}", status.text),
            state.theme.status_connected,
        )),
        None => Line::from(Span::styled(
            format!(" {}", state.idle_status()),
            Style::default().add_modifier(Modifier::DIM),
        )),
    };
    frame.render_widget(line, area);
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
