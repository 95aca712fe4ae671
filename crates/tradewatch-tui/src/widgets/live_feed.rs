//! Live feed pane: the auto-tailing view of [`LiveFeed`]'s buffer.
//!
//! # Scroll semantics
//!
//! `scroll_offset` = number of events hidden at the bottom (0 = live tail).
//! While tailing, new events push older ones off the top. Once the user
//! scrolls up, the view stays anchored on the same events and arrivals are
//! counted in `unseen` until `G` (or scrolling back down) returns to the tail.
//!
//! [`LiveFeed`]: tradewatch_feeds::LiveFeed

use std::cell::Cell;
use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};
use tradewatch_core::{ConnectionState, LogEvent};

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;

const PAGE_STEP: usize = 10;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LiveFeedPaneState {
    /// Number of events hidden at the bottom (0 = live tail).
    pub scroll_offset: usize,
    /// Events that arrived while scrolled away from the tail.
    pub unseen: usize,
    pub show_timestamps: bool,
    /// chrono format string for the time column.
    pub timestamp_format: String,
    last_height: Cell<usize>,
}

impl Default for LiveFeedPaneState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            unseen: 0,
            show_timestamps: true,
            timestamp_format: "%H:%M:%S".to_string(),
            last_height: Cell::new(20),
        }
    }
}

impl LiveFeedPaneState {
    pub fn new(show_timestamps: bool, timestamp_format: impl Into<String>) -> Self {
        Self {
            show_timestamps,
            timestamp_format: timestamp_format.into(),
            ..Self::default()
        }
    }

    pub fn is_tailing(&self) -> bool {
        self.scroll_offset == 0
    }

    /// Account for `appended` new events in a buffer now holding `total`.
    pub fn on_appended(&mut self, appended: usize, total: usize) {
        if appended == 0 || self.is_tailing() {
            return;
        }
        self.unseen += appended;
        self.scroll_offset = (self.scroll_offset + appended).min(total.saturating_sub(1));
    }

    /// Handle a navigation event. `total` is the current buffer length.
    pub fn handle(&mut self, event: &AppEvent, total: usize) {
        let max_offset = total.saturating_sub(1);
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.scroll_offset = (self.scroll_offset + 1).min(max_offset);
            }
            AppEvent::Nav(Direction::Down) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppEvent::ScrollUp => {
                let step = PAGE_STEP.max(self.last_height.get() / 2);
                self.scroll_offset = (self.scroll_offset + step).min(max_offset);
            }
            AppEvent::ScrollDown => {
                let step = PAGE_STEP.max(self.last_height.get() / 2);
                self.scroll_offset = self.scroll_offset.saturating_sub(step);
            }
            AppEvent::ScrollToTail => self.scroll_offset = 0,
            _ => return,
        }
        if self.is_tailing() {
            self.unseen = 0;
        }
        tracing::trace!(scroll_offset = self.scroll_offset, "feed pane scrolled");
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Snapshot of the controller the pane renders.
pub struct FeedView<'a> {
    pub events: &'a VecDeque<LogEvent>,
    pub status: ConnectionState,
    pub paused: bool,
    pub ops_per_minute: usize,
}

pub struct LiveFeedPane<'a> {
    state: &'a LiveFeedPaneState,
    feed: FeedView<'a>,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> LiveFeedPane<'a> {
    pub fn new(
        state: &'a LiveFeedPaneState,
        feed: FeedView<'a>,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { state, feed, focused, theme }
    }
}

impl Widget for LiveFeedPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status = status_badge(self.feed.status, self.theme);
        let rate = Line::from(vec![
            Span::styled(
                format!(" {} ops/min ", self.feed.ops_per_minute),
                Style::default().add_modifier(Modifier::DIM),
            ),
            if self.feed.paused {
                Span::styled(" RESUME (p) ", Style::default().bg(Color::Blue).fg(Color::White))
            } else {
                Span::styled(" PAUSE (p) ", Style::default().add_modifier(Modifier::DIM))
            },
        ])
        .alignment(Alignment::Right);

        let block = Block::bordered()
            .title(Line::from(vec![Span::raw(" Real-time Execution "), status]))
            .title(rate)
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        self.state.last_height.set(height);

        let events = self.feed.events;
        if events.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Waiting for incoming signals...",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        }

        let total = events.len();
        let end = total.saturating_sub(self.state.scroll_offset);
        let start = end.saturating_sub(height);

        let mut lines: Vec<Line<'static>> = events
            .range(start..end)
            .map(|event| render_event(event, self.state, self.theme))
            .collect();

        let banner = if self.feed.paused {
            Some(" ⏸  paused  (p to resume) ".to_string())
        } else if !self.state.is_tailing() {
            Some(format!(" ↑ scrolled  {} new  (G to follow) ", self.state.unseen))
        } else {
            None
        };
        if let Some(msg) = banner {
            let banner = Line::from(Span::styled(
                msg,
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            if lines.len() < height {
                lines.insert(0, banner);
            } else {
                lines[0] = banner;
            }
        }

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines).render(text_area, buf);

        let mut sb_state = ScrollbarState::new(total)
            .position(start)
            .viewport_content_length(height);
        StatefulWidget::render(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            sb_area,
            buf,
            &mut sb_state,
        );
    }
}

/// ` ● LIVE ` / ` ◌ connecting ` / ` ○ disconnected `.
fn status_badge(status: ConnectionState, theme: &Theme) -> Span<'static> {
    let text = match status {
        ConnectionState::Connected => " ● LIVE ".to_string(),
        ConnectionState::Connecting => format!(" ◌ {status} "),
        ConnectionState::Disconnected => format!(" ○ {status} "),
    };
    Span::styled(text, theme.status_style(status))
}

// ---------------------------------------------------------------------------
// Event rendering
// ---------------------------------------------------------------------------

fn render_event(event: &LogEvent, state: &LiveFeedPaneState, theme: &Theme) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(6);

    if state.show_timestamps {
        spans.push(Span::styled(
            format!("{} ", local_time(event.timestamp, &state.timestamp_format)),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    spans.push(Span::styled(
        format!("{:<9} ", format!("[{}]", event.kind)),
        theme.type_style(event.kind).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(
        format!("@{:<16} ", event.account),
        theme.account_style(&event.account),
    ));
    spans.push(Span::raw(event.message.clone()));
    if let Some(amount) = &event.amount {
        spans.push(Span::styled(format!("  {amount}"), theme.impact_style(amount)));
    }

    Line::from(spans)
}

fn local_time(ts: DateTime<Utc>, format: &str) -> String {
    ts.with_timezone(&Local).format(format).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
