//! tradewatch: terminal dashboard for a trading bot's live activity feed and
//! historical logs.
//!
//! The interactive UI lives in `tradewatch-tui`. This crate adds the
//! non-interactive entry points the binary exposes (headless tailing and
//! one-shot export) so integration tests can drive them directly.
//!
//! # Architecture
//!
//! ```text
//! synthetic timer ─┐
//!                  ├──► LiveFeed (bounded buffer) ──► live pane / headless lines
//! SSE endpoint ────┘
//!
//! fixtures ──► HistoryStore ──► query ──► history table
//!                                  └──► CSV export
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, SecondsFormat};
use tradewatch_core::config::{Config, FeedModeKind};
use tradewatch_core::export::write_export;
use tradewatch_core::{HistoryStore, LogEvent, TypeFilter};
use tradewatch_feeds::{FeedMode, LiveFeed};

pub use tradewatch_core::config;
pub use tradewatch_feeds::FeedSettings;

/// Resolve the feed source: an explicit endpoint forces external mode,
/// otherwise the config decides.
pub fn feed_mode(config: &Config, endpoint: Option<&str>) -> FeedMode {
    match endpoint {
        Some(url) => FeedMode::External(url.to_string()),
        None if config.feed.mode == FeedModeKind::External => {
            FeedMode::External(config.feed.endpoint.clone())
        }
        None => FeedMode::Synthetic,
    }
}

/// One event as a plain text line:
/// `2024-12-26T09:30:00.000Z [TRADE] @user_8821 Sold player ... +4200`.
pub fn format_line(event: &LogEvent) -> String {
    let mut line = format!(
        "{} [{}] @{} {}",
        event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        event.kind,
        event.account,
        event.message
    );
    if let Some(amount) = &event.amount {
        line.push(' ');
        line.push_str(amount);
    }
    line
}

/// Drive an already-started feed until `count` events have been appended,
/// writing each as a [`format_line`] line. Returns the number written.
pub async fn run_headless<W: Write>(feed: &mut LiveFeed, count: usize, mut out: W) -> anyhow::Result<usize> {
    let mut written = 0;
    while written < count {
        let report = feed.next_signal().await;
        for status in &report.transitions {
            tracing::info!(%status, "feed status");
        }
        let fresh = report.appended.min(count - written);
        let skip = feed.len() - report.appended.min(feed.len());
        for event in feed.events().iter().skip(skip).take(fresh) {
            writeln!(out, "{}", format_line(event)).context("writing feed line")?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

/// Write the history rows matching `search` and `filter` to `dir` as a
/// date-stamped CSV. Returns the path and the row count.
pub fn run_export(
    history: &HistoryStore,
    dir: &Path,
    search: &str,
    filter: TypeFilter,
    date: NaiveDate,
) -> anyhow::Result<(PathBuf, usize)> {
    let rows = history.query(search, filter);
    let count = rows.len();
    let path = write_export(dir, date, rows)
        .with_context(|| format!("exporting history to {}", dir.display()))?;
    Ok((path, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tradewatch_core::LogType;

    #[test]
    fn endpoint_flag_overrides_config() {
        let config = Config::defaults();
        assert_eq!(feed_mode(&config, None), FeedMode::Synthetic);
        assert_eq!(
            feed_mode(&config, Some("http://localhost:9000/s")),
            FeedMode::External("http://localhost:9000/s".to_string())
        );
    }

    #[test]
    fn line_format() {
        let event = LogEvent {
            id: "a".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 12, 26, 9, 30, 0).unwrap(),
            kind: LogType::Trade,
            account: "user_8821".to_string(),
            message: "Sold player Mbappe for 42000 coins.".to_string(),
            amount: Some("+4200".to_string()),
        };
        assert_eq!(
            format_line(&event),
            "2024-12-26T09:30:00.000Z [TRADE] @user_8821 Sold player Mbappe for 42000 coins. +4200"
        );
    }
}
