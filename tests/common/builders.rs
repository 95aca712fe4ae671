//! Test builders: ergonomic constructors for `LogEvent`, histories and feeds.
//!
//! These builders are designed for readability in test assertions, not for
//! production use.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tradewatch_core::{HistoryStore, LogEvent, LogType};
use tradewatch_feeds::{FeedMode, FeedSettings, LiveFeed, StreamConnector};

/// Fixed reference instant so timestamps in assertions are stable.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 26, 9, 30, 0).unwrap()
}

// ---------------------------------------------------------------------------
// LogEventBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogEvent`] test fixtures.
///
/// # Example
///
/// ```rust
/// let event = LogEventBuilder::new("e1", "Sold player Mbappe")
///     .kind(LogType::Trade)
///     .account("user_8821")
///     .amount("+4200")
///     .build();
/// ```
pub struct LogEventBuilder {
    id: String,
    timestamp: DateTime<Utc>,
    kind: LogType,
    account: String,
    message: String,
    amount: Option<String>,
}

impl LogEventBuilder {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: base_time(),
            kind: LogType::Info,
            account: "System".to_string(),
            message: message.into(),
            amount: None,
        }
    }

    pub fn kind(mut self, kind: LogType) -> Self {
        self.kind = kind;
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> LogEvent {
        LogEvent {
            id: self.id,
            timestamp: self.timestamp,
            kind: self.kind,
            account: self.account,
            message: self.message,
            amount: self.amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Build an INFO event with a sequential id.
pub fn info_event(seq: usize) -> LogEvent {
    LogEventBuilder::new(format!("e{seq}"), format!("event {seq}"))
        .at(base_time() + chrono::Duration::seconds(seq as i64))
        .build()
}

/// Build a TRADE event for `account` with an impact.
pub fn trade_event(id: &str, account: &str, message: &str, amount: &str) -> LogEvent {
    LogEventBuilder::new(id, message)
        .kind(LogType::Trade)
        .account(account)
        .amount(amount)
        .build()
}

/// The two-record history used across the query and export harnesses:
/// one trade by `user_8821` and one system error.
pub fn two_record_history() -> HistoryStore {
    HistoryStore::new(vec![
        trade_event("1", "user_8821", "Sold player Mbappe for 42000 coins.", "+4200"),
        LogEventBuilder::new("2", "Proxy connection timed out")
            .kind(LogType::Error)
            .at(base_time() + chrono::Duration::minutes(15))
            .build(),
    ])
}

// ---------------------------------------------------------------------------
// Feed constructors
// ---------------------------------------------------------------------------

/// Settings with the stock 3 s retry and 1.5 s tick, a fixed seed, and the
/// given capacity.
pub fn settings(capacity: usize) -> FeedSettings {
    FeedSettings {
        capacity,
        seed: Some(7),
        ..FeedSettings::default()
    }
}

/// An external-mode feed at `http://feed.test/stream` that dials through
/// `connector`.
pub fn external_feed(connector: Arc<dyn StreamConnector>) -> LiveFeed {
    LiveFeed::with_connector(
        FeedMode::External("http://feed.test/stream".to_string()),
        settings(200),
        connector,
    )
}

/// A synthetic feed ticking every `tick`.
pub fn synthetic_feed(tick: Duration) -> LiveFeed {
    LiveFeed::new(
        FeedMode::Synthetic,
        FeedSettings {
            tick,
            ..settings(200)
        },
    )
}
