//! tradewatch-core: data model and history layer for tradewatch.
//!
//! This crate owns everything that does not depend on a live source or a
//! terminal: the [`LogEvent`] model, the [`HistoryStore`](history::HistoryStore)
//! and its CSV export, the mock fixtures, and configuration.
//!
//! # Architecture
//!
//! ```text
//! Feed source ──► LiveFeed ──► live pane
//!
//! fixtures ──► HistoryStore ──► query ──► history table
//!                                  │
//!                                  └──► export (CSV)
//! ```

pub mod config;
pub mod export;
pub mod fixtures;
pub mod history;
pub mod types;

pub use history::HistoryStore;
pub use types::{
    AccountStat, ChartDataPoint, ConnectionState, LogEvent, LogType, ParseLogTypeError, Slice,
    TopItem, TypeFilter,
};
