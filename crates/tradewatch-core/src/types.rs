//! Core types for tradewatch-core.
//!
//! This module defines the data shared by the feed controller, the history
//! store and the UI: the [`LogEvent`] record, its [`LogType`], the feed's
//! [`ConnectionState`], and the dashboard records consumed by the charts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped record of bot activity, shown in the live feed or
/// the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Opaque identifier, unique within the buffer or store that holds it.
    pub id: String,
    /// When the event was generated (synthetic) or received (stream).
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: LogType,
    /// Originating account. No referential integrity is enforced.
    pub account: String,
    pub message: String,
    /// Signed monetary delta as text (e.g. `+4200`). Only trade-like events
    /// carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Severity / category of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Info,
    Success,
    Warning,
    Error,
    Trade,
}

impl LogType {
    /// Every variant, in display order.
    pub const ALL: [LogType; 5] = [
        LogType::Info,
        LogType::Success,
        LogType::Warning,
        LogType::Error,
        LogType::Trade,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Info => "INFO",
            LogType::Success => "SUCCESS",
            LogType::Warning => "WARNING",
            LogType::Error => "ERROR",
            LogType::Trade => "TRADE",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the five [`LogType`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log type: {0:?}")]
pub struct ParseLogTypeError(pub String);

impl std::str::FromStr for LogType {
    type Err = ParseLogTypeError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INFO" => Ok(LogType::Info),
            "SUCCESS" => Ok(LogType::Success),
            "WARNING" => Ok(LogType::Warning),
            "ERROR" => Ok(LogType::Error),
            "TRADE" => Ok(LogType::Trade),
            _ => Err(ParseLogTypeError(s.to_string())),
        }
    }
}

/// Type filter applied by the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(LogType),
}

impl TypeFilter {
    pub fn matches(self, kind: LogType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted == kind,
        }
    }

    /// Step through `All → INFO → … → TRADE → All`.
    pub fn cycle(self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Only(LogType::ALL[0]),
            TypeFilter::Only(kind) => {
                let idx = LogType::ALL.iter().position(|k| *k == kind).unwrap_or(0);
                LogType::ALL
                    .get(idx + 1)
                    .map(|next| TypeFilter::Only(*next))
                    .unwrap_or(TypeFilter::All)
            }
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::All => f.write_str("ALL"),
            TypeFilter::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl std::str::FromStr for TypeFilter {
    type Err = ParseLogTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

/// The feed controller's view of whether its source is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard records
// ---------------------------------------------------------------------------

/// One day of the profit / volume time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    /// Axis label, e.g. `12/20`.
    pub date: String,
    pub profit: u64,
    pub volume: u64,
}

/// A headline figure shown in a stat card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStat {
    pub id: String,
    pub label: String,
    pub value: String,
    /// e.g. `+5.2%`
    pub trend: Option<String>,
}

/// A named share of a categorical breakdown (account status, asset split).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub name: String,
    pub value: u64,
}

/// Best-performing traded item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItem {
    pub name: String,
    pub profit: u64,
    pub count: u32,
    /// `0` for non-player items.
    pub rating: u8,
}
