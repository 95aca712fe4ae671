//! Mock datasets for the dashboard and the history table.
//!
//! Nothing here is global state: callers build the data they need and hand
//! it to the store or the UI at construction, so tests can substitute their
//! own fixtures.

use chrono::{DateTime, Duration, Utc};

use crate::types::{AccountStat, ChartDataPoint, LogEvent, LogType, Slice, TopItem};

/// Gap between consecutive generated history rows.
pub const HISTORY_SPACING_MINUTES: i64 = 15;

/// Build `count` historical events, newest first, spaced
/// [`HISTORY_SPACING_MINUTES`] apart going back from `now`.
///
/// Every fifth row is a trade with an amount. Every other row is a routine
/// health check, tagged as a warning on every third index.
pub fn generate_history(count: usize, now: DateTime<Utc>) -> Vec<LogEvent> {
    (0..count)
        .map(|i| {
            let kind = if i % 5 == 0 {
                LogType::Trade
            } else if i % 3 == 0 {
                LogType::Warning
            } else {
                LogType::Info
            };
            let (message, amount) = if kind == LogType::Trade {
                let coins = (i as u64 + 1) * 200;
                (
                    format!("Sold item for {coins} coins via automated process."),
                    Some(format!("+{coins}")),
                )
            } else {
                ("Standard health check routine passed.".to_string(), None)
            };

            LogEvent {
                id: format!("hist-{i}"),
                timestamp: now - Duration::minutes(i as i64 * HISTORY_SPACING_MINUTES),
                kind,
                account: format!("user_account_{}", 100 + (i % 10)),
                message,
                amount,
            }
        })
        .collect()
}

/// Seven days of profit and volume.
pub fn chart_data() -> Vec<ChartDataPoint> {
    [
        ("12/20", 620_000, 2_400),
        ("12/21", 150_000, 1_398),
        ("12/22", 280_000, 9_800),
        ("12/23", 290_000, 3_908),
        ("12/24", 350_000, 4_800),
        ("12/25", 10_000, 3_800),
        ("12/26", 50_000, 4_300),
    ]
    .into_iter()
    .map(|(date, profit, volume)| ChartDataPoint {
        date: date.to_string(),
        profit,
        volume,
    })
    .collect()
}

pub fn account_stats() -> Vec<AccountStat> {
    let stat = |id: &str, label: &str, value: &str, trend: Option<&str>| AccountStat {
        id: id.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        trend: trend.map(str::to_string),
    };
    vec![
        stat("coins", "Total Coins", "4,662,156", Some("+5.2%")),
        stat("profit", "Profit (7d)", "1,750,000", Some("+12.8%")),
        stat("accounts", "Active Accounts", "39 / 55", None),
    ]
}

/// Account status distribution (Active / Sleep / Captcha / Soft Ban).
pub fn account_status() -> Vec<Slice> {
    slices(&[("Active", 39), ("Sleep", 12), ("Captcha", 3), ("Soft Ban", 1)])
}

/// Where the coin balance currently sits.
pub fn asset_breakdown() -> Vec<Slice> {
    slices(&[
        ("Liquid Coins", 4_662_156),
        ("Transfer List", 2_100_500),
        ("Unassigned", 450_000),
    ])
}

pub fn top_items() -> Vec<TopItem> {
    [
        ("K. Mbappé", 450_000, 12, 91),
        ("V. Van Dijk", 210_000, 28, 89),
        ("Shadow Chem", 155_000, 145, 0),
        ("T. Hernández", 98_000, 42, 85),
    ]
    .into_iter()
    .map(|(name, profit, count, rating)| TopItem {
        name: name.to_string(),
        profit,
        count,
        rating,
    })
    .collect()
}

fn slices(src: &[(&str, u64)]) -> Vec<Slice> {
    src.iter()
        .map(|(name, value)| Slice {
            name: name.to_string(),
            value: *value,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
