//! Domain-specific assertion macros for tradewatch harnesses.
//!
//! These wrap `pretty_assertions` and print the buffer or row set on failure
//! so it is clear which events were actually present.

use tradewatch_core::LogEvent;

/// Assert that a sequence of events carries exactly these ids, in order.
///
/// ```rust
/// assert_ids!(feed.events(), ["e1", "e2"]);
/// ```
#[macro_export]
macro_rules! assert_ids {
    ($events:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $events.into_iter().map(|e| e.id.as_str()).collect();
        let expected: Vec<&str> = vec![$($id),*];
        pretty_assertions::assert_eq!(actual, expected, "event ids differ");
    }};
}

/// Assert the connection-state transitions recorded in a `PumpReport`.
///
/// ```rust
/// assert_transitions!(feed.pump(), [ConnectionState::Connected]);
/// ```
#[macro_export]
macro_rules! assert_transitions {
    ($report:expr, [$($state:expr),* $(,)?]) => {{
        let report: tradewatch_feeds::PumpReport = $report;
        let expected: Vec<tradewatch_core::ConnectionState> = vec![$($state),*];
        pretty_assertions::assert_eq!(report.transitions, expected, "status transitions differ");
    }};
}

/// Assert that every event in a result set satisfies a predicate.
#[macro_export]
macro_rules! assert_rows_all {
    ($rows:expr, $pred:expr) => {{
        let rows: &[&tradewatch_core::LogEvent] = &$rows;
        let pred = $pred;
        let failing: Vec<&tradewatch_core::LogEvent> = rows.iter().copied().filter(|e| !pred(*e)).collect();
        if !failing.is_empty() {
            panic!(
                "assert_rows_all! failed: {} of {} rows did not satisfy predicate.\n  first: {:?}",
                failing.len(),
                rows.len(),
                failing[0]
            );
        }
    }};
}

/// Timestamps must never go backwards through a buffer.
pub fn assert_non_decreasing<'a>(events: impl IntoIterator<Item = &'a LogEvent>) {
    let mut last = None;
    for event in events {
        if let Some(prev) = last {
            assert!(
                event.timestamp >= prev,
                "timestamp went backwards at {:?}: {} < {}",
                event.id,
                event.timestamp,
                prev
            );
        }
        last = Some(event.timestamp);
    }
}
