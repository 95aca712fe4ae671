//! History store: the session's past [`LogEvent`](crate::LogEvent) values and
//! the queries the history table runs against them.
//!
//! Events are immutable once the store is built. Storage order is the order
//! the table shows (newest first for the generated fixtures); every query
//! preserves it.

use crate::types::{LogEvent, TypeFilter};

/// In-memory collection of historical events.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    events: Vec<LogEvent>,
}

impl HistoryStore {
    pub fn new(events: Vec<LogEvent>) -> Self {
        tracing::debug!(count = events.len(), "history store built");
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Events whose `account` or `message` contains `search` (case-insensitive)
    /// and whose type passes `filter`. An empty search term matches everything.
    pub fn query(&self, search: &str, filter: TypeFilter) -> Vec<&LogEvent> {
        let needle = search.to_lowercase();
        self.events
            .iter()
            .filter(|event| filter.matches(event.kind))
            .filter(|event| {
                needle.is_empty()
                    || event.account.to_lowercase().contains(&needle)
                    || event.message.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a query result plus the counters the table footer shows
/// ("Showing `first` to `last` of `total` results").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub rows: Vec<&'a LogEvent>,
    /// Zero-based page index, clamped to the last page.
    pub index: usize,
    pub page_count: usize,
    /// One-based position of the first row; `0` when the result is empty.
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

/// Slice `rows` into pages of `page_size` and return page `index`.
///
/// An out-of-range index is clamped to the last page. A `page_size` of zero
/// is treated as one.
pub fn page<'a>(rows: &[&'a LogEvent], index: usize, page_size: usize) -> Page<'a> {
    let page_size = page_size.max(1);
    let total = rows.len();
    let page_count = total.div_ceil(page_size).max(1);
    let index = index.min(page_count - 1);
    let start = (index * page_size).min(total);
    let end = (start + page_size).min(total);

    Page {
        rows: rows[start..end].to_vec(),
        index,
        page_count,
        first: if start < end { start + 1 } else { 0 },
        last: end,
        total,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogType;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn event(id: &str, account: &str, message: &str, kind: LogType) -> LogEvent {
        LogEvent {
            id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 12, 20, 10, 0, 0).unwrap(),
            kind,
            account: account.to_string(),
            message: message.to_string(),
            amount: None,
        }
    }

    fn two_record_store() -> HistoryStore {
        HistoryStore::new(vec![
            event("1", "a1", "hello", LogType::Info),
            event("2", "b2", "world", LogType::Trade),
        ])
    }

    #[test]
    fn search_matches_account() {
        let store = two_record_store();
        let ids: Vec<_> = store.query("a1", TypeFilter::All).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn type_filter_selects_trade() {
        let store = two_record_store();
        let ids: Vec<_> = store
            .query("", TypeFilter::Only(LogType::Trade))
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive_on_message() {
        let store = two_record_store();
        assert_eq!(store.query("WORLD", TypeFilter::All).len(), 1);
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let store = two_record_store();
        let all: Vec<_> = store.query("", TypeFilter::All).into_iter().cloned().collect();
        assert_eq!(all, store.events().to_vec());
    }

    #[test]
    fn empty_store_queries_to_empty() {
        let store = HistoryStore::default();
        assert!(store.query("anything", TypeFilter::All).is_empty());
    }

    #[test]
    fn page_clamps_and_counts() {
        let store = HistoryStore::new(
            (0..25)
                .map(|i| event(&i.to_string(), "acc", "msg", LogType::Info))
                .collect(),
        );
        let rows = store.query("", TypeFilter::All);

        let first = page(&rows, 0, 10);
        assert_eq!((first.first, first.last, first.total), (1, 10, 25));
        assert_eq!(first.page_count, 3);

        let last = page(&rows, 99, 10);
        assert_eq!(last.index, 2);
        assert_eq!((last.first, last.last), (21, 25));
        assert_eq!(last.rows.len(), 5);
    }

    #[test]
    fn page_of_empty_result() {
        let p = page(&[], 3, 10);
        assert_eq!((p.index, p.first, p.last, p.total, p.page_count), (0, 0, 0, 0, 1));
        assert!(p.rows.is_empty());
    }
}
