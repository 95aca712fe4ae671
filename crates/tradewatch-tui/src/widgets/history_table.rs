//! History table: one page of the current query with a results footer.

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, Widget},
};
use tradewatch_core::history::Page;
use tradewatch_core::LogEvent;

use crate::theme::Theme;

pub struct HistoryTable<'a> {
    page: &'a Page<'a>,
    /// Active search term; matches are highlighted.
    needle: &'a str,
    timestamp_format: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> HistoryTable<'a> {
    pub fn new(
        page: &'a Page<'a>,
        needle: &'a str,
        timestamp_format: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            page,
            needle,
            timestamp_format,
            focused,
            theme,
        }
    }

    fn row(&self, event: &LogEvent) -> Row<'static> {
        let highlight = self.theme.search_highlight;
        let ts = event
            .timestamp
            .with_timezone(&Local)
            .format(&format!("%Y-%m-%d {}", self.timestamp_format))
            .to_string();
        let impact = match &event.amount {
            Some(amount) => Line::from(Span::styled(amount.clone(), self.theme.impact_style(amount))),
            None => Line::from("-"),
        }
        .alignment(Alignment::Right);

        Row::new(vec![
            Cell::from(Span::styled(ts, Style::default().add_modifier(Modifier::DIM))),
            Cell::from(Span::styled(
                event.kind.to_string(),
                self.theme.type_style(event.kind).add_modifier(Modifier::BOLD),
            )),
            Cell::from(Line::from(highlight_matches(
                &event.account,
                self.needle,
                self.theme.account_style(&event.account),
                highlight,
            ))),
            Cell::from(Line::from(highlight_matches(
                &event.message,
                self.needle,
                Style::default(),
                highlight,
            ))),
            Cell::from(impact),
        ])
    }
}

impl Widget for HistoryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let page = self.page;
        let footer = format!(
            " Showing {} to {} of {} results  ·  page {}/{}  ([ / ]) ",
            page.first,
            page.last,
            page.total,
            page.index + 1,
            page.page_count
        );
        let block = Block::bordered()
            .title(" Historical System Logs ")
            .title_bottom(Line::from(footer).alignment(Alignment::Right))
            .border_style(self.theme.border(self.focused));

        if page.rows.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(Span::styled(
                "No matching log entries.",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        }

        let header = Row::new(["Timestamp", "Level", "Account ID", "Message", "Impact"])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let rows: Vec<Row> = page.rows.iter().map(|event| self.row(event)).collect();
        let widths = [
            Constraint::Length(19),
            Constraint::Length(8),
            Constraint::Length(18),
            Constraint::Fill(1),
            Constraint::Length(9),
        ];

        Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .block(block)
            .render(area, buf);
    }
}

/// Split `text` into spans, styling every ASCII-case-insensitive occurrence
/// of `needle` with `highlight`.
pub fn highlight_matches(
    text: &str,
    needle: &str,
    base: Style,
    highlight: Style,
) -> Vec<Span<'static>> {
    if needle.is_empty() {
        return vec![Span::styled(text.to_string(), base)];
    }
    // ASCII lowering keeps byte offsets aligned with `text`.
    let hay = text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(found) = hay[pos..].find(&needle) {
        let start = pos + found;
        let end = start + needle.len();
        if start > pos {
            spans.push(Span::styled(text[pos..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), highlight));
        pos = end;
    }
    if pos < text.len() {
        spans.push(Span::styled(text[pos..].to_string(), base));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tradewatch_core::fixtures::generate_history;
    use tradewatch_core::history::page;
    use tradewatch_core::{HistoryStore, TypeFilter};

    fn spans_text(spans: &[Span]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn highlight_splits_on_every_match() {
        let base = Style::default();
        let hl = Style::default().add_modifier(Modifier::REVERSED);
        let spans = highlight_matches("Sold item, SOLD again", "sold", base, hl);
        assert_eq!(spans_text(&spans), vec!["Sold", " item, ", "SOLD", " again"]);
        assert_eq!(spans[0].style, hl);
        assert_eq!(spans[1].style, base);
    }

    #[test]
    fn highlight_without_needle_is_one_span() {
        let spans = highlight_matches("abc", "", Style::default(), Style::default());
        assert_eq!(spans_text(&spans), vec!["abc"]);
    }

    #[test]
    fn renders_footer_counts() {
        let store = HistoryStore::new(generate_history(25, Utc::now()));
        let rows = store.query("", TypeFilter::All);
        let page = page(&rows, 0, 10);
        let theme = Theme::load_default();

        let area = Rect::new(0, 0, 120, 16);
        let mut buf = Buffer::empty(area);
        HistoryTable::new(&page, "", "%H:%M:%S", false, &theme).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Showing 1 to 10 of 25 results"));
        assert!(text.contains("user_account_100"));
        assert!(text.contains("Account ID"));
    }

    #[test]
    fn empty_page_shows_placeholder() {
        let store = HistoryStore::new(Vec::new());
        let rows = store.query("nothing", TypeFilter::All);
        let page = page(&rows, 0, 10);
        let theme = Theme::load_default();

        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        HistoryTable::new(&page, "nothing", "%H:%M:%S", true, &theme).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("No matching log entries."));
        assert!(text.contains("Showing 0 to 0 of 0 results"));
    }
}
