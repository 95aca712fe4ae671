//! Dashboard view: stat cards, profit and volume charts, breakdowns and the
//! top items list.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Paragraph, Sparkline, Widget},
};
use tradewatch_core::{fixtures, AccountStat, ChartDataPoint, Slice, TopItem};

use crate::theme::Theme;

/// Everything the dashboard draws. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub stats: Vec<AccountStat>,
    pub chart: Vec<ChartDataPoint>,
    pub account_status: Vec<Slice>,
    pub assets: Vec<Slice>,
    pub top_items: Vec<TopItem>,
}

impl DashboardData {
    pub fn mock() -> Self {
        Self {
            stats: fixtures::account_stats(),
            chart: fixtures::chart_data(),
            account_status: fixtures::account_status(),
            assets: fixtures::asset_breakdown(),
            top_items: fixtures::top_items(),
        }
    }
}

pub struct Dashboard<'a> {
    data: &'a DashboardData,
    theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(data: &'a DashboardData, theme: &'a Theme) -> Self {
        Self { data, theme }
    }

    fn render_stats(&self, area: Rect, buf: &mut Buffer) {
        if self.data.stats.is_empty() {
            return;
        }
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(self.data.stats.iter().map(|_| Constraint::Fill(1)))
            .split(area);

        for (stat, cell) in self.data.stats.iter().zip(cells.iter()) {
            let mut value = vec![Span::styled(
                stat.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(trend) = &stat.trend {
                value.push(Span::raw("  "));
                value.push(Span::styled(trend.clone(), self.theme.impact_style(trend)));
            }
            Paragraph::new(Line::from(value))
                .block(
                    Block::bordered()
                        .title(format!(" {} ", stat.label))
                        .border_style(self.theme.border_unfocused),
                )
                .render(*cell, buf);
        }
    }

    fn render_charts(&self, area: Rect, buf: &mut Buffer) {
        let [profit_area, volume_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(2), Constraint::Fill(1)])
            .areas(area);

        // Profit in thousands so bar labels stay short.
        let bars: Vec<(&str, u64)> = self
            .data
            .chart
            .iter()
            .map(|p| (p.date.as_str(), p.profit / 1_000))
            .collect();
        BarChart::default()
            .block(
                Block::bordered()
                    .title(" Profit trend (k coins) ")
                    .border_style(self.theme.border_unfocused),
            )
            .bar_width(5)
            .bar_gap(2)
            .bar_style(self.theme.chart_profit)
            .value_style(self.theme.chart_profit.add_modifier(Modifier::REVERSED))
            .data(bars.as_slice())
            .render(profit_area, buf);

        let volume: Vec<u64> = self.data.chart.iter().map(|p| p.volume).collect();
        let peak = volume.iter().copied().max().unwrap_or(0);
        Sparkline::default()
            .block(
                Block::bordered()
                    .title(format!(" Volume (peak {peak}) "))
                    .border_style(self.theme.border_unfocused),
            )
            .style(self.theme.chart_volume)
            .data(volume.iter().copied())
            .render(volume_area, buf);
    }

    fn render_breakdowns(&self, area: Rect, buf: &mut Buffer) {
        let [status_area, assets_area, items_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Fill(1), Constraint::Fill(1)])
            .areas(area);

        self.render_slices(" Account status ", &self.data.account_status, status_area, buf);
        self.render_slices(" Asset breakdown ", &self.data.assets, assets_area, buf);

        let best = self.data.top_items.first().map(|i| i.profit).unwrap_or(0);
        let lines: Vec<Line> = self
            .data
            .top_items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let rating = if item.rating > 0 {
                    item.rating.to_string()
                } else {
                    "N/A".to_string()
                };
                Line::from(vec![
                    Span::styled(format!("{}. ", idx + 1), Style::default().add_modifier(Modifier::DIM)),
                    Span::styled(format!("{:<14}", item.name), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("+{:<8}", item.profit), self.theme.impact_gain),
                    Span::raw(bar(item.profit, best, 6)),
                    Span::styled(
                        format!(" ×{} ★{}", item.count, rating),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Top items ")
                    .border_style(self.theme.border_unfocused),
            )
            .render(items_area, buf);
    }

    fn render_slices(&self, title: &str, slices: &[Slice], area: Rect, buf: &mut Buffer) {
        let total: u64 = slices.iter().map(|s| s.value).sum();
        let lines: Vec<Line> = slices
            .iter()
            .map(|slice| {
                let pct = if total == 0 {
                    0.0
                } else {
                    slice.value as f64 * 100.0 / total as f64
                };
                Line::from(vec![
                    Span::styled(format!("{:<14}", slice.name), self.theme.account_style(&slice.name)),
                    Span::raw(bar(slice.value, total, 10)),
                    Span::styled(format!(" {pct:>5.1}%"), Style::default().add_modifier(Modifier::DIM)),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(title.to_string())
                    .border_style(self.theme.border_unfocused),
            )
            .render(area, buf);
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [stats, charts, breakdowns] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Fill(1), Constraint::Length(7)])
            .areas(area);

        self.render_stats(stats, buf);
        self.render_charts(charts, buf);
        self.render_breakdowns(breakdowns, buf);
    }
}

/// Horizontal bar of `width` cells filled in proportion to `value / max`.
fn bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        (((value as f64 / max as f64) * width as f64).round() as usize).min(width)
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(0, 10, 4), "░░░░");
        assert_eq!(bar(5, 10, 4), "██░░");
        assert_eq!(bar(10, 10, 4), "████");
        assert_eq!(bar(3, 0, 2), "░░");
    }

    #[test]
    fn renders_mock_data() {
        let data = DashboardData::mock();
        let theme = Theme::load_default();
        let area = Rect::new(0, 0, 140, 30);
        let mut buf = Buffer::empty(area);
        Dashboard::new(&data, &theme).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Total Coins"));
        assert!(text.contains("4,662,156"));
        assert!(text.contains("Profit trend"));
        assert!(text.contains("Account status"));
        assert!(text.contains("Van Dijk"));
    }
}
