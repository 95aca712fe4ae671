//! View bar: the strip of views at the top of the screen.

use crate::app::View;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Tabs, Widget},
};

/// Renders the 1-line view strip. Keybinding hints (`q:quit  ?:help`) are
/// right-aligned in the same row.
pub struct TabBar<'a> {
    active: View,
    theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(active: View, theme: &'a Theme) -> Self {
        Self { active, theme }
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.title())))
            .collect();

        Tabs::new(labels)
            .select(self.active.index())
            .highlight_style(
                self.theme
                    .border_focused
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("")
            .render(area, buf);

        let hint = " q:quit  ?:help ";
        let hint_x = area.right().saturating_sub(hint.len() as u16);
        buf.set_string(hint_x, area.y, hint, Style::default().add_modifier(Modifier::DIM));
    }
}
