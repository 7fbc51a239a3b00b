//! Key binding reference overlay.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::event::{HelpSection, KeyBinding, get_goto_help, get_help_sections};
use crate::theme::Theme;
use crate::ui::modals::popup;

/// Two-column list of key bindings plus the forms `:` accepts.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn entry(&self, keys: &str, description: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{keys:>12}"), self.theme.help_key),
            Span::styled(format!(" {description}"), self.theme.help_desc),
        ])
    }

    /// Lines of one column: each section's title, its entries, a gap.
    fn column_lines(&self, sections: &[&HelpSection]) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for section in sections {
            lines.push(Line::styled(section.title, self.theme.title));
            lines.extend(
                section
                    .bindings
                    .iter()
                    .map(|KeyBinding { keys, description }| self.entry(keys, description)),
            );
            lines.push(Line::default());
        }
        lines
    }

    fn draw_column(lines: &[Line], area: Rect, buf: &mut Buffer) {
        for (line, y) in lines.iter().zip(area.top()..area.bottom()) {
            buf.set_line(area.x, y, line, area.width);
        }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = popup(area, 72, 20);
        Clear.render(area, buf);

        let block = Block::default()
            .title(" Keys - ? or Esc closes ")
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(area);
        block.render(area, buf);

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);

        let sections = get_help_sections();
        let (left, right): (Vec<&HelpSection>, Vec<&HelpSection>) =
            sections.iter().partition(|s| s.title != "Application");

        let mut right_lines = self.column_lines(&right);
        right_lines.push(Line::styled("Go to (:)", self.theme.title));
        right_lines.extend(
            get_goto_help()
                .into_iter()
                .map(|(form, meaning)| self.entry(form, meaning)),
        );

        Self::draw_column(&self.column_lines(&left), left_area, buf);
        Self::draw_column(&right_lines, right_area, buf);
    }
}
