//! Navigation bar widget.

use freebase_cursor::{NavCommand, NavigationBar};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::theme::Theme;

/// First/previous/next/last buttons around the position field.
pub struct NavBarView<'a> {
    theme: &'a Theme,
    navbar: &'a NavigationBar,
}

impl<'a> NavBarView<'a> {
    pub fn new(theme: &'a Theme, navbar: &'a NavigationBar) -> Self {
        Self { theme, navbar }
    }

    fn button(&self, command: NavCommand) -> Span<'static> {
        let style = if self.navbar.is_enabled(command) {
            self.theme.nav_button
        } else {
            self.theme.nav_disabled
        };
        Span::styled(format!(" {} ", command.symbol()), style)
    }
}

impl Widget for NavBarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            self.button(NavCommand::First),
            self.button(NavCommand::PrevPage),
            self.button(NavCommand::Prev),
            Span::raw(" "),
            Span::styled(format!(" {} ", self.navbar.label()), self.theme.nav_position),
            Span::raw(" "),
            self.button(NavCommand::Next),
            self.button(NavCommand::NextPage),
            self.button(NavCommand::Last),
        ];
        spans.push(Span::styled(
            format!("  page {}", self.navbar.page_size()),
            self.theme.help_desc,
        ));

        Paragraph::new(Line::from(spans))
            .style(self.theme.footer)
            .render(area, buf);
    }
}
