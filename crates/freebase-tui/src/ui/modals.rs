//! Modal dialog widgets.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::app::input::InputState;
use crate::theme::Theme;

/// Rect of a given size centered in an area.
pub(crate) fn popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(width)) / 2 + area.x;
    let y = (area.height.saturating_sub(height)) / 2 + area.y;
    Rect::new(x, y, width, height)
}

/// Asks whether unsaved edits may be thrown away.
pub struct DiscardConfirmModal<'a> {
    theme: &'a Theme,
    dirty_fields: &'a [String],
}

impl<'a> DiscardConfirmModal<'a> {
    /// Create a new discard confirmation modal.
    pub fn new(theme: &'a Theme, dirty_fields: &'a [String]) -> Self {
        Self {
            theme,
            dirty_fields,
        }
    }
}

impl Widget for DiscardConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_area = popup(area, 56, self.dirty_fields.len() as u16 + 7);
        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(" Unsaved Changes ")
            .title_style(
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.warning));
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let count = self.dirty_fields.len();
        let mut lines = vec![
            Line::styled(
                format!(
                    "Discard changes to {count} field{}?",
                    if count == 1 { "" } else { "s" }
                ),
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
        ];

        let max_items = (inner.height as usize).saturating_sub(4);
        for name in self.dirty_fields.iter().take(max_items) {
            lines.push(Line::styled(format!("  * {name}"), self.theme.dirty));
        }
        if count > max_items {
            lines.push(Line::styled(
                format!("  ... and {} more", count - max_items),
                Style::default().fg(self.theme.muted),
            ));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled(" y ", self.theme.help_key),
            Span::raw("Discard and continue  "),
            Span::styled(" n/Esc ", self.theme.help_key),
            Span::raw("Keep editing"),
        ]));

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Single-line text prompt.
pub struct InputModal<'a> {
    theme: &'a Theme,
    input: &'a InputState,
    title: &'a str,
    prompt: &'a str,
}

impl<'a> InputModal<'a> {
    /// Create a new input modal.
    pub fn new(theme: &'a Theme, input: &'a InputState, title: &'a str, prompt: &'a str) -> Self {
        Self {
            theme,
            input,
            title,
            prompt,
        }
    }

    fn input_spans(&self, max_visible: usize) -> Vec<Span<'static>> {
        let cursor = self.input.cursor();
        let max_visible = max_visible.max(1);
        let start = cursor.saturating_sub(max_visible - 1);
        let visible: Vec<char> = self
            .input
            .buffer()
            .chars()
            .skip(start)
            .take(max_visible)
            .collect();
        let at = cursor - start;

        let before: String = visible.iter().take(at).collect();
        let under = visible.get(at).map_or(" ".to_string(), char::to_string);
        let after: String = visible.iter().skip(at + 1).collect();

        vec![
            Span::raw("  "),
            Span::styled(before, self.theme.input_text),
            Span::styled(under, self.theme.input_cursor),
            Span::styled(after, self.theme.input_text),
        ]
    }
}

impl Widget for InputModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_area = popup(area, 50, 7);
        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.input_prompt)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let max_visible = (inner.width as usize).saturating_sub(4);
        let lines = vec![
            Line::styled(self.prompt, self.theme.help_desc),
            Line::raw(""),
            Line::from(self.input_spans(max_visible)),
            Line::raw(""),
            Line::from(vec![
                Span::styled(" Enter ", self.theme.help_key),
                Span::raw("Confirm  "),
                Span::styled(" Esc ", self.theme.help_key),
                Span::raw("Cancel"),
            ]),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}
