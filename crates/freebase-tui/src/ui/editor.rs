//! Record editor panel: the cursor's scratch values, one field per line.

use freebase_core::{Column, Record};
use freebase_cursor::Position;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::theme::Theme;
use crate::ui::grid::{fit, single_line};

/// Lists every column of the current record, marking unsaved fields.
pub struct RecordEditor<'a> {
    theme: &'a Theme,
    columns: &'a [Column],
    values: &'a Record,
    dirty_fields: &'a [String],
    position: Position,
    selected: usize,
}

impl<'a> RecordEditor<'a> {
    pub fn new(
        theme: &'a Theme,
        columns: &'a [Column],
        values: &'a Record,
        dirty_fields: &'a [String],
        position: Position,
        selected: usize,
    ) -> Self {
        Self {
            theme,
            columns,
            values,
            dirty_fields,
            position,
            selected,
        }
    }
}

impl Widget for RecordEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.position {
            Position::Row(index) => format!(" Record #{} ", index + 1),
            Position::New => " New record ".to_string(),
            Position::Bof | Position::Eof => " No record ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .title_style(self.theme.title)
            .borders(Borders::LEFT | Borders::TOP)
            .border_style(self.theme.border);
        let inner = block.inner(area);
        block.render(area, buf);

        if !self.position.has_record() {
            Paragraph::new(Line::styled(
                "Move to a record or press n",
                self.theme.help_desc,
            ))
            .render(inner, buf);
            return;
        }

        let label_width = self
            .columns
            .iter()
            .map(|c| c.caption.chars().count())
            .max()
            .unwrap_or(0)
            .min(14);
        let value_width = (inner.width as usize).saturating_sub(label_width + 4) as u16;

        let lines: Vec<Line> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let dirty = self.dirty_fields.contains(&column.name);
                let marker = if dirty { "*" } else { " " };
                let value = self
                    .values
                    .get(&column.name)
                    .map(ToString::to_string)
                    .unwrap_or_default();

                let label_style = if i == self.selected {
                    self.theme.field_selected
                } else {
                    self.theme.field_name
                };
                let value_style = if dirty {
                    self.theme.dirty
                } else {
                    self.theme.cell
                };
                let label = fit(&column.caption, label_width as u16);
                Line::from(vec![
                    Span::styled(marker, self.theme.dirty),
                    Span::styled(format!("{label:<label_width$}"), label_style),
                    Span::raw(" : "),
                    Span::styled(fit(&single_line(&value), value_width), value_style),
                ])
            })
            .collect();

        // Keep the selected field in view.
        let skip = (self.selected + 1).saturating_sub(inner.height as usize);
        Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>()).render(inner, buf);
    }
}
