//! Application rendering.

use freebase_core::{Column, Record};
use freebase_cursor::{Cursor, NavigationBar};
use freebase_grid::GridViewport;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::theme::Theme;
use crate::ui::modals::{DiscardConfirmModal, InputModal};
use crate::ui::{AppLayout, GridGeometry, GridView, HelpOverlay, NavBarView, RecordEditor};

use super::input::InputState;
use super::state::{AppMode, StatusKind, StatusMessage};

/// Render context containing all the state needed for rendering.
pub struct RenderContext<'a> {
    pub mode: AppMode,
    pub theme: &'a Theme,
    pub title: &'a str,
    pub layout: AppLayout,
    pub geometry: GridGeometry,
    pub columns: &'a [Column],
    /// Rows inside the viewport as `(data index, record)`.
    pub rows: &'a [(usize, Record)],
    pub viewport: &'a GridViewport,
    pub cursor: &'a Cursor,
    pub dirty_fields: &'a [String],
    pub field: usize,
    pub navbar: &'a NavigationBar,
    pub input: Option<&'a InputState>,
    pub status: Option<&'a StatusMessage>,
}

/// Main render function for the application.
pub fn render_app(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let base_style = Style::default()
        .bg(ctx.theme.background)
        .fg(ctx.theme.foreground);
    buf.set_style(area, base_style);

    render_header(ctx, ctx.layout.header, buf);

    let cursor_row = ctx.cursor.position().row();
    GridView::new(
        ctx.theme,
        ctx.geometry,
        ctx.columns,
        ctx.rows,
        ctx.viewport,
    )
    .cursor(cursor_row, ctx.cursor.current_values(), ctx.dirty_fields)
    .render(ctx.layout.grid, buf);

    if let Some(editor) = ctx.layout.editor {
        RecordEditor::new(
            ctx.theme,
            ctx.columns,
            ctx.cursor.current_values(),
            ctx.dirty_fields,
            ctx.cursor.position(),
            ctx.field,
        )
        .render(editor, buf);
    }

    NavBarView::new(ctx.theme, ctx.navbar).render(ctx.layout.navbar, buf);
    render_footer(ctx, ctx.layout.footer, buf);

    match ctx.mode {
        AppMode::Help => HelpOverlay::new(ctx.theme).render(area, buf),
        AppMode::Editing => {
            if let Some(input) = ctx.input {
                let field = input.field().unwrap_or_default();
                let caption = ctx
                    .columns
                    .iter()
                    .find(|c| c.name == field)
                    .map_or(field, |c| c.caption.as_str());
                let prompt = format!("Value for {caption} (empty = null):");
                InputModal::new(ctx.theme, input, "Edit Field", &prompt).render(area, buf);
            }
        }
        AppMode::Goto => {
            if let Some(input) = ctx.input {
                InputModal::new(
                    ctx.theme,
                    input,
                    "Go To",
                    "Record number, bof, eof or new:",
                )
                .render(area, buf);
            }
        }
        AppMode::ConfirmDiscard => {
            DiscardConfirmModal::new(ctx.theme, ctx.dirty_fields).render(area, buf);
        }
        AppMode::Normal | AppMode::Quit => {}
    }
}

fn render_header(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let title = Span::styled(" freebase ", ctx.theme.title.add_modifier(Modifier::BOLD));
    let source = Span::styled(format!(" {} ", ctx.title), ctx.theme.header);
    let count = Span::styled(
        format!(" {} records, {} fields ", ctx.viewport.row_count(), ctx.columns.len()),
        ctx.theme.header,
    );

    let mut spans = vec![title, source, count];
    if !ctx.dirty_fields.is_empty() {
        spans.push(Span::styled(
            " modified ",
            Style::default()
                .fg(ctx.theme.background)
                .bg(ctx.theme.warning),
        ));
    }

    Paragraph::new(Line::from(spans))
        .style(ctx.theme.header)
        .render(area, buf);
}

fn render_footer(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let line = match ctx.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => ctx.theme.info,
                StatusKind::Success => ctx.theme.success,
                StatusKind::Error => ctx.theme.error,
            };
            Line::from(Span::styled(
                format!(" {}", status.text),
                Style::default().fg(color),
            ))
        }
        None => {
            let hints = [
                ("j/k", "move"),
                ("e", "edit"),
                ("n", "new"),
                ("^s", "save"),
                ("d", "delete"),
                (":", "go to"),
                ("?", "help"),
                ("q", "quit"),
            ];
            Line::from(
                hints
                    .iter()
                    .flat_map(|(key, what)| {
                        [
                            Span::styled(format!(" {key}"), ctx.theme.help_key),
                            Span::styled(format!(" {what} "), ctx.theme.help_desc),
                        ]
                    })
                    .collect::<Vec<_>>(),
            )
        }
    };

    Paragraph::new(line).style(ctx.theme.footer).render(area, buf);
}
