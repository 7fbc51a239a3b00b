//! Main application state and logic.

mod constants;
pub mod input;
mod render;
pub mod state;

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use color_eyre::eyre::WrapErr;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::{DefaultTerminal, Frame};
use tracing::{debug, info, warn};

use freebase_core::{
    Column, Datasource, GridConfig, MemoryDatasource, Record, RowEvent, SharedDatasource, Value,
};
use freebase_cursor::{
    Cursor, CursorEvent, CursorResult, MoveOutcome, NavCommand, NavEvent, NavigationBar, Position,
};
use freebase_grid::{CellKind, CellRef, GridViewport, Selection};

use crate::TuiConfig;
use crate::event::KeyAction;
use crate::theme::Theme;
use crate::ui::{AppLayout, GridGeometry};

use self::constants::{STATUS_TIMEOUT_SECS, TICK_INTERVAL_MS, WHEEL_SCROLL_ROWS};
use self::input::{InputResult, InputState};
use self::render::{RenderContext, render_app};
use self::state::{AppMode, PendingMove, StatusKind, StatusMessage, UserSettings};

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// Main application state.
pub struct App {
    mode: AppMode,
    title: String,
    path: Option<std::path::PathBuf>,

    /// Concrete handle kept for writing the records back to disk.
    records: Rc<RefCell<MemoryDatasource>>,
    source: SharedDatasource,
    columns: Vec<Column>,

    cursor: Cursor,
    navbar: NavigationBar,
    grid: Rc<RefCell<GridViewport>>,

    config: GridConfig,
    settings: UserSettings,
    theme: Theme,

    /// Selected field in the record editor.
    field: usize,
    input: Option<InputState>,
    /// Lets the next discard through without a prompt.
    allow_discard: Rc<Cell<bool>>,
    /// Move to retry once the user confirms the discard.
    pending: Option<PendingMove>,
    status: Option<StatusMessage>,

    /// Grid placement from the last frame, for mouse hit-testing.
    geometry: GridGeometry,
    /// Cell under the pointer during a drag.
    hover: Option<CellRef>,

    needs_redraw: bool,
}

impl App {
    /// Create a new application over a set of records.
    pub fn new(records: MemoryDatasource, config: TuiConfig) -> Self {
        let TuiConfig {
            title,
            path,
            grid: mut grid_config,
            settings,
        } = config;
        settings.apply(&mut grid_config);

        let records = Rc::new(RefCell::new(records));
        let source: SharedDatasource = records.clone();
        let columns = source.borrow().columns();
        let row_count = source.borrow().count();

        let grid = Rc::new(RefCell::new(GridViewport::new(
            columns.len(),
            row_count,
            0,
            &grid_config,
        )));

        // Row count changes reach the grid straight from the datasource.
        // The cursor queues the same events itself and catches up in
        // `follow_source`.
        let listener = Rc::clone(&grid);
        source
            .borrow_mut()
            .subscribe(Box::new(move |event: &RowEvent| {
                listener.borrow_mut().handle_row_event(event);
            }));

        let mut cursor = Cursor::new(Rc::clone(&source));

        // The grid selection follows the cursor row.
        let follower = Rc::clone(&grid);
        cursor.subscribe(move |event| {
            if let CursorEvent::Moved { to, .. } = event {
                let mut grid = follower.borrow_mut();
                match to.row() {
                    Some(row) => {
                        grid.select_row(row);
                        grid.ensure_visible(row);
                    }
                    None => grid.clear_selection(),
                }
            }
        });

        let allow_discard = Rc::new(Cell::new(false));
        if grid_config.confirm_discard {
            let allow = Rc::clone(&allow_discard);
            cursor.subscribe_discard(move |check| {
                if !allow.get() {
                    check.cancel();
                }
            });
        }

        let mut navbar = NavigationBar::new(grid_config.effective_page_size(1));
        navbar.attach(&mut cursor);

        info!(rows = row_count, columns = columns.len(), "Opened records");

        Self {
            mode: AppMode::Normal,
            title,
            path,
            records,
            source,
            columns,
            cursor,
            navbar,
            grid,
            theme: Theme::from_variant(settings.theme),
            config: grid_config,
            settings,
            field: 0,
            input: None,
            allow_discard,
            pending: None,
            status: None,
            geometry: GridGeometry::default(),
            hover: None,
            needs_redraw: true,
        }
    }

    /// Run the application with async event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        // Land on the first record so the editor has something to show.
        if self.source.borrow().count() > 0 {
            self.perform(PendingMove::Nav(NavCommand::First));
        }

        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();

        while self.mode != AppMode::Quit {
            if self.needs_redraw {
                terminal.draw(|frame| self.render(frame))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(event) = events.next() => {
                    self.handle_event(event?);
                    self.needs_redraw = true;
                }

                _ = interval.tick() => {
                    if self.expire_status() {
                        self.needs_redraw = true;
                    }
                }
            }
        }

        Ok(())
    }

    // ==================== Accessors ====================

    /// Current UI mode.
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// The record cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The grid selection.
    pub fn selection(&self) -> Selection {
        self.grid.borrow().selection()
    }

    /// Grid scroll offset as `(x, y)`.
    pub fn scroll(&self) -> (usize, usize) {
        self.grid.borrow().scroll()
    }

    /// Current status line message.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Selected field in the record editor.
    pub fn selected_field(&self) -> usize {
        self.field
    }

    /// The theme in use.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    // ==================== Events ====================

    /// Dispatch one terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
        self.follow_source();
    }

    /// Apply datasource changes made outside the cursor, so the editor,
    /// grid selection and navigation bar stay on the same record.
    pub fn follow_source(&mut self) -> bool {
        let moved = self.cursor.apply_source_events();
        self.navbar.refresh(&self.cursor);
        if moved {
            debug!(position = %self.cursor.position(), "Cursor followed datasource change");
            self.needs_redraw = true;
        }
        moved
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            AppMode::Normal => self.handle_action(KeyAction::from_key_event(key)),
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')) {
                    self.mode = AppMode::Normal;
                }
            }
            AppMode::Editing | AppMode::Goto => self.handle_input_key(key),
            AppMode::ConfirmDiscard => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => self.confirm_discard(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.reject_discard(),
                _ => {}
            },
            AppMode::Quit => {}
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::PrevRecord => self.perform(PendingMove::Nav(NavCommand::Prev)),
            KeyAction::NextRecord => self.perform(PendingMove::Nav(NavCommand::Next)),
            KeyAction::PrevPage => self.perform(PendingMove::Nav(NavCommand::PrevPage)),
            KeyAction::NextPage => self.perform(PendingMove::Nav(NavCommand::NextPage)),
            KeyAction::FirstRecord => self.perform(PendingMove::Nav(NavCommand::First)),
            KeyAction::LastRecord => self.perform(PendingMove::Nav(NavCommand::Last)),
            KeyAction::Goto => {
                self.input = Some(InputState::new());
                self.mode = AppMode::Goto;
            }
            KeyAction::PrevField => self.select_field(self.field.saturating_sub(1)),
            KeyAction::NextField => self.select_field(self.field + 1),
            KeyAction::NewRecord => self.perform(PendingMove::NewRecord),
            KeyAction::EditField => self.begin_edit(),
            KeyAction::Save => self.save_record(),
            KeyAction::Discard => self.discard_edits(),
            KeyAction::Delete => self.delete_record(),
            KeyAction::ScrollUp => self.grid.borrow_mut().scroll_by(-1),
            KeyAction::ScrollDown => self.grid.borrow_mut().scroll_by(1),
            KeyAction::ToggleHelp => self.mode = AppMode::Help,
            KeyAction::ToggleTheme => self.toggle_theme(),
            KeyAction::WriteFile => self.write_file(),
            KeyAction::Quit | KeyAction::ForceQuit => self.mode = AppMode::Quit,
            KeyAction::None => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };
        match input.handle_key(key) {
            InputResult::Continue => {}
            InputResult::Cancel => {
                self.input = None;
                self.mode = AppMode::Normal;
            }
            InputResult::Submit(text) => {
                let input = self.input.take();
                let mode = self.mode;
                self.mode = AppMode::Normal;
                match mode {
                    AppMode::Goto => self.perform(PendingMove::Goto(text)),
                    AppMode::Editing => {
                        if let Some(input) = input.filter(InputState::has_changed) {
                            self.apply_edit(&input, &text);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != AppMode::Normal {
            return;
        }
        let hit = self.geometry.hit_test(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(cell) = hit else {
                    return;
                };
                let on_row = matches!(cell.kind, CellKind::Middle | CellKind::RowHead);
                if on_row && self.cursor.position() != Position::Row(cell.row) {
                    self.perform(PendingMove::Row(cell.row));
                    if self.mode != AppMode::Normal {
                        return;
                    }
                }
                if cell.kind == CellKind::Middle {
                    self.select_field(cell.col);
                }
                self.grid.borrow_mut().mouse_down(cell);
                self.hover = Some(cell);
            }
            MouseEventKind::Drag(MouseButton::Left) => match hit {
                Some(cell) if self.hover != Some(cell) => {
                    let mut grid = self.grid.borrow_mut();
                    if let Some(previous) = self.hover {
                        grid.mouse_out(previous);
                    }
                    grid.mouse_over(cell);
                    self.hover = Some(cell);
                }
                Some(_) => {}
                None => {
                    self.grid.borrow_mut().leave_viewport();
                    self.hover = None;
                }
            },
            MouseEventKind::Up(MouseButton::Left) => {
                self.grid.borrow_mut().mouse_up();
                self.hover = None;
            }
            MouseEventKind::ScrollDown => self.grid.borrow_mut().scroll_by(WHEEL_SCROLL_ROWS),
            MouseEventKind::ScrollUp => self.grid.borrow_mut().scroll_by(-WHEEL_SCROLL_ROWS),
            _ => {}
        }
    }

    // ==================== Navigation ====================

    /// Run a cursor move, prompting when unsaved edits block it.
    fn perform(&mut self, request: PendingMove) {
        let outcome = match &request {
            PendingMove::Nav(command) => self.navbar.execute(*command, &mut self.cursor),
            PendingMove::Goto(text) => self.navbar.goto(text, &mut self.cursor),
            PendingMove::Row(row) => {
                let result = self.cursor.set_position(Position::Row(*row));
                self.settle(result)
            }
            PendingMove::NewRecord => {
                let result = self.cursor.new_record();
                self.settle(result)
            }
        };

        if let Some(NavEvent::Exception { error, .. }) = self.navbar.take_exception() {
            self.set_status(StatusKind::Error, error.to_string());
        }

        match outcome {
            Some(MoveOutcome::Blocked) => {
                debug!(?request, "Move waiting on discard confirmation");
                self.pending = Some(request);
                self.mode = AppMode::ConfirmDiscard;
            }
            Some(MoveOutcome::Moved(position)) => {
                if self.status.as_ref().is_some_and(|s| s.kind == StatusKind::Error) {
                    self.status = None;
                }
                if position == Position::New {
                    self.set_status(StatusKind::Info, "New record: edit fields, then Ctrl-s");
                }
            }
            None => {}
        }
    }

    fn settle(&mut self, result: CursorResult<MoveOutcome>) -> Option<MoveOutcome> {
        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                self.set_status(StatusKind::Error, err.to_string());
                None
            }
        }
    }

    fn confirm_discard(&mut self) {
        self.mode = AppMode::Normal;
        let Some(request) = self.pending.take() else {
            return;
        };
        self.allow_discard.set(true);
        self.perform(request);
        self.allow_discard.set(false);
    }

    fn reject_discard(&mut self) {
        self.mode = AppMode::Normal;
        self.pending = None;
        self.set_status(StatusKind::Info, "Kept unsaved edits");
    }

    fn select_field(&mut self, field: usize) {
        if self.columns.is_empty() {
            return;
        }
        self.field = field.min(self.columns.len() - 1);

        let mut grid = self.grid.borrow_mut();
        let (x, y) = grid.scroll();
        let visible = self.geometry.fully_visible_columns().max(1);
        if self.field < x {
            grid.set_scroll(self.field, y);
        } else if self.field >= x + visible {
            grid.set_scroll(self.field + 1 - visible, y);
        }
    }

    // ==================== Editing ====================

    fn begin_edit(&mut self) {
        let Some(column) = self.columns.get(self.field) else {
            return;
        };
        match self.cursor.field_value(&column.name) {
            Ok(value) => {
                self.input = Some(InputState::for_field(&column.name, &value.to_string()));
                self.mode = AppMode::Editing;
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    fn apply_edit(&mut self, input: &InputState, text: &str) {
        let Some(field) = input.field() else {
            return;
        };
        if let Err(err) = self.cursor.set_field_value(field, Value::parse_input(text)) {
            self.set_status(StatusKind::Error, err.to_string());
        }
    }

    fn save_record(&mut self) {
        let created = self.cursor.is_new();
        match self.cursor.save() {
            Ok(index) => {
                let verb = if created { "Created" } else { "Saved" };
                self.set_status(StatusKind::Success, format!("{verb} record #{}", index + 1));
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    fn discard_edits(&mut self) {
        if self.cursor.is_dirty() {
            self.cursor.discard();
            self.set_status(StatusKind::Info, "Discarded edits");
        }
    }

    fn delete_record(&mut self) {
        let from = self.cursor.position();
        match self.cursor.delete_current() {
            Ok(_) => {
                let text = match from {
                    Position::New => "Abandoned new record".to_string(),
                    other => format!("Deleted record {other}"),
                };
                self.set_status(StatusKind::Success, text);
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    // ==================== Application ====================

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.settings.theme = self.theme.variant;
        if let Err(err) = self.settings.save() {
            warn!(error = %err, "Failed to save settings");
            self.set_status(StatusKind::Error, format!("Could not save settings: {err}"));
        }
    }

    fn write_file(&mut self) {
        let Some(path) = self.path.clone() else {
            self.set_status(StatusKind::Error, "No file to write to");
            return;
        };
        match self.write_records(&path) {
            Ok(count) => self.set_status(
                StatusKind::Success,
                format!("Wrote {count} records to {}", path.display()),
            ),
            Err(err) => self.set_status(StatusKind::Error, format!("{err:#}")),
        }
    }

    fn write_records(&self, path: &Path) -> AppResult<usize> {
        let records = self.records.borrow();
        let json = records.to_json().wrap_err("Failed to serialize records")?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), count = records.count(), "Wrote records");
        Ok(records.count())
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage::new(kind, text));
    }

    /// Drop a status message that has been up long enough.
    fn expire_status(&mut self) -> bool {
        let expired = self
            .status
            .as_ref()
            .is_some_and(|s| s.shown_at.elapsed() >= Duration::from_secs(STATUS_TIMEOUT_SECS));
        if expired {
            self.status = None;
        }
        expired
    }

    // ==================== Rendering ====================

    /// Size the grid to the frame, then draw everything.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::new(area);
        self.sync_geometry(layout);

        let grid = self.grid.borrow();
        let rows: Vec<(usize, Record)> = {
            let source = self.source.borrow();
            grid.visible_rows()
                .filter_map(|index| source.get(index).ok().map(|record| (index, record)))
                .collect()
        };
        let dirty_fields = self.cursor.dirty_fields();

        let ctx = RenderContext {
            mode: self.mode,
            theme: &self.theme,
            title: &self.title,
            layout,
            geometry: self.geometry,
            columns: &self.columns,
            rows: &rows,
            viewport: &grid,
            cursor: &self.cursor,
            dirty_fields: &dirty_fields,
            field: self.field,
            navbar: &self.navbar,
            input: self.input.as_ref(),
            status: self.status.as_ref(),
        };
        render_app(&ctx, area, frame.buffer_mut());
    }

    fn sync_geometry(&mut self, layout: AppLayout) {
        let area = layout.grid;
        let mut grid = self.grid.borrow_mut();
        let row_height = u16::try_from(self.config.row_height.max(1)).unwrap_or(u16::MAX);

        grid.set_viewport_height(area.height.saturating_sub(1) as usize);
        let page = self
            .config
            .effective_page_size(grid.fully_visible_row_count());
        self.navbar.set_page_size(page);

        let (x, y) = grid.scroll();
        self.geometry = GridGeometry {
            area,
            gutter: GridGeometry::gutter_for(grid.row_count()),
            column_width: self
                .config
                .default_column_width
                .max(self.config.min_column_width)
                .max(1),
            first_column: x,
            column_count: self.columns.len(),
            first_row: y,
            row_count: grid.row_count(),
            row_height,
        };
    }
}
