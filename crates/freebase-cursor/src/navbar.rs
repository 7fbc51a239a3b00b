//! Navigation bar command surface.
//!
//! The bar is driven from UI event handlers, where a failure has nowhere
//! useful to go. Every cursor error raised while running a command is
//! therefore caught here and republished as a cancelable
//! [`NavEvent::Exception`]. If no listener cancels it, the bar keeps it as
//! [`NavigationBar::last_exception`] for the chrome to show.

use std::cell::RefCell;
use std::rc::Rc;

use freebase_core::{Cancelable, ChangeNotifier, SubscriptionId};
use strum::{Display, EnumIter};
use tracing::{debug, warn};

use crate::cursor::{Cursor, CursorEvent, MoveOutcome};
use crate::error::{CursorError, CursorResult};
use crate::position::Position;

/// A navigation bar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum NavCommand {
    #[strum(to_string = "First")]
    First,
    #[strum(to_string = "Previous page")]
    PrevPage,
    #[strum(to_string = "Previous")]
    Prev,
    #[strum(to_string = "Next")]
    Next,
    #[strum(to_string = "Next page")]
    NextPage,
    #[strum(to_string = "Last")]
    Last,
}

impl NavCommand {
    /// Short button face.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::First => "|<",
            Self::PrevPage => "<<",
            Self::Prev => "<",
            Self::Next => ">",
            Self::NextPage => ">>",
            Self::Last => ">|",
        }
    }
}

/// Events published by the navigation bar.
#[derive(Debug)]
pub enum NavEvent {
    /// A command failed. `command` is None for the position field.
    Exception {
        command: Option<NavCommand>,
        error: CursorError,
    },
    /// A command was vetoed by a before-discard listener.
    Blocked { command: Option<NavCommand> },
}

/// What the position field shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavDisplay {
    /// Cursor position.
    pub position: Position,
    /// Row count, if known.
    pub row_count: Option<usize>,
}

impl NavDisplay {
    /// Human readable position text.
    pub fn label(&self) -> String {
        let total = self
            .row_count
            .map_or_else(|| "?".to_string(), |count| count.to_string());
        match self.position {
            Position::Bof => format!("BOF ({total} records)"),
            Position::Eof => format!("EOF ({total} records)"),
            Position::New => "New record".to_string(),
            Position::Row(index) => format!("Record {} of {total}", index + 1),
        }
    }
}

/// First/previous/next/last/page buttons plus a position field.
pub struct NavigationBar {
    page_size: usize,
    display: Rc<RefCell<NavDisplay>>,
    subscription: Option<SubscriptionId>,
    events: ChangeNotifier<Cancelable<NavEvent>>,
    last_exception: Option<NavEvent>,
}

impl NavigationBar {
    /// Create a bar paging by `page_size` rows.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            display: Rc::new(RefCell::new(NavDisplay::default())),
            subscription: None,
            events: ChangeNotifier::new(),
            last_exception: None,
        }
    }

    /// Follow a cursor's moves to keep the position field current.
    pub fn attach(&mut self, cursor: &mut Cursor) {
        self.refresh(cursor);
        let display = Rc::clone(&self.display);
        let id = cursor.subscribe(move |event| {
            if let CursorEvent::Moved { to, row_count, .. } = event {
                *display.borrow_mut() = NavDisplay {
                    position: *to,
                    row_count: *row_count,
                };
            }
        });
        self.subscription = Some(id);
    }

    /// Stop following a cursor.
    pub fn detach(&mut self, cursor: &mut Cursor) {
        if let Some(id) = self.subscription.take() {
            cursor.unsubscribe(id);
        }
    }

    /// Re-read the position field from the cursor.
    ///
    /// Row count changes that do not move the cursor are not announced by
    /// it, so the owner calls this after datasource mutations.
    pub fn refresh(&mut self, cursor: &Cursor) {
        *self.display.borrow_mut() = NavDisplay {
            position: cursor.position(),
            row_count: cursor.row_count(),
        };
    }

    /// Rows moved by the page commands.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Follow the viewport's fully visible row count.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// Current contents of the position field.
    pub fn display(&self) -> NavDisplay {
        *self.display.borrow()
    }

    /// Position field text.
    pub fn label(&self) -> String {
        self.display().label()
    }

    /// Whether a button should be enabled for the displayed position.
    pub fn is_enabled(&self, command: NavCommand) -> bool {
        let display = self.display();
        match command {
            NavCommand::First => display.row_count != Some(0),
            NavCommand::Prev | NavCommand::PrevPage => display.position != Position::Bof,
            NavCommand::Next | NavCommand::NextPage => {
                !matches!(display.position, Position::Eof | Position::New)
            }
            NavCommand::Last => display.row_count.is_some(),
        }
    }

    /// Register a listener for exception and veto events.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Cancelable<NavEvent>) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// The most recent exception nobody handled.
    pub fn last_exception(&self) -> Option<&NavEvent> {
        self.last_exception.as_ref()
    }

    /// Take the most recent unhandled exception.
    pub fn take_exception(&mut self) -> Option<NavEvent> {
        self.last_exception.take()
    }

    /// Run a button's command against the cursor.
    ///
    /// Never fails: errors become events. Returns the move outcome when the
    /// cursor accepted the command.
    pub fn execute(&mut self, command: NavCommand, cursor: &mut Cursor) -> Option<MoveOutcome> {
        debug!(%command, "Navigation command");
        let result = match command {
            NavCommand::First => cursor.move_first(),
            NavCommand::PrevPage => cursor.move_backward(self.page_size),
            NavCommand::Prev => cursor.move_backward(1),
            NavCommand::Next => cursor.move_forward(1),
            NavCommand::NextPage => cursor.move_forward(self.page_size),
            NavCommand::Last => cursor.move_last(),
        };
        self.settle(Some(command), result)
    }

    /// Handle text typed into the position field.
    pub fn goto(&mut self, text: &str, cursor: &mut Cursor) -> Option<MoveOutcome> {
        let result = match Position::parse_display(text) {
            Some(position) => cursor.set_position(position),
            None => Err(CursorError::illegal_move(
                cursor.position(),
                format!("'{}' is not a position", text.trim()),
            )),
        };
        self.settle(None, result)
    }

    fn settle(
        &mut self,
        command: Option<NavCommand>,
        result: CursorResult<MoveOutcome>,
    ) -> Option<MoveOutcome> {
        match result {
            Ok(MoveOutcome::Moved(position)) => {
                self.last_exception = None;
                Some(MoveOutcome::Moved(position))
            }
            Ok(MoveOutcome::Blocked) => {
                let event = Cancelable::new(NavEvent::Blocked { command });
                self.events.publish(&event);
                Some(MoveOutcome::Blocked)
            }
            Err(error) => {
                warn!(?command, %error, "Navigation failed");
                let event = Cancelable::new(NavEvent::Exception { command, error });
                self.events.publish(&event);
                if !event.is_canceled() {
                    self.last_exception = Some(event.into_inner());
                }
                None
            }
        }
    }
}

impl std::fmt::Debug for NavigationBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationBar")
            .field("page_size", &self.page_size)
            .field("display", &self.display())
            .field("last_exception", &self.last_exception)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let mut display = NavDisplay {
            position: Position::Row(2),
            row_count: Some(10),
        };
        assert_eq!(display.label(), "Record 3 of 10");
        display.position = Position::Bof;
        display.row_count = None;
        assert_eq!(display.label(), "BOF (? records)");
        display.position = Position::New;
        assert_eq!(display.label(), "New record");
    }

    #[test]
    fn test_symbols_unique() {
        use strum::IntoEnumIterator;
        let symbols: std::collections::HashSet<_> = NavCommand::iter().map(NavCommand::symbol).collect();
        assert_eq!(symbols.len(), 6);
    }

    #[test]
    fn test_page_size_at_least_one() {
        let mut bar = NavigationBar::new(0);
        assert_eq!(bar.page_size(), 1);
        bar.set_page_size(12);
        assert_eq!(bar.page_size(), 12);
    }
}
