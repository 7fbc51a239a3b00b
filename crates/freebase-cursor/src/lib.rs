//! Record cursor and navigation for freebase.
//!
//! A [`Cursor`] binds to one datasource and tracks a single current
//! position (`BOF`, `EOF`, `NEW` or a row index) together with an editable
//! scratch copy of the current record. Moving away from a record with
//! unsaved edits goes through a cancelable discard check.
//!
//! [`NavigationBar`] maps first/previous/next/last/page commands onto a
//! cursor and turns navigation errors into events instead of failures.

mod cursor;
mod error;
mod navbar;
mod position;

pub use cursor::{Cursor, CursorEvent, DiscardOutcome, MoveOutcome};
pub use error::{CursorError, CursorResult};
pub use navbar::{NavCommand, NavDisplay, NavEvent, NavigationBar};
pub use position::Position;
