//! Grid viewport engine for freebase.
//!
//! Maps a possibly huge, changing row set onto a fixed window of rendered
//! rows. The [`GridViewport`] owns the scroll offset, the selection
//! rectangle and the mouse drag state machine, and reports highlight
//! changes incrementally so a renderer only touches rows whose state
//! actually changed.

mod highlight;
mod scroll;
mod selection;
mod viewport;

pub use highlight::{ColumnChange, ColumnHighlight, HighlightDiff};
pub use scroll::ScrollState;
pub use selection::{CellKind, CellRef, DragMode, Selection};
pub use viewport::{GridEvent, GridViewport};
