//! Application constants.

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 250;

/// How long a status line message stays up, in seconds.
pub const STATUS_TIMEOUT_SECS: u64 = 5;

/// Rows scrolled per mouse wheel notch.
pub const WHEEL_SCROLL_ROWS: isize = 3;
