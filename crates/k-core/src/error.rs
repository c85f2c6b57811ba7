//! Editor errors.
//!
//! Only unrecoverable conditions surface here; anything the editor can
//! continue from (a failed save, an out-of-bounds row operation, a search
//! with no matches) is reported on the status bar or silently ignored
//! instead.

use std::io;

use thiserror::Error;

/// A fatal editor error. The main loop stops, the terminal is restored,
/// and the message is printed once.
#[derive(Debug, Error)]
pub enum Error {
    /// The window cannot fit the two-line status band plus one text row.
    #[error("terminal window too small ({cols}x{rows})")]
    WindowTooSmall {
        /// Reported terminal width.
        cols: usize,
        /// Reported terminal height.
        rows: usize,
    },

    /// The terminal or the filesystem failed underneath us.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
