//! # k-core — editor core for ked
//!
//! The editor state machine, kept deliberately free of terminal
//! ownership: the core consumes keystrokes through the
//! [`KeySource`](k_term::input::KeySource) seam and produces frames into
//! any byte sink, so tests drive it with scripted keys and `Vec<u8>`
//! sinks while `ked` wires it to the real terminal.
//!
//! - **[`row`]** — `Row`: logical bytes, tab-expanded render, highlight
//!   tokens, and the open-comment flag
//! - **[`buffer`]** — the row store: ordered rows, the highlight cascade,
//!   file load/save, the dirty flag
//! - **[`editor`]** — `Editor`: cursor and viewport, editing operations,
//!   the key dispatcher, the quit counter
//! - **[`screen`]** — frame composition: text rows, status bar, message
//!   bar, one write per refresh
//! - **[`prompt`]** — the status-line mini line editor
//! - **[`search`]** — incremental search with the match overlay
//! - **[`error`]** — the fatal error type

pub mod buffer;
pub mod editor;
pub mod error;
pub mod prompt;
pub mod row;
pub mod screen;
pub mod search;

pub use buffer::Buffer;
pub use editor::{ControlFlow, Editor};
pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod test_util;
