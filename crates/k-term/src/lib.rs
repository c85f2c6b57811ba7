// SPDX-License-Identifier: MIT
//
// k-term — terminal driver for ked.
//
// Direct VT100/ECMA-48 control over a raw-mode terminal: escape sequence
// generation, termios raw mode with guaranteed restore, single-write frame
// output, and keystroke decoding (arrows, paging, editing keys, and a
// synthetic resize event fed by SIGWINCH).
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for, and every refresh reaches the terminal as one write.

#[allow(clippy::missing_errors_doc)] // ANSI functions all just forward io::Write errors.
pub mod ansi;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
