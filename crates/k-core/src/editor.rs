//! Editor — cursor, viewport, editing operations, and the key dispatcher.
//!
//! The `Editor` owns a [`Buffer`] plus everything that is about *looking
//! at* and *mutating* it: the cursor in both coordinate spaces, the
//! scroll offsets, the sticky rendered column for vertical motion, the
//! status message, and the dirty-quit counter.
//!
//! # Cursor model
//!
//! `(cx, cy)` address the logical text: `cy` may equal the row count
//! (cursor on the virtual line past the last row, where only `cx == 0`
//! is valid) and `cx` never exceeds the current row's length. `rx` is
//! the rendered column derived from `cx` before every refresh.
//!
//! `desired_rx` is the column the user is "aiming at" during vertical
//! motion: moving through a short line clamps the cursor but keeps the
//! target, so reaching a long line again snaps back out. Every
//! non-vertical action re-anchors the target at the cursor.
//!
//! # Dispatch
//!
//! [`process_key`](Editor::process_key) handles exactly one key and
//! returns whether the main loop should continue. Operations that need
//! more input (save-as, search) run the [`prompt`](crate::prompt) loop
//! inline, reading from the same key source and refreshing into the same
//! sink.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use k_term::input::{ctrl, Key, KeySource, BACKSPACE, ENTER, ESC};
use k_term::terminal::{get_size, Size};

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::prompt::prompt;
use crate::row::Row;
use crate::search;

/// How many extra Ctrl-Q presses abandon an unsaved buffer.
pub const QUIT_TIMES: u32 = 3;

/// How long a status message stays visible.
pub const MSG_TIMEOUT: Duration = Duration::from_secs(5);

const CTRL_F: u8 = ctrl(b'f');
const CTRL_H: u8 = ctrl(b'h');
const CTRL_K: u8 = ctrl(b'k');
const CTRL_L: u8 = ctrl(b'l');
const CTRL_Q: u8 = ctrl(b'q');
const CTRL_S: u8 = ctrl(b's');

/// What the main loop should do after a key is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep going.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// A status message with its display deadline anchor.
#[derive(Debug)]
struct StatusMessage {
    text: String,
    set_at: Instant,
}

/// The editor: one buffer, one viewport, one key at a time.
#[derive(Debug)]
pub struct Editor {
    pub(crate) buffer: Buffer,

    /// Cursor column in chars space.
    pub(crate) cx: usize,
    /// Cursor row.
    pub(crate) cy: usize,
    /// Cursor column in render space, derived from `cx` each refresh.
    pub(crate) rx: usize,
    /// Sticky rendered column for vertical motion.
    pub(crate) desired_rx: usize,

    /// First visible row.
    pub(crate) row_off: usize,
    /// First visible rendered column.
    pub(crate) col_off: usize,

    /// Text area height (window height minus the two-line band).
    pub(crate) screen_rows: usize,
    /// Text area width.
    pub(crate) screen_cols: usize,

    status: Option<StatusMessage>,
    quit_times: u32,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// Create an editor over an empty, unnamed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WindowTooSmall`] if the window cannot fit the
    /// status band plus one text row.
    pub fn new(size: Size) -> Result<Self> {
        Self::with_buffer(Buffer::new(), size)
    }

    /// Create an editor with a file loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the window is too
    /// small.
    pub fn from_file(path: &Path, size: Size) -> Result<Self> {
        Self::with_buffer(Buffer::from_file(path)?, size)
    }

    fn with_buffer(buffer: Buffer, size: Size) -> Result<Self> {
        let mut editor = Self {
            buffer,
            cx: 0,
            cy: 0,
            rx: 0,
            desired_rx: 0,
            row_off: 0,
            col_off: 0,
            screen_rows: 0,
            screen_cols: 0,
            status: None,
            quit_times: QUIT_TIMES,
        };
        editor.set_window_size(size)?;
        Ok(editor)
    }

    // -- Accessors ----------------------------------------------------------

    /// The underlying buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Cursor position `(cx, cy)` in chars space.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    /// The sticky rendered column vertical motion aims at.
    #[inline]
    #[must_use]
    pub const fn desired_rx(&self) -> usize {
        self.desired_rx
    }

    // -- Window geometry ----------------------------------------------------

    /// Adopt new window dimensions, reserving two rows for the status and
    /// message bars.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WindowTooSmall`] if fewer than three rows (or no
    /// columns) remain.
    pub fn set_window_size(&mut self, size: Size) -> Result<()> {
        if size.rows < 3 || size.cols == 0 {
            return Err(Error::WindowTooSmall {
                cols: size.cols,
                rows: size.rows,
            });
        }
        self.screen_cols = size.cols;
        self.screen_rows = size.rows - 2;
        Ok(())
    }

    /// Re-query the window size from the terminal after a resize event.
    ///
    /// Off-terminal (in tests), the query fails and the dimensions stay
    /// as they were.
    fn sync_window_size(&mut self) -> Result<()> {
        match get_size() {
            Some(size) => self.set_window_size(size),
            None => Ok(()),
        }
    }

    // -- Status message -----------------------------------------------------

    /// Show a message in the message bar for [`MSG_TIMEOUT`].
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at: Instant::now(),
        });
    }

    /// Drop the current status message.
    pub(crate) fn clear_status(&mut self) {
        self.status = None;
    }

    /// The status message, if one is set and still fresh.
    #[must_use]
    pub(crate) fn status_for_display(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|msg| msg.set_at.elapsed() < MSG_TIMEOUT)
            .map(|msg| msg.text.as_str())
    }

    // -- Viewport -----------------------------------------------------------

    /// Derive `rx` from the cursor and drag the scroll offsets until the
    /// cursor is inside the visible window.
    pub(crate) fn scroll(&mut self) {
        self.rx = self
            .buffer
            .row(self.cy)
            .map_or(0, |row| row.cx_to_rx(self.cx));

        if self.cy < self.row_off {
            self.row_off = self.cy;
        }
        if self.cy >= self.row_off + self.screen_rows {
            self.row_off = self.cy + 1 - self.screen_rows;
        }
        if self.rx < self.col_off {
            self.col_off = self.rx;
        }
        if self.rx >= self.col_off + self.screen_cols {
            self.col_off = self.rx + 1 - self.screen_cols;
        }
    }

    // -- Movement -----------------------------------------------------------

    /// Apply one arrow-key motion, wrapping at line boundaries and
    /// landing vertical moves on the sticky column.
    pub(crate) fn move_cursor(&mut self, key: Key) {
        let num_rows = self.buffer.len();

        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // Wrap to the end of the previous row.
                    self.cy -= 1;
                    self.cx = self.buffer.rows()[self.cy].len();
                }
            }
            Key::ArrowRight => {
                if self.cy < num_rows {
                    if self.cx < self.buffer.rows()[self.cy].len() {
                        self.cx += 1;
                    } else {
                        // Wrap to the start of the next row.
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cy > 0 {
                    self.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cy < num_rows {
                    self.cy += 1;
                }
            }
            _ => {}
        }

        // Vertical moves land on the remembered rendered column.
        if matches!(key, Key::ArrowUp | Key::ArrowDown) {
            self.cx = self
                .buffer
                .row(self.cy)
                .map_or(0, |row| row.rx_to_cx(self.desired_rx));
        }

        // Snap the cursor into the row it landed on.
        let row_len = self.buffer.row(self.cy).map_or(0, Row::len);
        if self.cx > row_len {
            self.cx = row_len;
        }
    }

    /// PageUp/PageDown: jump the cursor to the window edge, then take a
    /// screenful of single-row steps (which handles clamping and the
    /// sticky column exactly like held arrow keys would).
    fn page_move(&mut self, key: Key) {
        self.cy = if key == Key::PageUp {
            self.row_off
        } else {
            (self.row_off + self.screen_rows - 1).min(self.buffer.len())
        };

        let arrow = if key == Key::PageUp {
            Key::ArrowUp
        } else {
            Key::ArrowDown
        };
        for _ in 0..self.screen_rows {
            self.move_cursor(arrow);
        }
    }

    fn remember_desired_rx(&mut self) {
        self.desired_rx = self
            .buffer
            .row(self.cy)
            .map_or(0, |row| row.cx_to_rx(self.cx));
    }

    // -- Editing operations -------------------------------------------------

    /// Insert one byte at the cursor, growing the buffer by an empty row
    /// first when the cursor sits past the last line.
    pub(crate) fn insert_char(&mut self, b: u8) {
        if self.cy == self.buffer.len() {
            let at = self.buffer.len();
            self.buffer.insert_row(at, b"");
        }
        self.buffer.insert_char(self.cy, self.cx, b);
        self.cx += 1;
    }

    /// Delete the byte left of the cursor; at column zero, join the
    /// current row onto the previous one.
    pub(crate) fn delete_char(&mut self) {
        if self.cy == self.buffer.len() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }

        if self.cx > 0 {
            self.buffer.delete_char(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            // Join: cursor lands at the seam in the previous row.
            self.cx = self.buffer.rows()[self.cy - 1].len();
            let moved = self.buffer.rows()[self.cy].chars().to_vec();
            self.buffer.append_bytes(self.cy - 1, &moved);
            self.buffer.delete_row(self.cy);
            self.cy -= 1;
        }
    }

    /// Split the current row at the cursor, replicating leading blanks
    /// onto the new row (auto-indent).
    pub(crate) fn insert_newline(&mut self) {
        let mut new_cx = 0;

        if self.cx == 0 {
            self.buffer.insert_row(self.cy, b"");
        } else {
            // cx > 0 means the cursor is on a real row.
            let row = &self.buffer.rows()[self.cy];

            let n_blank = row
                .chars()
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .count()
                .min(self.cx);

            let indent = row.chars()[..n_blank].to_vec();
            let tail = row.chars()[self.cx..].to_vec();

            self.buffer.insert_row(self.cy + 1, &indent);
            self.buffer.append_bytes(self.cy + 1, &tail);

            // The remainder of the split row; when the cursor sat inside
            // the indent itself, the whole row moved down.
            let keep = if self.cx == n_blank { 0 } else { self.cx };
            self.buffer.truncate_row(self.cy, keep);

            new_cx = n_blank;
        }

        self.cy += 1;
        self.cx = new_cx;
    }

    /// Delete the row under the cursor (Ctrl-K), keeping the cursor
    /// valid afterwards.
    fn delete_current_row(&mut self) {
        self.buffer.delete_row(self.cy);

        if self.cy >= self.buffer.len() {
            self.cx = 0;
        } else {
            self.cx = self.cx.min(self.buffer.rows()[self.cy].len());
        }
    }

    // -- Save ---------------------------------------------------------------

    /// Write the buffer to disk, prompting for a filename if the buffer
    /// has none. Save failures are reported on the status bar and leave
    /// the buffer dirty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the key source or sink fails while
    /// prompting; filesystem errors are reported, not returned.
    pub(crate) fn save<K: KeySource, W: Write>(
        &mut self,
        keys: &mut K,
        out: &mut W,
    ) -> Result<()> {
        if self.buffer.path().is_none() {
            let Some(name) = prompt(self, keys, out, "Save as: {} (ESC to cancel)", |_, _, _| {})?
            else {
                self.set_status_message("Save aborted");
                return Ok(());
            };
            let name = String::from_utf8_lossy(&name).into_owned();
            self.buffer.set_path(PathBuf::from(name));
        }

        self.buffer.select_syntax();

        match self.buffer.save() {
            Ok(len) => self.set_status_message(format!("{len} bytes written")),
            Err(err) => self.set_status_message(format!("error saving: {err}")),
        }
        Ok(())
    }

    // -- Dispatch -----------------------------------------------------------

    /// Dispatch one key.
    ///
    /// `keys` and `out` are only touched by operations that go modal
    /// (save-as, search), which run their own refresh/read iterations.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink or key source fails, or if a resize
    /// shrinks the window below the minimum.
    pub fn process_key<K: KeySource, W: Write>(
        &mut self,
        key: Key,
        keys: &mut K,
        out: &mut W,
    ) -> Result<ControlFlow> {
        // Anything but Ctrl-Q re-arms the dirty-quit guard.
        if key != Key::Char(CTRL_Q) {
            self.quit_times = QUIT_TIMES;
        }

        let mut vertical = false;

        match key {
            // The reader already drained the resize flag; pick up the new
            // dimensions and let the next refresh redraw into them.
            Key::Resize => self.sync_window_size()?,

            Key::Char(CTRL_Q) => {
                if self.buffer.is_dirty() && self.quit_times > 0 {
                    let plural = if self.quit_times == 1 { "" } else { "s" };
                    self.set_status_message(format!(
                        "File has unsaved changes. Press Ctrl-Q {} more time{} to quit.",
                        self.quit_times, plural
                    ));
                    self.quit_times -= 1;
                    return Ok(ControlFlow::Continue);
                }
                return Ok(ControlFlow::Quit);
            }

            Key::Char(CTRL_S) => self.save(keys, out)?,
            Key::Char(CTRL_F) => search::find(self, keys, out)?,
            Key::Char(CTRL_K) => self.delete_current_row(),

            Key::Char(ENTER) => self.insert_newline(),

            Key::Char(CTRL_H | BACKSPACE) => self.delete_char(),
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.delete_char();
            }

            Key::Char(CTRL_L | ESC) => {}

            Key::Home => self.cx = 0,
            Key::End => {
                if self.cy < self.buffer.len() {
                    self.cx = self.buffer.rows()[self.cy].len();
                }
            }

            Key::PageUp | Key::PageDown => {
                vertical = true;
                self.page_move(key);
            }

            Key::ArrowUp | Key::ArrowDown => {
                vertical = true;
                self.move_cursor(key);
            }
            Key::ArrowLeft | Key::ArrowRight => self.move_cursor(key),

            // Any remaining literal byte is text.
            Key::Char(b) => self.insert_char(b),
        }

        if !vertical {
            self.remember_desired_rx();
        }
        Ok(ControlFlow::Continue)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
