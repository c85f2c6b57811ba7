//! Search — incremental find with a non-destructive highlight overlay.
//!
//! [`find`] opens the prompt and reacts to every keystroke through a
//! [`SearchState`] observer:
//!
//! - typing re-runs the search from the top of the buffer,
//! - Right/Down continue past the previous hit, Left/Up reverse the row
//!   walk, and
//! - Enter keeps the cursor on the hit while Escape restores the exact
//!   cursor and scroll position from before the search.
//!
//! The current hit is shown by *overlaying* the match token over the
//! row's highlight bytes; the replaced tokens are kept aside and written
//! back before the next overlay and when the session ends. The text and
//! its real classification are never touched.

use std::io::{self, Write};

use k_syntax::Highlight;
use k_term::input::{Key, KeySource};

use crate::editor::Editor;
use crate::prompt::prompt;

/// Which way the row walk advances on Arrow continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Per-session search state, owned by the observer closure for exactly
/// the lifetime of one prompt.
struct SearchState {
    direction: Direction,
    /// Rendered column to resume from within the resume row.
    last_match_rx: usize,
    /// Row to resume from.
    last_match_row: usize,
    /// Highlight bytes displaced by the current overlay.
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl SearchState {
    const fn new() -> Self {
        Self {
            direction: Direction::Forward,
            last_match_rx: 0,
            last_match_row: 0,
            saved_hl: None,
        }
    }

    /// React to one prompt keystroke: restore the previous overlay,
    /// adjust direction or restart, and hunt for the next hit.
    fn on_key(&mut self, ed: &mut Editor, query: &[u8], key: Key) {
        if let Some((row, saved)) = self.saved_hl.take() {
            ed.buffer.restore_hl(row, saved);
        }

        match key {
            Key::ArrowRight | Key::ArrowDown => self.direction = Direction::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = Direction::Backward,
            Key::Char(b) if b >= 0x20 && b != 0x7f => {
                // The query changed: restart from the top, forward.
                self.last_match_rx = 0;
                self.last_match_row = 0;
                self.direction = Direction::Forward;
            }
            _ => {
                // Enter, Escape, or another session-ending key: leave no
                // resume state (or overlay) behind.
                *self = Self::new();
                return;
            }
        }

        self.scan(ed, query);
    }

    /// Walk at most one full lap of rows looking for `query` as a byte
    /// substring of the rendered text. A miss is silent.
    fn scan(&mut self, ed: &mut Editor, query: &[u8]) {
        if query.is_empty() || ed.buffer.is_empty() {
            return;
        }

        let num_rows = ed.buffer.len();
        let mut current_rx = self.last_match_rx;
        let mut current_row = self.last_match_row;

        for _ in 0..num_rows {
            let hit = {
                let row = &ed.buffer.rows()[current_row];
                let from = current_rx.min(row.render().len());
                find_bytes(&row.render()[from..], query).map(|offset| {
                    let match_rx = from + offset;
                    (match_rx, row.rx_to_cx(match_rx))
                })
            };

            if let Some((match_rx, match_cx)) = hit {
                self.last_match_rx = match_rx + query.len();
                self.last_match_row = current_row;

                ed.cy = current_row;
                ed.cx = match_cx;
                // Push the scroll clamp so the matching line surfaces at
                // the top of the window on the next refresh.
                ed.row_off = num_rows;

                let saved = ed.buffer.paint_match(current_row, match_rx, query.len());
                self.saved_hl = Some((current_row, saved));
                return;
            }

            current_rx = 0;
            current_row = match self.direction {
                Direction::Forward => (current_row + 1) % num_rows,
                Direction::Backward => current_row.checked_sub(1).unwrap_or(num_rows - 1),
            };
        }
    }
}

/// Substring search over raw bytes.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Interactive search. Restores the cursor and scroll position if the
/// user cancels; a confirmed search leaves the cursor on the hit.
///
/// # Errors
///
/// Returns an error if reading a key or writing a refresh fails.
pub fn find<K: KeySource, W: Write>(
    ed: &mut Editor,
    keys: &mut K,
    out: &mut W,
) -> io::Result<()> {
    let saved = (ed.cx, ed.cy, ed.row_off, ed.col_off);

    let mut state = SearchState::new();
    let accepted = prompt(
        ed,
        keys,
        out,
        "Search: {} (ESC/Ctrl-C cancels, Arrows continue)",
        |ed, query, key| state.on_key(ed, query, key),
    )?;

    if accepted.is_none() {
        (ed.cx, ed.cy, ed.row_off, ed.col_off) = saved;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{typed, ScriptedKeys};
    use k_term::input::{BACKSPACE, ENTER, ESC};
    use k_term::terminal::Size;
    use std::path::PathBuf;

    /// Ten rows with "foo" appearing on rows 3 and 7, highlighted as C.
    fn editor_with_foos() -> Editor {
        let mut ed = Editor::new(Size { cols: 80, rows: 24 }).unwrap();
        for i in 0..10 {
            let line = match i {
                3 => b"int foo = 42;".to_vec(),
                7 => format!("call(foo); // row {i}").into_bytes(),
                _ => format!("plain row {i}").into_bytes(),
            };
            let at = ed.buffer.len();
            ed.buffer.insert_row(at, &line);
        }
        ed.buffer.set_path(PathBuf::from("demo.c"));
        ed
    }

    fn run_search(ed: &mut Editor, script: Vec<Key>) {
        let mut keys = ScriptedKeys::new(script);
        let mut out = Vec::new();
        find(ed, &mut keys, &mut out).unwrap();
    }

    fn all_hl(ed: &Editor) -> Vec<Vec<Highlight>> {
        ed.buffer.rows().iter().map(|r| r.hl().to_vec()).collect()
    }

    // -- find_bytes ---------------------------------------------------------

    #[test]
    fn find_bytes_basics() {
        assert_eq!(find_bytes(b"hello world", b"world"), Some(6));
        assert_eq!(find_bytes(b"hello", b"xyz"), None);
        assert_eq!(find_bytes(b"ab", b"abc"), None);
        assert_eq!(find_bytes(b"abc", b""), None);
        assert_eq!(find_bytes(b"aaa", b"aa"), Some(0));
    }

    // -- Cursor movement ----------------------------------------------------

    #[test]
    fn first_match_lands_on_row_three() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        let (cx, cy) = ed.cursor();
        assert_eq!(cy, 3);
        assert_eq!(cx, 4); // "int foo": the hit starts at column 4
    }

    #[test]
    fn arrow_right_advances_to_next_match() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::ArrowRight);
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor().1, 7);
    }

    #[test]
    fn search_wraps_past_the_last_row() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::ArrowRight); // row 7
        script.push(Key::ArrowRight); // wraps back to row 3
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor().1, 3);
    }

    #[test]
    fn arrow_left_searches_backward() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::ArrowLeft); // backward from row 3 wraps to row 7
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor().1, 7);
    }

    #[test]
    fn match_line_is_pushed_to_the_top() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        // The overlarge offset collapses to "match row at top" on the
        // next scroll.
        ed.scroll();
        assert_eq!(ed.row_off, 3);
    }

    // -- Overlay ------------------------------------------------------------

    #[test]
    fn active_match_is_overlaid() {
        let mut ed = editor_with_foos();
        // Script ends without a terminator: capture the mid-session
        // state by running the prompt pieces manually.
        let mut state = SearchState::new();
        state.on_key(&mut ed, b"foo", Key::Char(b'o'));

        let row = ed.buffer.row(3).unwrap();
        assert_eq!(&row.hl()[4..7], &[Highlight::Match; 3]);
        // Neighboring tokens are untouched.
        assert_eq!(row.hl()[0], Highlight::Keyword2);
    }

    #[test]
    fn escape_restores_cursor_scroll_and_highlight() {
        let mut ed = editor_with_foos();
        let before_hl = all_hl(&ed);

        let mut script = typed(b"foo");
        script.push(Key::ArrowRight);
        script.push(Key::Char(ESC));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor(), (0, 0));
        assert_eq!(ed.row_off, 0);
        assert_eq!(ed.col_off, 0);
        assert_eq!(all_hl(&ed), before_hl, "overlay must restore exactly");
    }

    #[test]
    fn confirming_keeps_cursor_but_clears_overlay() {
        let mut ed = editor_with_foos();
        let before_hl = all_hl(&ed);

        let mut script = typed(b"foo");
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor().1, 3);
        assert_eq!(all_hl(&ed), before_hl, "no overlay may survive the session");
    }

    #[test]
    fn editing_the_query_restarts_from_the_top() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"foo");
        script.push(Key::ArrowRight); // row 7
        script.extend(typed(b" ")); // query grows: restart from the top
        script.push(Key::Char(BACKSPACE));
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor().1, 3);
    }

    // -- Misses -------------------------------------------------------------

    #[test]
    fn no_match_is_silent() {
        let mut ed = editor_with_foos();
        let mut script = typed(b"zebra");
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        assert_eq!(ed.cursor(), (0, 0));
        assert!(ed
            .buffer
            .rows()
            .iter()
            .all(|r| r.hl().iter().all(|&h| h != Highlight::Match)));
    }

    #[test]
    fn search_in_empty_buffer_is_silent() {
        let mut ed = Editor::new(Size { cols: 80, rows: 24 }).unwrap();
        let mut script = typed(b"x");
        script.push(Key::Char(ESC));
        run_search(&mut ed, script);
        assert_eq!(ed.cursor(), (0, 0));
    }

    #[test]
    fn match_respects_rendered_tab_columns() {
        let mut ed = Editor::new(Size { cols: 80, rows: 24 }).unwrap();
        ed.buffer.insert_row(0, b"\tneedle");

        let mut script = typed(b"needle");
        script.push(Key::Char(ENTER));
        run_search(&mut ed, script);

        // The hit is at rendered column 8; cx maps back through the tab.
        assert_eq!(ed.cursor(), (1, 0));
    }
}
