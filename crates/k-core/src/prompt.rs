//! Prompt — the status-line mini line editor.
//!
//! Runs its own refresh/read iterations on top of the main loop's key
//! source and sink: each keystroke updates the status message (the
//! template's `{}` placeholder shows the input so far), redraws, and
//! feeds an optional observer. The observer is how incremental search
//! reacts per keystroke without the prompt knowing anything about
//! searching.
//!
//! Cancel (ESC or Ctrl-C) yields `None`; Enter on a non-empty input
//! yields the raw bytes. Enter on an empty input is ignored, matching
//! the expectation that an empty filename or query is never meaningful.

use std::io::{self, Write};

use k_term::input::{ctrl, Key, KeySource, BACKSPACE, ENTER, ESC};

use crate::editor::Editor;
use crate::screen;

const CTRL_C: u8 = ctrl(b'c');

/// Run the prompt loop and return the entered bytes, or `None` on cancel.
///
/// `template` must contain a `{}` placeholder for the live input. The
/// observer runs after every processed key, including the final Enter or
/// cancel key (so per-keystroke consumers can tear down their state).
///
/// # Errors
///
/// Returns an error if reading a key or writing a refresh fails.
pub fn prompt<K, W, F>(
    ed: &mut Editor,
    keys: &mut K,
    out: &mut W,
    template: &str,
    mut observer: F,
) -> io::Result<Option<Vec<u8>>>
where
    K: KeySource,
    W: Write,
    F: FnMut(&mut Editor, &[u8], Key),
{
    let mut input: Vec<u8> = Vec::new();

    loop {
        let shown = template.replacen("{}", &String::from_utf8_lossy(&input), 1);
        ed.set_status_message(shown);
        screen::refresh(ed, out)?;

        let key = keys.read_key()?;
        match key {
            Key::Char(ESC | CTRL_C) => {
                ed.clear_status();
                observer(ed, &input, key);
                return Ok(None);
            }
            Key::Char(BACKSPACE) => {
                if input.pop().is_none() {
                    // Nothing to erase; the observer is not consulted.
                    continue;
                }
            }
            Key::Char(ENTER) => {
                if !input.is_empty() {
                    ed.clear_status();
                    observer(ed, &input, key);
                    return Ok(Some(input));
                }
            }
            Key::Char(b) if b >= 0x20 && b != BACKSPACE => input.push(b),
            _ => {}
        }

        observer(ed, &input, key);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
