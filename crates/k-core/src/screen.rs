//! Screen composer — one complete frame per refresh.
//!
//! Layout, top to bottom:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ text rows (or ~ filler)      │  ← screen_rows
//! ├──────────────────────────────┤
//! │ status bar (reverse video)   │  ← 1 row
//! ├──────────────────────────────┤
//! │ message bar                  │  ← 1 row
//! └──────────────────────────────┘
//! ```
//!
//! The whole frame is staged in a [`RefreshBuffer`] and handed to the
//! sink in one write: hide cursor, home, draw everything, re-position
//! the cursor, show it again. The terminal never sees a partial frame.
//!
//! While drawing text the composer tracks the color it last emitted and
//! only writes an SGR sequence when the token color actually changes, so
//! a row of plain text costs no escapes at all.

use std::io::{self, Write};

use k_syntax::Highlight;
use k_term::ansi;
use k_term::output::RefreshBuffer;

use crate::editor::Editor;

/// Compose the current state into one frame and write it to `out`.
///
/// # Errors
///
/// Returns an error if the sink rejects the frame; the caller treats
/// that as fatal.
pub fn refresh<W: Write>(ed: &mut Editor, out: &mut W) -> io::Result<()> {
    ed.scroll();

    let mut frame = RefreshBuffer::new();

    ansi::cursor_hide(&mut frame)?;
    ansi::cursor_home(&mut frame)?;

    draw_rows(ed, &mut frame)?;
    draw_status_bar(ed, &mut frame)?;
    draw_message_bar(ed, &mut frame)?;

    ansi::cursor_to(&mut frame, ed.rx - ed.col_off, ed.cy - ed.row_off)?;
    ansi::cursor_show(&mut frame)?;

    frame.flush_to(out)
}

/// Draw the text area: visible rows, `~` filler, and the welcome line.
fn draw_rows(ed: &Editor, frame: &mut RefreshBuffer) -> io::Result<()> {
    for y in 0..ed.screen_rows {
        let file_row = y + ed.row_off;

        if file_row >= ed.buffer.len() {
            if ed.buffer.len() == 0 && y == ed.screen_rows / 3 {
                draw_welcome(ed, frame)?;
            } else {
                frame.write_all(b"~")?;
            }
        } else {
            draw_text_row(ed, file_row, frame)?;
        }

        ansi::erase_line(frame)?;
        frame.write_all(b"\r\n")?;
    }
    Ok(())
}

/// The centered welcome line, shown only for a completely empty buffer.
fn draw_welcome(ed: &Editor, frame: &mut RefreshBuffer) -> io::Result<()> {
    let welcome = concat!("ked editor -- version ", env!("CARGO_PKG_VERSION"));
    let shown = &welcome.as_bytes()[..welcome.len().min(ed.screen_cols)];

    let mut padding = (ed.screen_cols - shown.len()) / 2;
    if padding > 0 {
        frame.write_all(b"~")?;
        padding -= 1;
    }
    for _ in 0..padding {
        frame.write_all(b" ")?;
    }
    frame.write_all(shown)
}

/// One visible row of text, colored by its highlight tokens.
fn draw_text_row(ed: &Editor, file_row: usize, frame: &mut RefreshBuffer) -> io::Result<()> {
    let row = &ed.buffer.rows()[file_row];
    let start = ed.col_off.min(row.render().len());
    let end = (ed.col_off + ed.screen_cols).min(row.render().len());
    let bytes = &row.render()[start..end];
    let hl = &row.hl()[start..end];

    let mut current_color: Option<u8> = None;

    for (j, &b) in bytes.iter().enumerate() {
        if !(b == b' ' || b.is_ascii_graphic()) {
            // Control (and other unprintable) bytes render symbolically in
            // reverse video; the reset also wipes the color, so re-emit it.
            let sym = if b < 26 { b'@' + b } else { b'?' };
            ansi::reverse_video(frame)?;
            frame.write_all(&[sym])?;
            ansi::normal_video(frame)?;
            if let Some(color) = current_color {
                ansi::fg_color(frame, color)?;
            }
        } else if hl[j] == Highlight::Normal {
            if current_color.is_some() {
                ansi::fg_default(frame)?;
                current_color = None;
            }
            frame.write_all(&[b])?;
        } else {
            let color = hl[j].color();
            if current_color != Some(color) {
                ansi::fg_color(frame, color)?;
                current_color = Some(color);
            }
            frame.write_all(&[b])?;
        }
    }

    ansi::fg_default(frame)
}

/// The reverse-video status bar: name and line count on the left,
/// filetype and cursor position on the right.
fn draw_status_bar(ed: &Editor, frame: &mut RefreshBuffer) -> io::Result<()> {
    ansi::reverse_video(frame)?;

    let name = ed
        .buffer
        .path()
        .map_or_else(|| "[No Name]".into(), |p| p.to_string_lossy().into_owned());
    let modified = if ed.buffer.is_dirty() { "(modified)" } else { "" };
    let left = format!(
        " {} - {} lines {}",
        truncate_str(&name, 20),
        ed.buffer.len(),
        modified
    );

    let filetype = ed.buffer.syntax().map_or("no ft", |s| s.name);
    let right = format!("{} | {}/{} ", filetype, ed.cy + 1, ed.buffer.len());

    let left_bytes = left.as_bytes();
    let mut len = left_bytes.len().min(ed.screen_cols);
    frame.write_all(&left_bytes[..len])?;

    // Pad with spaces; the right segment is emitted only if it fits
    // exactly against the edge.
    let right_bytes = right.as_bytes();
    while len < ed.screen_cols {
        if ed.screen_cols - len == right_bytes.len() {
            frame.write_all(right_bytes)?;
            break;
        }
        frame.write_all(b" ")?;
        len += 1;
    }

    ansi::normal_video(frame)?;
    frame.write_all(b"\r\n")
}

/// The message bar: the status message while it is fresh, blank after.
fn draw_message_bar(ed: &Editor, frame: &mut RefreshBuffer) -> io::Result<()> {
    ansi::erase_line(frame)?;
    if let Some(msg) = ed.status_for_display() {
        let bytes = msg.as_bytes();
        frame.write_all(&bytes[..bytes.len().min(ed.screen_cols)])?;
    }
    Ok(())
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
