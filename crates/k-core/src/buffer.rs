//! Buffer — the row store.
//!
//! A `Buffer` owns the ordered sequence of [`Row`]s plus the file-level
//! metadata: the backing path, the dirty flag, and the active syntax
//! definition. Every text mutation goes through the buffer so that three
//! invariants hold after each public operation:
//!
//! 1. every row's `idx` equals its index in the sequence,
//! 2. every row's highlight array matches its render length, and
//! 3. every row's `hl_open_comment` flag is consistent with the row above.
//!
//! The third is maintained by the *cascade*: after any row's render
//! changes, the scanner re-runs on that row and walks forward, one row at
//! a time, for as long as the open-comment flag keeps changing. Edits far
//! from an unterminated `/*` therefore re-scan a single row; closing or
//! opening one re-scans exactly the rows whose classification changes.
//!
//! # File format
//!
//! Rows are joined with `\n` on save (one terminator per row, none extra)
//! and split on `\n` on load, with a single trailing `\n` or `\r` stripped
//! per line. Saving truncates the file to the exact computed length.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use k_syntax::{select, Highlight, Syntax};

use crate::row::Row;

/// The row store: an ordered sequence of rows plus file metadata.
#[derive(Debug, Default)]
pub struct Buffer {
    rows: Vec<Row>,
    path: Option<PathBuf>,
    dirty: bool,
    syntax: Option<&'static Syntax>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty, unnamed buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a buffer from a file, selecting syntax by filename.
    ///
    /// Each line loses exactly one trailing terminator (`\n` or `\r`).
    /// The buffer starts clean.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;

        let mut buffer = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };
        buffer.syntax = select(&path.to_string_lossy());

        for chunk in data.split_inclusive(|&b| b == b'\n') {
            let line = match chunk.split_last() {
                Some((&last, rest)) if last == b'\n' || last == b'\r' => rest,
                _ => chunk,
            };
            let at = buffer.rows.len();
            buffer.insert_row(at, line);
        }

        buffer.dirty = false;
        Ok(buffer)
    }

    // -- Accessors ----------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the buffer holds no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row at `at`, if any.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// True iff a text mutation happened since the last load or save.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The backing file path, if the buffer has one.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The active syntax definition, if any.
    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// Assign the backing path (used by save-as) and re-select syntax.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.select_syntax();
    }

    // -- Row store operations -----------------------------------------------

    /// Insert a row at `at ∈ [0, len]` with the given logical bytes.
    ///
    /// Shifts following rows down, renumbers them, scans the new row and
    /// cascades. Out-of-bounds is a silent no-op. Sets dirty.
    pub fn insert_row(&mut self, at: usize, bytes: &[u8]) {
        if at > self.rows.len() {
            return;
        }

        self.rows.insert(at, Row::new(at, bytes));
        self.renumber_from(at + 1);
        self.rehighlight_from(at);
        self.dirty = true;
    }

    /// Delete the row at `at ∈ [0, len)`.
    ///
    /// Shifts following rows up, renumbers them, and re-scans from the
    /// deletion point (the removed row may have opened or closed a
    /// multi-line comment). Out-of-bounds is a silent no-op. Sets dirty.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }

        self.rows.remove(at);
        self.renumber_from(at);
        self.rehighlight_from(at);
        self.dirty = true;
    }

    /// Insert one byte into row `y` at column `at` (clipped to the row
    /// length). Sets dirty.
    pub fn insert_char(&mut self, y: usize, at: usize, b: u8) {
        if y >= self.rows.len() {
            return;
        }
        self.rows[y].insert_char(at, b);
        self.rehighlight_from(y);
        self.dirty = true;
    }

    /// Delete the byte at column `at` of row `y`. Out-of-bounds is a
    /// silent no-op and does not set dirty.
    pub fn delete_char(&mut self, y: usize, at: usize) {
        if y >= self.rows.len() {
            return;
        }
        if self.rows[y].delete_char(at) {
            self.rehighlight_from(y);
            self.dirty = true;
        }
    }

    /// Append bytes to the end of row `y`. Sets dirty.
    pub fn append_bytes(&mut self, y: usize, bytes: &[u8]) {
        if y >= self.rows.len() {
            return;
        }
        self.rows[y].append_bytes(bytes);
        self.rehighlight_from(y);
        self.dirty = true;
    }

    /// Truncate row `y` to `len` bytes. Sets dirty.
    pub fn truncate_row(&mut self, y: usize, len: usize) {
        if y >= self.rows.len() {
            return;
        }
        self.rows[y].truncate(len);
        self.rehighlight_from(y);
        self.dirty = true;
    }

    fn renumber_from(&mut self, at: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(at) {
            row.set_idx(i);
        }
    }

    // -- Highlighting -------------------------------------------------------

    /// Re-scan row `at`, then cascade forward while the open-comment flag
    /// keeps changing.
    ///
    /// Each following row is re-scanned at most once per call; the walk
    /// stops at the first row whose flag is unchanged, so the whole
    /// document bounds the worst case.
    fn rehighlight_from(&mut self, at: usize) {
        let mut at = at;
        while at < self.rows.len() {
            let starts_in_comment = at > 0 && self.rows[at - 1].hl_open_comment();
            let changed = self.rows[at].rehighlight(self.syntax, starts_in_comment);
            if !changed {
                break;
            }
            at += 1;
        }
    }

    /// Re-scan every row from the top. Used when the syntax definition
    /// changes (file association at load and save time).
    fn rehighlight_all(&mut self) {
        for at in 0..self.rows.len() {
            let starts_in_comment = at > 0 && self.rows[at - 1].hl_open_comment();
            self.rows[at].rehighlight(self.syntax, starts_in_comment);
        }
    }

    /// Match the filename against the syntax table and re-highlight.
    pub fn select_syntax(&mut self) {
        self.syntax = self
            .path
            .as_ref()
            .and_then(|p| select(&p.to_string_lossy()));
        self.rehighlight_all();
    }

    // -- Search overlay -----------------------------------------------------

    /// Overlay the match token over `len` rendered bytes of row `y`,
    /// returning the tokens it replaced. Purely visual: not a mutation,
    /// does not set dirty.
    pub(crate) fn paint_match(&mut self, y: usize, rx: usize, len: usize) -> Vec<Highlight> {
        self.rows[y].paint_match(rx, len)
    }

    /// Restore tokens previously returned by
    /// [`paint_match`](Self::paint_match).
    pub(crate) fn restore_hl(&mut self, y: usize, saved: Vec<Highlight>) {
        if y < self.rows.len() {
            self.rows[y].restore_hl(saved);
        }
    }

    // -- File I/O -----------------------------------------------------------

    /// Serialize all rows, each followed by `\n`.
    #[must_use]
    pub fn rows_to_bytes(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    /// Write the buffer to its backing path and clear the dirty flag.
    ///
    /// Opens (creating if needed), truncates to the exact content length,
    /// then writes. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has no path or if any of
    /// open/truncate/write fails. On error the dirty flag is left set.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.path.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no filename",
            ));
        };

        let bytes = self.rows_to_bytes();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        file.set_len(bytes.len() as u64)?;
        file.write_all(&bytes)?;

        self.dirty = false;
        Ok(bytes.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use k_syntax::Highlight;

    /// A buffer with rows from a byte string, as if loaded from a `.c`
    /// file (so syntax highlighting is active).
    fn c_buffer(lines: &[&[u8]]) -> Buffer {
        let mut buf = Buffer::new();
        buf.set_path(PathBuf::from("test.c"));
        for (i, line) in lines.iter().enumerate() {
            buf.insert_row(i, line);
        }
        buf
    }

    fn plain_buffer(lines: &[&[u8]]) -> Buffer {
        let mut buf = Buffer::new();
        for (i, line) in lines.iter().enumerate() {
            buf.insert_row(i, line);
        }
        buf
    }

    fn assert_invariants(buf: &Buffer) {
        for (i, row) in buf.rows().iter().enumerate() {
            assert_eq!(row.idx(), i, "row {i} has stale idx");
            assert_eq!(
                row.hl().len(),
                row.render().len(),
                "row {i} hl/render length mismatch"
            );
        }
    }

    // -- Row store ----------------------------------------------------------

    #[test]
    fn new_buffer_is_empty_and_clean() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert!(!buf.is_dirty());
        assert!(buf.path().is_none());
        assert!(buf.syntax().is_none());
    }

    #[test]
    fn insert_row_appends_and_numbers() {
        let buf = plain_buffer(&[b"one", b"two", b"three"]);
        assert_eq!(buf.len(), 3);
        assert_invariants(&buf);
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_row_in_middle_renumbers() {
        let mut buf = plain_buffer(&[b"one", b"three"]);
        buf.insert_row(1, b"two");
        assert_eq!(buf.row(1).unwrap().chars(), b"two");
        assert_eq!(buf.row(2).unwrap().chars(), b"three");
        assert_invariants(&buf);
    }

    #[test]
    fn insert_row_out_of_bounds_is_noop() {
        let mut buf = plain_buffer(&[b"one"]);
        buf.insert_row(5, b"lost");
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn delete_row_renumbers_following() {
        let mut buf = plain_buffer(&[b"one", b"two", b"three"]);
        buf.delete_row(0);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.row(0).unwrap().chars(), b"two");
        assert_invariants(&buf);
    }

    #[test]
    fn delete_row_out_of_bounds_is_noop() {
        let mut buf = plain_buffer(&[b"one"]);
        buf.delete_row(1);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn idx_invariant_across_edit_sequence() {
        let mut buf = plain_buffer(&[b"a", b"b", b"c", b"d"]);
        buf.delete_row(1);
        buf.insert_row(0, b"top");
        buf.insert_row(4, b"bottom");
        buf.delete_row(2);
        assert_invariants(&buf);
    }

    #[test]
    fn insert_then_delete_char_is_text_noop() {
        let mut buf = plain_buffer(&[b"hello"]);
        buf.insert_char(0, 2, b'X');
        assert_eq!(buf.row(0).unwrap().chars(), b"heXllo");
        buf.delete_char(0, 2);
        assert_eq!(buf.row(0).unwrap().chars(), b"hello");
        assert!(buf.is_dirty());
        assert_invariants(&buf);
    }

    #[test]
    fn delete_char_out_of_bounds_is_silent() {
        let mut buf = plain_buffer(&[b"ab"]);
        // Reset dirty to observe that a no-op doesn't set it.
        buf.dirty = false;
        buf.delete_char(0, 2);
        assert!(!buf.is_dirty());
    }

    // -- Highlight cascade ----------------------------------------------------

    #[test]
    fn open_comment_propagates_to_next_row() {
        let buf = c_buffer(&[b"/* open", b"closed */ x"]);
        assert!(buf.row(0).unwrap().hl_open_comment());
        assert!(!buf.row(1).unwrap().hl_open_comment());

        let row1 = buf.row(1).unwrap();
        // Row 1 starts inside the comment, through "*/".
        assert_eq!(&row1.hl()[0..9], &[Highlight::MlComment; 9]);
        // "x" after the close is plain text.
        assert_eq!(row1.hl()[10], Highlight::Normal);
    }

    #[test]
    fn closing_a_comment_recascades() {
        let mut buf = c_buffer(&[b"/* open", b"int x;", b"int y;"]);
        // While the comment is open, following rows are comment-colored.
        assert_eq!(buf.row(1).unwrap().hl()[0], Highlight::MlComment);
        assert_eq!(buf.row(2).unwrap().hl()[0], Highlight::MlComment);

        // Close the comment on row 0; rows 1 and 2 reclassify.
        buf.append_bytes(0, b" */");
        assert!(!buf.row(0).unwrap().hl_open_comment());
        assert_eq!(buf.row(1).unwrap().hl()[0], Highlight::Keyword2);
        assert_eq!(buf.row(2).unwrap().hl()[0], Highlight::Keyword2);
    }

    #[test]
    fn deleting_the_opening_row_reclassifies() {
        let mut buf = c_buffer(&[b"/* open", b"int x;"]);
        assert_eq!(buf.row(1).unwrap().hl()[0], Highlight::MlComment);

        buf.delete_row(0);
        assert_eq!(buf.row(0).unwrap().hl()[0], Highlight::Keyword2);
        assert_invariants(&buf);
    }

    #[test]
    fn cascade_stops_where_flags_settle() {
        // With no multi-line comments anywhere, editing one row leaves
        // every other row's tokens untouched.
        let mut buf = c_buffer(&[b"int a;", b"int b;", b"int c;"]);
        let before: Vec<Vec<Highlight>> =
            buf.rows().iter().map(|r| r.hl().to_vec()).collect();

        buf.insert_char(1, 4, b'x');

        assert_eq!(buf.row(0).unwrap().hl(), &before[0][..]);
        assert_eq!(buf.row(2).unwrap().hl(), &before[2][..]);
    }

    #[test]
    fn no_syntax_means_all_normal() {
        let buf = plain_buffer(&[b"int x = 42; /* c */"]);
        assert!(buf
            .row(0)
            .unwrap()
            .hl()
            .iter()
            .all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn select_syntax_rehighlights_existing_rows() {
        let mut buf = plain_buffer(&[b"int x;"]);
        assert_eq!(buf.row(0).unwrap().hl()[0], Highlight::Normal);

        buf.set_path(PathBuf::from("late.c"));
        assert_eq!(buf.row(0).unwrap().hl()[0], Highlight::Keyword2);
        assert_eq!(buf.syntax().unwrap().name, "c");
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn rows_to_bytes_one_newline_per_row() {
        let buf = plain_buffer(&[b"abc", b"de", b""]);
        assert_eq!(buf.rows_to_bytes(), b"abc\nde\n\n");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut buf = plain_buffer(&[b"first", b"", b"third"]);
        buf.set_path(path.clone());
        let written = buf.save().unwrap();
        assert_eq!(written, b"first\n\nthird\n".len());
        assert!(!buf.is_dirty());

        let loaded = Buffer::from_file(&path).unwrap();
        assert!(!loaded.is_dirty());
        assert_eq!(loaded.rows_to_bytes(), buf.rows_to_bytes());
    }

    #[test]
    fn save_truncates_previous_longer_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, b"a much longer previous content\n").unwrap();

        let mut buf = plain_buffer(&[b"hi"]);
        buf.set_path(path.clone());
        buf.save().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hi\n");
    }

    #[test]
    fn save_without_path_errors_and_stays_dirty() {
        let mut buf = plain_buffer(&[b"x"]);
        assert!(buf.save().is_err());
        assert!(buf.is_dirty());
    }

    #[test]
    fn load_strips_one_terminator_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, b"unix\ncrlf\r\nlast").unwrap();

        let buf = Buffer::from_file(&path).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.row(0).unwrap().chars(), b"unix");
        // Only the final terminator comes off; the \r stays.
        assert_eq!(buf.row(1).unwrap().chars(), b"crlf\r");
        assert_eq!(buf.row(2).unwrap().chars(), b"last");
    }

    #[test]
    fn load_empty_file_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        let buf = Buffer::from_file(&path).unwrap();
        assert!(buf.is_empty());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn trailing_newline_does_not_create_empty_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nl.txt");
        fs::write(&path, b"only\n").unwrap();

        let buf = Buffer::from_file(&path).unwrap();
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn load_selects_syntax_from_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.c");
        fs::write(&path, b"int main(void) { return 0; }\n").unwrap();

        let buf = Buffer::from_file(&path).unwrap();
        assert_eq!(buf.syntax().unwrap().name, "c");
        assert_eq!(buf.row(0).unwrap().hl()[0], Highlight::Keyword2);
    }
}
