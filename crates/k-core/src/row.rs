//! Row — one logical line of text plus its derived projections.
//!
//! A `Row` owns three parallel views of a line:
//!
//! - `chars` — the logical bytes, exactly what load/save sees
//! - `render` — the displayed bytes, with tabs expanded to the next
//!   multiple of [`TAB_STOP`]
//! - `hl` — one [`Highlight`] token per render byte
//!
//! plus `hl_open_comment`, the single bit of highlight state that crosses
//! rows, and `idx`, the row's position in the buffer (kept equal to its
//! index by the row store at all times).
//!
//! # Coordinate spaces
//!
//! `cx` is a column in `chars`; `rx` is a column in `render`. The two
//! differ only where tabs expand. [`cx_to_rx`](Row::cx_to_rx) and
//! [`rx_to_cx`](Row::rx_to_cx) convert between them.
//!
//! All columns are byte offsets. The editor is deliberately byte-oriented;
//! multi-byte sequences render as their individual bytes.

use k_syntax::{scan_row, Highlight, Syntax};

/// Tab stop width: tabs render as spaces up to the next multiple of this.
pub const TAB_STOP: usize = 8;

/// One logical line of text with its rendered and highlighted projections.
#[derive(Debug)]
pub struct Row {
    /// Position of this row within the buffer. The row store keeps this
    /// equal to the row's index across every insert and delete.
    idx: usize,
    /// Logical bytes of the line (no terminator).
    chars: Vec<u8>,
    /// Displayed bytes: `chars` with tabs expanded.
    render: Vec<u8>,
    /// One token per render byte. Always `render.len()` entries.
    hl: Vec<Highlight>,
    /// True if this row ends inside an unterminated multi-line comment.
    hl_open_comment: bool,
}

impl Row {
    /// Create a row from logical bytes and compute its render projection.
    ///
    /// The highlight array starts all-Normal; the row store runs the
    /// scanner immediately after insertion (it knows the previous row's
    /// open-comment flag, which this constructor cannot).
    pub(crate) fn new(idx: usize, chars: &[u8]) -> Self {
        let mut row = Self {
            idx,
            chars: chars.to_vec(),
            render: Vec::new(),
            hl: Vec::new(),
            hl_open_comment: false,
        };
        row.update_render();
        row
    }

    // -- Accessors ----------------------------------------------------------

    /// The row's position in the buffer.
    #[inline]
    #[must_use]
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Logical bytes.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Rendered bytes (tabs expanded).
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Highlight tokens, one per rendered byte.
    #[inline]
    #[must_use]
    pub fn hl(&self) -> &[Highlight] {
        &self.hl
    }

    /// True if this row ends inside an unterminated multi-line comment.
    #[inline]
    #[must_use]
    pub const fn hl_open_comment(&self) -> bool {
        self.hl_open_comment
    }

    /// Length of the logical line in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when the logical line is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Convert a chars column to the rendered column it lands on.
    ///
    /// Each tab advances to the next multiple of [`TAB_STOP`]; every other
    /// byte advances by one.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for &b in self.chars.iter().take(cx) {
            if b == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Convert a rendered column back to a chars column.
    ///
    /// Returns the smallest `cx` whose rendered width strictly exceeds
    /// `rx_target`, or the row length if no column does. The two
    /// conversions are inverse-like: `cx_to_rx(rx_to_cx(r)) >= r` for any
    /// rendered column `r`.
    #[must_use]
    pub fn rx_to_cx(&self, rx_target: usize) -> usize {
        let mut rx = 0;
        for (cx, &b) in self.chars.iter().enumerate() {
            if b == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;

            if rx > rx_target {
                return cx;
            }
        }
        self.chars.len()
    }

    // -- Mutation (row store only) ------------------------------------------

    pub(crate) fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    /// Insert one byte at `at`, clipped to `[0, len]`.
    pub(crate) fn insert_char(&mut self, at: usize, b: u8) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, b);
        self.update_render();
    }

    /// Delete the byte at `at`. Out-of-bounds is a no-op.
    pub(crate) fn delete_char(&mut self, at: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update_render();
        true
    }

    /// Append bytes to the end of the line.
    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.chars.extend_from_slice(bytes);
        self.update_render();
    }

    /// Truncate the line to `len` bytes. Longer lengths are a no-op.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.chars.len() {
            self.chars.truncate(len);
            self.update_render();
        }
    }

    /// Rebuild `render` from `chars`, expanding tabs.
    ///
    /// Resets `hl` to all-Normal at the new length so the
    /// render/highlight length invariant holds even before the scanner
    /// runs.
    fn update_render(&mut self) {
        self.render.clear();
        for &b in &self.chars {
            if b == b'\t' {
                self.render.push(b' ');
                while self.render.len() % TAB_STOP != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(b);
            }
        }
        self.hl = vec![Highlight::Normal; self.render.len()];
    }

    // -- Highlighting (row store only) --------------------------------------

    /// Re-scan this row's tokens given the previous row's open-comment
    /// flag. Returns `true` if this row's own flag changed, in which case
    /// the following row must be re-scanned too.
    pub(crate) fn rehighlight(&mut self, syntax: Option<&Syntax>, starts_in_comment: bool) -> bool {
        let open = match syntax {
            Some(syntax) => {
                let (hl, open) = scan_row(&self.render, syntax, starts_in_comment);
                self.hl = hl;
                open
            }
            None => {
                self.hl = vec![Highlight::Normal; self.render.len()];
                false
            }
        };
        let changed = open != self.hl_open_comment;
        self.hl_open_comment = open;
        changed
    }

    /// Paint the search-match overlay over `len` rendered bytes starting
    /// at `rx`, returning the previous tokens for later restore.
    pub(crate) fn paint_match(&mut self, rx: usize, len: usize) -> Vec<Highlight> {
        let saved = self.hl.clone();
        let end = (rx + len).min(self.hl.len());
        self.hl[rx.min(end)..end].fill(Highlight::Match);
        saved
    }

    /// Restore tokens saved by [`paint_match`](Self::paint_match).
    ///
    /// Ignored if the row has been re-rendered to a different length in
    /// the meantime (the saved overlay is then stale).
    pub(crate) fn restore_hl(&mut self, saved: Vec<Highlight>) {
        if saved.len() == self.render.len() {
            self.hl = saved;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
