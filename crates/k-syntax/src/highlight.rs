//! Token classification — the per-row highlight scanner.
//!
//! [`scan_row`] walks one row's rendered bytes left to right, carrying
//! three pieces of state:
//!
//! - `prev_sep` — whether the previous byte was a separator, which gates
//!   number and keyword starts so `int` highlights but `print` does not
//! - `in_string` — the opening quote byte while inside a string, 0 outside
//! - `in_comment` — whether the scan is inside a multi-line comment; the
//!   initial value comes from the previous row's open-comment flag
//!
//! The scan returns one token per rendered byte plus the final
//! `in_comment` state, which the row store compares against the row's
//! stored flag to decide whether the following row must be re-scanned.

use crate::language::{Syntax, SyntaxFlags};

// ---------------------------------------------------------------------------
// Highlight tokens
// ---------------------------------------------------------------------------

/// Classification of one rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Highlight {
    /// Plain text.
    Normal,
    /// Single-line comment, from the delimiter to end of row.
    Comment,
    /// Multi-line comment body or delimiter.
    MlComment,
    /// Primary keyword (control flow, declarations).
    Keyword1,
    /// Secondary keyword (type names).
    Keyword2,
    /// String or character literal, including quotes and escapes.
    String,
    /// Numeric literal.
    Number,
    /// Search match overlay.
    Match,
}

impl Highlight {
    /// The ANSI SGR foreground parameter for this token.
    #[must_use]
    pub const fn color(self) -> u8 {
        match self {
            Self::Comment | Self::MlComment => 36, // cyan
            Self::Keyword1 => 33,                  // yellow
            Self::Keyword2 => 32,                  // green
            Self::String => 35,                    // magenta
            Self::Number => 31,                    // red
            Self::Match => 34,                     // blue
            Self::Normal => 37,                    // white
        }
    }
}

// ---------------------------------------------------------------------------
// Separators
// ---------------------------------------------------------------------------

/// True for bytes that end a token: whitespace, NUL, or punctuation.
#[must_use]
pub fn is_separator(b: u8) -> bool {
    b == 0 || b.is_ascii_whitespace() || b",.()+-/*=~%<>[];".contains(&b)
}

// ---------------------------------------------------------------------------
// Row scan
// ---------------------------------------------------------------------------

/// Classify every byte of one row's render.
///
/// `starts_in_comment` is the previous row's open-comment flag (false for
/// the first row). Returns the token array (always exactly
/// `render.len()` entries) and whether the row ends inside an
/// unterminated multi-line comment.
#[must_use]
pub fn scan_row(render: &[u8], syntax: &Syntax, starts_in_comment: bool) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; render.len()];

    let mut prev_sep = true;
    let mut in_string: u8 = 0;
    let mut in_comment = starts_in_comment;

    let scs = syntax.singleline_comment.map_or(&[] as &[u8], str::as_bytes);
    let (mcs, mce) = syntax
        .multiline_comment
        .map_or((&[] as &[u8], &[] as &[u8]), |(s, e)| {
            (s.as_bytes(), e.as_bytes())
        });

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        // Single-line comment: the rest of the row, unless we're inside a
        // string or a multi-line comment.
        if !scs.is_empty() && in_string == 0 && !in_comment && render[i..].starts_with(scs) {
            hl[i..].fill(Highlight::Comment);
            break;
        }

        // Multi-line comments take precedence over everything but strings.
        if !mcs.is_empty() && !mce.is_empty() && in_string == 0 {
            if in_comment {
                hl[i] = Highlight::MlComment;
                if render[i..].starts_with(mce) {
                    hl[i..i + mce.len()].fill(Highlight::MlComment);
                    i += mce.len();
                    in_comment = false;
                    prev_sep = true;
                } else {
                    i += 1;
                }
                continue;
            } else if render[i..].starts_with(mcs) {
                hl[i..i + mcs.len()].fill(Highlight::MlComment);
                i += mcs.len();
                in_comment = true;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS) {
            if in_string != 0 {
                hl[i] = Highlight::String;

                // A backslash escapes the next byte, including the
                // terminating quote.
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }

                if c == in_string {
                    in_string = 0;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = c;
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        // Keywords start only after a separator and must end at one
        // (end of row counts).
        if prev_sep {
            let mut matched = false;
            for kw in syntax.keywords {
                let (body, token) = match kw.strip_suffix('|') {
                    Some(body) => (body.as_bytes(), Highlight::Keyword2),
                    None => (kw.as_bytes(), Highlight::Keyword1),
                };
                if i + body.len() > render.len() {
                    continue;
                }
                let bounded = render
                    .get(i + body.len())
                    .map_or(true, |&b| is_separator(b));
                if bounded && &render[i..i + body.len()] == body {
                    hl[i..i + body.len()].fill(token);
                    i += body.len();
                    matched = true;
                    break;
                }
            }
            if matched {
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
