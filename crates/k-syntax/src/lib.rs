//! # k-syntax — syntax highlighting for ked
//!
//! A deliberately small highlighting engine: a built-in table of language
//! definitions and a forward, line-local token scanner.
//!
//! - **[`language`]** — `Syntax` definitions (filename patterns, comment
//!   delimiters, keyword lists) and filename-based selection
//! - **[`highlight`]** — the `Highlight` token type and `scan_row`, the
//!   per-row state machine that classifies each rendered byte
//!
//! The scanner is line-local on purpose: the only state that crosses rows
//! is whether a row ends inside an unterminated multi-line comment. The
//! row store owns that propagation; this crate only reports, for a single
//! row, what the tokens are and whether a comment is left open.

pub mod highlight;
pub mod language;

pub use highlight::{is_separator, scan_row, Highlight};
pub use language::{select, Syntax, SyntaxFlags, LANGUAGES};
