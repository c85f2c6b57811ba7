//! Language definitions — the built-in syntax table.
//!
//! Each [`Syntax`] describes one language: which filenames it applies to,
//! which token classes to highlight, how its comments are delimited, and
//! its keywords. Definitions are static data; nothing here scans text.
//!
//! # Keyword convention
//!
//! A keyword ending in `|` is a *secondary* keyword (type names), shown in
//! a different color from control-flow keywords. The sentinel is stripped
//! before matching.
//!
//! # Filename patterns
//!
//! A pattern starting with `.` matches as a literal filename suffix
//! (`.c` matches `main.c` but not `main.cpp`); any other pattern matches
//! as a plain substring anywhere in the name.

use bitflags::bitflags;

bitflags! {
    /// Which token classes a language wants highlighted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        /// Highlight numeric literals.
        const HIGHLIGHT_NUMBERS = 1 << 0;
        /// Highlight string and character literals.
        const HIGHLIGHT_STRINGS = 1 << 1;
    }
}

/// A syntax definition for one language.
#[derive(Debug)]
pub struct Syntax {
    /// Display name, shown in the status bar.
    pub name: &'static str,
    /// Filename patterns selecting this definition.
    pub patterns: &'static [&'static str],
    /// Which token classes to highlight.
    pub flags: SyntaxFlags,
    /// Prefix starting a comment that runs to end of line.
    pub singleline_comment: Option<&'static str>,
    /// Multi-line comment delimiters (start, end).
    pub multiline_comment: Option<(&'static str, &'static str)>,
    /// Keywords; a trailing `|` marks a secondary (type) keyword.
    pub keywords: &'static [&'static str],
}

impl Syntax {
    /// True if `filename` selects this definition.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        self.patterns.iter().any(|pat| {
            if pat.starts_with('.') {
                filename.ends_with(pat)
            } else {
                filename.contains(pat)
            }
        })
    }
}

/// The built-in syntax table.
pub static LANGUAGES: &[Syntax] = &[
    Syntax {
        name: "c",
        patterns: &[".c", ".h", ".cpp", ".hpp"],
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
        singleline_comment: Some("//"),
        multiline_comment: Some(("/*", "*/")),
        keywords: &[
            "switch", "if", "while", "for", "break", "continue", "return", "else", "struct",
            "union", "typedef", "static", "enum", "class", "case",
            // Types
            "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|",
        ],
    },
    Syntax {
        name: "rust",
        patterns: &[".rs"],
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
        singleline_comment: Some("//"),
        multiline_comment: Some(("/*", "*/")),
        keywords: &[
            "fn", "let", "mut", "pub", "use", "mod", "impl", "trait", "match", "if", "else",
            "while", "for", "loop", "return", "break", "continue", "struct", "enum", "const",
            "static", "move", "ref", "where", "unsafe", "as", "in",
            // Types
            "i8|", "i16|", "i32|", "i64|", "u8|", "u16|", "u32|", "u64|", "usize|", "isize|",
            "f32|", "f64|", "bool|", "char|", "str|", "String|", "Vec|", "Option|", "Result|",
        ],
    },
];

/// Select the definition for `filename`, or `None` if nothing matches.
///
/// Definitions are tried in table order; the first match wins.
#[must_use]
pub fn select(filename: &str) -> Option<&'static Syntax> {
    LANGUAGES.iter().find(|syntax| syntax.matches(filename))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Pattern matching ---------------------------------------------------

    #[test]
    fn dot_pattern_matches_suffix() {
        assert!(select("main.c").is_some());
        assert!(select("editor.cpp").is_some());
        assert!(select("row.rs").is_some());
    }

    #[test]
    fn dot_pattern_requires_suffix_position() {
        // ".c" must be a trailing suffix, not an interior substring.
        assert!(select("main.c.txt").is_none());
        assert!(select("archive.cpio").is_none());
    }

    #[test]
    fn no_match_for_plain_names() {
        assert!(select("README").is_none());
        assert!(select("notes.txt").is_none());
    }

    #[test]
    fn header_patterns() {
        let c = select("defs.h").unwrap();
        assert_eq!(c.name, "c");
        let cpp = select("defs.hpp").unwrap();
        assert_eq!(cpp.name, "c");
    }

    #[test]
    fn rust_selects_rust() {
        assert_eq!(select("lib.rs").unwrap().name, "rust");
    }

    #[test]
    fn suffix_must_match_whole_extension() {
        // "a.rs" ends with ".rs"; "a.rsx" does not.
        assert!(select("a.rs").is_some());
        assert!(select("a.rsx").is_none());
    }

    // -- Table shape --------------------------------------------------------

    #[test]
    fn c_highlights_numbers_and_strings() {
        let c = select("x.c").unwrap();
        assert!(c.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS));
        assert!(c.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS));
    }

    #[test]
    fn c_comment_delimiters() {
        let c = select("x.c").unwrap();
        assert_eq!(c.singleline_comment, Some("//"));
        assert_eq!(c.multiline_comment, Some(("/*", "*/")));
    }

    #[test]
    fn every_language_has_patterns_and_keywords() {
        for syntax in LANGUAGES {
            assert!(!syntax.patterns.is_empty(), "{}: no patterns", syntax.name);
            assert!(!syntax.keywords.is_empty(), "{}: no keywords", syntax.name);
        }
    }

    #[test]
    fn secondary_keywords_present() {
        let c = select("x.c").unwrap();
        assert!(c.keywords.contains(&"int|"));
        assert!(c.keywords.contains(&"void|"));
        // Primary keywords carry no sentinel.
        assert!(c.keywords.contains(&"if"));
    }
}
