//! Anchor matching for file patches.
//!
//! An anchor locates a single line in a text file, either by regular
//! expression or by literal substring. Matching is a top-to-bottom scan;
//! only the first occurrence counts. An absent anchor is not an error,
//! callers decide whether that is fatal.

use regex::Regex;

use crate::error::{Error, Result};

/// Pattern used to locate an insertion point within a text file.
#[derive(Debug, Clone)]
pub enum Anchor {
    Regex(String),
    Literal(String),
}

impl Anchor {
    pub fn regex(pattern: impl Into<String>) -> Self {
        Anchor::Regex(pattern.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Anchor::Literal(text.into())
    }

    /// Human-readable form for reports and logs.
    pub fn describe(&self) -> &str {
        match self {
            Anchor::Regex(p) => p,
            Anchor::Literal(t) => t,
        }
    }
}

/// Which side of the matched line inserted text lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Before => "before",
            Placement::After => "after",
        }
    }
}

/// Find the first line matching the anchor.
///
/// Returns the zero-based line index, or None when no line matches.
/// An invalid regex pattern is a validation error, not a panic.
pub fn find_line(content: &str, anchor: &Anchor) -> Result<Option<usize>> {
    match anchor {
        Anchor::Regex(pattern) => {
            let re = Regex::new(pattern)
                .map_err(|e| Error::validation_invalid_pattern(pattern.clone(), e.to_string()))?;
            Ok(content.lines().position(|line| re.is_match(line)))
        }
        Anchor::Literal(text) => Ok(content.lines().position(|line| line.contains(text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEMFILE: &str = "source 'https://rubygems.org'\n\ngem 'rails'\ngem 'sqlite3'\n";

    #[test]
    fn regex_anchor_finds_first_match() {
        let anchor = Anchor::regex(r"^gem 'rails'");
        assert_eq!(find_line(GEMFILE, &anchor).unwrap(), Some(2));
    }

    #[test]
    fn literal_anchor_finds_first_match() {
        let anchor = Anchor::literal("sqlite3");
        assert_eq!(find_line(GEMFILE, &anchor).unwrap(), Some(3));
    }

    #[test]
    fn absent_anchor_returns_none() {
        let anchor = Anchor::regex(r"^gem 'unicorn'");
        assert_eq!(find_line(GEMFILE, &anchor).unwrap(), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let content = "end\nend\n";
        let anchor = Anchor::regex(r"^end");
        assert_eq!(find_line(content, &anchor).unwrap(), Some(0));
    }

    #[test]
    fn invalid_regex_is_a_validation_error() {
        let anchor = Anchor::regex("(unclosed");
        let err = find_line(GEMFILE, &anchor).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_pattern");
    }
}
