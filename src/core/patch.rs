//! File patching operations.
//!
//! Every operation is a single read-modify-write pass: read the full file,
//! compute the new content in memory, write back atomically. A skipped
//! operation (absent anchor, zero matches) leaves the file untouched.

use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::anchor::{self, Anchor, Placement};
use crate::error::{Error, Result};
use crate::utils::io;

/// Outcome of a single patch operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOutcome {
    pub path: String,
    pub operation: String,
    /// Whether the file was rewritten.
    pub applied: bool,
    /// Whether the anchor matched (insert only). False together with
    /// `applied: true` means the forced end-of-file fallback was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_anchor: Option<bool>,
    /// Replacements made or lines removed, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl PatchOutcome {
    fn new(path: &Path, operation: &str, applied: bool) -> Self {
        Self {
            path: path.display().to_string(),
            operation: operation.to_string(),
            applied,
            matched_anchor: None,
            count: None,
        }
    }
}

/// Insert `text` immediately before or after the first line matching `anchor`.
///
/// When the anchor is absent: with `force = false` the operation is a
/// silent skip and the file is left byte-for-byte unchanged; with
/// `force = true` the text is appended at end of file (the documented
/// fallback policy for a forced insert without a match).
pub fn insert(
    file: &Path,
    text: &str,
    anchor: &Anchor,
    placement: Placement,
    force: bool,
) -> Result<PatchOutcome> {
    let content = io::read_file(file, "patch insert")?;

    let matched = anchor::find_line(&content, anchor)?;

    let mut outcome = PatchOutcome::new(file, "insert", false);
    outcome.matched_anchor = Some(matched.is_some());

    let new_content = match matched {
        Some(index) => {
            let (mut lines, trailing) = split_lines(&content);
            let at = match placement {
                Placement::Before => index,
                Placement::After => index + 1,
            };
            lines.splice(at..at, text_lines(text));
            join_lines(&lines, trailing)
        }
        None if force => {
            let mut appended = content.clone();
            if !appended.is_empty() && !appended.ends_with('\n') {
                appended.push('\n');
            }
            appended.push_str(text);
            if !appended.ends_with('\n') {
                appended.push('\n');
            }
            appended
        }
        None => return Ok(outcome),
    };

    io::write_file_atomic(file, &new_content, "patch insert")?;
    outcome.applied = true;
    Ok(outcome)
}

/// Replace every match of `pattern` with `replacement` in one pass.
///
/// Zero matches leaves the file unchanged.
pub fn substitute(file: &Path, pattern: &str, replacement: &str) -> Result<PatchOutcome> {
    let content = io::read_file(file, "patch substitute")?;
    let re = compile(pattern)?;

    let count = re.find_iter(&content).count();

    let mut outcome = PatchOutcome::new(file, "substitute", false);
    outcome.count = Some(count);

    if count == 0 {
        return Ok(outcome);
    }

    let new_content = re.replace_all(&content, replacement).to_string();
    io::write_file_atomic(file, &new_content, "patch substitute")?;
    outcome.applied = true;
    Ok(outcome)
}

/// Remove every line matching `pattern`.
pub fn strip_lines(file: &Path, pattern: &str) -> Result<PatchOutcome> {
    let content = io::read_file(file, "patch strip")?;
    let re = compile(pattern)?;

    let (lines, trailing) = split_lines(&content);
    let kept: Vec<String> = lines.iter().filter(|l| !re.is_match(l)).cloned().collect();
    let removed = lines.len() - kept.len();

    let mut outcome = PatchOutcome::new(file, "strip", false);
    outcome.count = Some(removed);

    if removed == 0 {
        return Ok(outcome);
    }

    io::write_file_atomic(file, &join_lines(&kept, trailing), "patch strip")?;
    outcome.applied = true;
    Ok(outcome)
}

/// Append `text` as one or more lines at end of file.
///
/// Creates the file when it does not exist (Procfile, .env).
pub fn append(file: &Path, text: &str) -> Result<PatchOutcome> {
    let content = io::read_file_or_empty(file, "patch append")?;

    let mut new_content = content;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(text);
    if !new_content.ends_with('\n') {
        new_content.push('\n');
    }

    io::write_file_atomic(file, &new_content, "patch append")?;
    Ok(PatchOutcome::new(file, "append", true))
}

/// Replace the entire file content, creating the file when absent.
pub fn overwrite(file: &Path, text: &str) -> Result<PatchOutcome> {
    io::write_file_atomic(file, text, "patch overwrite")?;
    Ok(PatchOutcome::new(file, "overwrite", true))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::validation_invalid_pattern(pattern, e.to_string()))
}

/// Split content into owned lines, remembering whether a trailing newline
/// was present so the rewrite can preserve it exactly.
fn split_lines(content: &str) -> (Vec<String>, bool) {
    let trailing = content.ends_with('\n');
    let lines = content.lines().map(|s| s.to_string()).collect();
    (lines, trailing)
}

fn join_lines(lines: &[String], trailing: bool) -> String {
    let mut joined = lines.join("\n");
    if trailing && !lines.is_empty() {
        joined.push('\n');
    }
    joined
}

fn text_lines(text: &str) -> Vec<String> {
    text.trim_end_matches('\n')
        .split('\n')
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn insert_before_places_text_on_preceding_line() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "Gemfile", "source 'https://rubygems.org'\ngem 'rails'\n");

        let outcome = insert(
            &file,
            "ruby '3.2.2'",
            &Anchor::regex(r"^ *gem 'rails'"),
            Placement::Before,
            false,
        )
        .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.matched_anchor, Some(true));
        let content = fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "ruby '3.2.2'");
        // The matched line itself is unchanged and now directly follows
        assert_eq!(lines[2], "gem 'rails'");
    }

    #[test]
    fn insert_after_places_text_on_following_line() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "spec_helper.rb", "require 'rspec/autorun'\nRSpec.configure do |config|\nend\n");

        insert(
            &file,
            "require 'simplecov'",
            &Anchor::regex(r"^require 'rspec/autorun'"),
            Placement::After,
            false,
        )
        .unwrap();

        let content = fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "require 'rspec/autorun'");
        assert_eq!(lines[1], "require 'simplecov'");
    }

    #[test]
    fn insert_absent_anchor_without_force_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let original = "gem 'rails'\n";
        let file = write_fixture(&dir, "Gemfile", original);

        let outcome = insert(
            &file,
            "ruby '3.2.2'",
            &Anchor::regex(r"^gem 'sinatra'"),
            Placement::Before,
            false,
        )
        .unwrap();

        assert!(!outcome.applied);
        assert_eq!(outcome.matched_anchor, Some(false));
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn insert_absent_anchor_with_force_appends_at_eof() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "Gemfile", "gem 'rails'\n");

        let outcome = insert(
            &file,
            "gem 'bcrypt'",
            &Anchor::regex(r"^gem 'sinatra'"),
            Placement::After,
            true,
        )
        .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.matched_anchor, Some(false));
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "gem 'rails'\ngem 'bcrypt'\n"
        );
    }

    #[test]
    fn insert_multiline_text_keeps_line_structure() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "development.rb", "configure do\nend\n");

        insert(
            &file,
            "  config.a = true\n  config.b = false",
            &Anchor::regex(r"^end"),
            Placement::Before,
            false,
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "configure do\n  config.a = true\n  config.b = false\nend\n"
        );
    }

    #[test]
    fn substitute_zero_matches_leaves_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let original = "gem 'rails'\n";
        let file = write_fixture(&dir, "Gemfile", original);

        let outcome = substitute(&file, r"gem 'sinatra'.*", "").unwrap();

        assert!(!outcome.applied);
        assert_eq!(outcome.count, Some(0));
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn substitute_replaces_every_match() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "Gemfile", "gem \"rails\"\ngem \"rspec\"\n");

        let outcome = substitute(&file, "\"", "'").unwrap();

        assert_eq!(outcome.count, Some(4));
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "gem 'rails'\ngem 'rspec'\n"
        );
    }

    #[test]
    fn strip_lines_removes_only_matching_lines() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(
            &dir,
            "Gemfile",
            "# commented out gem\ngem 'rails'\n# another comment\n",
        );

        let outcome = strip_lines(&file, r"^\s*#").unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.count, Some(2));
        assert_eq!(fs::read_to_string(&file).unwrap(), "gem 'rails'\n");
    }

    #[test]
    fn strip_lines_reduces_line_count_by_removed() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(
            &dir,
            "Gemfile",
            "# gem 'bcrypt'\ngem 'rails'\n",
        );
        let before = fs::read_to_string(&file).unwrap().lines().count();

        let outcome = strip_lines(&file, r"^\s*#").unwrap();

        let after = fs::read_to_string(&file).unwrap().lines().count();
        assert_eq!(before - after, outcome.count.unwrap());
        assert_eq!(after, 1);
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Procfile");

        append(&file, "web: bundle exec rails server -p $PORT").unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "web: bundle exec rails server -p $PORT\n"
        );
    }

    #[test]
    fn append_adds_newline_separator_when_needed() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, ".gitignore", "/.bundle");

        append(&file, ".env").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "/.bundle\n.env\n");
    }

    #[test]
    fn overwrite_replaces_entire_content() {
        let dir = TempDir::new().unwrap();
        let file = write_fixture(&dir, "unicorn.rb", "old\n");

        overwrite(&file, "timeout 15\n").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "timeout 15\n");
    }

    #[test]
    fn insert_into_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let result = insert(
            &dir.path().join("absent"),
            "text",
            &Anchor::literal("anchor"),
            Placement::Before,
            false,
        );
        assert_eq!(result.unwrap_err().code.as_str(), "internal.io_error");
    }
}
