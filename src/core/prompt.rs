//! Operator prompting.
//!
//! The orchestrator asks its questions through the `Prompter` trait so a
//! run can be driven either by a terminal operator or by a JSON answers
//! file. Terminal prompts re-ask until the answer is acceptable; scripted
//! answers have no operator to re-ask, so a bad answer is an error.

use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io as file_io;

/// Capability interface for operator interaction.
///
/// Each question carries a stable `key` (used to look up scripted answers)
/// and the human-readable question text.
pub trait Prompter {
    /// Free-text question.
    fn ask(&self, key: &str, question: &str) -> Result<String>;

    /// Yes/no question. Empty or unrecognized input means no.
    fn confirm(&self, key: &str, question: &str) -> Result<bool>;

    /// Question constrained to a closed answer set (case-sensitive exact
    /// match). Re-prompts until the answer is a member of `allowed`.
    fn choose(&self, key: &str, question: &str, allowed: &[&str]) -> Result<String> {
        loop {
            let answer = self.ask(key, &format!("{} [{}]", question, allowed.join("/")))?;
            if allowed.contains(&answer.as_str()) {
                return Ok(answer);
            }
            eprintln!("Please answer one of: {}", allowed.join(", "));
        }
    }
}

/// Prompter backed by the controlling terminal: question to stderr,
/// answer from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&self, _key: &str, question: &str) -> Result<String> {
        eprint!("{}: ", question);
        io::stderr().flush().ok();

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::internal_io(format!("Failed to read input: {}", e), None))?;

        Ok(line.trim().to_string())
    }

    fn confirm(&self, key: &str, question: &str) -> Result<bool> {
        let answer = self.ask(key, &format!("{} [y/N]", question))?;
        Ok(answer.to_lowercase().starts_with('y'))
    }
}

/// Prompter fed from a JSON answers file (`{"database": "pg", ...}`).
///
/// The answer set is fixed up front, so `choose` validates instead of
/// re-prompting and a missing key is an error.
#[derive(Debug)]
pub struct ScriptedPrompter {
    answers: BTreeMap<String, Value>,
}

impl ScriptedPrompter {
    pub fn new(answers: BTreeMap<String, Value>) -> Self {
        Self { answers }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = file_io::read_file(path, "read answers file")?;
        let answers: BTreeMap<String, Value> = serde_json::from_str(&content).map_err(|e| {
            Error::internal_json(
                format!("Invalid answers file {}: {}", path.display(), e),
                Some("parse answers".to_string()),
            )
        })?;
        Ok(Self::new(answers))
    }

    fn lookup(&self, key: &str, question: &str) -> Result<&Value> {
        self.answers
            .get(key)
            .ok_or_else(|| Error::prompt_answer_missing(key, question))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, key: &str, question: &str) -> Result<String> {
        match self.lookup(key, question)? {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }

    fn confirm(&self, key: &str, question: &str) -> Result<bool> {
        match self.lookup(key, question)? {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => Ok(s.to_lowercase().starts_with('y')),
            other => Err(Error::prompt_answer_invalid(
                key,
                question,
                other.to_string(),
                &["true", "false", "y", "n"],
            )),
        }
    }

    fn choose(&self, key: &str, question: &str, allowed: &[&str]) -> Result<String> {
        let answer = self.ask(key, question)?;
        if allowed.contains(&answer.as_str()) {
            return Ok(answer);
        }
        Err(Error::prompt_answer_invalid(key, question, answer, allowed))
    }
}
