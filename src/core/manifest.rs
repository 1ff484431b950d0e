//! Gemfile dependency declarations.
//!
//! Appends `gem` lines and `group` blocks in Gemfile syntax. Declarations
//! are append-only and are not deduplicated: two calls produce two entries,
//! in call order, exactly like running the original generator twice would.

use serde::Serialize;
use std::path::Path;

use crate::anchor::{Anchor, Placement};
use crate::error::Result;
use crate::patch::{self, PatchOutcome};

/// One dependency declaration.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub requirement: Option<String>,
    /// Raw Gemfile options, rendered as `key: value` (e.g. `require: false`).
    pub options: Vec<(String, String)>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: None,
            options: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Render as a single Gemfile line, without indentation.
    pub fn render(&self) -> String {
        let mut line = format!("gem '{}'", self.name);
        if let Some(req) = &self.requirement {
            line.push_str(&format!(", '{}'", req));
        }
        for (key, value) in &self.options {
            line.push_str(&format!(", {}: {}", key, value));
        }
        line
    }
}

/// Result of a declaration, for the JSON envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareOutcome {
    pub path: String,
    pub entries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Append a single top-level `gem` line to the manifest.
pub fn declare(file: &Path, dep: &Dependency) -> Result<DeclareOutcome> {
    patch::append(file, &dep.render())?;
    Ok(DeclareOutcome {
        path: file.display().to_string(),
        entries: vec![dep.name.clone()],
        group: None,
    })
}

/// Append a `group :name do ... end` block with the given entries.
///
/// Entries sharing a group are emitted together under the one header,
/// indented two spaces, in the order given.
pub fn declare_group(file: &Path, group: &str, deps: &[Dependency]) -> Result<DeclareOutcome> {
    let mut block = format!("\ngroup :{} do\n", group);
    for dep in deps {
        block.push_str(&format!("  {}\n", dep.render()));
    }
    block.push_str("end");

    patch::append(file, &block)?;
    Ok(DeclareOutcome {
        path: file.display().to_string(),
        entries: deps.iter().map(|d| d.name.clone()).collect(),
        group: Some(group.to_string()),
    })
}

/// Pin the interpreter version before the first `gem 'rails'` line.
///
/// A manifest without a rails line is left untouched (non-forced insert).
pub fn pin_runtime(file: &Path, version: &str) -> Result<PatchOutcome> {
    patch::insert(
        file,
        &format!("ruby '{}'", version),
        &Anchor::regex(r"^ *gem 'rails'"),
        Placement::Before,
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn gemfile(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("Gemfile");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn render_name_only() {
        assert_eq!(Dependency::new("bcrypt").render(), "gem 'bcrypt'");
    }

    #[test]
    fn render_with_requirement_and_options() {
        let dep = Dependency::new("simplecov")
            .with_requirement("~> 0.22")
            .with_option("require", "false");
        assert_eq!(dep.render(), "gem 'simplecov', '~> 0.22', require: false");
    }

    #[test]
    fn declare_appends_in_call_order() {
        let dir = TempDir::new().unwrap();
        let file = gemfile(&dir, "gem 'rails'\n");

        declare(&file, &Dependency::new("bcrypt")).unwrap();
        declare(&file, &Dependency::new("unicorn")).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "gem 'rails'\ngem 'bcrypt'\ngem 'unicorn'\n"
        );
    }

    #[test]
    fn declare_does_not_deduplicate() {
        let dir = TempDir::new().unwrap();
        let file = gemfile(&dir, "");

        declare(&file, &Dependency::new("bcrypt")).unwrap();
        declare(&file, &Dependency::new("bcrypt")).unwrap();

        let content = fs::read_to_string(&file).unwrap();
        assert_eq!(content.matches("gem 'bcrypt'").count(), 2);
    }

    #[test]
    fn declare_group_emits_entries_under_one_header() {
        let dir = TempDir::new().unwrap();
        let file = gemfile(&dir, "gem 'rails'\n");

        declare_group(
            &file,
            "test",
            &[Dependency::new("faker"), Dependency::new("capybara")],
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "gem 'rails'\n\ngroup :test do\n  gem 'faker'\n  gem 'capybara'\nend\n"
        );
    }

    #[test]
    fn sequential_group_declares_produce_two_tagged_blocks() {
        let dir = TempDir::new().unwrap();
        let file = gemfile(&dir, "");

        declare_group(&file, "development", &[Dependency::new("guard")]).unwrap();
        declare_group(&file, "development", &[Dependency::new("spring")]).unwrap();

        let content = fs::read_to_string(&file).unwrap();
        assert_eq!(content.matches("group :development do").count(), 2);
        let guard_at = content.find("gem 'guard'").unwrap();
        let spring_at = content.find("gem 'spring'").unwrap();
        assert!(guard_at < spring_at);
    }

    #[test]
    fn pin_runtime_lands_before_rails_line() {
        let dir = TempDir::new().unwrap();
        let file = gemfile(&dir, "source 'https://rubygems.org'\ngem 'rails'\n");

        let outcome = pin_runtime(&file, "3.2.2").unwrap();

        assert!(outcome.applied);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "source 'https://rubygems.org'\nruby '3.2.2'\ngem 'rails'\n"
        );
    }

    #[test]
    fn pin_runtime_skips_manifest_without_rails() {
        let dir = TempDir::new().unwrap();
        let original = "gem 'sinatra'\n";
        let file = gemfile(&dir, original);

        let outcome = pin_runtime(&file, "3.2.2").unwrap();

        assert!(!outcome.applied);
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }
}
