//! Git primitives for initial repository setup.
//!
//! Thin wrappers over the `git` binary in the target directory. Each
//! failure maps to a `git.command_failed` error; callers decide whether
//! the failure stops the run.

use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

pub fn init(dir: &Path) -> Result<()> {
    command::run_in(dir, "git", &["init"], "git init")
        .map_err(|e| Error::git_command_failed(e.to_string()))?;
    Ok(())
}

pub fn add_all(dir: &Path) -> Result<()> {
    command::run_in(dir, "git", &["add", "."], "git add")
        .map_err(|e| Error::git_command_failed(e.to_string()))?;
    Ok(())
}

pub fn commit(dir: &Path, message: &str) -> Result<()> {
    command::run_in(dir, "git", &["commit", "-m", message], "git commit")
        .map_err(|e| Error::git_command_failed(e.to_string()))?;
    Ok(())
}

pub fn remote_add(dir: &Path, name: &str, url: &str) -> Result<()> {
    command::run_in(dir, "git", &["remote", "add", name, url], "git remote add")
        .map_err(|e| Error::git_command_failed(e.to_string()))?;
    Ok(())
}

pub fn push(dir: &Path, remote: &str, branch: &str) -> Result<()> {
    command::run_in(dir, "git", &["push", remote, branch], "git push")
        .map_err(|e| Error::git_command_failed(e.to_string()))?;
    Ok(())
}

/// The configured origin URL, or None when no origin remote exists.
pub fn remote_origin_url(dir: &Path) -> Option<String> {
    command::run_in_optional(dir, "git", &["config", "remote.origin.url"])
}

pub fn is_git_repo(dir: &Path) -> bool {
    command::succeeded_in(dir, "git", &["rev-parse", "--git-dir"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fresh_directory_is_not_a_repo() {
        let dir = TempDir::new().unwrap();
        assert!(!is_git_repo(dir.path()));
    }

    #[test]
    fn init_creates_a_repo() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();
        assert!(is_git_repo(dir.path()));
    }

    #[test]
    fn remote_origin_url_is_none_without_remote() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();
        assert_eq!(remote_origin_url(dir.path()), None);
    }

    #[test]
    fn remote_add_then_lookup_roundtrips() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();
        remote_add(dir.path(), "origin", "git@github.com:someone/app.git").unwrap();
        assert_eq!(
            remote_origin_url(dir.path()).as_deref(),
            Some("git@github.com:someone/app.git")
        );
    }
}
