//! Run context for a target skeleton.
//!
//! The target directory and everything derived from it travel through the
//! orchestrator as one explicit value; nothing reads the ambient working
//! directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "Gemfile";
pub const STAMP_FILE: &str = ".groundwork.json";

/// Resolved target of one orchestrator run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub target: PathBuf,
    /// Directory basename; used as the repository name on GitHub.
    pub app_name: String,
}

impl RunContext {
    /// Resolve an operator-supplied path: tilde-expanded, must be an
    /// existing directory.
    pub fn new(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let target = PathBuf::from(&expanded);

        if !target.is_dir() {
            return Err(Error::setup_target_invalid(
                expanded,
                "not an existing directory",
            ));
        }

        let canonical = target
            .canonicalize()
            .map_err(|e| Error::setup_target_invalid(target.display().to_string(), e.to_string()))?;

        let app_name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::setup_target_invalid(
                    canonical.display().to_string(),
                    "cannot derive an application name",
                )
            })?;

        Ok(Self {
            target: canonical,
            app_name,
        })
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.target.join(rel)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.join(MANIFEST_FILE)
    }

    pub fn stamp_path(&self) -> PathBuf {
        self.join(STAMP_FILE)
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path().is_file()
    }

    pub fn is_configured(&self) -> bool {
        self.stamp_path().is_file()
    }
}

impl AsRef<Path> for RunContext {
    fn as_ref(&self) -> &Path {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn new_resolves_existing_directory() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("myapp");
        fs::create_dir(&app).unwrap();

        let ctx = RunContext::new(app.to_str().unwrap()).unwrap();

        assert_eq!(ctx.app_name, "myapp");
        assert!(ctx.target.is_absolute());
    }

    #[test]
    fn new_rejects_missing_directory() {
        let err = RunContext::new("/nonexistent/skeleton").unwrap_err();
        assert_eq!(err.code.as_str(), "setup.target_invalid");
    }

    #[test]
    fn manifest_detection() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new(dir.path().to_str().unwrap()).unwrap();
        assert!(!ctx.has_manifest());

        fs::write(ctx.manifest_path(), "gem 'rails'\n").unwrap();
        assert!(ctx.has_manifest());
    }

    #[test]
    fn stamp_detection() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new(dir.path().to_str().unwrap()).unwrap();
        assert!(!ctx.is_configured());

        fs::write(ctx.stamp_path(), "{}").unwrap();
        assert!(ctx.is_configured());
    }
}
