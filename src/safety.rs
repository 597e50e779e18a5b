use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keeps a tree run from rewriting files outside the tree it was pointed at.
///
/// Only matters once symlinks are followed: a link inside the root can point
/// at a dependency checkout or at another project entirely.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical path of the walked root
    workspace_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Create a guard for `workspace_root`.
    ///
    /// Forbidden: the cargo registry and git checkouts, rustup toolchains,
    /// and each of `excluded` (directory names) directly under the root.
    pub fn new(workspace_root: impl AsRef<Path>, excluded: &[String]) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        let mut forbidden_paths = Vec::new();

        if let Some(home) = home::home_dir() {
            for dir in [".cargo/registry", ".cargo/git", ".rustup"] {
                if let Ok(path) = home.join(dir).canonicalize() {
                    forbidden_paths.push(path);
                }
            }
        }

        for name in excluded {
            if let Ok(path) = workspace_root.join(name).canonicalize() {
                forbidden_paths.push(path);
            }
        }

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Check a path as given (relative paths resolve against the current
    /// directory). Returns the canonical path if safe.
    pub fn check_path(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
