//! Tree runs: enumerate candidate files under a root and feed each one to a
//! [`FileDriver`].

use crate::config::WalkSettings;
use crate::driver::{DriverError, FileDriver, FileResult};
use crate::safety::{SafetyError, WorkspaceGuard};
use crate::store::{FileStore, FsStore};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Lists files under a root in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEnumerator {
    extensions: Vec<String>,
    exclude: Vec<String>,
    follow_links: bool,
}

impl FileEnumerator {
    pub fn new(extensions: Vec<String>, exclude: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        Self {
            extensions,
            exclude,
            follow_links: false,
        }
    }

    pub fn from_settings(settings: &WalkSettings) -> Self {
        Self::new(settings.extensions.clone(), settings.exclude.clone())
            .follow_links(settings.follow_links)
    }

    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    pub fn follows_links(&self) -> bool {
        self.follow_links
    }

    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }

    fn is_excluded(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.exclude.iter().any(|excluded| excluded == name))
    }

    /// Files under `root` with a wanted extension, sorted by name within each
    /// directory. Excluded directories are pruned, never descended into; the
    /// root itself is always walked.
    pub fn files<'a>(
        &'a self,
        root: &Path,
    ) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + 'a {
        WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir() && self.is_excluded(entry.file_name()))
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() && self.matches_extension(entry.path()) => {
                    Some(Ok(entry.into_path()))
                }
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            })
    }
}

/// What a tree run does when one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it. Files already written stay
    /// written; nothing after the failure is touched.
    #[default]
    FailFast,
    /// Record the failure in [`RunSummary::failures`] and move on.
    KeepGoing,
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to enumerate files: {0}")]
    Enumerate(#[from] walkdir::Error),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// A file that could not be processed under [`FailurePolicy::KeepGoing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files handed to the driver, including failed ones
    pub scanned: usize,
    pub results: Vec<FileResult>,
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    pub fn modified_count(&self) -> usize {
        self.results.iter().filter(|result| result.modified).count()
    }

    pub fn modified_paths(&self) -> impl Iterator<Item = &Path> {
        self.results
            .iter()
            .filter(|result| result.modified)
            .map(|result| result.path.as_path())
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs one [`FileDriver`] over every file an enumerator yields.
pub struct TreeWalker<S: FileStore = FsStore> {
    driver: FileDriver<S>,
    enumerator: FileEnumerator,
    policy: FailurePolicy,
}

impl<S: FileStore> TreeWalker<S> {
    pub fn new(driver: FileDriver<S>, enumerator: FileEnumerator, policy: FailurePolicy) -> Self {
        Self {
            driver,
            enumerator,
            policy,
        }
    }

    pub fn run(&self, root: &Path) -> Result<RunSummary, WalkError> {
        self.run_with(root, |_| {})
    }

    /// Like [`TreeWalker::run`], calling `observer` with each result as soon
    /// as its file is done.
    pub fn run_with<F>(&self, root: &Path, mut observer: F) -> Result<RunSummary, WalkError>
    where
        F: FnMut(&FileResult),
    {
        // Plain walks never leave the root; followed links can.
        let guard = if self.enumerator.follows_links() {
            Some(WorkspaceGuard::new(root, self.enumerator.excluded())?)
        } else {
            None
        };

        tracing::debug!(
            root = %root.display(),
            transform = self.driver.transform().name(),
            policy = ?self.policy,
            "starting tree run"
        );

        let mut summary = RunSummary::default();
        for entry in self.enumerator.files(root) {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    self.record(&mut summary, path, err.into())?;
                    continue;
                }
            };

            summary.scanned += 1;

            if let Some(guard) = &guard {
                if let Err(err) = guard.check_path(&path) {
                    self.record(&mut summary, path, err.into())?;
                    continue;
                }
            }

            match self.driver.process(&path) {
                Ok(result) => {
                    observer(&result);
                    summary.results.push(result);
                }
                Err(err) => self.record(&mut summary, path, err.into())?,
            }
        }

        tracing::info!(
            root = %root.display(),
            scanned = summary.scanned,
            modified = summary.modified_count(),
            failed = summary.failures.len(),
            "tree run finished"
        );
        Ok(summary)
    }

    fn record(
        &self,
        summary: &mut RunSummary,
        path: PathBuf,
        err: WalkError,
    ) -> Result<(), WalkError> {
        match self.policy {
            FailurePolicy::FailFast => Err(err),
            FailurePolicy::KeepGoing => {
                tracing::warn!(path = %path.display(), error = %err, "skipping file");
                summary.failures.push(FileFailure {
                    path,
                    message: err.to_string(),
                });
                Ok(())
            }
        }
    }
}
