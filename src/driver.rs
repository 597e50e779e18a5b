//! Per-file orchestration: read, match, classify, rewrite, splice, write.

use crate::edit::{splice, Edit, EditError, EditVerification};
use crate::pattern::match_all;
use crate::store::{FileStore, FsStore, StoreError};
use crate::transform::{Classification, Transform};
use crate::validate::{validate_rewrite, ValidationError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Output of one pass of a transform over one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub output: String,
    /// Candidates the pattern found
    pub matches: usize,
    /// Candidates whose text was replaced
    pub rewrites: usize,
}

/// Run `transform` over `source` without touching any file.
///
/// Conforming matches keep their original text; the rest are spliced in scan
/// order, so everything outside a rewritten span is byte-identical.
pub fn rewrite_source(source: &str, transform: &dyn Transform) -> Result<Rewrite, EditError> {
    let mut edits = Vec::new();
    let mut matches = 0;

    for m in match_all(source, transform.pattern()) {
        matches += 1;
        let classification = transform.classify(&m);
        tracing::trace!(
            transform = transform.name(),
            byte_start = m.byte_start,
            byte_end = m.byte_end,
            ?classification,
            "classified match"
        );

        if classification == Classification::NeedsRewrite {
            let replacement = transform.rewrite(&m);
            if replacement != m.text {
                edits.push(Edit::for_match(&m, replacement));
            }
        }
    }

    let output = splice(source, &edits)?;
    Ok(Rewrite {
        output,
        matches,
        rewrites: edits.len(),
    })
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to splice rewrites into {path}: {source}")]
    Splice { path: PathBuf, source: EditError },

    #[error("refusing to write {path}: {source}")]
    Validation {
        path: PathBuf,
        source: ValidationError,
    },

    #[error("{path} changed on disk while it was being rewritten")]
    Conflict { path: PathBuf },
}

impl DriverError {
    pub fn path(&self) -> &Path {
        match self {
            DriverError::Store(err) => err.path(),
            DriverError::Splice { path, .. }
            | DriverError::Validation { path, .. }
            | DriverError::Conflict { path } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Compute results but never write
    pub dry_run: bool,
    /// Refuse rewrites that make a parsing `.rs` file stop parsing
    pub validate: bool,
    /// Attach before/after text to modified results
    pub keep_changes: bool,
}

/// Before and after text of a modified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub before: String,
    pub after: String,
}

/// Outcome for one file in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    /// Content changed (and was written, unless this was a dry run)
    pub modified: bool,
    pub matches: usize,
    pub rewrites: usize,
    #[serde(skip)]
    pub change: Option<Change>,
}

/// Applies one transform to one file at a time.
pub struct FileDriver<S: FileStore = FsStore> {
    transform: Box<dyn Transform>,
    store: S,
    options: DriverOptions,
}

impl<S: FileStore> FileDriver<S> {
    pub fn new(transform: Box<dyn Transform>, store: S, options: DriverOptions) -> Self {
        Self {
            transform,
            store,
            options,
        }
    }

    pub fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }

    /// Rewrite one file, writing it back at most once and only if it changed.
    pub fn process(&self, path: &Path) -> Result<FileResult, DriverError> {
        let original = self.store.read(path)?;
        let rewrite =
            rewrite_source(&original, self.transform.as_ref()).map_err(|source| {
                DriverError::Splice {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        tracing::debug!(
            path = %path.display(),
            transform = self.transform.name(),
            matches = rewrite.matches,
            rewrites = rewrite.rewrites,
            "scanned file"
        );

        let modified = rewrite.output != original;
        if modified {
            if self.options.validate && is_rust_file(path) {
                validate_rewrite(&original, &rewrite.output).map_err(|source| {
                    DriverError::Validation {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
            }

            if !self.options.dry_run {
                self.write_if_unchanged(path, &original, &rewrite.output)?;
                tracing::info!(path = %path.display(), rewrites = rewrite.rewrites, "updated file");
            }
        }

        let change = (modified && self.options.keep_changes).then(|| Change {
            before: original,
            after: rewrite.output,
        });

        Ok(FileResult {
            path: path.to_path_buf(),
            modified,
            matches: rewrite.matches,
            rewrites: rewrite.rewrites,
            change,
        })
    }

    /// Write `output` unless the file no longer holds `original`.
    fn write_if_unchanged(
        &self,
        path: &Path,
        original: &str,
        output: &str,
    ) -> Result<(), DriverError> {
        let expected = EditVerification::Hash(xxh3_64(original.as_bytes()));
        let current = self.store.read(path)?;
        if !expected.matches(&current) {
            return Err(DriverError::Conflict {
                path: path.to_path_buf(),
            });
        }

        self.store.write(path, output)?;
        Ok(())
    }
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "rs")
}
