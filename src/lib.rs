//! rewrite-sweep: idempotent, span-local source rewriting
//!
//! Finds occurrences of a structural pattern in source text, decides for each
//! one whether it already has the desired shape, and replaces only those that
//! do not. Everything outside a rewritten span stays byte-identical, and a
//! second run over the same tree changes nothing.
//!
//! # Architecture
//!
//! - [`pattern`]: lazy, non-overlapping matching ([`RegexPattern`] for flat
//!   constructs, [`BlockPattern`] for balanced-brace blocks)
//! - [`transform`]: a [`Transform`] pairs a pattern with a classifier and a
//!   rewriter
//! - [`edit`]: verified byte-span replacements, spliced in one pass
//! - [`driver`]: per-file read, rewrite, validate, write-if-changed
//! - [`walker`]: enumerate a tree and run the driver on every file
//!
//! # Safety
//!
//! - Every edit checks its expected before-text before it is spliced
//! - Overlapping edits are rejected, never merged
//! - Atomic file writes (tempfile + fsync + rename)
//! - A file modified between read and write is left alone
//! - Rewrites that would stop a parsing `.rs` file from parsing are refused
//!
//! # Example
//!
//! ```
//! use rewrite_sweep::{rewrite_source, SweepConfig, TransformKind};
//!
//! let transform = TransformKind::StripAttribute
//!     .build(&SweepConfig::default())
//!     .unwrap();
//! let source = "#[must_use]\n    pub fn foo() -> Result<i32> {\n";
//! let rewrite = rewrite_source(source, transform.as_ref()).unwrap();
//! assert_eq!(rewrite.output, "    pub fn foo() -> Result<i32> {\n");
//! ```

pub mod config;
pub mod driver;
pub mod edit;
pub mod pattern;
pub mod safety;
pub mod store;
pub mod transform;
pub mod validate;
pub mod walker;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, SweepConfig};
pub use driver::{rewrite_source, DriverError, DriverOptions, FileDriver, FileResult, Rewrite};
pub use edit::{splice, Edit, EditError, EditVerification};
pub use pattern::{match_all, BlockPattern, Match, Pattern, PatternError, RegexPattern};
pub use safety::{SafetyError, WorkspaceGuard};
pub use store::{FileStore, FsStore, MemoryStore, StoreError};
pub use transform::{Classification, InsertField, StripAttribute, Transform, TransformKind};
pub use validate::ValidationError;
pub use walker::{
    FailurePolicy, FileEnumerator, FileFailure, RunSummary, TreeWalker, WalkError,
};
