use crate::pattern::Match;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every rewrite compiles down to a list of these, spliced into the original
/// text in one pass. Intelligence lives in finding the spans, not in applying
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until spliced into a source"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text for [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (cheaper to carry for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("Edit at byte {byte_start} overlaps or precedes an earlier edit ending at {previous_end}")]
    Overlap {
        byte_start: usize,
        previous_end: usize,
    },
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Replace the whole span of a match.
    pub fn for_match(m: &Match, new_text: impl Into<String>) -> Self {
        Self::new(m.byte_start, m.byte_end, new_text, m.text.as_str())
    }

    /// Validate the edit against the source it will be spliced into.
    fn validate(&self, source: &str) -> Result<(), EditError> {
        let current = source
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: source.len(),
            })?;

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }

        Ok(())
    }
}

/// Splice edits into `source`, producing the new text.
///
/// Edits must be sorted by `byte_start` and must not overlap; this is checked,
/// not assumed. Every byte outside the edited spans is copied unchanged.
pub fn splice(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    let growth: usize = edits.iter().map(|e| e.new_text.len()).sum();
    let mut output = String::with_capacity(source.len() + growth);
    let mut cursor = 0;

    for edit in edits {
        if edit.byte_start < cursor {
            return Err(EditError::Overlap {
                byte_start: edit.byte_start,
                previous_end: cursor,
            });
        }
        edit.validate(source)?;

        output.push_str(&source[cursor..edit.byte_start]);
        output.push_str(&edit.new_text);
        cursor = edit.byte_end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes. The permissions of an
/// existing file are carried over to its replacement.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Tempfile in the same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
