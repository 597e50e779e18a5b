//! syn-based checks that a rewrite did not break a Rust file.
//!
//! # Hard Rule
//!
//! A rewrite may not turn a file that parses into one that does not. Files
//! that already fail to parse are not judged; rewriting them cannot make
//! things worse in a way this check could see.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("syn validation failed: {message}")]
    SynValidationFailed { message: String },
}

/// Validate that code parses as a complete Rust file.
pub fn validate_file(code: &str) -> Result<(), ValidationError> {
    syn::parse_file(code).map_err(|e| ValidationError::SynValidationFailed {
        message: e.to_string(),
    })?;
    Ok(())
}

/// Check that `rewritten` parses whenever `original` did.
pub fn validate_rewrite(original: &str, rewritten: &str) -> Result<(), ValidationError> {
    if validate_file(original).is_err() {
        tracing::debug!("original does not parse; skipping rewrite validation");
        return Ok(());
    }
    validate_file(rewritten)
}
