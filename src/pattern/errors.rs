use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("block delimiters must be distinct ASCII punctuation, got {open:?} and {close:?}")]
    InvalidDelimiters { open: char, close: char },
}
