//! Structural matching over plain source text.
//!
//! A [`Pattern`] turns file content into a lazy, left-to-right sequence of
//! non-overlapping [`Match`]es. Two flavours exist: [`RegexPattern`] for flat
//! constructs that fit on a known number of lines, and [`BlockPattern`] for
//! brace-delimited blocks whose extent is found by a balanced-delimiter scan
//! instead of a regex.

pub mod errors;
pub mod matcher;
pub mod scanner;

pub use errors::PatternError;
pub use matcher::{match_all, BlockPattern, Capture, Match, Matches, Pattern, RegexPattern};
pub use scanner::{code_end, find_closing, top_level};
