//! Classification and rewriting of matches.
//!
//! A [`Transform`] bundles the three pure pieces of one rewrite rule: the
//! pattern that finds candidates, the classifier that decides whether a
//! candidate already satisfies the rule, and the rewriter that produces the
//! replacement text for one that does not.

pub mod insert_field;
pub mod strip_attribute;

pub use insert_field::InsertField;
pub use strip_attribute::StripAttribute;

use crate::config::SweepConfig;
use crate::pattern::{Match, Pattern, PatternError};
use serde::Serialize;
use std::fmt;

/// Whether a match already satisfies the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    AlreadyConforming,
    NeedsRewrite,
}

pub trait Transform {
    /// Short stable name used in logs and reports.
    fn name(&self) -> &'static str;

    fn pattern(&self) -> &dyn Pattern;

    /// Total over every match `pattern()` can produce.
    fn classify(&self, m: &Match) -> Classification;

    /// Replacement text for a match classified as [`Classification::NeedsRewrite`].
    fn rewrite(&self, m: &Match) -> String;

    /// Text that should occupy the match's span in the output.
    fn replacement(&self, m: &Match) -> String {
        match self.classify(m) {
            Classification::AlreadyConforming => m.text.clone(),
            Classification::NeedsRewrite => self.rewrite(m),
        }
    }
}

/// The rewrite rules selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransformKind {
    /// Drop an attribute made redundant by the function's return type
    StripAttribute,
    /// Add a missing field to wrapped struct literals
    InsertField,
}

impl TransformKind {
    pub fn build(self, config: &SweepConfig) -> Result<Box<dyn Transform>, PatternError> {
        let transform: Box<dyn Transform> = match self {
            TransformKind::StripAttribute => {
                Box::new(StripAttribute::from_settings(&config.strip_attribute)?)
            }
            TransformKind::InsertField => {
                Box::new(InsertField::from_settings(&config.insert_field)?)
            }
        };
        Ok(transform)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::StripAttribute => write!(f, "strip-attribute"),
            TransformKind::InsertField => write!(f, "insert-field"),
        }
    }
}
