use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub walk: WalkSettings,
    pub strip_attribute: StripAttributeSettings,
    pub insert_field: InsertFieldSettings,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let walk = &self.walk;
        if walk.root.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "walk",
                field: "root",
            });
        }
        if walk.extensions.is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "walk",
                field: "extensions",
            });
        }
        if walk
            .extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').is_empty())
        {
            issues.push(ValidationIssue::InvalidValue {
                section: "walk",
                field: "extensions",
                message: "extensions must not be empty strings".to_string(),
            });
        }

        let strip = &self.strip_attribute;
        check_path("strip_attribute", "attribute", &strip.attribute, &mut issues);
        check_ident("strip_attribute", "return_type", &strip.return_type, &mut issues);

        let insert = &self.insert_field;
        check_ident("insert_field", "wrapper", &insert.wrapper, &mut issues);
        check_path("insert_field", "struct_name", &insert.struct_name, &mut issues);
        check_ident("insert_field", "field", &insert.field, &mut issues);
        if insert.value.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "insert_field",
                field: "value",
            });
        }
        if insert.indent_width == 0 {
            issues.push(ValidationIssue::InvalidValue {
                section: "insert_field",
                field: "indent_width",
                message: "indent width must be at least 1".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Which files a tree run visits.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WalkSettings {
    /// Root walked when no path is given on the command line
    pub root: PathBuf,
    /// File extensions to rewrite, without the leading dot
    pub extensions: Vec<String>,
    /// Directory names never descended into
    pub exclude: Vec<String>,
    pub follow_links: bool,
    /// Record per-file failures and continue instead of stopping
    pub keep_going: bool,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extensions: vec!["rs".to_string()],
            exclude: vec!["target".to_string(), ".git".to_string()],
            follow_links: false,
            keep_going: false,
        }
    }
}

/// Removal of a redundant attribute above functions returning a given type.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StripAttributeSettings {
    /// Attribute path inside `#[...]`
    pub attribute: String,
    /// Return type name that makes the attribute redundant
    pub return_type: String,
}

impl Default for StripAttributeSettings {
    fn default() -> Self {
        Self {
            attribute: "must_use".to_string(),
            return_type: "Result".to_string(),
        }
    }
}

/// Insertion of a missing field into struct literals built inside a wrapper call.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InsertFieldSettings {
    /// Call wrapping the struct literal, e.g. `Ok` in `Ok(Audiobook { .. })`
    pub wrapper: String,
    pub struct_name: String,
    pub field: String,
    /// Rust expression written as the field's value
    pub value: String,
    pub indent_width: usize,
    /// Closing-brace indentation used when the literal sits on one line
    pub inline_indent: usize,
}

impl Default for InsertFieldSettings {
    fn default() -> Self {
        Self {
            wrapper: "Ok".to_string(),
            struct_name: "Audiobook".to_string(),
            field: "selected".to_string(),
            value: "false".to_string(),
            indent_width: 4,
            inline_indent: 20,
        }
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_ident(
    section: &'static str,
    field: &'static str,
    value: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::MissingField { section, field });
    } else if !is_ident(value) {
        issues.push(ValidationIssue::NotIdentifier {
            section,
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(
    section: &'static str,
    field: &'static str,
    value: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::MissingField { section, field });
    } else if !value.split("::").all(is_ident) {
        issues.push(ValidationIssue::NotIdentifier {
            section,
            field,
            value: value.to_string(),
        });
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        section: &'static str,
        field: &'static str,
    },
    NotIdentifier {
        section: &'static str,
        field: &'static str,
        value: String,
    },
    InvalidValue {
        section: &'static str,
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { section, field } => {
                write!(f, "[{section}] missing required field '{field}'")
            }
            ValidationIssue::NotIdentifier {
                section,
                field,
                value,
            } => write!(
                f,
                "[{section}] field '{field}' is not a Rust identifier or path: '{value}'"
            ),
            ValidationIssue::InvalidValue {
                section,
                field,
                message,
            } => write!(f, "[{section}] invalid '{field}': {message}"),
        }
    }
}
