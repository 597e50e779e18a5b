use crate::config::InsertFieldSettings;
use crate::pattern::{code_end, top_level, BlockPattern, Match, Pattern, PatternError};
use crate::transform::{Classification, Transform};
use regex::Regex;

/// Adds a missing field to struct literals built inside a wrapper call,
/// e.g. `Ok(Audiobook { .. })` without `selected`.
///
/// The literal's extent comes from balanced-brace scanning, so nested blocks
/// and closures in field values are fine. Only the literal's top level is
/// inspected: a `selected:` inside a nested struct or a string does not count.
#[derive(Debug, Clone)]
pub struct InsertField {
    pattern: BlockPattern,
    field: String,
    value: String,
    /// `field: value` at top level
    named: Regex,
    /// `field` shorthand at top level
    shorthand: Regex,
    /// `..base` struct update syntax
    struct_base: Regex,
    indent_width: usize,
    inline_indent: usize,
}

impl InsertField {
    pub fn from_settings(settings: &InsertFieldSettings) -> Result<Self, PatternError> {
        let wrapper = regex::escape(&settings.wrapper);
        let struct_name = regex::escape(&settings.struct_name);
        let field = regex::escape(&settings.field);

        let pattern = BlockPattern::new(
            &format!(r"\b{wrapper}\(\s*{struct_name}\s*"),
            '{',
            '}',
            r"\s*\)",
        )?;

        Ok(Self {
            pattern,
            field: settings.field.clone(),
            value: settings.value.clone(),
            named: Regex::new(&format!(r"\b{field}\s*:(?:[^:]|$)"))?,
            shorthand: Regex::new(&format!(r"(?:^|,)\s*{field}\s*(?:,|$)"))?,
            struct_base: Regex::new(r"(?:^|,)\s*\.\.\s*[^\s.=]")?,
            indent_width: settings.indent_width,
            inline_indent: settings.inline_indent,
        })
    }

    fn indent_unit(&self, sample: Option<&str>) -> String {
        match sample {
            Some(indent) if indent.contains('\t') => "\t".to_string(),
            _ => " ".repeat(self.indent_width),
        }
    }
}

impl Transform for InsertField {
    fn name(&self) -> &'static str {
        "insert-field"
    }

    fn pattern(&self) -> &dyn Pattern {
        &self.pattern
    }

    /// Conforming when the literal's top level names the field (`field:` or
    /// shorthand `field`) or ends in `..base`. Unlike a plain substring search
    /// for `field:` over the whole body, mentions inside nested blocks, calls,
    /// strings and comments are ignored.
    fn classify(&self, m: &Match) -> Classification {
        let Some(body) = m.get("body") else {
            return Classification::AlreadyConforming;
        };

        let visible = top_level(body);
        if self.named.is_match(&visible)
            || self.shorthand.is_match(&visible)
            || self.struct_base.is_match(&visible)
        {
            Classification::AlreadyConforming
        } else {
            Classification::NeedsRewrite
        }
    }

    fn rewrite(&self, m: &Match) -> String {
        let (Some(head), Some(body), Some(tail)) = (m.get("head"), m.get("body"), m.get("tail"))
        else {
            return m.text.clone();
        };

        let newline = if m.text.contains("\r\n") { "\r\n" } else { "\n" };
        let content = body.trim_end();
        let trailing = &body[content.len()..];

        let field_line = first_field_indent(content);
        let closing_line = trailing.rfind('\n').map(|i| &trailing[i + 1..]);
        let unit = self.indent_unit(closing_line.or(field_line));

        let close_indent = match (closing_line, field_line) {
            (Some(indent), _) => indent.to_string(),
            (None, Some(indent)) => indent.strip_suffix(unit.as_str()).unwrap_or(indent).to_string(),
            (None, None) => " ".repeat(self.inline_indent),
        };
        let field_indent = field_line.map_or_else(|| format!("{close_indent}{unit}"), str::to_string);

        // The comma goes after the last token, ahead of any trailing comment
        let last_token_end = code_end(content);
        let separator = if last_token_end == 0 || content[..last_token_end].ends_with(',') {
            ""
        } else {
            ","
        };

        format!(
            "{head}{}{separator}{}{newline}{field_indent}{}: {},{newline}{close_indent}{tail}",
            &content[..last_token_end],
            &content[last_token_end..],
            self.field,
            self.value,
        )
    }
}

/// Indentation of the first non-blank line that starts inside the block.
fn first_field_indent(content: &str) -> Option<&str> {
    content
        .split('\n')
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
}
