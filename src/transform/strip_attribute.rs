use crate::config::StripAttributeSettings;
use crate::pattern::{Match, Pattern, PatternError, RegexPattern};
use crate::transform::{Classification, Transform};

/// Removes a bare attribute sitting directly above a `fn` whose return type
/// is written as the configured type.
///
/// With the defaults this drops `#[must_use]` from functions returning
/// `Result`, which is already `#[must_use]` itself. Only the literal form is
/// recognised: `-> Result<..>` or a path ending in `Result` on the same line
/// as `fn`. Aliases and return types broken across lines are left alone.
#[derive(Debug, Clone)]
pub struct StripAttribute {
    pattern: RegexPattern,
}

impl StripAttribute {
    pub fn new(attribute: &str, return_type: &str) -> Result<Self, PatternError> {
        let attr = regex::escape(attribute);
        let ret = regex::escape(return_type);

        // marker: one or more attribute lines; decl: the signature up to the type name.
        // Parameters may nest parentheses one level deep, which keeps an arrow
        // inside `impl Fn() -> T` from being read as the return arrow.
        let source = format!(
            r##"(?m)^(?P<marker>(?:[ \t]*#\[{attr}\][ \t]*\r?\n)+)(?P<decl>(?P<indent>[ \t]*)(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:const[ \t]+)?(?:async[ \t]+)?(?:unsafe[ \t]+)?(?:extern[ \t]+(?:"[^"\n]*"[ \t]+)?)?fn[ \t]+\w+[ \t]*(?:<[^\n{{;()]*>)?[ \t]*\((?:[^()\n]|\([^()\n]*\))*\)[ \t]*->[ \t]*(?:\w+::)*{ret}\b)"##
        );

        Ok(Self {
            pattern: RegexPattern::new(&source)?,
        })
    }

    pub fn from_settings(settings: &StripAttributeSettings) -> Result<Self, PatternError> {
        Self::new(&settings.attribute, &settings.return_type)
    }
}

impl Transform for StripAttribute {
    fn name(&self) -> &'static str {
        "strip-attribute"
    }

    fn pattern(&self) -> &dyn Pattern {
        &self.pattern
    }

    /// The pattern already encodes the condition, so every match is rewritten.
    fn classify(&self, _m: &Match) -> Classification {
        Classification::NeedsRewrite
    }

    fn rewrite(&self, m: &Match) -> String {
        m.get("decl").map_or_else(|| m.text.clone(), str::to_string)
    }
}
