//! Value matchers select among repeated (multi-valued) variables.

use regex::Regex;

use crate::error::ConfigError;

/// A predicate over a variable's value.
///
/// Built from an optional regular expression: no expression (or an empty
/// one) matches everything, a leading `!` negates the expression. A
/// shorthand variable has no value and never matches anything but
/// [`ValueMatcher::All`].
///
/// The expression runs against the decoded value, not the text in the file:
/// surrounding quotes are gone and escapes are resolved, so `"a  b"` on disk
/// is tested as `a  b`. No type coercion happens.
#[derive(Debug, Clone, Default)]
pub enum ValueMatcher {
    #[default]
    All,
    Regex { regex: Regex, negate: bool },
}

impl ValueMatcher {
    pub fn from_expr(expr: Option<&str>) -> Result<Self, ConfigError> {
        let Some(expr) = expr.filter(|e| !e.is_empty()) else {
            return Ok(ValueMatcher::All);
        };

        let (pattern, negate) = match expr.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (expr, false),
        };

        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidMatcher {
            expr: expr.to_string(),
            source,
        })?;
        Ok(ValueMatcher::Regex { regex, negate })
    }

    /// Test a decoded value (`None` for the boolean shorthand).
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (ValueMatcher::All, _) => true,
            (ValueMatcher::Regex { .. }, None) => false,
            (ValueMatcher::Regex { regex, negate }, Some(value)) => regex.is_match(value) != *negate,
        }
    }
}
