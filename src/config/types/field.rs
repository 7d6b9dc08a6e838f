//! Config field paths used in diagnostics.

use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::fmt;

/// Dotted path of a config field, e.g. `observe.scroll_debounce_ms` or
/// `rules[3].selector`.
///
/// Static paths cost nothing; indexed paths (array-of-tables entries) are
/// built on demand.
///
/// # Example
///
/// ```ignore
/// diag.error(FieldPath::new("observe.max_turns"), "must be at least 1");
/// diag.error(FieldPath::indexed("rules", 3, "selector"), "must not be empty");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// Path of a field inside an array-of-tables entry.
    pub fn indexed(section: &str, index: usize, field: &str) -> Self {
        Self(Cow::Owned(format!("{section}[{index}].{field}")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_paths() {
        assert_eq!(FieldPath::new("observe.eager").as_str(), "observe.eager");
        assert_eq!(
            FieldPath::indexed("rules", 2, "selector").as_str(),
            "rules[2].selector"
        );
    }
}
