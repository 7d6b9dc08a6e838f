//! `[[rules]]` entries: selector → replacement markup.
//!
//! # Example
//!
//! ```toml
//! [[rules]]
//! selector = "div.property.property-1 div.property__title"
//! replacement = "Store Price"
//!
//! [[rules]]
//! selector = "#powerful .sec-title[data-aos='fade-up']"
//! replacement = "Giving <span class='gradiently'>You</span> 3D Superpowers"
//! ```
//!
//! Order matters: for an element matched by several selectors, the first
//! entry wins the direct match.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::dom::parse_selector;

/// One content substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRule {
    /// Host selector syntax (`nth-of-type`, attribute matchers, combinators).
    pub selector: String,
    /// Markup or plain text that replaces the element's children.
    pub replacement: String,
}

impl ContentRule {
    pub fn new(selector: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            replacement: replacement.into(),
        }
    }
}

/// Validate the rule list.
///
/// Empty selectors are errors. Unparsable and duplicate selectors are only
/// warnings: the overrider skips them at runtime.
pub fn validate_rules(rules: &[ContentRule], diag: &mut ConfigDiagnostics) {
    let mut first_seen: FxHashMap<&str, usize> = FxHashMap::default();

    for (index, rule) in rules.iter().enumerate() {
        let selector = rule.selector.trim();
        if selector.is_empty() {
            diag.error_with_hint(
                FieldPath::indexed("rules", index, "selector"),
                "selector must not be empty",
                "remove the entry or give it a CSS selector",
            );
            continue;
        }

        if let Err(err) = parse_selector(selector) {
            diag.warn(FieldPath::indexed("rules", index, "selector"), err.to_string());
        }

        if let Some(first) = first_seen.get(selector) {
            diag.warn(
                FieldPath::indexed("rules", index, "selector"),
                format!("duplicates rules[{first}], this entry never wins a direct match"),
            );
        } else {
            first_seen.insert(selector, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_rules_keep_order() {
        let config = test_parse_config(
            r#"
[[rules]]
selector = "header h1"
replacement = "Delta XR"

[[rules]]
selector = "header .btn-type-4"
replacement = "Create Store"
"#,
        );

        assert_eq!(
            config.rules,
            vec![
                ContentRule::new("header h1", "Delta XR"),
                ContentRule::new("header .btn-type-4", "Create Store"),
            ]
        );
    }

    #[test]
    fn test_validate_rules() {
        let rules = vec![
            ContentRule::new("", "x"),
            ContentRule::new("div[[", "x"),
            ContentRule::new("p", "a"),
            ContentRule::new("p", "b"),
        ];
        let mut diag = ConfigDiagnostics::new();
        validate_rules(&rules, &mut diag);

        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "rules[0].selector");
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.warnings()[1].field.as_str(), "rules[3].selector");
    }
}
