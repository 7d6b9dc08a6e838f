//! `[observe]` section: how the overrider follows a changing page.
//!
//! # Example
//!
//! ```toml
//! [observe]
//! attributes = ["class", "style", "data-aos"]  # attribute changes that re-trigger rules
//! scroll_debounce_ms = 100                     # quiet period before the scroll fallback pass
//! eager = true                                 # pass before DOM-ready
//! max_turns = 64                               # notification turns per settle
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Observation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserveConfig {
    /// Attribute names whose changes re-run rules on the changed element.
    pub attributes: Vec<String>,

    /// Quiet period after the last scroll event before a full pass.
    pub scroll_debounce_ms: u64,

    /// Run a pass as soon as the overrider is attached.
    pub eager: bool,

    /// Upper bound on notification turns when settling.
    pub max_turns: usize,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            attributes: vec!["class".into(), "style".into(), "data-aos".into()],
            scroll_debounce_ms: 100,
            eager: true,
            max_turns: 64,
        }
    }
}

impl ObserveConfig {
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.scroll_debounce_ms == 0 {
            diag.error_with_hint(
                FieldPath::new("observe.scroll_debounce_ms"),
                "debounce must be greater than zero",
                "the default is 100",
            );
        }
        if self.max_turns == 0 {
            diag.error(FieldPath::new("observe.max_turns"), "must be at least 1");
        }
        if self.attributes.iter().any(|name| name.trim().is_empty()) {
            diag.error(
                FieldPath::new("observe.attributes"),
                "attribute names must not be empty",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_observe_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.observe.attributes, ["class", "style", "data-aos"]);
        assert_eq!(config.observe.scroll_debounce(), Duration::from_millis(100));
        assert!(config.observe.eager);
        assert_eq!(config.observe.max_turns, 64);
    }

    #[test]
    fn test_observe_partial_override() {
        let config = test_parse_config("[observe]\nscroll_debounce_ms = 250");
        assert_eq!(config.observe.scroll_debounce_ms, 250);
        assert!(config.observe.eager);
    }

    #[test]
    fn test_observe_validate() {
        let observe = ObserveConfig {
            scroll_debounce_ms: 0,
            max_turns: 0,
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        observe.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
