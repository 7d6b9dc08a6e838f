//! `[localize]` section: point remote asset references at local folders.
//!
//! # Example
//!
//! ```toml
//! [localize]
//! enable = true
//! css_dir = "css"
//! js_dir = "js"
//! images_dir = "images"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizeConfig {
    pub enable: bool,
    pub css_dir: String,
    pub js_dir: String,
    pub images_dir: String,
}

impl Default for LocalizeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            css_dir: "css".into(),
            js_dir: "js".into(),
            images_dir: "images".into(),
        }
    }
}

impl LocalizeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }
        for (field, dir) in [
            (FieldPath::new("localize.css_dir"), &self.css_dir),
            (FieldPath::new("localize.js_dir"), &self.js_dir),
            (FieldPath::new("localize.images_dir"), &self.images_dir),
        ] {
            if dir.trim().is_empty() {
                diag.error(field, "directory must not be empty");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_localize_defaults() {
        let config = test_parse_config("");
        assert!(!config.localize.enable);
        assert_eq!(config.localize.images_dir, "images");
    }

    #[test]
    fn test_localize_validate_only_when_enabled() {
        let mut localize = LocalizeConfig {
            css_dir: String::new(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        localize.validate(&mut diag);
        assert!(diag.is_empty());

        localize.enable = true;
        localize.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
