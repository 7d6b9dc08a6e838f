//! `[fixups]` section: targeted attribute fixes that are not content swaps.
//!
//! # Example
//!
//! ```toml
//! [fixups.video]
//! selector = "section#first video source"
//! src = "./starter.mp4"
//!
//! [fixups.placeholder]
//! input_ids = ["downshift-0-input", "downshift-1-input"]
//! text = "Search different products across 10+ experiences..."
//!
//! [[fixups.images]]
//! selector = 'img[src="assets/svg/watch.svg"]'
//! src = "./watch.svg"
//!
//! [fixups.logo]
//! selector = "header a.header__logo picture img"
//! src = "./logo.avif"
//! ```
//!
//! Every fixup is optional; an omitted table disables it.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Elements matching `selector` get `src` rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcFixup {
    pub selector: String,
    pub src: String,
}

/// Search inputs whose placeholder is pinned to `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderFixup {
    /// Element ids (without `#`) of the guarded inputs.
    pub input_ids: Vec<String>,
    pub text: String,
}

impl PlaceholderFixup {
    /// Selector list matching every configured input.
    pub fn selector(&self) -> String {
        self.input_ids
            .iter()
            .map(|id| format!("#{id}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Special-case fixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixupsConfig {
    /// `<source>` elements; the parent `<video>` is reloaded after a change.
    pub video: Option<SrcFixup>,
    pub placeholder: Option<PlaceholderFixup>,
    pub images: Vec<SrcFixup>,
    /// Looked up document-wide; a miss is reported as a warning.
    pub logo: Option<SrcFixup>,
}

impl FixupsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(video) = &self.video {
            check_src_fixup(video, FieldPath::new("fixups.video"), diag);
        }
        if let Some(logo) = &self.logo {
            check_src_fixup(logo, FieldPath::new("fixups.logo"), diag);
        }
        for (index, image) in self.images.iter().enumerate() {
            if image.selector.trim().is_empty() {
                diag.error(
                    FieldPath::indexed("fixups.images", index, "selector"),
                    "selector must not be empty",
                );
            }
        }

        if let Some(placeholder) = &self.placeholder {
            if placeholder.input_ids.is_empty() {
                diag.error_with_hint(
                    FieldPath::new("fixups.placeholder.input_ids"),
                    "at least one input id is required",
                    "remove [fixups.placeholder] to disable the guard",
                );
            }
            if placeholder.input_ids.iter().any(|id| id.starts_with('#')) {
                diag.error(
                    FieldPath::new("fixups.placeholder.input_ids"),
                    "ids are written without the leading `#`",
                );
            }
        }
    }
}

fn check_src_fixup(fixup: &SrcFixup, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if fixup.selector.trim().is_empty() {
        diag.error(field, "selector must not be empty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_fixups_default_to_disabled() {
        let config = test_parse_config("");
        assert_eq!(config.fixups, FixupsConfig::default());
    }

    #[test]
    fn test_fixups_parse() {
        let config = test_parse_config(
            r#"
[fixups.video]
selector = "section#first video source"
src = "./starter.mp4"

[fixups.placeholder]
input_ids = ["downshift-0-input", "downshift-1-input"]
text = "Search"

[[fixups.images]]
selector = 'img[src="assets/svg/watch.svg"]'
src = "./watch.svg"
"#,
        );

        let placeholder = config.fixups.placeholder.unwrap();
        assert_eq!(placeholder.selector(), "#downshift-0-input, #downshift-1-input");
        assert_eq!(config.fixups.video.unwrap().src, "./starter.mp4");
        assert_eq!(config.fixups.images.len(), 1);
        assert!(config.fixups.logo.is_none());
    }

    #[test]
    fn test_validate_placeholder_ids() {
        let fixups = FixupsConfig {
            placeholder: Some(PlaceholderFixup {
                input_ids: vec!["#search".into()],
                text: "x".into(),
            }),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        fixups.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
