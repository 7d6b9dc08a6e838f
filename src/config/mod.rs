//! Rebrand configuration (`whitelabel.toml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── rules      # [[rules]]
//! │   ├── fixups     # [fixups]
//! │   ├── observe    # [observe]
//! │   └── localize   # [localize]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # WhitelabelConfig (this file)
//! ```
//!
//! The rule table is configuration, not code: the overrider receives a
//! compiled copy of it and never reads this module's types at runtime.

pub mod section;
pub mod types;
mod util;

pub use section::{ContentRule, FixupsConfig, LocalizeConfig, ObserveConfig, SrcFixup};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use crate::{embed, log};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing whitelabel.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhitelabelConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Ordered content rules
    #[serde(default)]
    pub rules: Vec<ContentRule>,

    /// Special-case attribute fixes
    #[serde(default)]
    pub fixups: FixupsConfig,

    /// Observation settings
    #[serde(default)]
    pub observe: ObserveConfig,

    /// Asset localization
    #[serde(default)]
    pub localize: LocalizeConfig,
}

impl WhitelabelConfig {
    /// Locate `config_name` upward from `start`, load and validate it.
    pub fn load(start: &Path, config_name: &Path) -> Result<Self> {
        let Some(path) = find_config_file(start, config_name) else {
            bail!(ConfigError::NotFound(config_name.to_path_buf()));
        };

        let mut config = Self::from_path(&path)?;
        config.config_path = path;
        config.validate()?;
        Ok(config)
    }

    /// The built-in rebrand table shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(embed::DEFAULT_CONFIG)
    }

    /// Parse TOML content without unknown-field detection.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate every section, printing warnings and failing on errors.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnose();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Collect diagnostics without printing anything.
    pub fn diagnose(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        section::validate_rules(&self.rules, &mut diag);
        self.fixups.validate(&mut diag);
        self.observe.validate(&mut diag);
        self.localize.validate(&mut diag);
        diag
    }
}

/// Parse a config snippet, failing the test on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> WhitelabelConfig {
    let (parsed, ignored) = WhitelabelConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_invalid_toml() {
        assert!(WhitelabelConfig::parse("[observe\neager = true").is_err());
    }

    #[test]
    fn test_embedded_config_is_valid() {
        let config = WhitelabelConfig::embedded().unwrap();
        assert!(!config.rules.is_empty());
        assert!(!config.diagnose().has_errors());
        assert!(config.fixups.placeholder.is_some());
        assert!(config.fixups.logo.is_some());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (_, ignored) =
            WhitelabelConfig::parse_with_ignored("[observe]\neager = false\nturbo = true").unwrap();
        assert_eq!(ignored, ["observe.turbo"]);
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("whitelabel.toml");
        fs::write(
            &path,
            "[[rules]]\nselector = \"header h1\"\nreplacement = \"Delta XR\"\n",
        )
        .unwrap();

        let config = WhitelabelConfig::load(temp.path(), Path::new("whitelabel.toml")).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("whitelabel.toml"),
            "[observe]\nscroll_debounce_ms = 0\n",
        )
        .unwrap();

        let err = WhitelabelConfig::load(temp.path(), Path::new("whitelabel.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Diagnostics(_))
        ));
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let err = WhitelabelConfig::load(temp.path(), Path::new("missing-whitelabel.toml"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NotFound(_))
        ));
    }
}
