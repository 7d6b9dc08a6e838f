//! Embedded static resources.
//!
//! - `DEFAULT_CONFIG` - starter `whitelabel.toml` written by `whitelabel init`
//!   and used as the fallback rule table in tests

/// Starter configuration: the Delta XR rebrand table.
pub const DEFAULT_CONFIG: &str = include_str!("whitelabel.toml");

/// File name `init` writes and `load` searches for.
pub const CONFIG_FILE_NAME: &str = "whitelabel.toml";
