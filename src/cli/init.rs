//! `whitelabel init`: write the starter configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::embed::{CONFIG_FILE_NAME, DEFAULT_CONFIG};
use crate::log;

/// Write the embedded `whitelabel.toml` into `dir`.
///
/// Refuses to overwrite an existing file unless `force` is set. With
/// `dry_run` the config is printed to stdout instead.
pub fn init_config(dir: &Path, force: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        print!("{DEFAULT_CONFIG}");
        return Ok(());
    }

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;

    log!("init"; "wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitelabelConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("site");
        init_config(&dir, false, false).unwrap();

        let config = WhitelabelConfig::load(&dir, Path::new(CONFIG_FILE_NAME)).unwrap();
        assert!(!config.rules.is_empty());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "# mine").unwrap();

        assert!(init_config(temp.path(), false, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        init_config(temp.path(), true, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
