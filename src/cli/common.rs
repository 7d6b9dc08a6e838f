//! Common utilities shared across CLI commands.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::WhitelabelConfig;
use crate::dom::Document;
use crate::localize::localize;
use crate::overrider::PassReport;
use crate::debug;

/// Read and parse an HTML page.
pub fn read_page(path: &Path) -> Result<Document> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Document::parse(&source))
}

/// Write serialized HTML to `output`, or stdout when absent.
pub fn write_page(html: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Localize assets (when enabled) before any override runs.
pub fn prepare(doc: &mut Document, config: &WhitelabelConfig) -> Result<()> {
    if config.localize.enable {
        let report = localize(doc, &config.localize).context("asset localization failed")?;
        debug!("localize"; "{:?}", report);
    }
    Ok(())
}

/// One-line summary of a pass, for logs and watch status.
pub fn describe(report: &PassReport) -> String {
    let mut text = format!(
        "{} rewrites, {} fixups, {} restored",
        report.rewrites, report.fixups, report.restored
    );
    if !report.errors.is_empty() {
        text.push_str(&format!(", {} problems", report.errors.len()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrider::ApplyError;
    use tempfile::TempDir;

    #[test]
    fn test_write_page_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dist/index.html");
        write_page("<html></html>", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_read_page_missing() {
        let temp = TempDir::new().unwrap();
        let err = read_page(&temp.path().join("nope.html")).err().unwrap();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_describe() {
        let mut report = PassReport::new();
        report.rewrites = 3;
        assert_eq!(describe(&report), "3 rewrites, 0 fixups, 0 restored");

        report.error(ApplyError::MediaReload {
            reason: "detached".into(),
        });
        assert!(describe(&report).ends_with("1 problems"));
    }
}
