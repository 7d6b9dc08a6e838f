//! `whitelabel watch`: re-apply whenever the page or the config changes.
//!
//! ```text
//! notify ──► filter (input page, config) ──► Debouncer ──► reload config? ──► apply
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use notify::{EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use super::PageArgs;
use super::apply;
use super::common::describe;
use crate::config::WhitelabelConfig;
use crate::logger::{status_error, status_success, status_unchanged};
use crate::utils::debounce::Debouncer;
use crate::{debug, log};

/// Quiet period after the last file event.
const DEBOUNCE_MS: u64 = 300;

/// What a batch of file events asks for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Pending {
    page: bool,
    config: bool,
}

pub fn run(page: &PageArgs, config: WhitelabelConfig) -> Result<()> {
    let input = page
        .input
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", page.input.display()))?;
    if let Some(output) = &page.output
        && output.canonicalize().is_ok_and(|output| output == input)
    {
        bail!("output must differ from the watched input");
    }
    let config_path = config.config_path.clone();

    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    // Watch parent directories: editors often replace files instead of
    // writing them in place.
    let dirs: FxHashSet<&Path> = [input.as_path(), config_path.as_path()]
        .into_iter()
        .filter_map(Path::parent)
        .collect();
    for dir in dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }

    let mut config = config;
    rebuild(page, &config);
    log!("watch"; "watching {} and {}", input.display(), config_path.display());

    let mut debouncer = Debouncer::new(Duration::from_millis(DEBOUNCE_MS));
    let mut pending = Pending::default();
    loop {
        match rx.recv_timeout(debouncer.sleep_duration(Instant::now())) {
            Ok(Ok(event)) => {
                let hit = classify(&event, &input, &config_path);
                if hit != Pending::default() {
                    debug!("watch"; "event {:?} {:?}", event.kind, event.paths);
                    pending.page |= hit.page;
                    pending.config |= hit.config;
                    debouncer.touch(Instant::now());
                }
            }
            Ok(Err(err)) => log!("watch"; "notify error: {}", err),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if !debouncer.take_if_ready(Instant::now()) {
            continue;
        }
        let batch = std::mem::take(&mut pending);
        if batch.config {
            match reload_config(&config_path) {
                Ok(fresh) => config = fresh,
                Err(err) => {
                    status_error("config reload failed", &format!("{err:#}"));
                    continue;
                }
            }
        }
        rebuild(page, &config);
    }
    Ok(())
}

/// Which of the watched files an event touches.
fn classify(event: &notify::Event, input: &Path, config: &Path) -> Pending {
    let relevant = match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    };
    if !relevant {
        return Pending::default();
    }
    Pending {
        page: event.paths.iter().any(|p| p == input),
        config: event.paths.iter().any(|p| p == config),
    }
}

fn reload_config(path: &Path) -> Result<WhitelabelConfig> {
    let dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    let name = path.file_name().map(PathBuf::from).unwrap_or_default();
    WhitelabelConfig::load(&dir, &name)
}

/// Apply once and report the outcome on the status line.
fn rebuild(page: &PageArgs, config: &WhitelabelConfig) {
    let name = page.input.display();
    match apply::run(page, config) {
        Ok(report) if report.is_quiet() => status_unchanged(&format!("{name}: nothing to rewrite")),
        Ok(report) => status_success(&format!("applied: {name} ({})", describe(&report))),
        Err(err) => status_error(&format!("failed: {name}"), &format!("{err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        let input = Path::new("/site/index.html");
        let config = Path::new("/site/whitelabel.toml");

        let write = notify::Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(input.to_path_buf());
        assert_eq!(
            classify(&write, input, config),
            Pending {
                page: true,
                config: false
            }
        );

        let replaced = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(config.to_path_buf());
        assert!(classify(&replaced, input, config).config);

        let touch = notify::Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
            .add_path(input.to_path_buf());
        assert_eq!(classify(&touch, input, config), Pending::default());

        let output = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/site/out.html"));
        assert_eq!(classify(&output, input, config), Pending::default());
    }

    #[test]
    fn test_reload_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("brand.toml");
        std::fs::write(&path, "[[rules]]\nselector = \"h1\"\nreplacement = \"x\"\n").unwrap();

        let config = reload_config(&path).unwrap();
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.config_path, path);
    }

    #[test]
    fn test_rebuild_writes_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("index.html");
        let output = temp.path().join("out.html");
        std::fs::write(&input, "<html><body><header><h1>Old</h1></header></body></html>").unwrap();

        let page = PageArgs {
            input,
            output: Some(output.clone()),
        };
        rebuild(&page, &WhitelabelConfig::embedded().unwrap());
        assert!(std::fs::read_to_string(output).unwrap().contains("Delta XR"));
    }
}
