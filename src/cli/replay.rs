//! `whitelabel replay`: run the host event loop over a page with a timed
//! script of page events.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::PageArgs;
use super::common::{describe, prepare, read_page, write_page};
use crate::config::WhitelabelConfig;
use crate::host::{Host, RunSummary, Script};
use crate::log;
use crate::overrider::Overrider;

/// Events buffered between the script feeder and the host loop.
const CHANNEL_CAPACITY: usize = 64;

pub fn run(page: &PageArgs, script: &Path, config: &WhitelabelConfig) -> Result<RunSummary> {
    let script = Script::load(script)?;
    let mut doc = read_page(&page.input)?;
    prepare(&mut doc, config)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to create tokio runtime")?;

    let mut host = Host::new(doc, Overrider::from_config(config));
    let summary = rt.block_on(async {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(script.feed(tx));
        host.run(rx).await
    });

    write_page(&host.into_document().to_html(), page.output.as_deref())?;
    log!(
        "replay";
        "{} events, {} scroll passes, {}",
        summary.events,
        summary.scroll_passes,
        describe(&summary.report)
    );
    Ok(summary)
}
