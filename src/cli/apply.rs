//! `whitelabel apply`: rebrand a page once.
//!
//! Runs the same sequence a browser would: eager pass on attach, full pass
//! on DOM-ready, then notification turns until the page is quiet.

use anyhow::Result;

use super::PageArgs;
use super::common::{describe, prepare, read_page, write_page};
use crate::config::WhitelabelConfig;
use crate::dom::Document;
use crate::log;
use crate::overrider::{Overrider, PassReport};

/// Rebrand `doc` in place.
pub fn apply_document(doc: &mut Document, config: &WhitelabelConfig) -> Result<PassReport> {
    prepare(doc, config)?;

    let mut overrider = Overrider::from_config(config);
    let mut report = overrider.attach(doc);
    report.merge(overrider.dom_ready(doc));
    report.merge(overrider.settle(doc));
    overrider.stop(doc);
    Ok(report)
}

pub fn run(page: &PageArgs, config: &WhitelabelConfig) -> Result<PassReport> {
    let mut doc = read_page(&page.input)?;
    let report = apply_document(&mut doc, config)?;
    write_page(&doc.to_html(), page.output.as_deref())?;

    if page.output.is_some() {
        log!("apply"; "{}: {}", page.input.display(), describe(&report));
    }
    Ok(report)
}
