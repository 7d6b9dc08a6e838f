//! Special-case attribute fixes: video source, search placeholder, image
//! sources, header logo.
//!
//! Unlike content rules these never touch inner markup. Every write is
//! skipped when the attribute already holds the target value.

use scraper::Selector;

use crate::config::{FixupsConfig, SrcFixup};
use crate::dom::{Document, DomError, NodeId, parse_selector};
use crate::overrider::{ApplyError, PassReport};

/// A selector plus the `src` it pins.
#[derive(Debug)]
struct SrcTarget {
    selector: String,
    matcher: Result<Selector, String>,
    src: String,
}

impl SrcTarget {
    fn compile(fixup: &SrcFixup) -> Self {
        Self {
            selector: fixup.selector.clone(),
            matcher: parse_selector(&fixup.selector).map_err(|err| err.to_string()),
            src: fixup.src.clone(),
        }
    }

    fn matcher(&self, report: &mut PassReport) -> Option<&Selector> {
        match &self.matcher {
            Ok(selector) => Some(selector),
            Err(reason) => {
                report.invalid_selector(&self.selector, reason);
                None
            }
        }
    }
}

#[derive(Debug)]
struct PlaceholderTarget {
    selector: String,
    matcher: Result<Selector, String>,
    text: String,
}

/// Compiled `[fixups]` section.
#[derive(Debug, Default)]
pub struct Fixups {
    video: Option<SrcTarget>,
    placeholder: Option<PlaceholderTarget>,
    images: Vec<SrcTarget>,
    logo: Option<SrcTarget>,
}

impl Fixups {
    pub fn from_config(config: &FixupsConfig) -> Self {
        Self {
            video: config.video.as_ref().map(SrcTarget::compile),
            placeholder: config.placeholder.as_ref().map(|fixup| {
                let selector = fixup.selector();
                PlaceholderTarget {
                    matcher: parse_selector(&selector).map_err(|err| err.to_string()),
                    selector,
                    text: fixup.text.clone(),
                }
            }),
            images: config.images.iter().map(SrcTarget::compile).collect(),
            logo: config.logo.as_ref().map(SrcTarget::compile),
        }
    }

    /// Desired placeholder text, when the placeholder fixup is enabled.
    pub fn placeholder_text(&self) -> Option<&str> {
        self.placeholder.as_ref().map(|p| p.text.as_str())
    }

    /// `(selector, reason)` of every fixup whose selector was rejected.
    pub fn invalid(&self) -> Vec<(&str, &str)> {
        let src_targets = self.video.iter().chain(&self.images).chain(&self.logo);
        let mut invalid: Vec<(&str, &str)> = src_targets
            .filter_map(|t| t.matcher.as_ref().err().map(|r| (t.selector.as_str(), r.as_str())))
            .collect();
        if let Some(p) = &self.placeholder
            && let Err(reason) = &p.matcher
        {
            invalid.push((p.selector.as_str(), reason.as_str()));
        }
        invalid
    }

    /// Apply every fixup to `scope` and its descendants.
    ///
    /// Returns the placeholder inputs found, which the caller puts under
    /// guard.
    pub fn apply(&self, doc: &mut Document, scope: NodeId, report: &mut PassReport) -> Vec<NodeId> {
        if let Some(video) = &self.video {
            apply_video(video, doc, scope, report);
        }
        let inputs = match &self.placeholder {
            Some(placeholder) => apply_placeholder(placeholder, doc, scope, report),
            None => Vec::new(),
        };
        for image in &self.images {
            if let Some(selector) = image.matcher(report) {
                for target in doc.select_inclusive(scope, selector) {
                    set_src(doc, target, &image.src, report);
                }
            }
        }
        if let Some(logo) = &self.logo {
            apply_logo(logo, doc, report);
        }
        inputs
    }
}

/// Pin the `<source>` src, then reload the enclosing media element.
fn apply_video(video: &SrcTarget, doc: &mut Document, scope: NodeId, report: &mut PassReport) {
    let Some(selector) = video.matcher(report) else {
        return;
    };
    for source in doc.select_inclusive(scope, selector) {
        if !set_src(doc, source, &video.src, report) {
            continue;
        }
        let reload = doc
            .parent_element(source)
            .ok_or(DomError::Detached)
            .and_then(|media| doc.request_reload(media));
        if let Err(err) = reload {
            report.error(ApplyError::MediaReload {
                reason: err.to_string(),
            });
        }
    }
}

fn apply_placeholder(
    placeholder: &PlaceholderTarget,
    doc: &mut Document,
    scope: NodeId,
    report: &mut PassReport,
) -> Vec<NodeId> {
    let selector = match &placeholder.matcher {
        Ok(selector) => selector,
        Err(reason) => {
            report.invalid_selector(&placeholder.selector, reason);
            return Vec::new();
        }
    };

    let inputs = doc.select_inclusive(scope, selector);
    for &input in &inputs {
        set_attr(doc, input, "placeholder", &placeholder.text, report);
    }
    inputs
}

/// The logo is looked up document-wide regardless of `scope`.
fn apply_logo(logo: &SrcTarget, doc: &mut Document, report: &mut PassReport) {
    let Some(selector) = logo.matcher(report) else {
        return;
    };
    match doc.select_all(selector).first() {
        Some(&img) => {
            set_src(doc, img, &logo.src, report);
        }
        None => report.missing(&logo.selector),
    }
}

fn set_src(doc: &mut Document, id: NodeId, src: &str, report: &mut PassReport) -> bool {
    set_attr(doc, id, "src", src, report)
}

/// Write `name=value` unless already set. Returns whether a write happened.
fn set_attr(
    doc: &mut Document,
    id: NodeId,
    name: &str,
    value: &str,
    report: &mut PassReport,
) -> bool {
    if doc.attr(id, name) == Some(value) {
        return false;
    }
    match doc.set_attribute(id, name, value) {
        Ok(()) => {
            report.fixups += 1;
            true
        }
        Err(err) => {
            report.error(ApplyError::AttributeWrite {
                attribute: name.to_owned(),
                reason: err.to_string(),
            });
            false
        }
    }
}
