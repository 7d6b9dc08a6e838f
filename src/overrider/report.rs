//! Per-pass outcome: what was written and what could not be applied.

use rustc_hash::FxHashSet;
use thiserror::Error;

/// A rule or fixup that did not apply during a pass.
///
/// None of these abort a pass; they are collected into the [`PassReport`]
/// and forwarded to the diagnostics callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("media reload failed: {reason}")]
    MediaReload { reason: String },

    #[error("no element matches `{selector}`")]
    MissingElement { selector: String },

    #[error("cannot rewrite `{attribute}`: {reason}")]
    AttributeWrite { attribute: String, reason: String },
}

/// Counters and errors of one walk or notification turn.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Elements whose content was replaced.
    pub rewrites: usize,
    /// Attribute writes made by fixups.
    pub fixups: usize,
    /// Placeholder values restored by guards.
    pub restored: usize,
    pub errors: Vec<ApplyError>,
    /// Selectors already reported this pass.
    reported: FxHashSet<String>,
}

impl PassReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of writes made during the pass.
    pub fn writes(&self) -> usize {
        self.rewrites + self.fixups + self.restored
    }

    pub fn is_quiet(&self) -> bool {
        self.writes() == 0
    }

    pub fn error(&mut self, error: ApplyError) {
        self.errors.push(error);
    }

    /// Record an unusable selector once per pass, however many elements
    /// were checked against it.
    pub fn invalid_selector(&mut self, selector: &str, reason: &str) {
        if self.reported.insert(selector.to_owned()) {
            self.errors.push(ApplyError::InvalidSelector {
                selector: selector.to_owned(),
                reason: reason.to_owned(),
            });
        }
    }

    /// Record a required element that is absent, once per pass.
    pub fn missing(&mut self, selector: &str) {
        if self.reported.insert(selector.to_owned()) {
            self.errors.push(ApplyError::MissingElement {
                selector: selector.to_owned(),
            });
        }
    }

    /// Fold another report into this one, keeping once-per-pass dedup.
    pub fn merge(&mut self, other: PassReport) {
        self.rewrites += other.rewrites;
        self.fixups += other.fixups;
        self.restored += other.restored;
        for error in other.errors {
            let fresh = match &error {
                ApplyError::InvalidSelector { selector, .. }
                | ApplyError::MissingElement { selector } => self.reported.insert(selector.clone()),
                _ => true,
            };
            if fresh {
                self.errors.push(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selector_reported_once() {
        let mut report = PassReport::new();
        report.invalid_selector("div[[", "bad");
        report.invalid_selector("div[[", "bad");
        report.missing("header img");
        report.missing("header img");
        assert_eq!(report.errors.len(), 2);
        assert!(report.is_quiet());
    }

    #[test]
    fn test_merge_dedups_by_selector() {
        let mut first = PassReport::new();
        first.rewrites = 2;
        first.missing("header img");

        let mut second = PassReport::new();
        second.fixups = 1;
        second.missing("header img");
        second.error(ApplyError::MediaReload {
            reason: "detached".into(),
        });

        first.merge(second);
        assert_eq!(first.writes(), 3);
        assert_eq!(first.errors.len(), 2);
    }
}
