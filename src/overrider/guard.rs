//! Placeholder guard for a single input element.
//!
//! ```text
//! Unwatched ──watch()──► Watched ──dispose() / element removed──► Disposed
//! ```
//!
//! While watched, the guard owns one attribute observer on its input and
//! writes the desired text back whenever the page changes it.

use crate::dom::{Document, NodeId, ObserveOptions, ObserverId};
use crate::overrider::{ApplyError, PassReport};

const PLACEHOLDER: &str = "placeholder";

/// Lifecycle of an [`AttributeGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unwatched,
    Watched,
    Disposed,
}

#[derive(Debug)]
pub struct AttributeGuard {
    input: NodeId,
    text: String,
    state: GuardState,
    observer: Option<ObserverId>,
}

impl AttributeGuard {
    pub fn new(input: NodeId, text: impl Into<String>) -> Self {
        Self {
            input,
            text: text.into(),
            state: GuardState::Unwatched,
            observer: None,
        }
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Apply the desired text once and start observing the input.
    ///
    /// Only an unwatched guard can start watching.
    pub fn watch(&mut self, doc: &mut Document, report: &mut PassReport) {
        if self.state != GuardState::Unwatched {
            return;
        }
        self.enforce(doc, report);
        self.observer = Some(doc.observe(self.input, ObserveOptions::attribute(PLACEHOLDER)));
        self.state = GuardState::Watched;
    }

    /// Deliver pending records, restoring the text if any of them left it
    /// changed.
    pub fn handle(&mut self, doc: &mut Document, report: &mut PassReport) {
        let Some(observer) = self.observer.filter(|_| self.state == GuardState::Watched) else {
            return;
        };
        if doc.take_records(observer).is_empty() {
            return;
        }
        if self.enforce(doc, report) {
            report.restored += 1;
            crate::debug!("guard"; "restored placeholder on {:?}", self.input);
        }
    }

    /// Whether the input still holds the desired text.
    pub fn is_satisfied(&self, doc: &Document) -> bool {
        doc.attr(self.input, PLACEHOLDER) == Some(self.text.as_str())
    }

    /// Disconnect the observer. Idempotent.
    pub fn dispose(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
        self.state = GuardState::Disposed;
    }

    /// Write the desired text unless already present. Returns whether a
    /// write happened.
    fn enforce(&self, doc: &mut Document, report: &mut PassReport) -> bool {
        if self.is_satisfied(doc) {
            return false;
        }
        match doc.set_attribute(self.input, PLACEHOLDER, &self.text) {
            Ok(()) => true,
            Err(err) => {
                report.error(ApplyError::AttributeWrite {
                    attribute: PLACEHOLDER.to_owned(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }
}
