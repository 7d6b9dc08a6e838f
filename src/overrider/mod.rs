//! Content overrider.
//!
//! Applies the compiled rule table and fixups to a [`Document`] and keeps
//! re-applying them while the page mutates.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──attach()──► Loading ──dom_ready()──► Observing ──stop()──► Stopped
//!   └────────────────dom_ready()───────────────┘
//! ```
//!
//! - `attach` runs the eager pass (when enabled)
//! - `dom_ready` runs the full pass and registers the structural observer
//! - `notify` delivers one notification turn; `settle` repeats it until
//!   the queues are empty
//! - `on_scroll` arms the fallback pass, `poll` runs it once due
//!
//! Nothing here returns an error: every pass produces a [`PassReport`] and
//! forwards its errors to the optional diagnostics callback.

mod guard;
mod report;

pub use guard::{AttributeGuard, GuardState};
pub use report::{ApplyError, PassReport};

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::config::{ObserveConfig, WhitelabelConfig};
use crate::dom::{Document, MutationKind, NodeId, ObserveOptions, ObserverId};
use crate::rules::{Fixups, RuleTable};
use crate::utils::debounce::Debouncer;
use crate::{debug, log};

/// Callback receiving every non-fatal error of every pass.
pub type Diagnostics = Box<dyn FnMut(&ApplyError)>;

/// Where the overrider is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Loading,
    Observing,
    Stopped,
}

pub struct Overrider {
    rules: RuleTable,
    fixups: Fixups,
    observe: ObserveConfig,
    state: Lifecycle,
    structural: Option<ObserverId>,
    guards: FxHashMap<NodeId, AttributeGuard>,
    scroll: Debouncer,
    diagnostics: Option<Diagnostics>,
}

impl Overrider {
    pub fn new(rules: RuleTable, fixups: Fixups, observe: ObserveConfig) -> Self {
        let scroll = Debouncer::new(observe.scroll_debounce());
        Self {
            rules,
            fixups,
            observe,
            state: Lifecycle::Idle,
            structural: None,
            guards: FxHashMap::default(),
            scroll,
            diagnostics: None,
        }
    }

    pub fn from_config(config: &WhitelabelConfig) -> Self {
        Self::new(
            RuleTable::compile(&config.rules),
            Fixups::from_config(&config.fixups),
            config.observe.clone(),
        )
    }

    /// Install a callback that sees every error of every pass.
    pub fn with_diagnostics(mut self, callback: impl FnMut(&ApplyError) + 'static) -> Self {
        self.diagnostics = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Attach to a loading document, running the eager pass when enabled.
    pub fn attach(&mut self, doc: &mut Document) -> PassReport {
        if self.state != Lifecycle::Idle {
            return PassReport::new();
        }
        self.state = Lifecycle::Loading;
        debug!("overrider"; "attached ({} rules)", self.rules.len());

        match doc.body() {
            Some(body) if self.observe.eager => self.walk(doc, body),
            _ => PassReport::new(),
        }
    }

    /// Full pass over the body, then start observing it.
    pub fn dom_ready(&mut self, doc: &mut Document) -> PassReport {
        if !matches!(self.state, Lifecycle::Idle | Lifecycle::Loading) {
            return PassReport::new();
        }
        let Some(body) = doc.body() else {
            return PassReport::new();
        };

        let report = self.walk(doc, body);
        let options = ObserveOptions::subtree_with_attributes(&self.observe.attributes);
        self.structural = Some(doc.observe(body, options));
        self.state = Lifecycle::Observing;
        debug!("overrider"; "observing body");
        report
    }

    /// Disconnect every observer and make further events no-ops.
    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(observer) = self.structural.take() {
            doc.disconnect(observer);
        }
        for guard in self.guards.values_mut() {
            guard.dispose(doc);
        }
        self.scroll.cancel();
        self.state = Lifecycle::Stopped;
        debug!("overrider"; "stopped");
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Pre-order walk from `root`, as one pass.
    pub fn walk(&mut self, doc: &mut Document, root: NodeId) -> PassReport {
        let mut report = PassReport::new();
        self.process(doc, root, &mut report);
        self.finish(report)
    }

    /// One notification turn: structural records first, then every guard.
    pub fn notify(&mut self, doc: &mut Document) -> PassReport {
        let mut report = PassReport::new();
        if self.state == Lifecycle::Stopped {
            return report;
        }

        self.reap_guards(doc);

        if let Some(observer) = self.structural {
            for record in doc.take_records(observer) {
                match record.kind {
                    MutationKind::ChildList { added, .. } => {
                        for node in added {
                            if doc.is_element(node) && doc.is_connected(node) {
                                self.process(doc, node, &mut report);
                            }
                        }
                    }
                    MutationKind::Attributes { .. } => {
                        if doc.is_connected(record.target) {
                            self.rules.apply(doc, record.target, &mut report);
                        }
                    }
                }
            }
        }

        for guard in self.guards.values_mut() {
            guard.handle(doc, &mut report);
        }

        self.finish(report)
    }

    /// Run notification turns until no records are pending or the turn
    /// limit is reached.
    pub fn settle(&mut self, doc: &mut Document) -> PassReport {
        let mut total = PassReport::new();
        let mut turns = 0;
        while doc.has_pending_records() && self.state != Lifecycle::Stopped {
            if turns == self.observe.max_turns {
                log!("warning"; "records still pending after {} turns", turns);
                break;
            }
            total.merge(self.notify(doc));
            turns += 1;
        }
        if turns > 0 {
            debug!("overrider"; "settled in {} turns, {} writes", turns, total.writes());
        }
        total
    }

    // ========================================================================
    // Scroll fallback
    // ========================================================================

    /// Re-arm the scroll quiet period. Ignored until the body is observed.
    pub fn on_scroll(&mut self, now: Instant) {
        if self.state == Lifecycle::Observing {
            self.scroll.touch(now);
        }
    }

    pub fn scroll_deadline(&self) -> Option<Instant> {
        self.scroll.deadline()
    }

    /// Run the fallback pass if the quiet period has elapsed.
    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> Option<PassReport> {
        if !self.scroll.take_if_ready(now) {
            return None;
        }
        let body = doc.body()?;
        debug!("overrider"; "scroll pass");
        Some(self.walk(doc, body))
    }

    // ========================================================================
    // Guards
    // ========================================================================

    /// State of the guard on `input`; `Unwatched` when there is none.
    pub fn guard_state(&self, input: NodeId) -> GuardState {
        self.guards
            .get(&input)
            .map_or(GuardState::Unwatched, AttributeGuard::state)
    }

    /// Dispose the guard on `input`. Returns false if it was not guarded.
    pub fn release_guard(&mut self, doc: &mut Document, input: NodeId) -> bool {
        match self.guards.get_mut(&input) {
            Some(guard) if guard.state() == GuardState::Watched => {
                guard.dispose(doc);
                true
            }
            _ => false,
        }
    }

    pub fn active_guards(&self) -> usize {
        self.guards
            .values()
            .filter(|g| g.state() == GuardState::Watched)
            .count()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Rules and fixups on `root`, then on each element child, parent first.
    ///
    /// Children are read after their parent has been rewritten.
    fn process(&mut self, doc: &mut Document, root: NodeId, report: &mut PassReport) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !doc.is_connected(id) {
                continue;
            }
            self.rules.apply(doc, id, report);
            for input in self.fixups.apply(doc, id, report) {
                self.guard(doc, input, report);
            }
            stack.extend(doc.children(id).into_iter().rev());
        }
    }

    /// Put `input` under guard unless a live guard already holds it.
    fn guard(&mut self, doc: &mut Document, input: NodeId, report: &mut PassReport) {
        if self.state == Lifecycle::Stopped {
            return;
        }
        let Some(text) = self.fixups.placeholder_text() else {
            return;
        };
        if self
            .guards
            .get(&input)
            .is_some_and(|g| g.state() != GuardState::Disposed)
        {
            return;
        }
        let mut guard = AttributeGuard::new(input, text);
        guard.watch(doc, report);
        self.guards.insert(input, guard);
    }

    /// Dispose and drop guards whose input left the document.
    fn reap_guards(&mut self, doc: &mut Document) {
        self.guards.retain(|_, guard| {
            if doc.is_connected(guard.input()) {
                return true;
            }
            guard.dispose(doc);
            false
        });
    }

    /// Log and forward the pass's errors.
    fn finish(&mut self, report: PassReport) -> PassReport {
        for error in &report.errors {
            match error {
                ApplyError::MissingElement { .. } => log!("warning"; "{}", error),
                _ => debug!("overrider"; "{}", error),
            }
            if let Some(callback) = self.diagnostics.as_mut() {
                callback(error);
            }
        }
        report
    }
}
