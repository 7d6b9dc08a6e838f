//! Host event loop.
//!
//! Plays the part of the browser around the overrider: page events arrive
//! on a channel, every event is followed by notification turns until the
//! observers are quiet, and the scroll quiet period is a real timer.
//!
//! ```text
//! Script::feed ──HostEvent──► Host::run ──► Overrider ──► Document
//!                                 └── sleep until scroll deadline ──┘
//! ```
//!
//! The document is not `Send`, so the loop runs on the thread that owns it
//! (a current-thread runtime); only the event source is spawned.

pub mod script;

pub use script::{Script, ScriptError};

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::dom::{Document, Fragment, NodeId};
use crate::overrider::{Overrider, PassReport};
use crate::{debug, log};

/// A write performed by the page's own scripts, addressed by selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMutation {
    /// Append markup to the first element matching `parent`.
    Insert { parent: String, html: String },
    SetHtml { selector: String, html: String },
    SetAttribute {
        selector: String,
        name: String,
        value: String,
    },
    Remove { selector: String },
}

impl PageMutation {
    /// Perform the write on the first matching element.
    pub fn apply(&self, doc: &mut Document) -> Result<(), ScriptError> {
        match self {
            Self::Insert { parent, html } => {
                let parent = first(doc, parent)?;
                doc.append_html(parent, html)?;
            }
            Self::SetHtml { selector, html } => {
                let target = first(doc, selector)?;
                doc.set_inner_html(target, &Fragment::parse(html))?;
            }
            Self::SetAttribute {
                selector,
                name,
                value,
            } => {
                let target = first(doc, selector)?;
                doc.set_attribute(target, name, value)?;
            }
            Self::Remove { selector } => {
                let target = first(doc, selector)?;
                doc.remove(target)?;
            }
        }
        Ok(())
    }
}

fn first(doc: &Document, selector: &str) -> Result<NodeId, ScriptError> {
    doc.query_first(selector)?
        .ok_or_else(|| ScriptError::NoMatch(selector.to_owned()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    DomReady,
    Mutate(PageMutation),
    Scroll,
    Shutdown,
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Events received, shutdown excluded.
    pub events: usize,
    /// Scroll fallback passes that ran.
    pub scroll_passes: usize,
    /// Every pass and turn, merged.
    pub report: PassReport,
    /// Page mutations that could not be performed.
    pub skipped: Vec<ScriptError>,
}

/// Owns the document and the overrider for the duration of a run.
pub struct Host {
    doc: Document,
    overrider: Overrider,
}

impl Host {
    pub fn new(doc: Document, overrider: Overrider) -> Self {
        Self { doc, overrider }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Attach, then handle events until shutdown or the sender hangs up.
    ///
    /// A scroll pass still pending at shutdown runs before returning.
    pub async fn run(&mut self, mut events: mpsc::Receiver<HostEvent>) -> RunSummary {
        let mut summary = RunSummary::default();
        summary.report.merge(self.overrider.attach(&mut self.doc));

        loop {
            let deadline = self.scroll_deadline();
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    None | Some(HostEvent::Shutdown) => break,
                    Some(event) => {
                        summary.events += 1;
                        self.handle(event, &mut summary);
                    }
                },
                _ = sleep_until(deadline), if deadline.is_some() => {
                    self.scroll_pass(&mut summary);
                }
            }
        }

        if let Some(deadline) = self.scroll_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.scroll_pass(&mut summary);
        }

        debug!("host"; "{} events, {} writes", summary.events, summary.report.writes());
        summary
    }

    fn handle(&mut self, event: HostEvent, summary: &mut RunSummary) {
        match event {
            HostEvent::DomReady => {
                summary.report.merge(self.overrider.dom_ready(&mut self.doc));
            }
            HostEvent::Mutate(mutation) => {
                if let Err(err) = mutation.apply(&mut self.doc) {
                    log!("host"; "skipped page mutation: {}", err);
                    summary.skipped.push(err);
                }
            }
            HostEvent::Scroll => self.overrider.on_scroll(Instant::now().into_std()),
            HostEvent::Shutdown => {}
        }
        summary.report.merge(self.overrider.settle(&mut self.doc));
    }

    fn scroll_pass(&mut self, summary: &mut RunSummary) {
        if let Some(report) = self.overrider.poll(&mut self.doc, Instant::now().into_std()) {
            summary.scroll_passes += 1;
            summary.report.merge(report);
            summary.report.merge(self.overrider.settle(&mut self.doc));
        }
    }

    fn scroll_deadline(&self) -> Option<Instant> {
        self.overrider.scroll_deadline().map(Instant::from_std)
    }
}

/// Sleep until `deadline`, or forever without one.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => tokio::time::sleep(Duration::from_secs(86400)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitelabelConfig;
    use crate::overrider::GuardState;

    const PAGE: &str = r#"<html><head></head><body>
        <header><a class="header__logo"><picture><img src="logo.png"></picture></a><h1>Acme</h1></header>
        <input id="downshift-0-input" placeholder="old">
    </body></html>"#;

    fn host() -> Host {
        let config = WhitelabelConfig::embedded().unwrap();
        Host::new(Document::parse(PAGE), Overrider::from_config(&config))
    }

    async fn replay(host: &mut Host, script: &str) -> RunSummary {
        let script = Script::parse(script).unwrap();
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(script.feed(tx));
        host.run(rx).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_inserted_content_is_rewritten() {
        let mut host = host();
        let summary = replay(
            &mut host,
            r#"
[[events]]
at_ms = 30
action = "insert"
parent = "body"
html = '<div class="property property-1"><div class="property__title">Lazy</div></div>'
"#,
        )
        .await;

        assert_eq!(summary.events, 2);
        assert!(summary.skipped.is_empty());
        let doc = host.document();
        let title = doc.query_first("div.property__title").unwrap().unwrap();
        assert_eq!(doc.inner_html(title).unwrap(), "Store Price");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_placeholder_restored() {
        let mut host = host();
        let summary = replay(
            &mut host,
            r##"
[[events]]
at_ms = 10
action = "set_attribute"
selector = "#downshift-0-input"
name = "placeholder"
value = "old text"
"##,
        )
        .await;

        assert_eq!(summary.report.restored, 1);
        let doc = host.document();
        let input = doc.query_first("#downshift-0-input").unwrap().unwrap();
        assert_eq!(
            doc.attr(input, "placeholder"),
            Some("Search different products across 10+ experiences...")
        );
        assert_eq!(host.overrider.guard_state(input), GuardState::Watched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_burst_runs_one_pass() {
        let mut host = host();
        let summary = replay(
            &mut host,
            r#"
[[events]]
at_ms = 0
action = "scroll"

[[events]]
at_ms = 40
action = "scroll"

[[events]]
at_ms = 80
action = "scroll"

[[events]]
at_ms = 500
action = "scroll"
"#,
        )
        .await;

        assert_eq!(summary.scroll_passes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_mutation_is_skipped() {
        let mut host = host();
        let summary = replay(
            &mut host,
            r#"
[[events]]
action = "remove"
selector = "footer"

[[events]]
at_ms = 5
action = "set_html"
selector = "header"
html = "<h1>Acme again</h1>"
"#,
        )
        .await;

        assert!(matches!(summary.skipped.as_slice(), [ScriptError::NoMatch(s)] if s == "footer"));
        // The heading the page re-rendered is overridden on the next turn.
        let doc = host.document();
        let h1 = doc.query_first("header h1").unwrap().unwrap();
        assert_ne!(doc.inner_html(h1).unwrap(), "Acme again");
    }
}
