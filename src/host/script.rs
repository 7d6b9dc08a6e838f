//! Replay scripts: timed page events read from TOML.
//!
//! # Example
//!
//! ```toml
//! [[events]]
//! at_ms = 50
//! action = "insert"
//! parent = "body"
//! html = '<div class="property property-1"><div class="property__title">Lazy</div></div>'
//!
//! [[events]]
//! at_ms = 120
//! action = "set_attribute"
//! selector = "#downshift-0-input"
//! name = "placeholder"
//! value = "old text"
//!
//! [[events]]
//! at_ms = 200
//! action = "scroll"
//! ```
//!
//! DOM-ready is delivered at `t = 0` before any scripted event.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{HostEvent, PageMutation};
use crate::dom::DomError;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {0}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid script: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no element matches `{0}`")]
    NoMatch(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Insert { parent: String, html: String },
    SetHtml { selector: String, html: String },
    SetAttribute {
        selector: String,
        name: String,
        value: String,
    },
    Remove { selector: String },
    Scroll,
}

impl Step {
    pub fn into_event(self) -> HostEvent {
        let mutation = match self {
            Self::Scroll => return HostEvent::Scroll,
            Self::Insert { parent, html } => PageMutation::Insert { parent, html },
            Self::SetHtml { selector, html } => PageMutation::SetHtml { selector, html },
            Self::SetAttribute {
                selector,
                name,
                value,
            } => PageMutation::SetAttribute {
                selector,
                name,
                value,
            },
            Self::Remove { selector } => PageMutation::Remove { selector },
        };
        HostEvent::Mutate(mutation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptEvent {
    /// Offset from the start of the replay.
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub step: Step,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content =
            std::fs::read_to_string(path).map_err(|err| ScriptError::Io(path.to_path_buf(), err))?;
        Self::parse(&content)
    }

    /// Parse and order events by time; ties keep file order.
    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        let mut script: Self = toml::from_str(content)?;
        script.events.sort_by_key(|event| event.at_ms);
        Ok(script)
    }

    /// Send DOM-ready, every event at its offset, then shutdown.
    ///
    /// Stops early if the host hangs up.
    pub async fn feed(self, events: mpsc::Sender<HostEvent>) {
        let start = Instant::now();
        if events.send(HostEvent::DomReady).await.is_err() {
            return;
        }
        for event in self.events {
            tokio::time::sleep_until(start + Duration::from_millis(event.at_ms)).await;
            if events.send(event.step.into_event()).await.is_err() {
                return;
            }
        }
        let _ = events.send(HostEvent::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_by_time() {
        let script = Script::parse(
            r#"
[[events]]
at_ms = 200
action = "scroll"

[[events]]
at_ms = 50
action = "remove"
selector = "footer"

[[events]]
action = "set_html"
selector = "h1"
html = "<b>x</b>"
"#,
        )
        .unwrap();

        let times: Vec<_> = script.events.iter().map(|e| e.at_ms).collect();
        assert_eq!(times, [0, 50, 200]);
        assert_eq!(
            script.events[1].step,
            Step::Remove {
                selector: "footer".into()
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = Script::parse("[[events]]\naction = \"teleport\"\n").unwrap_err();
        assert!(matches!(err, ScriptError::Toml(_)));
    }

    #[test]
    fn test_step_into_event() {
        assert_eq!(Step::Scroll.into_event(), HostEvent::Scroll);
        assert_eq!(
            Step::Insert {
                parent: "body".into(),
                html: "<p>x</p>".into()
            }
            .into_event(),
            HostEvent::Mutate(PageMutation::Insert {
                parent: "body".into(),
                html: "<p>x</p>".into()
            })
        );
    }

    #[test]
    fn test_empty_script() {
        let script = Script::parse("").unwrap();
        assert!(script.events.is_empty());
    }
}
