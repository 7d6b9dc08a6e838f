//! Compiled rule table and the two ways of applying it.
//!
//! - [`RuleTable::apply_direct`]: the element itself, first matching rule wins
//! - [`RuleTable::apply_subtree`]: every rule against every descendant
//! - [`RuleTable::apply`]: direct match, falling back to the subtree scan
//!
//! Selectors that the engine rejects stay in the table and are reported on
//! every pass instead of aborting anything.

mod fixup;

pub use crate::config::ContentRule;
pub use fixup::Fixups;

use scraper::Selector;

use crate::dom::{Document, Fragment, NodeId, parse_selector};
use crate::overrider::PassReport;

/// A rule with its selector parsed and replacement pre-parsed.
#[derive(Debug)]
pub struct CompiledRule {
    selector: String,
    matcher: Result<Selector, String>,
    replacement: Fragment,
}

impl CompiledRule {
    pub fn compile(rule: &ContentRule) -> Self {
        Self {
            selector: rule.selector.clone(),
            matcher: parse_selector(&rule.selector).map_err(|err| err.to_string()),
            replacement: Fragment::parse(&rule.replacement),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn replacement(&self) -> &Fragment {
        &self.replacement
    }

    pub fn is_valid(&self) -> bool {
        self.matcher.is_ok()
    }

    /// The parsed selector, or the reason it was rejected.
    pub fn matcher(&self) -> Result<&Selector, &str> {
        self.matcher.as_ref().map_err(String::as_str)
    }

    /// Write the replacement into `id`, counting real changes.
    fn write(&self, doc: &mut Document, id: NodeId, report: &mut PassReport) {
        // An earlier match in the same scan may have replaced this node.
        if !doc.is_connected(id) {
            return;
        }
        // Only non-elements fail here and callers never pass those.
        if let Ok(true) = doc.set_inner_html(id, &self.replacement) {
            report.rewrites += 1;
        }
    }
}

/// Ordered, read-only set of content rules.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    pub fn compile(rules: &[ContentRule]) -> Self {
        Self {
            rules: rules.iter().map(CompiledRule::compile).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    /// Rules whose selector the engine rejected.
    pub fn invalid(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter().filter(|rule| !rule.is_valid())
    }

    /// Rewrite `id` with the first rule matching it directly.
    ///
    /// Returns the index of the winning rule.
    pub fn apply_direct(
        &self,
        doc: &mut Document,
        id: NodeId,
        report: &mut PassReport,
    ) -> Option<usize> {
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.matcher() {
                Ok(selector) if doc.matches(id, selector) => {
                    rule.write(doc, id, report);
                    return Some(index);
                }
                Ok(_) => {}
                Err(reason) => report.invalid_selector(rule.selector(), reason),
            }
        }
        None
    }

    /// Rewrite every descendant of `id` matched by any rule, in table order.
    ///
    /// Overlapping rules both write; the later one in the table is what
    /// remains.
    pub fn apply_subtree(&self, doc: &mut Document, id: NodeId, report: &mut PassReport) {
        for rule in &self.rules {
            match rule.matcher() {
                Ok(selector) => {
                    for target in doc.select_within(id, selector) {
                        rule.write(doc, target, report);
                    }
                }
                Err(reason) => report.invalid_selector(rule.selector(), reason),
            }
        }
    }

    /// Direct match, or a subtree scan when nothing matched `id` itself.
    pub fn apply(&self, doc: &mut Document, id: NodeId, report: &mut PassReport) {
        if self.apply_direct(doc, id, report).is_none() {
            self.apply_subtree(doc, id, report);
        }
    }
}
