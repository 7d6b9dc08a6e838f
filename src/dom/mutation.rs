//! Mutation records and observer registrations.
//!
//! Observers never run code at mutation time: matching records are queued on
//! the registration and handed out by [`Document::take_records`], so callers
//! decide when a notification turn happens.
//!
//! [`Document::take_records`]: super::Document::take_records

use ego_tree::NodeId;

/// Handle returned by `Document::observe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// What an observer wants to hear about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Child insertions and removals.
    pub child_list: bool,
    /// Also report mutations of descendants of the observed node.
    pub subtree: bool,
    /// Attribute changes.
    pub attributes: bool,
    /// Restrict attribute records to these names (`None` = all).
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserveOptions {
    /// Child list + filtered attributes over a whole subtree.
    pub fn subtree_with_attributes(filter: &[String]) -> Self {
        Self {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: Some(filter.to_vec()),
        }
    }

    /// A single attribute on a single element.
    pub fn attribute(name: &str) -> Self {
        Self {
            child_list: false,
            subtree: false,
            attributes: true,
            attribute_filter: Some(vec![name.to_owned()]),
        }
    }

    fn wants(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::Attributes { name, .. } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|filter| filter.iter().any(|f| f == name))
            }
        }
    }
}

/// Kind-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attributes {
        name: String,
        old_value: Option<String>,
    },
}

/// One observed change. `target` is the node whose children or attributes
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList { added, removed },
        }
    }

    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            target,
            kind: MutationKind::Attributes {
                name: name.to_owned(),
                old_value,
            },
        }
    }

    /// Name of the changed attribute, if this is an attribute record.
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name, .. } => Some(name),
            MutationKind::ChildList { .. } => None,
        }
    }
}

struct Registration {
    id: ObserverId,
    target: NodeId,
    options: ObserveOptions,
    queue: Vec<MutationRecord>,
}

/// All live observer registrations of a document.
#[derive(Default)]
pub(super) struct Observers {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl Observers {
    pub(super) fn register(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.registrations.push(Registration {
            id,
            target,
            options,
            queue: Vec::new(),
        });
        id
    }

    /// Drop a registration and its pending records. Returns false if unknown.
    pub(super) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub(super) fn take(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| std::mem::take(&mut r.queue))
            .unwrap_or_default()
    }

    pub(super) fn has_pending(&self) -> bool {
        self.registrations.iter().any(|r| !r.queue.is_empty())
    }

    pub(super) fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Queue `record` on every registration interested in it.
    ///
    /// `within(observed, target)` must report whether `target` is a strict
    /// descendant of `observed`; it is evaluated at mutation time, while the
    /// target is still attached.
    pub(super) fn dispatch(
        &mut self,
        record: &MutationRecord,
        within: impl Fn(NodeId, NodeId) -> bool,
    ) {
        for registration in &mut self.registrations {
            if !registration.options.wants(&record.kind) {
                continue;
            }
            let in_scope = registration.target == record.target
                || (registration.options.subtree && within(registration.target, record.target));
            if in_scope {
                registration.queue.push(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (NodeId, NodeId) {
        let mut tree = ego_tree::Tree::new(0u8);
        let child = tree.root_mut().append(1).id();
        (tree.root().id(), child)
    }

    #[test]
    fn test_attribute_filter() {
        let options = ObserveOptions::attribute("placeholder");
        let (root, _) = ids();
        assert!(options.wants(&MutationRecord::attribute(root, "placeholder", None).kind));
        assert!(!options.wants(&MutationRecord::attribute(root, "class", None).kind));
        assert!(!options.wants(&MutationRecord::child_list(root, vec![], vec![]).kind));
    }

    #[test]
    fn test_dispatch_respects_subtree_flag() {
        let (root, child) = ids();
        let mut observers = Observers::default();
        let deep = observers.register(root, ObserveOptions::subtree_with_attributes(&[]));
        let shallow = observers.register(
            root,
            ObserveOptions {
                child_list: true,
                ..Default::default()
            },
        );

        let record = MutationRecord::child_list(child, vec![], vec![]);
        observers.dispatch(&record, |observed, target| observed == root && target == child);

        assert_eq!(observers.take(deep), vec![record]);
        assert!(observers.take(shallow).is_empty());
        assert!(!observers.has_pending());
    }

    #[test]
    fn test_disconnect_drops_queue() {
        let (root, _) = ids();
        let mut observers = Observers::default();
        let id = observers.register(root, ObserveOptions::attribute("src"));
        observers.dispatch(&MutationRecord::attribute(root, "src", None), |_, _| false);
        assert!(observers.has_pending());

        assert!(observers.disconnect(id));
        assert!(!observers.has_pending());
        assert!(!observers.disconnect(id));
        assert_eq!(observers.len(), 0);
    }
}
