//! Collection change events
//!
//! Only assertions and retractions are reported. A triple gaining or losing
//! quotation references is not graph content and raises nothing.

use crate::rdf::Triple;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum TripleEvent {
    /// A triple became asserted
    Asserted { triple: Triple },
    /// A triple stopped being asserted (it may still be quoted)
    Retracted { triple: Triple },
}

impl TripleEvent {
    pub fn triple(&self) -> &Triple {
        match self {
            TripleEvent::Asserted { triple } | TripleEvent::Retracted { triple } => triple,
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, TripleEvent::Asserted { .. })
    }

    /// Whether the triple carried an originating context
    pub fn has_context(&self) -> bool {
        self.triple().context().is_some()
    }
}

/// Handle returned by `subscribe`, redeemed with `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&TripleEvent) + Send + Sync>;

/// Observer list owned by a collection or a shared graph
///
/// Cloning snapshots the list; the observers themselves are shared.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn notify(&self, event: &TripleEvent) {
        for (_, observer) in &self.observers {
            observer(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}
