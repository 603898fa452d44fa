//! Reader/writer locked graph handle
//!
//! Readers share the lock, any writer excludes everyone else. Work that must
//! see a consistent graph across several calls goes through [`SharedGraph::read`]
//! or [`SharedGraph::write`]; the closure receives the graph itself, so nested
//! calls inside it never touch the lock again.
//!
//! Observers registered through [`SharedGraph::subscribe`] run after the write
//! lock is released, so they may call back into any clone of the handle.
//! Events from one write are delivered in order; deliveries from concurrent
//! writers may interleave. Observers registered on the inner [`Graph`] itself
//! still run under the lock.

use super::Graph;
use crate::collection::{Observers, SubscriptionId, TripleEvent};
use crate::index::{NestedIndex, TripleIndex};
use crate::rdf::{Node, Triple};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{trace, warn};

/// Cloneable, thread-safe handle to a [`Graph`]
#[derive(Debug)]
pub struct SharedGraph<I: TripleIndex = NestedIndex> {
    inner: Arc<RwLock<Graph<I>>>,
    /// Events raised under the write lock, not yet delivered
    pending: Arc<Mutex<Vec<TripleEvent>>>,
    observers: Arc<RwLock<Observers>>,
}

impl<I: TripleIndex> Clone for SharedGraph<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            pending: Arc::clone(&self.pending),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl SharedGraph<NestedIndex> {
    pub fn new() -> Self {
        Self::from_graph(Graph::new())
    }
}

impl Default for SharedGraph<NestedIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: TripleIndex> From<Graph<I>> for SharedGraph<I> {
    fn from(graph: Graph<I>) -> Self {
        Self::from_graph(graph)
    }
}

impl<I: TripleIndex> SharedGraph<I> {
    pub fn from_graph(mut graph: Graph<I>) -> Self {
        let pending = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::clone(&pending);
        graph.subscribe(move |event: &TripleEvent| lock_pending(&queue).push(event.clone()));

        Self {
            inner: Arc::new(RwLock::new(graph)),
            pending,
            observers: Arc::new(RwLock::new(Observers::default())),
        }
    }

    // Collection operations finish before any event is raised, so a panic
    // in a write closure after an operation leaves a consistent graph.
    fn read_guard(&self) -> RwLockReadGuard<'_, Graph<I>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Recovering graph from poisoned lock (read)");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Graph<I>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Recovering graph from poisoned lock (write)");
            PoisonError::into_inner(poisoned)
        })
    }

    fn dispatch(&self, events: Vec<TripleEvent>) {
        if events.is_empty() {
            return;
        }
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        trace!("Delivering {} events to {} observers", events.len(), observers.len());
        for event in &events {
            observers.notify(event);
        }
    }

    /// Run `f` under the shared lock
    pub fn read<R>(&self, f: impl FnOnce(&Graph<I>) -> R) -> R {
        f(&self.read_guard())
    }

    /// Run `f` under the exclusive lock, then deliver the events it raised
    pub fn write<R>(&self, f: impl FnOnce(&mut Graph<I>) -> R) -> R {
        let (result, events) = {
            let mut graph = self.write_guard();
            let result = f(&mut graph);
            let events = mem::take(&mut *lock_pending(&self.pending));
            (result, events)
        };
        self.dispatch(events);
        result
    }

    pub fn assert(&self, triple: Triple) -> bool {
        self.write(|graph| graph.assert(triple))
    }

    pub fn assert_all<T>(&self, triples: T) -> bool
    where
        T: IntoIterator<Item = Triple>,
    {
        self.write(|graph| graph.assert_all(triples))
    }

    pub fn retract(&self, triple: &Triple) -> bool {
        self.write(|graph| graph.retract(triple))
    }

    pub fn retract_all<T>(&self, triples: T) -> bool
    where
        T: IntoIterator<Item = Triple>,
    {
        self.write(|graph| graph.retract_all(triples))
    }

    pub fn clear(&self) {
        self.write(|graph| graph.clear())
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.read(|graph| graph.contains(triple))
    }

    pub fn contains_quoted(&self, triple: &Triple) -> bool {
        self.read(|graph| graph.contains_quoted(triple))
    }

    pub fn len(&self) -> usize {
        self.read(|graph| graph.len())
    }

    pub fn quoted_len(&self) -> usize {
        self.read(|graph| graph.quoted_len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|graph| graph.is_empty())
    }

    /// Snapshot of the asserted triples
    pub fn triples(&self) -> Vec<Triple> {
        self.read(|graph| graph.triples().cloned().collect())
    }

    /// Snapshot of the asserted triples matching the bound positions
    pub fn find(
        &self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Vec<Triple> {
        self.read(|graph| graph.find(subject, predicate, object).cloned().collect())
    }

    /// Register an observer that runs outside the graph lock
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&TripleEvent) + Send + Sync + 'static,
    {
        self.observers_mut().subscribe(Arc::new(observer))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers_mut().unsubscribe(id)
    }

    fn observers_mut(&self) -> RwLockWriteGuard<'_, Observers> {
        self.observers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_pending(pending: &Mutex<Vec<TripleEvent>>) -> MutexGuard<'_, Vec<TripleEvent>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn uri(s: &str) -> Node {
        Node::uri(&format!("http://example.org/{}", s)).unwrap()
    }

    #[test]
    fn test_concurrent_writers() {
        let graph = SharedGraph::new();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let graph = graph.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let subject = uri(&format!("w{}", worker));
                        let t = Triple::new(subject, uri("p"), uri(&format!("o{}", i)));
                        assert!(graph.assert(t));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(graph.len(), 200);
        assert_eq!(graph.find(Some(&uri("w2")), None, None).len(), 50);
        graph.read(|g| g.collection().check_integrity()).unwrap();
    }

    #[test]
    fn test_write_closure_is_atomic_unit() {
        let graph = SharedGraph::new();
        let t = Triple::new(uri("a"), uri("p"), uri("b"));
        let outcome = graph.write(|g| {
            let first = g.assert(t.clone());
            let second = g.assert(t.clone());
            (first, second, g.len())
        });
        assert_eq!(outcome, (true, false, 1));
    }

    #[test]
    fn test_observer_panic_leaves_lock_usable() {
        let graph = SharedGraph::new();
        graph.subscribe(|event: &TripleEvent| {
            if event.is_assertion() {
                panic!("observer failure");
            }
        });

        let t = Triple::new(uri("a"), uri("p"), uri("b"));
        let worker = graph.clone();
        let t2 = t.clone();
        assert!(thread::spawn(move || worker.assert(t2)).join().is_err());

        assert!(!graph.inner.is_poisoned());
        assert!(graph.contains(&t));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_recovers_after_panicking_writer() {
        let graph = SharedGraph::new();
        let t = Triple::new(uri("a"), uri("p"), uri("b"));
        let worker = graph.clone();
        let t2 = t.clone();
        let outcome = thread::spawn(move || {
            worker.write(|g| {
                if g.assert(t2) {
                    panic!("writer failure");
                }
            })
        })
        .join();
        assert!(outcome.is_err());
        assert!(graph.inner.is_poisoned());

        assert!(graph.contains(&t));
        assert!(graph.retract(&t));
        graph.read(|g| g.collection().check_integrity()).unwrap();
    }

    #[test]
    fn test_observers_can_call_back_into_graph() {
        let graph = SharedGraph::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = graph.clone();
        let sink = Arc::clone(&seen);
        graph.subscribe(move |event: &TripleEvent| {
            let visible = handle.contains(event.triple());
            sink.lock().unwrap().push((event.is_assertion(), visible, handle.len()));
        });

        // An observer may also write; the nested write delivers its own events
        let writer = graph.clone();
        let derived = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&derived);
        graph.subscribe(move |event: &TripleEvent| {
            if event.is_assertion() && event.triple().predicate() == &uri("p") {
                let quoted = Node::quoted(event.triple().clone());
                let note = Triple::new(uri("log"), uri("noted"), quoted);
                if writer.assert(note) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        let t = Triple::new(uri("a"), uri("p"), uri("b"));
        assert!(graph.assert(t.clone()));
        assert_eq!(derived.load(Ordering::SeqCst), 1);
        assert_eq!(graph.len(), 2);
        assert!(graph.contains_quoted(&t));

        assert!(graph.retract(&t));
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], (true, true, 1));
        assert_eq!(seen[1], (true, true, 2));
        assert_eq!(seen[2], (false, false, 1));
        assert_eq!(seen.len(), 3);
    }
}
