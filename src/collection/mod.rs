//! Indexed triple collection
//!
//! [`TripleCollection`] owns the map from each known triple to its
//! [`TripleRefs`] record and keeps a pluggable [`TripleIndex`] in step with
//! it. A triple can be asserted, quoted by other triples, or both; the record
//! is dropped as soon as it is neither.
//!
//! Asserting a triple quotes every triple nested in its subject or object,
//! and quoting a triple quotes everything it nests in turn. Retraction
//! releases the same references. Both directions walk an explicit work list,
//! as do triple equality, ordering and drop, so quotation depth is bounded
//! by memory rather than by the stack.

mod event;
mod refs;

pub use event::{SubscriptionId, TripleEvent};
pub use refs::{TripleRefs, TripleState, TripleStatus};

use crate::index::{Lookup, NestedIndex, TripleIndex, TripleIter};
use crate::rdf::{Node, Triple, TriplePattern};
pub(crate) use event::Observers;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Collection errors
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Exact-match access to a triple the collection does not know
    #[error("Triple not found: {0}")]
    NotFound(Triple),

    /// Counts or index contents disagree with the reference records
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Triple store core with reference counted quotation
pub struct TripleCollection<I: TripleIndex = NestedIndex> {
    triples: FxHashMap<Triple, TripleRefs>,
    index: I,
    asserted_count: usize,
    quoted_count: usize,
    observers: Observers,
}

impl TripleCollection<NestedIndex> {
    /// Create an empty collection with the default nested index
    pub fn new() -> Self {
        Self::with_index(NestedIndex::new())
    }
}

impl Default for TripleCollection<NestedIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: TripleIndex> TripleCollection<I> {
    /// Create an empty collection maintaining `index`
    pub fn with_index(index: I) -> Self {
        Self::with_capacity(index, 0)
    }

    pub fn with_capacity(index: I, capacity: usize) -> Self {
        debug!("Creating triple collection with {} index (capacity {})", index.name(), capacity);
        Self {
            triples: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            index,
            asserted_count: 0,
            quoted_count: 0,
            observers: Observers::default(),
        }
    }

    /// The active index strategy
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Assert a triple
    ///
    /// Returns `false` if it was already asserted. A triple that was only
    /// quoted keeps its record and becomes asserted as well.
    pub fn add(&mut self, triple: Triple) -> bool {
        match self.triples.entry(triple.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_asserted() {
                    return false;
                }
                entry.get_mut().asserted = true;
            }
            Entry::Vacant(entry) => {
                entry.insert(TripleRefs::asserted());
            }
        }

        self.asserted_count += 1;
        self.index.index_asserted(&triple);
        trace!("Asserted {}", triple);

        self.quote_all(triple.quoted_triples().cloned().collect());
        self.observers.notify(&TripleEvent::Asserted { triple });
        true
    }

    /// Retract a triple
    ///
    /// Returns `false` if it was not asserted; a quoted-only triple is left
    /// untouched. Quotations the triple held on nested triples are released.
    pub fn delete(&mut self, triple: &Triple) -> bool {
        let mut entry = match self.triples.entry(triple.clone()) {
            Entry::Occupied(entry) if entry.get().is_asserted() => entry,
            _ => return false,
        };
        entry.get_mut().asserted = false;
        if entry.get().is_unreferenced() {
            entry.remove();
        }

        self.asserted_count -= 1;
        self.index.unindex_asserted(triple);
        trace!("Retracted {}", triple);

        self.unquote_all(triple.quoted_triples().cloned().collect());
        self.observers.notify(&TripleEvent::Retracted {
            triple: triple.clone(),
        });
        true
    }

    /// Add one quotation reference to `triple` and, transitively, to every
    /// triple it quotes
    pub fn add_quoted(&mut self, triple: &Triple) {
        self.quote_all(vec![triple.clone()]);
    }

    /// Release one quotation reference on `triple` and on everything it quotes
    ///
    /// Returns `false` without descending if `triple` is not quoted.
    pub fn remove_quoted(&mut self, triple: &Triple) -> bool {
        if !self.contains_quoted(triple) {
            return false;
        }
        self.unquote_all(vec![triple.clone()]);
        true
    }

    fn quote_all(&mut self, mut pending: Vec<Triple>) {
        while let Some(triple) = pending.pop() {
            self.add_quote_ref(&triple);
            pending.extend(triple.quoted_triples().cloned());
        }
    }

    fn add_quote_ref(&mut self, triple: &Triple) {
        let refs = self.triples.entry(triple.clone()).or_default();
        refs.quote_count += 1;
        if refs.quote_count == 1 {
            self.quoted_count += 1;
            self.index.index_quoted(triple);
            trace!("Quoted {}", triple);
        }
    }

    fn unquote_all(&mut self, mut pending: Vec<Triple>) {
        while let Some(triple) = pending.pop() {
            if self.remove_quote_ref(&triple) {
                pending.extend(triple.quoted_triples().cloned());
            }
        }
    }

    /// Returns whether a reference was actually released
    fn remove_quote_ref(&mut self, triple: &Triple) -> bool {
        let refs = match self.triples.get_mut(triple) {
            Some(refs) if refs.is_quoted() => refs,
            _ => return false,
        };
        refs.quote_count -= 1;
        if refs.is_quoted() {
            return true;
        }

        if refs.is_unreferenced() {
            self.triples.remove(triple);
        }
        self.quoted_count -= 1;
        self.index.unindex_quoted(triple);
        trace!("Unquoted {}", triple);
        true
    }

    /// Whether `triple` is asserted
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.get(triple).map_or(false, |refs| refs.is_asserted())
    }

    /// Whether `triple` is quoted at least once
    pub fn contains_quoted(&self, triple: &Triple) -> bool {
        self.triples.get(triple).map_or(false, |refs| refs.is_quoted())
    }

    /// Number of asserted triples
    pub fn len(&self) -> usize {
        self.asserted_count
    }

    /// Number of triples with at least one quotation reference
    pub fn quoted_len(&self) -> usize {
        self.quoted_count
    }

    /// Number of records, asserted or quoted
    pub fn known_len(&self) -> usize {
        self.triples.len()
    }

    /// No asserted triples (quoted-only records may remain)
    pub fn is_empty(&self) -> bool {
        self.asserted_count == 0
    }

    /// The stored instance equal to `triple`
    pub fn get(&self, triple: &Triple) -> CollectionResult<&Triple> {
        self.triples
            .get_key_value(triple)
            .map(|(stored, _)| stored)
            .ok_or_else(|| CollectionError::NotFound(triple.clone()))
    }

    /// Reference record for `triple`, if it is known
    pub fn refs(&self, triple: &Triple) -> Option<TripleRefs> {
        self.triples.get(triple).copied()
    }

    /// All asserted triples, unordered
    pub fn iter(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.with_status(TripleStatus::Asserted)
    }

    /// All quoted triples, unordered
    pub fn quoted(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.with_status(TripleStatus::Quoted)
    }

    /// Every known triple with its record
    pub fn iter_known(&self) -> impl Iterator<Item = (&Triple, TripleRefs)> + '_ {
        self.triples.iter().map(|(triple, refs)| (triple, *refs))
    }

    fn with_status(&self, status: TripleStatus) -> impl Iterator<Item = &Triple> + '_ {
        self.triples
            .iter()
            .filter(move |(_, refs)| refs.has_status(status))
            .map(|(triple, _)| triple)
    }

    /// Answer a single or dual position lookup, scanning when the index
    /// does not cover it
    pub fn lookup<'a>(&'a self, status: TripleStatus, lookup: Lookup<'a>) -> TripleIter<'a> {
        match self.index.lookup(status, lookup) {
            Some(hits) => hits,
            None => Box::new(
                self.with_status(status)
                    .filter(move |triple| lookup.matches(triple)),
            ),
        }
    }

    pub fn with_subject<'a>(&'a self, subject: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::Subject(subject))
    }

    pub fn with_predicate<'a>(&'a self, predicate: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::Predicate(predicate))
    }

    pub fn with_object<'a>(&'a self, object: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::Object(object))
    }

    pub fn with_subject_predicate<'a>(
        &'a self,
        subject: &'a Node,
        predicate: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::SubjectPredicate(subject, predicate))
    }

    pub fn with_predicate_object<'a>(
        &'a self,
        predicate: &'a Node,
        object: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::PredicateObject(predicate, object))
    }

    pub fn with_subject_object<'a>(
        &'a self,
        subject: &'a Node,
        object: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Asserted, Lookup::SubjectObject(subject, object))
    }

    pub fn quoted_with_subject<'a>(&'a self, subject: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::Subject(subject))
    }

    pub fn quoted_with_predicate<'a>(&'a self, predicate: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::Predicate(predicate))
    }

    pub fn quoted_with_object<'a>(&'a self, object: &'a Node) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::Object(object))
    }

    pub fn quoted_with_subject_predicate<'a>(
        &'a self,
        subject: &'a Node,
        predicate: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::SubjectPredicate(subject, predicate))
    }

    pub fn quoted_with_predicate_object<'a>(
        &'a self,
        predicate: &'a Node,
        object: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::PredicateObject(predicate, object))
    }

    pub fn quoted_with_subject_object<'a>(
        &'a self,
        subject: &'a Node,
        object: &'a Node,
    ) -> TripleIter<'a> {
        self.lookup(TripleStatus::Quoted, Lookup::SubjectObject(subject, object))
    }

    /// Asserted triples matching the bound positions (`None` = wildcard)
    pub fn find<'a>(
        &'a self,
        subject: Option<&'a Node>,
        predicate: Option<&'a Node>,
        object: Option<&'a Node>,
    ) -> TripleIter<'a> {
        self.find_with_status(TripleStatus::Asserted, subject, predicate, object)
    }

    /// Quoted triples matching the bound positions (`None` = wildcard)
    pub fn find_quoted<'a>(
        &'a self,
        subject: Option<&'a Node>,
        predicate: Option<&'a Node>,
        object: Option<&'a Node>,
    ) -> TripleIter<'a> {
        self.find_with_status(TripleStatus::Quoted, subject, predicate, object)
    }

    pub fn matching<'a>(&'a self, pattern: &'a TriplePattern) -> TripleIter<'a> {
        self.find(pattern.subject.as_ref(), pattern.predicate.as_ref(), pattern.object.as_ref())
    }

    /// Dispatch to the narrowest lookup for the bound positions
    pub fn find_with_status<'a>(
        &'a self,
        status: TripleStatus,
        subject: Option<&'a Node>,
        predicate: Option<&'a Node>,
        object: Option<&'a Node>,
    ) -> TripleIter<'a> {
        match (subject, predicate, object) {
            (None, None, None) => Box::new(self.with_status(status)),
            (Some(s), Some(p), Some(o)) => {
                let key = Triple::new(s.clone(), p.clone(), o.clone());
                let hit = self
                    .triples
                    .get_key_value(&key)
                    .filter(|(_, refs)| refs.has_status(status))
                    .map(|(triple, _)| triple);
                Box::new(hit.into_iter())
            }
            (Some(s), None, None) => self.lookup(status, Lookup::Subject(s)),
            (None, Some(p), None) => self.lookup(status, Lookup::Predicate(p)),
            (None, None, Some(o)) => self.lookup(status, Lookup::Object(o)),
            (Some(s), Some(p), None) => self.lookup(status, Lookup::SubjectPredicate(s, p)),
            (None, Some(p), Some(o)) => self.lookup(status, Lookup::PredicateObject(p, o)),
            (Some(s), None, Some(o)) => self.lookup(status, Lookup::SubjectObject(s, o)),
        }
    }

    /// Drop every record and index entry without raising events
    pub fn clear(&mut self) {
        debug!(
            "Clearing collection ({} asserted, {} quoted)",
            self.asserted_count, self.quoted_count
        );
        self.triples.clear();
        self.index.clear();
        self.asserted_count = 0;
        self.quoted_count = 0;
    }

    /// Register an observer for assertion and retraction events
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&TripleEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(observer))
    }

    /// Returns `false` if the subscription was already removed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Recompute counts and re-derive every index answer by brute force
    pub fn check_integrity(&self) -> CollectionResult<()> {
        let result = self.verify();
        if let Err(ref e) = result {
            warn!("{} index failed integrity check: {}", self.index.name(), e);
        }
        result
    }

    fn verify(&self) -> CollectionResult<()> {
        let mut asserted = 0;
        let mut quoted = 0;

        for (triple, refs) in &self.triples {
            if refs.is_unreferenced() {
                return Err(integrity(format!("unreferenced record for {}", triple)));
            }
            if refs.is_asserted() {
                asserted += 1;
            }
            if refs.is_quoted() {
                quoted += 1;
            }

            for status in [TripleStatus::Asserted, TripleStatus::Quoted] {
                let expected = refs.has_status(status);
                for lookup in Lookup::all_for(triple) {
                    let mut found = false;
                    for hit in self.lookup(status, lookup) {
                        if !lookup.matches(hit) {
                            return Err(integrity(format!(
                                "{:?} returned non-matching {}",
                                lookup, hit
                            )));
                        }
                        if !self.triples.get(hit).map_or(false, |r| r.has_status(status)) {
                            return Err(integrity(format!(
                                "{:?} returned stale {} for {:?}",
                                lookup, hit, status
                            )));
                        }
                        found |= hit == triple;
                    }
                    if found != expected {
                        return Err(integrity(format!(
                            "{} {} by {:?} under {:?}",
                            triple,
                            if expected { "unreachable" } else { "reachable" },
                            lookup,
                            status
                        )));
                    }
                }
            }
        }

        if asserted != self.asserted_count {
            return Err(integrity(format!(
                "asserted count {} but {} records are asserted",
                self.asserted_count, asserted
            )));
        }
        if quoted != self.quoted_count {
            return Err(integrity(format!(
                "quoted count {} but {} records are quoted",
                self.quoted_count, quoted
            )));
        }
        let expected = [(TripleStatus::Asserted, asserted), (TripleStatus::Quoted, quoted)];
        for (status, count) in expected {
            if let Some(indexed) = self.index.indexed_len(status) {
                if indexed != count {
                    return Err(integrity(format!(
                        "index holds {} {:?} triples, expected {}",
                        indexed, status, count
                    )));
                }
            }
        }
        Ok(())
    }
}

fn integrity(message: String) -> CollectionError {
    CollectionError::Integrity(message)
}

impl<I: TripleIndex> fmt::Debug for TripleCollection<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripleCollection")
            .field("index", &self.index.name())
            .field("asserted", &self.asserted_count)
            .field("quoted", &self.quoted_count)
            .field("known", &self.triples.len())
            .field("observers", &self.observers)
            .finish()
    }
}

impl<I: TripleIndex> Extend<Triple> for TripleCollection<I> {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, triples: T) {
        for triple in triples {
            self.add(triple);
        }
    }
}

impl FromIterator<Triple> for TripleCollection<NestedIndex> {
    fn from_iter<T: IntoIterator<Item = Triple>>(triples: T) -> Self {
        let mut collection = Self::new();
        collection.extend(triples);
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatIndex, ScanIndex};
    use std::sync::{Arc, Mutex};

    fn uri(s: &str) -> Node {
        Node::uri(&format!("http://example.org/{}", s)).unwrap()
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(uri(s), uri(p), uri(o))
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut collection = TripleCollection::new();
        let t = triple("a", "p", "b");

        assert!(collection.add(t.clone()));
        assert!(!collection.add(t.clone()));
        assert_eq!(collection.len(), 1);
        assert!(collection.contains(&t));
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut collection = TripleCollection::new();
        collection.add(triple("a", "p", "b"));

        assert!(!collection.delete(&triple("x", "p", "y")));
        assert_eq!(collection.len(), 1);
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_delete_quoted_only_is_noop() {
        let mut collection = TripleCollection::new();
        let inner = triple("a", "p", "b");
        collection.add(Triple::new(uri("c"), uri("q"), Node::quoted(inner.clone())));

        assert!(!collection.delete(&inner));
        assert!(collection.contains_quoted(&inner));
        assert_eq!(collection.quoted_len(), 1);
    }

    #[test]
    fn test_quote_then_assert_shares_record() {
        let mut collection = TripleCollection::with_index(FlatIndex::new());
        let inner = triple("a", "p", "b");
        collection.add_quoted(&inner);
        assert_eq!(collection.refs(&inner).unwrap().state(), Some(TripleState::QuotedOnly));

        assert!(collection.add(inner.clone()));
        assert_eq!(collection.refs(&inner).unwrap().state(), Some(TripleState::AssertedAndQuoted));
        assert_eq!(collection.known_len(), 1);

        assert!(collection.remove_quoted(&inner));
        assert_eq!(collection.refs(&inner).unwrap().state(), Some(TripleState::AssertedOnly));
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_remove_quoted_unquoted_is_noop() {
        let mut collection = TripleCollection::new();
        let t = triple("a", "p", "b");
        collection.add(t.clone());

        assert!(!collection.remove_quoted(&t));
        assert!(!collection.remove_quoted(&triple("x", "y", "z")));
        assert_eq!(collection.refs(&t).unwrap().quote_count(), 0);
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_quote_count_tracks_every_site() {
        let mut collection = TripleCollection::new();
        let inner = triple("a", "p", "b");
        let q1 = Triple::new(Node::quoted(inner.clone()), uri("says"), uri("x"));
        let q2 = Triple::new(uri("y"), uri("says"), Node::quoted(inner.clone()));

        collection.add(q1.clone());
        collection.add(q2.clone());
        assert_eq!(collection.refs(&inner).unwrap().quote_count(), 2);
        assert_eq!(collection.quoted_len(), 1);

        collection.delete(&q1);
        assert!(collection.contains_quoted(&inner));
        collection.delete(&q2);
        assert!(collection.refs(&inner).is_none());
        assert_eq!(collection.quoted_len(), 0);
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_get_returns_stored_or_not_found() {
        let mut collection = TripleCollection::with_index(ScanIndex);
        let t = triple("a", "p", "b");
        collection.add(t.clone());

        assert_eq!(collection.get(&t).unwrap(), &t);
        let missing = triple("x", "p", "y");
        assert!(matches!(
            collection.get(&missing),
            Err(CollectionError::NotFound(ref m)) if *m == missing
        ));
    }

    #[test]
    fn test_find_dispatch() {
        let mut collection = TripleCollection::new();
        let t1 = triple("a", "p", "b");
        let t2 = triple("a", "q", "c");
        collection.add(t1.clone());
        collection.add(t2.clone());

        let a = uri("a");
        let p = uri("p");
        let b = uri("b");
        assert_eq!(collection.find(None, None, None).count(), 2);
        assert_eq!(collection.find(Some(&a), None, None).count(), 2);
        assert_eq!(collection.find(Some(&a), Some(&p), Some(&b)).collect::<Vec<_>>(), vec![&t1]);
        assert_eq!(collection.find(Some(&b), Some(&p), Some(&a)).count(), 0);
        assert_eq!(collection.find(None, Some(&p), None).collect::<Vec<_>>(), vec![&t1]);
        assert_eq!(collection.find_quoted(Some(&a), None, None).count(), 0);

        let pattern = TriplePattern::new(None, Some(uri("q")), None);
        assert_eq!(collection.matching(&pattern).collect::<Vec<_>>(), vec![&t2]);
    }

    #[test]
    fn test_events_only_for_assertion_changes() {
        let mut collection = TripleCollection::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = collection.subscribe(move |event: &TripleEvent| {
            sink.lock().unwrap().push((event.is_assertion(), event.triple().clone()));
        });

        let inner = triple("a", "p", "b");
        let outer = Triple::new(uri("c"), uri("p"), Node::quoted(inner.clone()));
        collection.add_quoted(&inner);
        collection.add(outer.clone());
        collection.add(outer.clone());
        collection.delete(&outer);
        collection.remove_quoted(&inner);

        assert_eq!(*events.lock().unwrap(), vec![(true, outer.clone()), (false, outer.clone())]);

        assert!(collection.unsubscribe(id));
        collection.add(inner);
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut collection = TripleCollection::with_index(FlatIndex::new());
        let inner = triple("a", "p", "b");
        collection.add(Triple::new(uri("c"), uri("p"), Node::quoted(inner.clone())));
        collection.clear();

        assert_eq!(collection.len(), 0);
        assert_eq!(collection.quoted_len(), 0);
        assert_eq!(collection.known_len(), 0);
        assert_eq!(collection.quoted_with_subject(&uri("a")).count(), 0);
        collection.check_integrity().unwrap();
    }

    #[test]
    fn test_from_iterator() {
        let triples = vec![triple("a", "p", "b"), triple("a", "p", "b"), triple("c", "p", "d")];
        let collection: TripleCollection = triples.into_iter().collect();
        assert_eq!(collection.len(), 2);
    }
}
