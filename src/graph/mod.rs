//! Graph layer over the triple collection
//!
//! A [`Graph`] is what applications hold: asserted triples are its content,
//! quoted triples are reachable through it but never counted as content.
//! [`SharedGraph`] wraps one behind a reader/writer lock.

pub mod shared;

pub use shared::SharedGraph;

use crate::collection::{SubscriptionId, TripleCollection, TripleEvent};
use crate::config::StoreConfig;
use crate::index::{NestedIndex, TripleIndex, TripleIter};
use crate::rdf::{Node, Triple};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use tracing::debug;

/// In-memory RDF-star graph
#[derive(Debug)]
pub struct Graph<I: TripleIndex = NestedIndex> {
    collection: TripleCollection<I>,
}

impl Graph<NestedIndex> {
    pub fn new() -> Self {
        Self::with_index(NestedIndex::new())
    }
}

impl Default for Graph<NestedIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph<Box<dyn TripleIndex>> {
    /// Build a graph with the index strategy and capacity from `config`
    pub fn from_config(config: &StoreConfig) -> Self {
        debug!("Building graph from config: index={}", config.index);
        Self::with_capacity(config.index.build(), config.initial_capacity)
    }
}

impl<I: TripleIndex> Graph<I> {
    pub fn with_index(index: I) -> Self {
        Self {
            collection: TripleCollection::with_index(index),
        }
    }

    pub fn with_capacity(index: I, capacity: usize) -> Self {
        Self {
            collection: TripleCollection::with_capacity(index, capacity),
        }
    }

    /// The underlying collection, for quoted-triple and index level access
    pub fn collection(&self) -> &TripleCollection<I> {
        &self.collection
    }

    /// Assert a triple; `false` if it was already asserted
    pub fn assert(&mut self, triple: Triple) -> bool {
        self.collection.add(triple)
    }

    /// Assert every triple; `true` if at least one was new
    pub fn assert_all<T>(&mut self, triples: T) -> bool
    where
        T: IntoIterator<Item = Triple>,
    {
        let mut changed = false;
        for triple in triples {
            changed |= self.collection.add(triple);
        }
        changed
    }

    /// Retract a triple; `false` if it was not asserted
    pub fn retract(&mut self, triple: &Triple) -> bool {
        self.collection.delete(triple)
    }

    /// Retract every triple; `true` if at least one was asserted
    pub fn retract_all<T, B>(&mut self, triples: T) -> bool
    where
        T: IntoIterator<Item = B>,
        B: Borrow<Triple>,
    {
        let mut changed = false;
        for triple in triples {
            changed |= self.collection.delete(triple.borrow());
        }
        changed
    }

    /// Retract all content, raising a retraction event per triple
    pub fn clear(&mut self) {
        let asserted: Vec<Triple> = self.collection.iter().cloned().collect();
        debug!("Clearing graph of {} triples", asserted.len());
        self.retract_all(asserted);
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.collection.contains(triple)
    }

    pub fn contains_quoted(&self, triple: &Triple) -> bool {
        self.collection.contains_quoted(triple)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn quoted_len(&self) -> usize {
        self.collection.quoted_len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.collection.iter()
    }

    pub fn quoted_triples(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.collection.quoted()
    }

    /// Asserted triples matching the bound positions
    pub fn find<'a>(
        &'a self,
        subject: Option<&'a Node>,
        predicate: Option<&'a Node>,
        object: Option<&'a Node>,
    ) -> TripleIter<'a> {
        self.collection.find(subject, predicate, object)
    }

    /// Asserted triples with `node` as subject or object
    pub fn triples_with_node<'a>(
        &'a self,
        node: &'a Node,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.collection.with_subject(node).chain(
            self.collection
                .with_object(node)
                .filter(move |triple| triple.subject() != node),
        )
    }

    /// Distinct subjects of asserted triples, sorted
    pub fn subject_nodes(&self) -> Vec<Node> {
        self.distinct(Triple::subject)
    }

    /// Distinct predicates of asserted triples, sorted
    pub fn predicate_nodes(&self) -> Vec<Node> {
        self.distinct(Triple::predicate)
    }

    /// Distinct objects of asserted triples, sorted
    pub fn object_nodes(&self) -> Vec<Node> {
        self.distinct(Triple::object)
    }

    fn distinct(&self, position: fn(&Triple) -> &Node) -> Vec<Node> {
        self.collection
            .iter()
            .map(position)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// No asserted triple contains a blank node at any depth
    pub fn is_ground(&self) -> bool {
        self.collection.iter().all(Triple::is_ground)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&TripleEvent) + Send + Sync + 'static,
    {
        self.collection.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.collection.unsubscribe(id)
    }
}
