//! Pluggable index strategies
//!
//! A [`TripleIndex`] receives exactly one hook call per state transition of
//! a triple (asserted on/off, quoted 0→1 / 1→0) and answers single and
//! dual position lookups for each status partition. Returning `None` from
//! [`TripleIndex::lookup`] tells the collection to fall back to a full scan.

pub mod flat;
pub mod nested;

pub use flat::FlatIndex;
pub use nested::NestedIndex;

use crate::collection::TripleStatus;
use crate::rdf::{Node, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lazily produced, unordered lookup results
pub type TripleIter<'a> = Box<dyn Iterator<Item = &'a Triple> + 'a>;

/// A single or dual position lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Subject(&'a Node),
    Predicate(&'a Node),
    Object(&'a Node),
    SubjectPredicate(&'a Node, &'a Node),
    PredicateObject(&'a Node, &'a Node),
    SubjectObject(&'a Node, &'a Node),
}

impl<'a> Lookup<'a> {
    pub fn matches(&self, triple: &Triple) -> bool {
        match *self {
            Lookup::Subject(s) => triple.subject() == s,
            Lookup::Predicate(p) => triple.predicate() == p,
            Lookup::Object(o) => triple.object() == o,
            Lookup::SubjectPredicate(s, p) => triple.subject() == s && triple.predicate() == p,
            Lookup::PredicateObject(p, o) => triple.predicate() == p && triple.object() == o,
            Lookup::SubjectObject(s, o) => triple.subject() == s && triple.object() == o,
        }
    }

    /// The six lookups a given triple must be reachable through
    pub fn all_for(triple: &'a Triple) -> [Lookup<'a>; 6] {
        let (s, p, o) = (triple.subject(), triple.predicate(), triple.object());
        [
            Lookup::Subject(s),
            Lookup::Predicate(p),
            Lookup::Object(o),
            Lookup::SubjectPredicate(s, p),
            Lookup::PredicateObject(p, o),
            Lookup::SubjectObject(s, o),
        ]
    }
}

/// Index maintenance hooks plus optional indexed lookups
///
/// The collection guarantees hooks are never called redundantly:
/// `index_asserted` only for a triple not currently asserted,
/// `index_quoted` only on a quote count transition from 0 to 1, and the
/// `unindex_*` hooks only on the reverse transitions.
pub trait TripleIndex: fmt::Debug + Send + Sync {
    /// Strategy name, used in logs
    fn name(&self) -> &'static str;

    fn index_asserted(&mut self, triple: &Triple);

    fn unindex_asserted(&mut self, triple: &Triple);

    fn index_quoted(&mut self, triple: &Triple);

    fn unindex_quoted(&mut self, triple: &Triple);

    /// Drop every indexed triple
    fn clear(&mut self);

    /// Indexed answer for `lookup`, or `None` if this strategy does not
    /// index that combination
    fn lookup<'a>(&'a self, _status: TripleStatus, _lookup: Lookup<'a>) -> Option<TripleIter<'a>> {
        None
    }

    /// Number of distinct triples held in a partition, if tracked
    fn indexed_len(&self, _status: TripleStatus) -> Option<usize> {
        None
    }
}

impl TripleIndex for Box<dyn TripleIndex> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn index_asserted(&mut self, triple: &Triple) {
        (**self).index_asserted(triple)
    }

    fn unindex_asserted(&mut self, triple: &Triple) {
        (**self).unindex_asserted(triple)
    }

    fn index_quoted(&mut self, triple: &Triple) {
        (**self).index_quoted(triple)
    }

    fn unindex_quoted(&mut self, triple: &Triple) {
        (**self).unindex_quoted(triple)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn lookup<'a>(&'a self, status: TripleStatus, lookup: Lookup<'a>) -> Option<TripleIter<'a>> {
        (**self).lookup(status, lookup)
    }

    fn indexed_len(&self, status: TripleStatus) -> Option<usize> {
        (**self).indexed_len(status)
    }
}

/// Keeps no structures; every lookup is answered by scanning the collection
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanIndex;

impl TripleIndex for ScanIndex {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn index_asserted(&mut self, _triple: &Triple) {}

    fn unindex_asserted(&mut self, _triple: &Triple) {}

    fn index_quoted(&mut self, _triple: &Triple) {}

    fn unindex_quoted(&mut self, _triple: &Triple) {}

    fn clear(&mut self) {}
}

/// Index strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Ordered per-position maps, dual lookups by intersection
    Flat,
    /// Hashed two-level pair maps, direct dual lookups
    #[default]
    Nested,
    /// No index, every lookup scans
    Scan,
}

impl IndexKind {
    pub fn build(self) -> Box<dyn TripleIndex> {
        match self {
            IndexKind::Flat => Box::new(FlatIndex::new()),
            IndexKind::Nested => Box::new(NestedIndex::new()),
            IndexKind::Scan => Box::new(ScanIndex),
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Flat => "flat",
            IndexKind::Nested => "nested",
            IndexKind::Scan => "scan",
        };
        write!(f, "{}", name)
    }
}
