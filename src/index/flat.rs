//! Ordered per-position index
//!
//! One `BTreeMap<Node, HashSet<Triple>>` per position and status. Dual
//! position lookups intersect two single position sets, walking the smaller
//! and probing the larger. Memory is roughly three entries per triple.

use super::{Lookup, TripleIndex, TripleIter};
use crate::collection::TripleStatus;
use crate::rdf::{Node, Triple};
use std::collections::{BTreeMap, HashSet};
use std::iter;

type NodeIndex = BTreeMap<Node, HashSet<Triple>>;

fn insert_into(index: &mut NodeIndex, key: &Node, triple: &Triple) -> bool {
    index.entry(key.clone()).or_default().insert(triple.clone())
}

fn remove_from(index: &mut NodeIndex, key: &Node, triple: &Triple) -> bool {
    if let Some(triples) = index.get_mut(key) {
        let removed = triples.remove(triple);
        if triples.is_empty() {
            index.remove(key);
        }
        removed
    } else {
        false
    }
}

fn intersect<'a>(
    first: Option<&'a HashSet<Triple>>,
    second: Option<&'a HashSet<Triple>>,
) -> TripleIter<'a> {
    match (first, second) {
        (Some(a), Some(b)) => {
            let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
            Box::new(small.iter().filter(move |t| large.contains(*t)))
        }
        _ => Box::new(iter::empty()),
    }
}

/// Subject, predicate and object maps for one status partition
#[derive(Debug, Clone, Default)]
struct PositionIndex {
    subjects: NodeIndex,
    predicates: NodeIndex,
    objects: NodeIndex,
    len: usize,
}

impl PositionIndex {
    fn insert(&mut self, triple: &Triple) -> bool {
        let fresh = insert_into(&mut self.subjects, triple.subject(), triple);
        insert_into(&mut self.predicates, triple.predicate(), triple);
        insert_into(&mut self.objects, triple.object(), triple);
        if fresh {
            self.len += 1;
        }
        fresh
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        let removed = remove_from(&mut self.subjects, triple.subject(), triple);
        remove_from(&mut self.predicates, triple.predicate(), triple);
        remove_from(&mut self.objects, triple.object(), triple);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn clear(&mut self) {
        self.subjects.clear();
        self.predicates.clear();
        self.objects.clear();
        self.len = 0;
    }

    fn lookup<'a>(&'a self, lookup: Lookup<'a>) -> TripleIter<'a> {
        match lookup {
            Lookup::Subject(s) => Box::new(self.subjects.get(s).into_iter().flatten()),
            Lookup::Predicate(p) => Box::new(self.predicates.get(p).into_iter().flatten()),
            Lookup::Object(o) => Box::new(self.objects.get(o).into_iter().flatten()),
            Lookup::SubjectPredicate(s, p) => {
                intersect(self.subjects.get(s), self.predicates.get(p))
            }
            Lookup::PredicateObject(p, o) => intersect(self.predicates.get(p), self.objects.get(o)),
            Lookup::SubjectObject(s, o) => intersect(self.subjects.get(s), self.objects.get(o)),
        }
    }
}

/// Tree-ordered index keyed by single positions
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    asserted: PositionIndex,
    quoted: PositionIndex,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, status: TripleStatus) -> &PositionIndex {
        match status {
            TripleStatus::Asserted => &self.asserted,
            TripleStatus::Quoted => &self.quoted,
        }
    }

    /// Distinct subjects of asserted triples, in node order
    pub fn subjects(&self) -> impl Iterator<Item = &Node> {
        self.asserted.subjects.keys()
    }

    /// Distinct predicates of asserted triples, in node order
    pub fn predicates(&self) -> impl Iterator<Item = &Node> {
        self.asserted.predicates.keys()
    }

    /// Distinct objects of asserted triples, in node order
    pub fn objects(&self) -> impl Iterator<Item = &Node> {
        self.asserted.objects.keys()
    }
}

impl TripleIndex for FlatIndex {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn index_asserted(&mut self, triple: &Triple) {
        let fresh = self.asserted.insert(triple);
        debug_assert!(fresh, "asserted triple indexed twice: {}", triple);
    }

    fn unindex_asserted(&mut self, triple: &Triple) {
        let removed = self.asserted.remove(triple);
        debug_assert!(removed, "unindexing asserted triple that was never indexed: {}", triple);
    }

    fn index_quoted(&mut self, triple: &Triple) {
        let fresh = self.quoted.insert(triple);
        debug_assert!(fresh, "quoted triple indexed twice: {}", triple);
    }

    fn unindex_quoted(&mut self, triple: &Triple) {
        let removed = self.quoted.remove(triple);
        debug_assert!(removed, "unindexing quoted triple that was never indexed: {}", triple);
    }

    fn clear(&mut self) {
        self.asserted.clear();
        self.quoted.clear();
    }

    fn lookup<'a>(&'a self, status: TripleStatus, lookup: Lookup<'a>) -> Option<TripleIter<'a>> {
        Some(self.partition(status).lookup(lookup))
    }

    fn indexed_len(&self, status: TripleStatus) -> Option<usize> {
        Some(self.partition(status).len)
    }
}
