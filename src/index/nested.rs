//! Two-level pair index
//!
//! Implements, per status partition:
//! - SP index (Subject -> Predicate -> triples)
//! - PO index (Predicate -> Object -> triples)
//! - OS index (Object -> Subject -> triples)
//!
//! Every dual position lookup is two hash lookups with no intersection.
//! Single position lookups flatten the second level of the matching index.

use super::{Lookup, TripleIndex, TripleIter};
use crate::collection::TripleStatus;
use crate::rdf::{Node, Triple};
use rustc_hash::{FxHashMap, FxHashSet};

type PairMap = FxHashMap<Node, FxHashMap<Node, FxHashSet<Triple>>>;

fn insert_pair(index: &mut PairMap, first: &Node, second: &Node, triple: &Triple) -> bool {
    index
        .entry(first.clone())
        .or_default()
        .entry(second.clone())
        .or_default()
        .insert(triple.clone())
}

fn remove_pair(index: &mut PairMap, first: &Node, second: &Node, triple: &Triple) -> bool {
    let mut removed = false;
    if let Some(inner) = index.get_mut(first) {
        if let Some(triples) = inner.get_mut(second) {
            removed = triples.remove(triple);
            if triples.is_empty() {
                inner.remove(second);
            }
        }
        if inner.is_empty() {
            index.remove(first);
        }
    }
    removed
}

fn flatten_first<'a>(index: &'a PairMap, first: &Node) -> TripleIter<'a> {
    Box::new(
        index
            .get(first)
            .into_iter()
            .flat_map(|inner| inner.values())
            .flatten(),
    )
}

fn pair_lookup<'a>(index: &'a PairMap, first: &Node, second: &Node) -> TripleIter<'a> {
    Box::new(
        index
            .get(first)
            .and_then(|inner| inner.get(second))
            .into_iter()
            .flatten(),
    )
}

/// The three pair indexes of one status partition
///
/// All three must hold exactly the same triple set.
#[derive(Debug, Clone, Default)]
struct PairIndexes {
    sp: PairMap,
    po: PairMap,
    os: PairMap,
    len: usize,
}

impl PairIndexes {
    fn insert(&mut self, triple: &Triple) -> bool {
        let (s, p, o) = (triple.subject(), triple.predicate(), triple.object());
        let fresh = insert_pair(&mut self.sp, s, p, triple);
        insert_pair(&mut self.po, p, o, triple);
        insert_pair(&mut self.os, o, s, triple);
        if fresh {
            self.len += 1;
        }
        fresh
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        let (s, p, o) = (triple.subject(), triple.predicate(), triple.object());
        let removed = remove_pair(&mut self.sp, s, p, triple);
        remove_pair(&mut self.po, p, o, triple);
        remove_pair(&mut self.os, o, s, triple);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn clear(&mut self) {
        self.sp.clear();
        self.po.clear();
        self.os.clear();
        self.len = 0;
    }

    fn lookup<'a>(&'a self, lookup: Lookup<'a>) -> TripleIter<'a> {
        match lookup {
            Lookup::Subject(s) => flatten_first(&self.sp, s),
            Lookup::Predicate(p) => flatten_first(&self.po, p),
            Lookup::Object(o) => flatten_first(&self.os, o),
            Lookup::SubjectPredicate(s, p) => pair_lookup(&self.sp, s, p),
            Lookup::PredicateObject(p, o) => pair_lookup(&self.po, p, o),
            Lookup::SubjectObject(s, o) => pair_lookup(&self.os, o, s),
        }
    }
}

/// Hashed index with direct dual position lookups
#[derive(Debug, Clone, Default)]
pub struct NestedIndex {
    asserted: PairIndexes,
    quoted: PairIndexes,
}

impl NestedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, status: TripleStatus) -> &PairIndexes {
        match status {
            TripleStatus::Asserted => &self.asserted,
            TripleStatus::Quoted => &self.quoted,
        }
    }
}

impl TripleIndex for NestedIndex {
    fn name(&self) -> &'static str {
        "nested"
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
