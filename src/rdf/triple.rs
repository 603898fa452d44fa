//! Immutable triples and triple patterns

use super::types::Node;
use rustc_hash::FxHasher;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

/// Opaque payload carried alongside a triple
///
/// The store never inspects it and it takes no part in triple identity.
#[derive(Clone)]
pub struct TripleContext(Arc<dyn Any + Send + Sync>);

impl TripleContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for TripleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TripleContext(..)")
    }
}

#[derive(Debug)]
struct TripleData {
    subject: Node,
    predicate: Node,
    object: Node,
    context: Option<TripleContext>,
    hash: u64,
}

// Unlinks nested triples this value solely owns so a long quotation chain is
// freed in a loop instead of one drop frame per level.
impl Drop for TripleData {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_nested(&mut self.subject, &mut pending);
        detach_nested(&mut self.predicate, &mut pending);
        detach_nested(&mut self.object, &mut pending);
        while let Some(triple) = pending.pop() {
            if let Ok(mut data) = Arc::try_unwrap(triple.0) {
                detach_nested(&mut data.subject, &mut pending);
                detach_nested(&mut data.predicate, &mut pending);
                detach_nested(&mut data.object, &mut pending);
            }
        }
    }
}

fn detach_nested(node: &mut Node, pending: &mut Vec<Triple>) {
    if node.is_triple() {
        if let Node::Triple(nested) = mem::replace(node, Node::literal(String::new())) {
            pending.push(nested);
        }
    }
}

/// RDF triple (subject-predicate-object)
///
/// Cloning is cheap: the components live behind a shared pointer and never
/// change after construction. The hash is computed once here so triples can
/// key the collection's maps without rehashing nested structure.
#[derive(Debug, Clone)]
pub struct Triple(Arc<TripleData>);

impl Triple {
    /// Create a new triple
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self::build(subject, predicate, object, None)
    }

    /// Create a new triple carrying an opaque context
    pub fn with_context(
        subject: Node,
        predicate: Node,
        object: Node,
        context: TripleContext,
    ) -> Self {
        Self::build(subject, predicate, object, Some(context))
    }

    fn build(subject: Node, predicate: Node, object: Node, context: Option<TripleContext>) -> Self {
        let mut hasher = FxHasher::default();
        subject.hash(&mut hasher);
        predicate.hash(&mut hasher);
        object.hash(&mut hasher);
        let hash = hasher.finish();

        Self(Arc::new(TripleData {
            subject,
            predicate,
            object,
            context,
            hash,
        }))
    }

    pub fn subject(&self) -> &Node {
        &self.0.subject
    }

    pub fn predicate(&self) -> &Node {
        &self.0.predicate
    }

    pub fn object(&self) -> &Node {
        &self.0.object
    }

    pub fn context(&self) -> Option<&TripleContext> {
        self.0.context.as_ref()
    }

    /// The precomputed structural hash
    pub fn hash_code(&self) -> u64 {
        self.0.hash
    }

    /// Triples quoted directly in subject or object position
    pub fn quoted_triples(&self) -> impl Iterator<Item = &Triple> {
        self.subject()
            .as_triple()
            .into_iter()
            .chain(self.object().as_triple())
    }

    /// Whether `node` occurs in any position, including inside quoted triples
    pub fn involves(&self, node: &Node) -> bool {
        let mut pending = vec![self];
        while let Some(triple) = pending.pop() {
            for component in [triple.subject(), triple.predicate(), triple.object()] {
                if component == node {
                    return true;
                }
                if let Node::Triple(nested) = component {
                    pending.push(nested);
                }
            }
        }
        false
    }

    /// No blank node in any position, at any quotation depth
    pub fn is_ground(&self) -> bool {
        let mut pending = vec![self];
        while let Some(triple) = pending.pop() {
            for component in [triple.subject(), triple.predicate(), triple.object()] {
                match component {
                    Node::Blank(_) => return false,
                    Node::Triple(nested) => pending.push(nested),
                    _ => {}
                }
            }
        }
        true
    }
}

impl PartialEq for Triple {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if Arc::ptr_eq(&a.0, &b.0) {
                continue;
            }
            if a.0.hash != b.0.hash {
                return false;
            }
            for (x, y) in [
                (a.subject(), b.subject()),
                (a.predicate(), b.predicate()),
                (a.object(), b.object()),
            ] {
                match (x, y) {
                    (Node::Triple(x), Node::Triple(y)) => pending.push((x, y)),
                    _ if x != y => return false,
                    _ => {}
                }
            }
        }
        true
    }
}

impl Eq for Triple {}

impl Hash for Triple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject(), self.predicate(), self.object())
    }
}

/// Triple pattern for lookups (None = wildcard)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriplePattern {
    pub subject: Option<Node>,
    pub predicate: Option<Node>,
    pub object: Option<Node>,
}

impl TriplePattern {
    pub fn new(subject: Option<Node>, predicate: Option<Node>, object: Option<Node>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Check if a triple matches this pattern
    pub fn matches(&self, triple: &Triple) -> bool {
        if let Some(ref s) = self.subject {
            if s != triple.subject() {
                return false;
            }
        }
        if let Some(ref p) = self.predicate {
            if p != triple.predicate() {
                return false;
            }
        }
        if let Some(ref o) = self.object {
            if o != triple.object() {
                return false;
            }
        }
        true
    }

    pub fn is_fully_bound(&self) -> bool {
        self.subject.is_some() && self.predicate.is_some() && self.object.is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }
}
