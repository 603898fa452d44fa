//! RDF data model for the triple store
//!
//! This module provides:
//! - The [`Node`] sum type covering every value a triple position can hold
//! - Immutable, cheaply cloned [`Triple`]s with a precomputed hash
//! - RDF-star quoting: a triple can be wrapped as a node via [`Node::quoted`]
//! - A canonical total order over nodes ([`compare_nodes`])
//!
//! # Example
//!
//! ```rust
//! use samyama_rdfstar::rdf::{Node, Triple};
//!
//! let alice = Node::uri("http://example.org/alice").unwrap();
//! let says = Node::uri("http://example.org/says").unwrap();
//! let claim = Triple::new(
//!     Node::uri("http://example.org/earth").unwrap(),
//!     Node::uri("http://example.org/shape").unwrap(),
//!     Node::literal("flat"),
//! );
//!
//! let statement = Triple::new(alice.clone(), says, Node::quoted(claim.clone()));
//! assert!(statement.involves(&alice));
//! assert_eq!(statement.quoted_triples().next(), Some(&claim));
//! ```

mod ordering;
mod triple;
mod types;

pub use types::{
    RdfError, RdfResult,
    Node, NodeKind, NamedNode, BlankNode, Literal, Variable, GraphLiteral,
};

pub use triple::{Triple, TripleContext, TriplePattern};

pub use ordering::{compare_nodes, compare_triples, compare_literals};
