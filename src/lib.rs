//! Samyama RDF-star Store
//!
//! An in-memory triple store with RDF-star quoted triples. Triples can be
//! asserted, quoted inside other triples, or both, and every known triple is
//! reachable through single and dual position lookups for either status.
//!
//! # Layout
//!
//! - [`rdf`]: node model, total node ordering, immutable triples
//! - [`collection`]: the reference counted triple collection and its events
//! - [`index`]: pluggable index strategies (flat, nested, scan)
//! - [`graph`]: graph API and the lock-wrapped shared graph
//! - [`config`]: YAML/JSON store configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_rdfstar::{Graph, Node, Triple};
//!
//! let ex = |name: &str| Node::uri(&format!("http://example.org/{}", name)).unwrap();
//!
//! let mut graph = Graph::new();
//! let claim = Triple::new(ex("a"), ex("p"), ex("b"));
//! graph.assert(claim.clone());
//!
//! // Quote the first triple in the object position of a second one
//! graph.assert(Triple::new(ex("c"), ex("p"), Node::quoted(claim.clone())));
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.quoted_len(), 1);
//!
//! // Retracting the claim leaves it quoted
//! graph.retract(&claim);
//! assert!(!graph.contains(&claim));
//! assert!(graph.contains_quoted(&claim));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod graph;
pub mod index;
pub mod rdf;

// Re-export main types for convenience
pub use collection::{
    CollectionError, CollectionResult, SubscriptionId, TripleCollection, TripleEvent, TripleRefs,
    TripleState, TripleStatus,
};

pub use config::{ConfigError, ConfigResult, StoreConfig};

pub use graph::{Graph, SharedGraph};

pub use index::{FlatIndex, IndexKind, Lookup, NestedIndex, ScanIndex, TripleIndex, TripleIter};

pub use rdf::{
    compare_nodes, BlankNode, GraphLiteral, Literal, NamedNode, Node, NodeKind, RdfError, RdfResult,
    Triple, TripleContext, TriplePattern, Variable,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
