//! RDF node definitions
//!
//! Every value that can occupy a triple position is a [`Node`]. The IRI,
//! blank node, literal and variable payloads wrap the oxrdf primitives so
//! their lexical forms are validated once, at construction.

use super::triple::Triple;
use oxrdf::{
    BlankNode as OxBlankNode,
    Literal as OxLiteral,
    NamedNode as OxNamedNode,
    Variable as OxVariable,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// RDF errors
#[derive(Error, Debug)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// Invalid variable name
    #[error("Invalid variable: {0}")]
    InvalidVariable(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an absolute IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

/// Blank node (locally scoped identifier)
///
/// Two blank nodes are equal iff their identifiers are equal, regardless of
/// which graph or factory produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a blank node with a fresh unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    pub fn from_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
///
/// Equality covers lexical value, language tag and datatype. Language tags
/// are normalised to lower case on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (xsd:string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype IRI
    pub fn datatype(&self) -> &str {
        self.0.datatype().as_str()
    }

    /// Get the inner oxrdf Literal
    pub fn inner(&self) -> &OxLiteral {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lang) = self.language() {
            write!(f, "\"{}\"@{}", self.value(), lang)
        } else {
            write!(f, "\"{}\"^^<{}>", self.value(), self.datatype())
        }
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// Named placeholder, only meaningful inside patterns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(OxVariable);

impl Variable {
    pub fn new(name: &str) -> RdfResult<Self> {
        OxVariable::new(name)
            .map(Self)
            .map_err(|e| RdfError::InvalidVariable(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.as_str())
    }
}

/// Embedded sub-graph value (legacy N3 formula)
///
/// The triples are kept sorted and de-duplicated so equality, hashing and
/// ordering are all structural over the same canonical list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphLiteral(Arc<[Triple]>);

impl GraphLiteral {
    pub fn new(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut triples: Vec<Triple> = triples.into_iter().collect();
        triples.sort();
        triples.dedup();
        Self(triples.into())
    }

    pub fn triples(&self) -> &[Triple] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GraphLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for triple in self.0.iter() {
            write!(f, " {}", triple)?;
        }
        write!(f, " }}")
    }
}

/// Variant discriminant, declared in canonical sort precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Variable,
    Blank,
    Uri,
    Literal,
    GraphLiteral,
    Triple,
}

/// Any value that can appear in a triple position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Pattern variable
    Variable(Variable),
    /// Blank node
    Blank(BlankNode),
    /// Named node (IRI)
    Uri(NamedNode),
    /// Literal value
    Literal(Literal),
    /// Embedded sub-graph
    GraphLiteral(GraphLiteral),
    /// Quoted triple (RDF-star)
    Triple(Triple),
}

impl Node {
    /// Named node from an IRI string
    pub fn uri(iri: &str) -> RdfResult<Self> {
        NamedNode::new(iri).map(Node::Uri)
    }

    /// Blank node from an identifier
    pub fn blank(id: &str) -> RdfResult<Self> {
        BlankNode::from_id(id).map(Node::Blank)
    }

    /// Simple (xsd:string) literal
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal(Literal::new_simple_literal(value))
    }

    /// Language-tagged literal
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> RdfResult<Self> {
        Literal::new_language_tagged_literal(value, language).map(Node::Literal)
    }

    /// Literal with an explicit datatype IRI
    pub fn typed_literal(value: impl Into<String>, datatype: &str) -> RdfResult<Self> {
        Ok(Node::Literal(Literal::new_typed_literal(value, NamedNode::new(datatype)?)))
    }

    pub fn variable(name: &str) -> RdfResult<Self> {
        Variable::new(name).map(Node::Variable)
    }

    /// Wrap a triple so it can be quoted in another triple
    pub fn quoted(triple: Triple) -> Self {
        Node::Triple(triple)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Variable(_) => NodeKind::Variable,
            Node::Blank(_) => NodeKind::Blank,
            Node::Uri(_) => NodeKind::Uri,
            Node::Literal(_) => NodeKind::Literal,
            Node::GraphLiteral(_) => NodeKind::GraphLiteral,
            Node::Triple(_) => NodeKind::Triple,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, Node::Triple(_))
    }

    /// The quoted triple, if this is a triple node
    pub fn as_triple(&self) -> Option<&Triple> {
        match self {
            Node::Triple(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Variable(v) => write!(f, "{}", v),
            Node::Blank(b) => write!(f, "{}", b),
            Node::Uri(u) => write!(f, "{}", u),
            Node::Literal(l) => write!(f, "{}", l),
            Node::GraphLiteral(g) => write!(f, "{}", g),
            Node::Triple(t) => write!(f, "<< {} {} {} >>", t.subject(), t.predicate(), t.object()),
        }
    }
}

impl From<NamedNode> for Node {
    fn from(node: NamedNode) -> Self {
        Node::Uri(node)
    }
}

impl From<BlankNode> for Node {
    fn from(node: BlankNode) -> Self {
        Node::Blank(node)
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Node::Literal(lit)
    }
}

impl From<Variable> for Node {
    fn from(var: Variable) -> Self {
        Node::Variable(var)
    }
}

impl From<GraphLiteral> for Node {
    fn from(graph: GraphLiteral) -> Self {
        Node::GraphLiteral(graph)
    }
}

impl From<Triple> for Node {
    fn from(triple: Triple) -> Self {
        Node::Triple(triple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_node() {
        let node = NamedNode::new("http://example.org/alice").unwrap();
        assert_eq!(node.as_str(), "http://example.org/alice");
        assert_eq!(node.to_string(), "<http://example.org/alice>");
    }

    #[test]
    fn test_invalid_iri() {
        assert!(matches!(NamedNode::new("not an iri"), Err(RdfError::InvalidIri(_))));
    }

    #[test]
    fn test_blank_node() {
        let node1 = BlankNode::new();
        let node2 = BlankNode::new();
        assert_ne!(node1, node2);

        let a = BlankNode::from_id("b0").unwrap();
        let b = BlankNode::from_id("b0").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "_:b0");
    }

    #[test]
    fn test_literal() {
        let lit = Literal::new_simple_literal("Alice");
        assert_eq!(lit.value(), "Alice");
        assert_eq!(lit.datatype(), "http://www.w3.org/2001/XMLSchema#string");

        let lit = Literal::new_language_tagged_literal("Alice", "EN").unwrap();
        assert_eq!(lit.language(), Some("en"));
        assert_eq!(lit, Literal::new_language_tagged_literal("Alice", "en").unwrap());
    }

    #[test]
    fn test_literal_equality_covers_datatype() {
        let plain = Node::literal("1");
        let typed = Node::typed_literal("1", "http://www.w3.org/2001/XMLSchema#integer").unwrap();
        assert_ne!(plain, typed);
    }

    #[test]
    fn test_node_display() {
        let s = Node::uri("http://example.org/s").unwrap();
        let p = Node::uri("http://example.org/p").unwrap();
        let o = Node::lang_literal("chat", "fr").unwrap();
        let quoted = Node::quoted(Triple::new(s, p, o));
        assert_eq!(
            quoted.to_string(),
            "<< <http://example.org/s> <http://example.org/p> \"chat\"@fr >>"
        );
        assert_eq!(Node::variable("x").unwrap().to_string(), "?x");
    }

    #[test]
    fn test_graph_literal_is_canonical() {
        let s = Node::uri("http://example.org/s").unwrap();
        let p = Node::uri("http://example.org/p").unwrap();
        let t1 = Triple::new(s.clone(), p.clone(), Node::literal("a"));
        let t2 = Triple::new(s, p, Node::literal("b"));

        let g1 = GraphLiteral::new(vec![t2.clone(), t1.clone(), t2.clone()]);
        let g2 = GraphLiteral::new(vec![t1, t2]);
        assert_eq!(g1.len(), 2);
        assert_eq!(g1, g2);
    }
}
