//! Canonical total order over nodes and triples
//!
//! Cross-variant precedence is fixed:
//! Variable < Blank < Uri < Literal < GraphLiteral < Triple.
//! Within a variant the order is chosen so that `compare_nodes` returns
//! `Equal` exactly when the nodes are `==`.

use super::triple::Triple;
use super::types::{Literal, Node};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::NamedNodeRef;
use std::cmp::Ordering;

const NUMERIC_TYPES: [NamedNodeRef<'static>; 16] = [
    xsd::INTEGER,
    xsd::DECIMAL,
    xsd::DOUBLE,
    xsd::FLOAT,
    xsd::LONG,
    xsd::INT,
    xsd::SHORT,
    xsd::BYTE,
    xsd::NON_NEGATIVE_INTEGER,
    xsd::NON_POSITIVE_INTEGER,
    xsd::POSITIVE_INTEGER,
    xsd::NEGATIVE_INTEGER,
    xsd::UNSIGNED_LONG,
    xsd::UNSIGNED_INT,
    xsd::UNSIGNED_SHORT,
    xsd::UNSIGNED_BYTE,
];

/// Literal families, in sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LiteralClass {
    Text,
    Numeric,
    Boolean,
    Other,
}

fn classify(literal: &Literal) -> LiteralClass {
    let datatype = literal.inner().datatype();
    if datatype == xsd::STRING || datatype == rdf::LANG_STRING {
        LiteralClass::Text
    } else if NUMERIC_TYPES.iter().any(|t| *t == datatype) {
        LiteralClass::Numeric
    } else if datatype == xsd::BOOLEAN {
        LiteralClass::Boolean
    } else {
        LiteralClass::Other
    }
}

fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Exact value for integer lexical forms that `f64` would round
fn parse_integer(value: &str) -> Option<i128> {
    value.trim().parse::<i128>().ok()
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parsed values first, malformed lexical forms after them
fn compare_parsed<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order literals by family, then by value where the family has one.
///
/// Ties fall through to datatype, lexical form and language so that
/// numerically equal but distinct literals ("1" vs "01") never compare equal.
pub fn compare_literals(a: &Literal, b: &Literal) -> Ordering {
    let class = classify(a);
    class
        .cmp(&classify(b))
        .then_with(|| match class {
            LiteralClass::Text => a
                .value()
                .cmp(b.value())
                .then_with(|| a.language().cmp(&b.language())),
            LiteralClass::Numeric => compare_parsed(
                parse_numeric(a.value()),
                parse_numeric(b.value()),
                |x, y| x.total_cmp(y),
            )
            .then_with(|| {
                compare_parsed(parse_integer(a.value()), parse_integer(b.value()), |x, y| x.cmp(y))
            }),
            LiteralClass::Boolean => compare_parsed(
                parse_boolean(a.value()),
                parse_boolean(b.value()),
                |x, y| x.cmp(y),
            ),
            LiteralClass::Other => Ordering::Equal,
        })
        .then_with(|| a.datatype().cmp(b.datatype()))
        .then_with(|| a.value().cmp(b.value()))
        .then_with(|| a.language().cmp(&b.language()))
}

/// Lexicographic over (subject, predicate, object)
pub fn compare_triples(a: &Triple, b: &Triple) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    compare_pending(vec![
        (a.object(), b.object()),
        (a.predicate(), b.predicate()),
        (a.subject(), b.subject()),
    ])
}

/// Total order over nodes
pub fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    compare_pending(vec![(a, b)])
}

/// Compares queued pairs in order, expanding quoted triples in place.
///
/// Pairs are popped from the back, so the leading position sits last.
fn compare_pending(mut pending: Vec<(&Node, &Node)>) -> Ordering {
    while let Some((a, b)) = pending.pop() {
        let ordering = match (a, b) {
            (Node::Variable(x), Node::Variable(y)) => x.as_str().cmp(y.as_str()),
            (Node::Blank(x), Node::Blank(y)) => x.as_str().cmp(y.as_str()),
            (Node::Uri(x), Node::Uri(y)) => x.as_str().cmp(y.as_str()),
            (Node::Literal(x), Node::Literal(y)) => compare_literals(x, y),
            (Node::GraphLiteral(x), Node::GraphLiteral(y)) => x.triples().cmp(y.triples()),
            (Node::Triple(x), Node::Triple(y)) => {
                if x != y {
                    pending.push((x.object(), y.object()));
                    pending.push((x.predicate(), y.predicate()));
                    pending.push((x.subject(), y.subject()));
                }
                continue;
            }
            _ => a.kind().cmp(&b.kind()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_nodes(self, other)
    }
}

impl PartialOrd for Triple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Triple {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_triples(self, other)
    }
}
