use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use samyama_rdfstar::{Graph, IndexKind, Node, StoreConfig, Triple};

fn ex(name: &str) -> Node {
    Node::uri(&format!("http://example.org/{}", name)).unwrap()
}

/// Triples over `size / 10` subjects and 10 predicates, every tenth one quoted
fn dataset(size: usize) -> Vec<Triple> {
    let predicates: Vec<Node> = (0..10).map(|i| ex(&format!("p{}", i))).collect();
    let mut triples = Vec::with_capacity(size);
    for i in 0..size {
        let base = Triple::new(
            ex(&format!("s{}", i / 10)),
            predicates[i % 10].clone(),
            Node::literal(i.to_string()),
        );
        if i % 10 == 0 {
            triples.push(Triple::new(ex("source"), ex("states"), Node::quoted(base)));
        } else {
            triples.push(base);
        }
    }
    triples
}

const KINDS: [IndexKind; 2] = [IndexKind::Flat, IndexKind::Nested];

/// Benchmark assertion throughput per index strategy
fn bench_assert(c: &mut Criterion) {
    let mut group = c.benchmark_group("assert");

    for size in [1_000, 10_000].iter() {
        let triples = dataset(*size);
        for kind in KINDS {
            let id = BenchmarkId::new(kind.to_string(), size);
            group.bench_with_input(id, &triples, |b, triples| {
                b.iter(|| {
                    let mut graph = Graph::from_config(&StoreConfig {
                        index: kind,
                        initial_capacity: triples.len(),
                    });
                    graph.assert_all(triples.iter().cloned());
                    graph
                });
            });
        }
    }
    group.finish();
}

/// Benchmark dual position lookups, where the strategies differ most
fn bench_subject_predicate_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("subject_predicate_lookup");

    for size in [1_000, 10_000].iter() {
        let triples = dataset(*size);
        for kind in KINDS {
            let mut graph = Graph::from_config(&StoreConfig {
                index: kind,
                initial_capacity: 0,
            });
            graph.assert_all(triples.iter().cloned());
            let subjects: Vec<Node> = (0..*size / 10).map(|i| ex(&format!("s{}", i))).collect();
            let predicate = ex("p3");

            let id = BenchmarkId::new(kind.to_string(), size);
            group.bench_with_input(id, &subjects, |b, subjects| {
                b.iter(|| {
                    subjects
                        .iter()
                        .map(|s| graph.find(Some(s), Some(&predicate), None).count())
                        .sum::<usize>()
                });
            });
        }
    }
    group.finish();
}

/// Benchmark retracting quoting triples, which releases quote references
fn bench_retract_quoting(c: &mut Criterion) {
    let mut group = c.benchmark_group("retract_quoting");
    let triples = dataset(10_000);
    let quoting: Vec<Triple> = triples.iter().filter(|t| t.object().is_triple()).cloned().collect();

    for kind in KINDS {
        group.bench_function(kind.to_string(), |b| {
            b.iter_batched(
                || {
                    let mut graph = Graph::from_config(&StoreConfig {
                        index: kind,
                        initial_capacity: 0,
                    });
                    graph.assert_all(triples.iter().cloned());
                    graph
                },
                |mut graph| {
                    graph.retract_all(&quoting);
                    graph
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_assert,
    bench_subject_predicate_lookup,
    bench_retract_quoting
);
criterion_main!(benches);
