use anyhow::{Context, Result};
use samyama_rdfstar::{Graph, Node, StoreConfig, Triple, TripleEvent};
use std::env;
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Samyama RDF-star Store v{}", samyama_rdfstar::version());
    println!("==========================================");
    println!();

    let config = match env::args().nth(1) {
        Some(path) => StoreConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => StoreConfig::default(),
    };
    info!("Using {} index", config.index);

    demo_quotation(&config)?;
    demo_lookups(&config)?;

    Ok(())
}

fn ex(name: &str) -> Result<Node> {
    Ok(Node::uri(&format!("http://example.org/{}", name))?)
}

fn demo_quotation(config: &StoreConfig) -> Result<()> {
    println!("=== Demo 1: Asserted and Quoted Triples ===");
    let mut graph = Graph::from_config(config);
    graph.subscribe(|event: &TripleEvent| match event {
        TripleEvent::Asserted { triple } => println!("  + {}", triple),
        TripleEvent::Retracted { triple } => println!("  - {}", triple),
    });

    let claim = Triple::new(ex("a")?, ex("p")?, ex("b")?);
    graph.assert(claim.clone());
    println!("✓ Asserted claim: count={}", graph.len());

    let about = Triple::new(ex("c")?, ex("p")?, Node::quoted(claim.clone()));
    graph.assert(about.clone());
    println!(
        "✓ Quoted claim: count={}, quoted={}, claim quoted={}",
        graph.len(),
        graph.quoted_len(),
        graph.contains_quoted(&claim)
    );

    graph.retract(&claim);
    println!(
        "✓ Retracted claim: count={}, claim asserted={}, claim quoted={}",
        graph.len(),
        graph.contains(&claim),
        graph.contains_quoted(&claim)
    );

    graph.retract(&about);
    println!("✓ Retracted quoting triple: count={}, quoted={}", graph.len(), graph.quoted_len());

    graph.collection().check_integrity()?;
    println!();
    Ok(())
}

fn demo_lookups(config: &StoreConfig) -> Result<()> {
    println!("=== Demo 2: Pattern Lookups ===");
    let mut graph = Graph::from_config(config);

    let knows = ex("knows")?;
    let name = ex("name")?;
    let alice = ex("alice")?;
    graph.assert_all(vec![
        Triple::new(alice.clone(), name.clone(), Node::literal("Alice")),
        Triple::new(ex("bob")?, name.clone(), Node::literal("Bob")),
        Triple::new(alice.clone(), knows.clone(), ex("bob")?),
        Triple::new(ex("bob")?, knows.clone(), ex("carol")?),
    ]);

    println!("Everyone who knows someone:");
    for triple in graph.find(None, Some(&knows), None) {
        println!("  {}", triple);
    }

    println!("Triples about Alice:");
    for triple in graph.triples_with_node(&alice) {
        println!("  {}", triple);
    }

    println!("Subjects:");
    for subject in graph.subject_nodes() {
        println!("  {}", subject);
    }
    println!();
    Ok(())
}
