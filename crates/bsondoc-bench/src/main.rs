//! Benchmark for document construction, mutation and ObjectId generation.
//!
//! Builds a batch of order documents the way a proxy assembles replies:
//! fields appended in bulk, metadata injected at the front afterwards,
//! a few fields updated and removed, then every document sized.
//!
//! Usage: bench-documents [DOCUMENT_COUNT]

use std::time::{Duration, Instant};

use bsondoc::{Document, DocumentBuilder, Element, ObjectId, Value};
use serde::Serialize;

const DEFAULT_DOCUMENTS: usize = 100_000;
const ID_ITERS: usize = 1_000_000;

#[derive(Debug, Serialize)]
struct Phase {
    name: &'static str,
    iterations: usize,
    total_ms: f64,
    ns_per_op: f64,
}

impl Phase {
    fn new(name: &'static str, iterations: usize, elapsed: Duration) -> Self {
        Self {
            name,
            iterations,
            total_ms: elapsed.as_secs_f64() * 1_000.0,
            ns_per_op: elapsed.as_nanos() as f64 / iterations.max(1) as f64,
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    documents: usize,
    total_wire_bytes: usize,
    avg_wire_bytes: f64,
    phases: Vec<Phase>,
}

fn build_order(i: usize) -> Document {
    DocumentBuilder::new()
        .string("customer", format!("customer-{}", i % 997))
        .int64("total_cents", (i as i64) * 137 % 100_000)
        .boolean("paid", i % 3 == 0)
        .datetime("created_at", 1_710_513_000_000 + i as i64)
        .document("shipping", |s| s
            .string("city", "Lisbon")
            .string("country", "PT")
            .field_omit_empty("notes", if i % 5 == 0 { "leave at door" } else { "" })
        )
        .array("items", (0..(i % 7) as i32).map(Value::Int32))
        .build()
}

fn main() {
    let documents = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_DOCUMENTS);

    let mut phases = Vec::new();

    // ObjectId generation
    let start = Instant::now();
    let mut last = ObjectId::NIL;
    for _ in 0..ID_ITERS {
        last = ObjectId::new();
    }
    phases.push(Phase::new("object_id_new", ID_ITERS, start.elapsed()));

    let hex = last.to_hex();
    let start = Instant::now();
    for _ in 0..ID_ITERS {
        let parsed = ObjectId::from_hex(&hex).expect("hex produced by to_hex parses");
        assert_eq!(parsed, last);
    }
    phases.push(Phase::new("object_id_from_hex", ID_ITERS, start.elapsed()));

    // Document construction
    let start = Instant::now();
    let mut docs: Vec<Document> = (0..documents).map(build_order).collect();
    phases.push(Phase::new("build", documents, start.elapsed()));

    // Metadata injected at the front after the fact
    let start = Instant::now();
    for doc in &mut docs {
        doc.prepend([
            Element::new("$db", "shop"),
            Element::new("_id", ObjectId::new()),
        ])
        .expect("no absent elements");
    }
    phases.push(Phase::new("prepend_metadata", documents, start.elapsed()));

    // Keyed mutation
    let start = Instant::now();
    for doc in &mut docs {
        doc.set(Element::new("paid", true));
        doc.delete("$db");
    }
    phases.push(Phase::new("set_and_delete", documents, start.elapsed()));

    // Sizing
    let start = Instant::now();
    let mut total_wire_bytes = 0usize;
    for doc in &docs {
        total_wire_bytes += doc.validate().expect("benchmark documents are valid");
    }
    phases.push(Phase::new("validate", documents, start.elapsed()));

    let summary = Summary {
        documents,
        total_wire_bytes,
        avg_wire_bytes: total_wire_bytes as f64 / documents.max(1) as f64,
        phases,
    };

    println!("=== Summary ===");
    for phase in &summary.phases {
        println!(
            "{:<20} {:>10} ops  {:>10.2} ms  {:>8.1} ns/op",
            phase.name, phase.iterations, phase.total_ms, phase.ns_per_op
        );
    }
    println!(
        "Documents: {} ({} wire bytes, {:.1} avg)",
        summary.documents, summary.total_wire_bytes, summary.avg_wire_bytes
    );

    println!("\n=== JSON ===");
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize summary: {}", e),
    }
}
