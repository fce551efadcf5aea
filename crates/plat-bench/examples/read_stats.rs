//! End-to-end read example.
//!
//! Demonstrates: generate a synthetic document → Reader → drain buffers →
//! tally entities per kind → print header metadata.

use plat_arena::EntityRef;
use plat_bench::{synthetic_nodes_document, synthetic_ways_document};
use plat_xml::Reader;

fn main() {
    println!("=== plat read example ===\n");

    // --- Pass 1: node-only document ---
    let document = synthetic_nodes_document(25_000, 42);
    println!(
        "Pass 1: {} bytes of synthetic nodes",
        document.len()
    );
    read_and_report(document);

    // --- Pass 2: way-heavy document ---
    let document = synthetic_ways_document(2_000, 50, 42);
    println!(
        "\nPass 2: {} bytes of synthetic ways",
        document.len()
    );
    read_and_report(document);
}

fn read_and_report(document: String) {
    let started = std::time::Instant::now();
    let mut reader = Reader::from_string(document);

    let header = reader.header().unwrap();
    println!(
        "  header: version={}, generator={}",
        header.version(),
        header.get("generator").unwrap_or("?")
    );

    let mut buffers = 0usize;
    let mut counts = [0usize; 5];
    loop {
        let buffer = reader.read().unwrap();
        if buffer.is_empty() {
            break;
        }
        buffers += 1;
        for entity in buffer.entities() {
            let slot = match entity {
                EntityRef::Node(_) => 0,
                EntityRef::Way(_) => 1,
                EntityRef::Relation(_) => 2,
                EntityRef::Changeset(_) => 3,
                EntityRef::Area(_) => 4,
            };
            counts[slot] += 1;
        }
    }
    reader.close().unwrap();

    println!(
        "  {} buffers: {} nodes, {} ways, {} relations, {} changesets, {} areas",
        buffers, counts[0], counts[1], counts[2], counts[3], counts[4],
    );
    println!("  done in {:?}", started.elapsed());
}
