//! Benchmark inputs and utilities for the plat OpenStreetMap toolkit.
//!
//! Provides deterministic synthetic documents for benchmarks and examples:
//!
//! - [`synthetic_nodes_document`]: dense node soup with jittered coordinates
//! - [`synthetic_ways_document`]: tagged ways over an implied node pool
//! - [`jitter_location`]: the placement rule both generators share
//!
//! Generation is seeded, so two runs of the same benchmark parse
//! byte-identical input.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt::Write;

use plat_core::Location;

/// Longitude origin of the synthetic grid, in 1e-7 degrees.
const BASE_X: i32 = 83_600_000;
/// Latitude origin of the synthetic grid, in 1e-7 degrees.
const BASE_Y: i32 = 490_190_000;
/// Fixed-point spacing between neighbouring grid slots.
const GRID_STEP: i32 = 1_000;
/// Version and timestamp attributes shared by every synthetic element.
const META: &str = "version=\"1\" timestamp=\"2015-07-01T12:30:45Z\"";

/// Place index `i` on a 1000-wide grid around the origin, displaced by
/// a seed-dependent jitter so the coordinate text varies between nodes.
pub fn jitter_location(seed: u64, i: u64) -> Location {
    let h = mix(seed, i);
    let x = BASE_X + (i % 1_000) as i32 * GRID_STEP + (h % 997) as i32;
    let y = BASE_Y + (i / 1_000) as i32 * GRID_STEP + ((h >> 32) % 997) as i32;
    Location::new(x, y)
}

/// Build a document holding `count` untagged nodes with ascending ids.
pub fn synthetic_nodes_document(count: usize, seed: u64) -> String {
    let mut doc = String::with_capacity(count * 110 + 64);
    doc.push_str("<osm version=\"0.6\" generator=\"plat-bench\">\n");
    for i in 0..count {
        let location = jitter_location(seed, i as u64);
        writeln!(
            doc,
            " <node id=\"{id}\" {META} lon=\"{lon:.7}\" lat=\"{lat:.7}\"/>",
            id = i as i64 + 1,
            lon = location.lon(),
            lat = location.lat(),
        )
        .unwrap();
    }
    doc.push_str("</osm>\n");
    doc
}

/// Build a document holding `way_count` ways with `refs_per_way` node
/// references and three tags each.
///
/// References point into an implied node pool four times the size of a
/// single way, so neighbouring ways share some nodes.
pub fn synthetic_ways_document(way_count: usize, refs_per_way: usize, seed: u64) -> String {
    let pool = (refs_per_way as u64 * 4).max(1);
    let mut doc = String::with_capacity(way_count * (refs_per_way * 20 + 160) + 64);
    doc.push_str("<osm version=\"0.6\" generator=\"plat-bench\">\n");
    for i in 0..way_count {
        writeln!(doc, " <way id=\"{}\" {META}>", i as i64 + 1).unwrap();
        for n in 0..refs_per_way {
            let reference = mix(seed, (i * refs_per_way + n) as u64) % pool + 1;
            writeln!(doc, "  <nd ref=\"{reference}\"/>").unwrap();
        }
        writeln!(doc, "  <tag k=\"highway\" v=\"residential\"/>").unwrap();
        writeln!(doc, "  <tag k=\"name\" v=\"Way {}\"/>", i + 1).unwrap();
        writeln!(doc, "  <tag k=\"surface\" v=\"asphalt\"/>").unwrap();
        doc.push_str(" </way>\n");
    }
    doc.push_str("</osm>\n");
    doc
}

/// Splitmix-style hash of `seed` and `i`.
fn mix(seed: u64, i: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(i.wrapping_mul(1442695040888963407))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plat_arena::EntityRef;
    use plat_xml::Reader;

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            synthetic_nodes_document(50, 7),
            synthetic_nodes_document(50, 7)
        );
        assert_ne!(
            synthetic_nodes_document(50, 7),
            synthetic_nodes_document(50, 8)
        );
    }

    #[test]
    fn nodes_document_parses_back() {
        let mut reader = Reader::from_string(synthetic_nodes_document(100, 42));
        let mut nodes = 0usize;
        loop {
            let buffer = reader.read().unwrap();
            if buffer.is_empty() {
                break;
            }
            nodes += buffer.entities().count();
        }
        assert_eq!(nodes, 100);
        let header = reader.header().unwrap();
        assert_eq!(header.get("generator"), Some("plat-bench"));
    }

    #[test]
    fn ways_document_parses_back() {
        let mut reader = Reader::from_string(synthetic_ways_document(20, 8, 42));
        let buffer = reader.read().unwrap();
        let mut ways = 0usize;
        for entity in buffer.entities() {
            match entity {
                EntityRef::Way(way) => {
                    assert_eq!(way.nodes().len(), 8);
                    assert_eq!(way.tags().get("surface"), Some("asphalt"));
                    ways += 1;
                }
                other => panic!("unexpected entity {other:?}"),
            }
        }
        assert_eq!(ways, 20);
    }

    #[test]
    fn jitter_stays_within_one_grid_slot() {
        for i in 0..200 {
            let location = jitter_location(99, i);
            let base_x = BASE_X + (i % 1_000) as i32 * GRID_STEP;
            let base_y = BASE_Y + (i / 1_000) as i32 * GRID_STEP;
            assert!(location.x() >= base_x && location.x() < base_x + GRID_STEP);
            assert!(location.y() >= base_y && location.y() < base_y + GRID_STEP);
        }
    }
}
