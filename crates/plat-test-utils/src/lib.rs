//! Test fixtures and sample documents for plat development.
//!
//! Provides canned XML documents for parser testing ([`fixtures`]) and
//! helpers that assemble representative records into a [`Buffer`] for
//! arena and view testing.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use plat_arena::{AreaBuilder, Buffer, ItemHandle, NodeBuilder, WayBuilder};
use plat_core::{Location, NodeRef, RingKind, Timestamp};

/// Timestamp shared by the fixture documents, 2015-07-01T12:30:45Z.
pub const FIXTURE_TIMESTAMP: Timestamp = Timestamp(1_435_753_845);

/// A deterministic grid location for index `i`, in the Karlsruhe area
/// like the fixture documents.
pub fn grid_location(i: usize) -> Location {
    let x = 83_600_000 + 10 * (i as i32 % 1000);
    let y = 490_190_000 + 10 * (i as i32 / 1000);
    Location::new(x, y)
}

/// Write `count` nodes with ascending ids starting at 1, each with a
/// small pair of tags.
pub fn fill_nodes(buffer: &mut Buffer, count: usize) {
    for i in 0..count {
        let mut node = NodeBuilder::new(
            buffer,
            i as i64 + 1,
            1,
            FIXTURE_TIMESTAMP,
            grid_location(i),
        );
        node.add_tag("highway", "crossing");
        node.add_tag("source", "survey");
        node.finish();
    }
}

/// Write `count` ways with ascending ids starting at 1, each holding
/// `refs_per_way` node references and one tag.
pub fn fill_ways(buffer: &mut Buffer, count: usize, refs_per_way: usize) {
    for i in 0..count {
        let mut way = WayBuilder::new(buffer, i as i64 + 1, 1, FIXTURE_TIMESTAMP);
        for n in 0..refs_per_way {
            way.add_node_ref(NodeRef::with_location(n as i64 + 1, grid_location(n)));
        }
        way.add_tag("highway", "residential");
        way.finish();
    }
}

/// Write one way-derived area: id 46, a closed square outer ring and
/// one triangular inner ring.
pub fn sample_area(buffer: &mut Buffer) -> ItemHandle {
    let mut area = AreaBuilder::new(buffer, 46, 1, FIXTURE_TIMESTAMP);
    area.add_tag("landuse", "forest");
    area.add_tag("name", "Hardtwald");
    {
        let mut outer = area.begin_ring(RingKind::Outer);
        outer.add_node_ref(NodeRef::with_location(10, Location::new(83_600_000, 490_190_000)));
        outer.add_node_ref(NodeRef::with_location(11, Location::new(83_640_000, 490_190_000)));
        outer.add_node_ref(NodeRef::with_location(12, Location::new(83_640_000, 490_230_000)));
        outer.add_node_ref(NodeRef::with_location(13, Location::new(83_600_000, 490_230_000)));
        outer.add_node_ref(NodeRef::with_location(10, Location::new(83_600_000, 490_190_000)));
    }
    {
        let mut inner = area.begin_ring(RingKind::Inner);
        inner.add_node_ref(NodeRef::with_location(20, Location::new(83_610_000, 490_200_000)));
        inner.add_node_ref(NodeRef::with_location(21, Location::new(83_620_000, 490_200_000)));
        inner.add_node_ref(NodeRef::with_location(22, Location::new(83_615_000, 490_210_000)));
        inner.add_node_ref(NodeRef::with_location(20, Location::new(83_610_000, 490_200_000)));
    }
    area.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plat_arena::EntityRef;

    #[test]
    fn fill_nodes_writes_the_requested_count() {
        let mut buffer = Buffer::new();
        fill_nodes(&mut buffer, 25);
        assert_eq!(buffer.entities().count(), 25);
        match buffer.entities().next() {
            Some(EntityRef::Node(node)) => {
                assert_eq!(node.id().0, 1);
                assert_eq!(node.tags().get("highway"), Some("crossing"));
            }
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[test]
    fn fill_ways_writes_refs_and_tags() {
        let mut buffer = Buffer::new();
        fill_ways(&mut buffer, 3, 5);
        match buffer.entities().next() {
            Some(EntityRef::Way(way)) => {
                assert_eq!(way.nodes().len(), 5);
                assert_eq!(way.tags().get("highway"), Some("residential"));
            }
            other => panic!("expected a way, got {other:?}"),
        }
    }

    #[test]
    fn sample_area_has_one_ring_of_each_kind() {
        let mut buffer = Buffer::new();
        let handle = sample_area(&mut buffer);
        match EntityRef::from_item(buffer.get(handle)) {
            Some(EntityRef::Area(area)) => {
                assert!(area.from_way());
                assert_eq!(area.orig_id().0, 23);
                assert_eq!(area.num_rings(), (1, 1));
                assert_eq!(area.tags().get("landuse"), Some("forest"));
            }
            other => panic!("expected an area, got {other:?}"),
        }
    }

    #[test]
    fn grid_locations_stay_in_range() {
        for i in [0, 999, 1000, 500_000] {
            let location = grid_location(i);
            assert!(location.is_defined());
        }
    }
}
