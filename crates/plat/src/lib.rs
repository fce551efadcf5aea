//! Plat: compact flat storage and streaming input for OpenStreetMap data.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! plat sub-crates. For most users, adding `plat` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use plat::prelude::*;
//!
//! let doc = r#"<osm version="0.6" generator="example">
//!   <node id="42" version="1" lon="8.3628851" lat="49.0189506">
//!     <tag k="name" v="Marktplatz"/>
//!   </node>
//! </osm>"#;
//!
//! // Parsing runs on background threads; the caller pulls filled
//! // buffers as they become available.
//! let mut reader = Reader::from_string(doc);
//! assert_eq!(reader.header().unwrap().get("generator"), Some("example"));
//!
//! let buffer = reader.read().unwrap();
//! match buffer.entities().next() {
//!     Some(EntityRef::Node(node)) => {
//!         assert_eq!(node.id().0, 42);
//!         assert_eq!(node.location().x(), 83_628_851);
//!         assert_eq!(node.tags().get("name"), Some("Marktplatz"));
//!     }
//!     other => panic!("expected a node, got {other:?}"),
//! }
//! assert!(reader.read().unwrap().is_empty());
//!
//! // Assembled polygons are written straight into a buffer.
//! let mut buffer = Buffer::new();
//! let mut builder = AreaBuilder::new(&mut buffer, 46, 1, Timestamp::UNSET);
//! builder.add_tag("landuse", "park");
//! let mut ring = builder.begin_ring(RingKind::Outer);
//! ring.add_node_ref(NodeRef::with_location(1, Location::from_degrees(8.0, 49.0)));
//! ring.add_node_ref(NodeRef::with_location(2, Location::from_degrees(8.1, 49.0)));
//! ring.add_node_ref(NodeRef::with_location(3, Location::from_degrees(8.05, 49.1)));
//! ring.add_node_ref(NodeRef::with_location(1, Location::from_degrees(8.0, 49.0)));
//! ring.finish();
//! builder.finish();
//!
//! match buffer.entities().next() {
//!     Some(EntityRef::Area(area)) => {
//!         assert!(area.from_way());
//!         assert_eq!(area.orig_id().0, 23);
//!         assert_eq!(area.num_rings(), (1, 0));
//!     }
//!     other => panic!("expected an area, got {other:?}"),
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plat-core` | Kind tags, ids, locations, timestamps, filters |
//! | [`arena`] | `plat-arena` | Append-only buffers, zero-copy views, builders |
//! | [`xml`] | `plat-xml` | Streaming document reader and parser pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Elementary types and ids (`plat-core`).
///
/// Contains the record kind tags ([`types::ItemKind`], [`types::RingKind`]),
/// object ids, fixed-point [`types::Location`], [`types::Timestamp`], the
/// fixed-size element trait, and [`types::EntityFilter`].
pub use plat_core as types;

/// Arena storage and zero-copy entity views (`plat-arena`).
///
/// Most users only need [`arena::Buffer`] and [`arena::EntityRef`] from this
/// module (both are also in the [`prelude`]), plus the per-kind builders for
/// writing records by hand.
pub use plat_arena as arena;

/// Streaming document input (`plat-xml`).
///
/// [`xml::Reader`] runs a producer thread and a parser thread behind a
/// blocking pull interface; [`xml::StreamingParser`] is the parser half on
/// its own for callers that manage their own threads and channels.
pub use plat_xml as xml;

/// Common imports for typical plat usage.
///
/// ```rust
/// use plat::prelude::*;
/// ```
///
/// This imports the most frequently used types: the buffer and entity views,
/// the per-kind builders, elementary types, and the document reader.
pub mod prelude {
    // Arena storage and views
    pub use plat_arena::{Area, Buffer, EntityRef, Ring};

    // Builders
    pub use plat_arena::{
        AreaBuilder, ChangesetBuilder, NodeBuilder, RelationBuilder, RingBuilder, WayBuilder,
    };

    // Elementary types
    pub use plat_core::{
        EntityFilter, ItemKind, Location, Member, NodeRef, ObjectId, RingKind, Timestamp,
    };

    // Errors
    pub use plat_xml::{ParseError, ReadError};

    // Reading
    pub use plat_xml::{Header, Reader, ReaderConfig};
}
