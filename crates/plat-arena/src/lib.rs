//! Append-only arena storage and zero-copy entity views for plat.
//!
//! Entities are stored back to back in a [`Buffer`] as aligned,
//! length-prefixed records:
//!
//! ```text
//! ┌──────────────┬─────────┬─────────┐
//! │ byte_size u32│ kind u8 │ pad × 3 │  8-byte header
//! ├──────────────┴─────────┴─────────┤
//! │ payload: head + nested records   │
//! ├──────────────────────────────────┤
//! │ zero padding to an 8-byte bound  │
//! └──────────────────────────────────┘
//! ```
//!
//! Iteration reads the length, forms a typed view in place, and jumps
//! to the next record; nothing is deserialized. A commit watermark
//! separates published records from records still being staged, so a
//! producer can abandon a half-built entity with [`Buffer::rollback`]
//! without disturbing anything a consumer can see.
//!
//! The write side lives in [`builder`]: one builder per entity kind,
//! each closing and committing its record on `finish`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod area;
pub mod buffer;
pub mod builder;
pub mod collection;
pub mod entity;
pub mod item;
pub mod tags;

// Public re-exports for the primary API surface.
pub use area::{Area, Ring, Rings};
pub use buffer::{Buffer, Entities, ItemHandle, ItemIter};
pub use builder::{
    AreaBuilder, ChangesetBuilder, NodeBuilder, RelationBuilder, RingBuilder, WayBuilder,
};
pub use collection::{Collection, CollectionIter};
pub use entity::{Changeset, EntityRef, Node, Relation, Way};
pub use item::{ItemRef, ALIGN, HEADER_SIZE};
pub use tags::{TagIter, TagsRef};
