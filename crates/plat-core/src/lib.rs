//! Core types for the plat OpenStreetMap toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the plat workspace:
//! record kind tags, object ids, fixed-point locations, timestamps,
//! fixed-size collection elements, and the entity filter.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod filter;
pub mod id;
pub mod kind;
pub mod location;
pub mod timestamp;

// Public re-exports for the primary API surface.
pub use element::{Element, Member, NodeRef};
pub use filter::EntityFilter;
pub use id::ObjectId;
pub use kind::{ItemKind, RingKind};
pub use location::Location;
pub use timestamp::Timestamp;
