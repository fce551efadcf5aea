//! Fixed-size elements stored in collection records.

use crate::id::ObjectId;
use crate::kind::ItemKind;
use crate::location::Location;

/// A fixed-size value that can be stored as one element of a
/// collection record.
///
/// Implementations define their encoded width and a little-endian
/// codec. `read` is always handed a slice of exactly [`Element::SIZE`]
/// bytes cut from a committed arena region, so implementations index
/// it directly.
pub trait Element: Copy {
    /// Encoded width in bytes. Must be a multiple of the arena
    /// alignment so collections never need internal padding.
    const SIZE: usize;

    /// Decode one element from its encoded form.
    fn read(bytes: &[u8]) -> Self;

    /// Append the encoded form to `out`.
    fn write(&self, out: &mut Vec<u8>);
}

/// A reference to a node, with an optional cached location.
///
/// Ways and area rings store these. The location starts undefined when
/// the reference comes from a `<nd ref="..."/>` element and is filled
/// in by whoever resolves node locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRef {
    id: ObjectId,
    location: Location,
}

impl NodeRef {
    /// A reference with an undefined location.
    pub fn new(id: impl Into<ObjectId>) -> Self {
        Self {
            id: id.into(),
            location: Location::undefined(),
        }
    }

    /// A reference with a known location.
    pub fn with_location(id: impl Into<ObjectId>, location: Location) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }

    /// The referenced node's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The cached location, possibly undefined.
    pub fn location(&self) -> Location {
        self.location
    }
}

impl Element for NodeRef {
    const SIZE: usize = 16;

    fn read(bytes: &[u8]) -> Self {
        let id = i64::from_le_bytes(bytes[0..8].try_into().expect("slice is SIZE bytes"));
        let x = i32::from_le_bytes(bytes[8..12].try_into().expect("slice is SIZE bytes"));
        let y = i32::from_le_bytes(bytes[12..16].try_into().expect("slice is SIZE bytes"));
        Self {
            id: ObjectId(id),
            location: Location::new(x, y),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.0.to_le_bytes());
        out.extend_from_slice(&self.location.x().to_le_bytes());
        out.extend_from_slice(&self.location.y().to_le_bytes());
    }
}

/// One member of a relation: a target id plus the kind it refers to.
///
/// The encoded form is the id, the kind tag byte, and seven padding
/// bytes, keeping the element width at the arena alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member {
    id: ObjectId,
    kind: ItemKind,
}

impl Member {
    /// Build a member reference. `kind` must be an entity kind.
    pub fn new(kind: ItemKind, id: impl Into<ObjectId>) -> Self {
        debug_assert!(kind.is_entity(), "members reference entities");
        Self {
            id: id.into(),
            kind,
        }
    }

    /// The referenced object's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The kind of object referenced.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }
}

impl Element for Member {
    const SIZE: usize = 16;

    fn read(bytes: &[u8]) -> Self {
        let id = i64::from_le_bytes(bytes[0..8].try_into().expect("slice is SIZE bytes"));
        let tag = bytes[8];
        let kind = match ItemKind::from_u8(tag) {
            Some(kind) if kind.is_entity() => kind,
            _ => panic!("corrupt member element: kind tag 0x{tag:02x}"),
        };
        Self {
            id: ObjectId(id),
            kind,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.0.to_le_bytes());
        out.push(self.kind.as_u8());
        out.extend_from_slice(&[0u8; 7]);
    }
}
