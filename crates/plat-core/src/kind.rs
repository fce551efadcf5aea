//! Record kind tags and ring classification.

use std::fmt;

/// Discriminant tag identifying what a record in an arena holds.
///
/// The tag is stored as a single byte in every record header. Entity
/// kinds occupy the low range, nested payload kinds the `0x1x` range,
/// and area ring kinds the `0x2x` range. Tag values are part of the
/// wire layout and must never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ItemKind {
    /// A point feature with a location.
    Node = 0x01,
    /// An ordered sequence of node references.
    Way = 0x02,
    /// A grouping of member references.
    Relation = 0x03,
    /// An edit-session record.
    Changeset = 0x04,
    /// An assembled polygon with outer and inner rings.
    Area = 0x05,
    /// Key/value tag pairs nested inside an entity.
    TagList = 0x11,
    /// The node references of a way.
    WayNodeList = 0x12,
    /// The members of a relation.
    MemberList = 0x13,
    /// An outer (shell) ring of an area.
    OuterRing = 0x21,
    /// An inner (hole) ring of an area.
    InnerRing = 0x22,
}

impl ItemKind {
    /// Decode a tag byte. Returns `None` for values outside the layout.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Node),
            0x02 => Some(Self::Way),
            0x03 => Some(Self::Relation),
            0x04 => Some(Self::Changeset),
            0x05 => Some(Self::Area),
            0x11 => Some(Self::TagList),
            0x12 => Some(Self::WayNodeList),
            0x13 => Some(Self::MemberList),
            0x21 => Some(Self::OuterRing),
            0x22 => Some(Self::InnerRing),
            _ => None,
        }
    }

    /// The tag byte stored in a record header.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this kind appears at the top level of an arena.
    ///
    /// Non-entity kinds only ever appear nested inside an entity's
    /// payload.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Self::Node | Self::Way | Self::Relation | Self::Changeset | Self::Area
        )
    }

    /// The ring classification, if this kind is a ring.
    pub fn ring_kind(self) -> Option<RingKind> {
        match self {
            Self::OuterRing => Some(RingKind::Outer),
            Self::InnerRing => Some(RingKind::Inner),
            _ => None,
        }
    }

    /// Lowercase name used in messages and element dispatch.
    pub fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
            Self::Changeset => "changeset",
            Self::Area => "area",
            Self::TagList => "tag list",
            Self::WayNodeList => "way node list",
            Self::MemberList => "member list",
            Self::OuterRing => "outer ring",
            Self::InnerRing => "inner ring",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of an area ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RingKind {
    /// A shell that encloses the polygon interior.
    Outer,
    /// A hole cut out of an outer ring.
    Inner,
}

impl RingKind {
    /// The record kind used to store a ring of this classification.
    pub fn item_kind(self) -> ItemKind {
        match self {
            Self::Outer => ItemKind::OuterRing,
            Self::Inner => ItemKind::InnerRing,
        }
    }
}
