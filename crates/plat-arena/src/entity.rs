//! Zero-copy views over committed entity records.

use crate::area::Area;
use crate::collection::Collection;
use crate::item::{self, ItemRef};
use crate::tags::TagsRef;
use plat_core::{ItemKind, Location, Member, NodeRef, ObjectId, Timestamp};

/// Width of the object head shared by every entity kind: id, version,
/// and timestamp.
pub(crate) const HEAD_SIZE: usize = 16;

pub(crate) fn head_id(item: ItemRef<'_>) -> ObjectId {
    ObjectId(item::read_i64_at(item.payload(), 0))
}

pub(crate) fn head_version(item: ItemRef<'_>) -> u32 {
    item::read_u32_at(item.payload(), 8)
}

pub(crate) fn head_timestamp(item: ItemRef<'_>) -> Timestamp {
    Timestamp(item::read_u32_at(item.payload(), 12))
}

/// Iterate the nested records that follow an entity's head.
pub(crate) fn sub_items(item: ItemRef<'_>) -> SubItems<'_> {
    SubItems {
        region: &item.payload()[head_width(item.kind())..],
        pos: 0,
    }
}

/// First nested record of the given kind, if present.
pub(crate) fn find_sub_item(item: ItemRef<'_>, kind: ItemKind) -> Option<ItemRef<'_>> {
    sub_items(item).find(|sub| sub.kind() == kind)
}

pub(crate) fn head_tags(item: ItemRef<'_>) -> TagsRef<'_> {
    match find_sub_item(item, ItemKind::TagList) {
        Some(sub) => TagsRef::new(sub),
        None => TagsRef::empty(),
    }
}

/// Bytes of fixed payload before the nested records begin.
fn head_width(kind: ItemKind) -> usize {
    match kind {
        // A node carries its location directly after the head.
        ItemKind::Node => HEAD_SIZE + 8,
        _ => HEAD_SIZE,
    }
}

/// Iterator over the nested records inside an entity payload.
pub(crate) struct SubItems<'a> {
    region: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for SubItems<'a> {
    type Item = ItemRef<'a>;

    fn next(&mut self) -> Option<ItemRef<'a>> {
        if self.pos == self.region.len() {
            return None;
        }
        let (sub, next) = item::split_item(self.region, self.pos);
        self.pos = next;
        Some(sub)
    }
}

/// A point feature with a location.
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    item: ItemRef<'a>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::Node);
        Self { item }
    }

    /// The node's id.
    pub fn id(&self) -> ObjectId {
        head_id(self.item)
    }

    /// The node's version.
    pub fn version(&self) -> u32 {
        head_version(self.item)
    }

    /// The node's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        head_timestamp(self.item)
    }

    /// The node's location, possibly undefined.
    pub fn location(&self) -> Location {
        let payload = self.item.payload();
        Location::new(
            item::read_i32_at(payload, HEAD_SIZE),
            item::read_i32_at(payload, HEAD_SIZE + 4),
        )
    }

    /// The node's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        head_tags(self.item)
    }
}

/// An ordered sequence of node references.
#[derive(Clone, Copy, Debug)]
pub struct Way<'a> {
    item: ItemRef<'a>,
}

impl<'a> Way<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::Way);
        Self { item }
    }

    /// The way's id.
    pub fn id(&self) -> ObjectId {
        head_id(self.item)
    }

    /// The way's version.
    pub fn version(&self) -> u32 {
        head_version(self.item)
    }

    /// The way's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        head_timestamp(self.item)
    }

    /// The way's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        head_tags(self.item)
    }

    /// The node references, in document order.
    ///
    /// Builders always write the node list, so its absence means the
    /// record bytes are corrupt.
    pub fn nodes(&self) -> Collection<'a, NodeRef> {
        let sub = find_sub_item(self.item, ItemKind::WayNodeList)
            .unwrap_or_else(|| panic!("corrupt arena: way record without a node list"));
        Collection::new(sub)
    }
}

/// A grouping of member references.
#[derive(Clone, Copy, Debug)]
pub struct Relation<'a> {
    item: ItemRef<'a>,
}

impl<'a> Relation<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::Relation);
        Self { item }
    }

    /// The relation's id.
    pub fn id(&self) -> ObjectId {
        head_id(self.item)
    }

    /// The relation's version.
    pub fn version(&self) -> u32 {
        head_version(self.item)
    }

    /// The relation's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        head_timestamp(self.item)
    }

    /// The relation's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        head_tags(self.item)
    }

    /// The members, in document order.
    pub fn members(&self) -> Collection<'a, Member> {
        let sub = find_sub_item(self.item, ItemKind::MemberList)
            .unwrap_or_else(|| panic!("corrupt arena: relation record without a member list"));
        Collection::new(sub)
    }
}

/// An edit-session record.
#[derive(Clone, Copy, Debug)]
pub struct Changeset<'a> {
    item: ItemRef<'a>,
}

impl<'a> Changeset<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::Changeset);
        Self { item }
    }

    /// The changeset's id.
    pub fn id(&self) -> ObjectId {
        head_id(self.item)
    }

    /// The changeset's version.
    pub fn version(&self) -> u32 {
        head_version(self.item)
    }

    /// The changeset's creation timestamp.
    pub fn timestamp(&self) -> Timestamp {
        head_timestamp(self.item)
    }

    /// The changeset's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        head_tags(self.item)
    }
}

/// A typed view of any top-level entity record.
///
/// This is the closed set of things a buffer can hold at its top
/// level; matching on it replaces downcasting from a common object
/// base.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    /// A point feature.
    Node(Node<'a>),
    /// An ordered sequence of node references.
    Way(Way<'a>),
    /// A grouping of member references.
    Relation(Relation<'a>),
    /// An edit-session record.
    Changeset(Changeset<'a>),
    /// An assembled polygon.
    Area(Area<'a>),
}

impl<'a> EntityRef<'a> {
    /// Wrap a raw record in its typed view. Returns `None` for nested
    /// record kinds, which never appear at the top level of a
    /// well-formed arena.
    pub fn from_item(item: ItemRef<'a>) -> Option<Self> {
        match item.kind() {
            ItemKind::Node => Some(Self::Node(Node::new(item))),
            ItemKind::Way => Some(Self::Way(Way::new(item))),
            ItemKind::Relation => Some(Self::Relation(Relation::new(item))),
            ItemKind::Changeset => Some(Self::Changeset(Changeset::new(item))),
            ItemKind::Area => Some(Self::Area(Area::new(item))),
            _ => None,
        }
    }

    /// The entity's kind tag.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Node(_) => ItemKind::Node,
            Self::Way(_) => ItemKind::Way,
            Self::Relation(_) => ItemKind::Relation,
            Self::Changeset(_) => ItemKind::Changeset,
            Self::Area(_) => ItemKind::Area,
        }
    }

    /// The entity's id.
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Node(n) => n.id(),
            Self::Way(w) => w.id(),
            Self::Relation(r) => r.id(),
            Self::Changeset(c) => c.id(),
            Self::Area(a) => a.id(),
        }
    }

    /// The entity's version.
    pub fn version(&self) -> u32 {
        match self {
            Self::Node(n) => n.version(),
            Self::Way(w) => w.version(),
            Self::Relation(r) => r.version(),
            Self::Changeset(c) => c.version(),
            Self::Area(a) => a.version(),
        }
    }

    /// The entity's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Node(n) => n.timestamp(),
            Self::Way(w) => w.timestamp(),
            Self::Relation(r) => r.timestamp(),
            Self::Changeset(c) => c.timestamp(),
            Self::Area(a) => a.timestamp(),
        }
    }

    /// The entity's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        match self {
            Self::Node(n) => n.tags(),
            Self::Way(w) => w.tags(),
            Self::Relation(r) => r.tags(),
            Self::Changeset(c) => c.tags(),
            Self::Area(a) => a.tags(),
        }
    }
}
