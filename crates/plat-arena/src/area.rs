//! Zero-copy views over assembled polygon records.

use crate::collection::Collection;
use crate::entity::{self, SubItems};
use crate::item::ItemRef;
use crate::tags::TagsRef;
use plat_core::{ItemKind, NodeRef, ObjectId, RingKind, Timestamp};

/// An assembled polygon with outer and inner rings.
///
/// Areas are derived objects: an area is built either from a closed
/// way or from a multipolygon relation, and its id encodes which. The
/// source id is doubled, with the low bit of the magnitude set for
/// relation-derived areas, so both sources map into one id space
/// without colliding.
#[derive(Clone, Copy, Debug)]
pub struct Area<'a> {
    item: ItemRef<'a>,
}

impl<'a> Area<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::Area);
        Self { item }
    }

    /// The area's own id, in the doubled id space.
    pub fn id(&self) -> ObjectId {
        entity::head_id(self.item)
    }

    /// The area's version.
    pub fn version(&self) -> u32 {
        entity::head_version(self.item)
    }

    /// The area's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        entity::head_timestamp(self.item)
    }

    /// The area's tags.
    pub fn tags(&self) -> TagsRef<'a> {
        entity::head_tags(self.item)
    }

    /// Whether this area was built from a closed way.
    ///
    /// Way-derived areas have an even id magnitude, relation-derived
    /// ones an odd magnitude.
    pub fn from_way(&self) -> bool {
        self.id().magnitude() & 1 == 0
    }

    /// The id of the way or relation this area was built from.
    pub fn orig_id(&self) -> ObjectId {
        ObjectId(self.id().0 / 2)
    }

    /// Count `(outer, inner)` rings in one pass over the payload.
    ///
    /// Nested records that are not rings, such as the tag list, are
    /// skipped.
    pub fn num_rings(&self) -> (usize, usize) {
        let mut outer = 0;
        let mut inner = 0;
        for sub in entity::sub_items(self.item) {
            match sub.kind().ring_kind() {
                Some(RingKind::Outer) => outer += 1,
                Some(RingKind::Inner) => inner += 1,
                None => {}
            }
        }
        (outer, inner)
    }

    /// Iterate over the rings in storage order, outer and inner
    /// interleaved exactly as they were written.
    pub fn rings(&self) -> Rings<'a> {
        Rings {
            sub: entity::sub_items(self.item),
        }
    }
}

/// Iterator over the rings of an [`Area`].
pub struct Rings<'a> {
    sub: SubItems<'a>,
}

impl<'a> Iterator for Rings<'a> {
    type Item = Ring<'a>;

    fn next(&mut self) -> Option<Ring<'a>> {
        loop {
            let sub = self.sub.next()?;
            if let Some(kind) = sub.kind().ring_kind() {
                return Some(Ring {
                    kind,
                    nodes: Collection::new(sub),
                });
            }
        }
    }
}

/// One ring of an area: a classification plus its node references.
#[derive(Clone, Copy, Debug)]
pub struct Ring<'a> {
    kind: RingKind,
    nodes: Collection<'a, NodeRef>,
}

impl<'a> Ring<'a> {
    /// Whether this is an outer or inner ring.
    pub fn kind(&self) -> RingKind {
        self.kind
    }

    /// Number of node references in the ring.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the ring holds no node references.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Decode the `n`-th node reference. Panics if out of range.
    pub fn get(&self, n: usize) -> NodeRef {
        self.nodes.get(n)
    }

    /// Iterate over the node references in storage order.
    pub fn iter(&self) -> crate::collection::CollectionIter<'a, NodeRef> {
        self.nodes.iter()
    }
}
