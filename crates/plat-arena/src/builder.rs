//! Incremental construction of entity records.
//!
//! Builders stage one entity at a time into a [`Buffer`]: the fixed
//! head is written up front, nested records (tags, node lists,
//! members, rings) are appended as they arrive, and `finish` closes
//! the record and commits it. Dropping a builder without calling
//! `finish` leaves the staged bytes behind; the buffer refuses to
//! commit them and [`Buffer::rollback`] reclaims the space.

use crate::buffer::{Buffer, ItemHandle};
use plat_core::{Element, ItemKind, Location, Member, NodeRef, ObjectId, RingKind, Timestamp};

/// Shared plumbing for all entity builders: the open parent record,
/// the optional open tag list, and a scratch buffer for element
/// encoding.
struct EntityScaffold<'b> {
    buf: &'b mut Buffer,
    start: usize,
    tags_start: Option<usize>,
    tags_done: bool,
    scratch: Vec<u8>,
}

impl<'b> EntityScaffold<'b> {
    fn begin(
        buf: &'b mut Buffer,
        kind: ItemKind,
        id: ObjectId,
        version: u32,
        timestamp: Timestamp,
    ) -> Self {
        let start = buf.begin_item(kind);
        buf.push_bytes(&id.0.to_le_bytes());
        buf.push_bytes(&version.to_le_bytes());
        buf.push_bytes(&timestamp.seconds().to_le_bytes());
        Self {
            buf,
            start,
            tags_start: None,
            tags_done: false,
            scratch: Vec::new(),
        }
    }

    fn add_tag(&mut self, key: &str, value: &str) {
        assert!(!key.is_empty(), "tag keys must not be empty");
        assert!(
            !key.as_bytes().contains(&0) && !value.as_bytes().contains(&0),
            "tag strings must not contain NUL"
        );
        assert!(!self.tags_done, "tags must be added before nested lists");
        if self.tags_start.is_none() {
            self.tags_start = Some(self.buf.begin_item(ItemKind::TagList));
        }
        self.buf.push_bytes(key.as_bytes());
        self.buf.push_bytes(&[0]);
        self.buf.push_bytes(value.as_bytes());
        self.buf.push_bytes(&[0]);
    }

    fn tags_started(&self) -> bool {
        self.tags_start.is_some() || self.tags_done
    }

    fn close_tags(&mut self) {
        if let Some(start) = self.tags_start.take() {
            self.buf.end_item(start);
        }
        self.tags_done = true;
    }

    fn push_element<E: Element>(&mut self, element: &E) {
        self.scratch.clear();
        element.write(&mut self.scratch);
        self.buf.push_bytes(&self.scratch);
    }

    fn append_empty_list(&mut self, kind: ItemKind) {
        let start = self.buf.begin_item(kind);
        self.buf.end_item(start);
    }

    fn finish(mut self) -> ItemHandle {
        self.close_tags();
        let start = self.start;
        self.buf.end_item(start);
        self.buf.commit();
        ItemHandle { offset: start }
    }
}

/// Builds a node record.
pub struct NodeBuilder<'b> {
    inner: EntityScaffold<'b>,
}

impl<'b> NodeBuilder<'b> {
    /// Open a node record and write its head and location.
    pub fn new(
        buf: &'b mut Buffer,
        id: impl Into<ObjectId>,
        version: u32,
        timestamp: Timestamp,
        location: Location,
    ) -> Self {
        let mut inner = EntityScaffold::begin(buf, ItemKind::Node, id.into(), version, timestamp);
        inner.buf.push_bytes(&location.x().to_le_bytes());
        inner.buf.push_bytes(&location.y().to_le_bytes());
        Self { inner }
    }

    /// Append one tag pair. Keys must be non-empty and NUL-free.
    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.inner.add_tag(key, value);
    }

    /// Close the record and commit the buffer.
    pub fn finish(self) -> ItemHandle {
        self.inner.finish()
    }
}

/// Builds a way record.
pub struct WayBuilder<'b> {
    inner: EntityScaffold<'b>,
    nodes_start: Option<usize>,
    nodes_emitted: bool,
}

impl<'b> WayBuilder<'b> {
    /// Open a way record and write its head.
    pub fn new(
        buf: &'b mut Buffer,
        id: impl Into<ObjectId>,
        version: u32,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            inner: EntityScaffold::begin(buf, ItemKind::Way, id.into(), version, timestamp),
            nodes_start: None,
            nodes_emitted: false,
        }
    }

    /// Append one node reference.
    ///
    /// All node references must come before the first tag, so the way
    /// ends up with exactly one node list.
    pub fn add_node_ref(&mut self, node_ref: NodeRef) {
        assert!(
            !self.inner.tags_started(),
            "node refs must be added before tags"
        );
        if self.nodes_start.is_none() {
            self.nodes_start = Some(self.inner.buf.begin_item(ItemKind::WayNodeList));
        }
        self.inner.push_element(&node_ref);
    }

    /// Append one tag pair.
    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.close_nodes();
        self.inner.add_tag(key, value);
    }

    /// Close the record and commit the buffer.
    ///
    /// A way always gets a node list, so one is written empty if no
    /// references were added.
    pub fn finish(mut self) -> ItemHandle {
        self.close_nodes();
        self.inner.close_tags();
        if !self.nodes_emitted {
            self.inner.append_empty_list(ItemKind::WayNodeList);
        }
        self.inner.finish()
    }

    fn close_nodes(&mut self) {
        if let Some(start) = self.nodes_start.take() {
            self.inner.buf.end_item(start);
            self.nodes_emitted = true;
        }
    }
}

/// Builds a relation record.
pub struct RelationBuilder<'b> {
    inner: EntityScaffold<'b>,
    members_start: Option<usize>,
    members_emitted: bool,
}

impl<'b> RelationBuilder<'b> {
    /// Open a relation record and write its head.
    pub fn new(
        buf: &'b mut Buffer,
        id: impl Into<ObjectId>,
        version: u32,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            inner: EntityScaffold::begin(buf, ItemKind::Relation, id.into(), version, timestamp),
            members_start: None,
            members_emitted: false,
        }
    }

    /// Append one member reference, before the first tag.
    pub fn add_member(&mut self, member: Member) {
        assert!(
            !self.inner.tags_started(),
            "members must be added before tags"
        );
        if self.members_start.is_none() {
            self.members_start = Some(self.inner.buf.begin_item(ItemKind::MemberList));
        }
        self.inner.push_element(&member);
    }

    /// Append one tag pair.
    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.close_members();
        self.inner.add_tag(key, value);
    }

    /// Close the record and commit the buffer. A relation always gets
    /// a member list, written empty if no members were added.
    pub fn finish(mut self) -> ItemHandle {
        self.close_members();
        self.inner.close_tags();
        if !self.members_emitted {
            self.inner.append_empty_list(ItemKind::MemberList);
        }
        self.inner.finish()
    }

    fn close_members(&mut self) {
        if let Some(start) = self.members_start.take() {
            self.inner.buf.end_item(start);
            self.members_emitted = true;
        }
    }
}

/// Builds a changeset record.
pub struct ChangesetBuilder<'b> {
    inner: EntityScaffold<'b>,
}

impl<'b> ChangesetBuilder<'b> {
    /// Open a changeset record and write its head.
    pub fn new(
        buf: &'b mut Buffer,
        id: impl Into<ObjectId>,
        version: u32,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            inner: EntityScaffold::begin(buf, ItemKind::Changeset, id.into(), version, timestamp),
        }
    }

    /// Append one tag pair.
    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.inner.add_tag(key, value);
    }

    /// Close the record and commit the buffer.
    pub fn finish(self) -> ItemHandle {
        self.inner.finish()
    }
}

/// Builds an area record.
///
/// The caller supplies the id already mapped into the doubled id
/// space: twice the source way id, or twice the source relation id
/// with the magnitude's low bit set.
pub struct AreaBuilder<'b> {
    inner: EntityScaffold<'b>,
}

impl<'b> AreaBuilder<'b> {
    /// Open an area record and write its head.
    pub fn new(
        buf: &'b mut Buffer,
        id: impl Into<ObjectId>,
        version: u32,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            inner: EntityScaffold::begin(buf, ItemKind::Area, id.into(), version, timestamp),
        }
    }

    /// Append one tag pair. Tags must precede the first ring.
    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.inner.add_tag(key, value);
    }

    /// Open a ring of the given classification.
    ///
    /// The returned builder borrows this one, so rings are naturally
    /// written one at a time, in call order.
    pub fn begin_ring(&mut self, kind: RingKind) -> RingBuilder<'_, 'b> {
        self.inner.close_tags();
        let start = self.inner.buf.begin_item(kind.item_kind());
        RingBuilder { owner: self, start }
    }

    /// Close the record and commit the buffer.
    pub fn finish(self) -> ItemHandle {
        self.inner.finish()
    }
}

/// Builds one ring inside an [`AreaBuilder`].
///
/// The ring record closes when this builder goes away, whether through
/// [`RingBuilder::finish`] or a plain drop.
pub struct RingBuilder<'r, 'b> {
    owner: &'r mut AreaBuilder<'b>,
    start: usize,
}

impl RingBuilder<'_, '_> {
    /// Append one node reference to the ring.
    pub fn add_node_ref(&mut self, node_ref: NodeRef) {
        self.owner.inner.push_element(&node_ref);
    }

    /// Close the ring record.
    pub fn finish(self) {}
}

impl Drop for RingBuilder<'_, '_> {
    fn drop(&mut self) {
        self.owner.inner.buf.end_item(self.start);
    }
}
