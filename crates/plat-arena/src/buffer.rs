//! The append-only arena buffer and its commit watermark.

use crate::entity::EntityRef;
use crate::item::{self, ItemRef, ALIGN, HEADER_SIZE};
use plat_core::ItemKind;
use std::fmt;

/// An append-only byte arena holding aligned, length-prefixed records.
///
/// Records are staged by appending past the commit watermark and
/// become visible to iteration only when [`Buffer::commit`] advances
/// the watermark over them. [`Buffer::rollback`] discards everything
/// staged since the last commit, which is how a producer abandons a
/// record that fails validation half-way through construction.
///
/// A buffer is a plain value: producers build one up, then hand it
/// off wholesale (typically through a channel) and start the next.
/// The default-constructed empty buffer is the conventional
/// end-of-stream marker on such channels.
#[derive(Default)]
pub struct Buffer {
    data: Vec<u8>,
    committed: usize,
    /// Offsets of records currently under construction, innermost
    /// last. Must be empty at commit time.
    open: Vec<usize>,
}

impl Buffer {
    /// An empty buffer with no backing allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer with `bytes` of pre-allocated capacity.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            committed: 0,
            open: Vec::new(),
        }
    }

    /// Bytes below the commit watermark.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Total bytes written, staged bytes included.
    pub fn written(&self) -> usize {
        self.data.len()
    }

    /// Current backing capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Whether the buffer holds no bytes at all.
    ///
    /// This is the test for the end-of-stream marker.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Advance the commit watermark over all staged bytes, making the
    /// records appended since the last commit visible to iteration in
    /// one step.
    ///
    /// Panics if a record is still under construction: committing a
    /// half-built record would publish a placeholder length.
    pub fn commit(&mut self) {
        assert!(
            self.open.is_empty(),
            "commit with a record still under construction"
        );
        debug_assert_eq!(self.data.len() % ALIGN, 0);
        self.committed = self.data.len();
    }

    /// Discard all staged bytes, restoring the buffer to its state at
    /// the last commit.
    pub fn rollback(&mut self) {
        self.data.truncate(self.committed);
        self.open.clear();
    }

    /// Append a complete record with the given payload.
    ///
    /// The payload is copied, zero-padded to the arena alignment, and
    /// prefixed with a header. The returned handle stays valid for the
    /// life of the buffer. The record is staged, not committed.
    pub fn append_item(&mut self, kind: ItemKind, payload: &[u8]) -> ItemHandle {
        let start = self.begin_item(kind);
        self.push_bytes(payload);
        self.end_item(start);
        ItemHandle { offset: start }
    }

    /// Look up a record by handle.
    ///
    /// Staged records are visible through their handle even before the
    /// commit that publishes them; only iteration is gated on the
    /// watermark.
    pub fn get(&self, handle: ItemHandle) -> ItemRef<'_> {
        let (item, _) = item::split_item(&self.data, handle.offset);
        item
    }

    /// Iterate over the raw records in the committed region.
    pub fn iter(&self) -> ItemIter<'_> {
        ItemIter {
            region: &self.data[..self.committed],
            pos: 0,
        }
    }

    /// Iterate over the committed region as typed entity views.
    ///
    /// Panics if a nested record kind shows up at the top level, which
    /// only happens when the arena bytes are corrupt.
    pub fn entities(&self) -> Entities<'_> {
        Entities { items: self.iter() }
    }

    /// Open a record and write its header with a placeholder length.
    /// Returns the record's start offset for [`Buffer::end_item`].
    pub(crate) fn begin_item(&mut self, kind: ItemKind) -> usize {
        debug_assert_eq!(self.data.len() % ALIGN, 0);
        let start = self.data.len();
        self.open.push(start);
        self.data.extend_from_slice(&item::encoded_header(kind, 0));
        start
    }

    /// Append raw payload bytes to the record currently open.
    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Close the record opened at `start`: pad to alignment and patch
    /// the real length into the header. Records close innermost-first.
    pub(crate) fn end_item(&mut self, start: usize) {
        assert_eq!(
            self.open.last().copied(),
            Some(start),
            "records must be closed innermost-first"
        );
        self.open.pop();
        while self.data.len() % ALIGN != 0 {
            self.data.push(0);
        }
        let size = self.data.len() - start;
        assert!(
            u32::try_from(size).is_ok(),
            "record of {size} bytes exceeds the length field"
        );
        self.data[start..start + 4].copy_from_slice(&(size as u32).to_le_bytes());
    }

    #[cfg(test)]
    pub(crate) fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("committed", &self.committed)
            .field("written", &self.data.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Buffer {
    type Item = ItemRef<'a>;
    type IntoIter = ItemIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Buffers move across the producer/consumer channel.
const _: fn() = || {
    fn assert_send<T: Send>() {}
    assert_send::<Buffer>();
};

/// Stable reference to a record appended to a [`Buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemHandle {
    pub(crate) offset: usize,
}

impl ItemHandle {
    /// Byte offset of the record inside its buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Iterator over the raw records of a committed region.
pub struct ItemIter<'a> {
    region: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for ItemIter<'a> {
    type Item = ItemRef<'a>;

    fn next(&mut self) -> Option<ItemRef<'a>> {
        if self.pos == self.region.len() {
            return None;
        }
        let (item, next) = item::split_item(self.region, self.pos);
        self.pos = next;
        Some(item)
    }
}

/// Iterator over the committed region as typed entity views.
pub struct Entities<'a> {
    items: ItemIter<'a>,
}

impl<'a> Iterator for Entities<'a> {
    type Item = EntityRef<'a>;

    fn next(&mut self) -> Option<EntityRef<'a>> {
        let item = self.items.next()?;
        let entity = EntityRef::from_item(item).unwrap_or_else(|| {
            panic!(
                "corrupt arena: nested record kind `{}` at the top level",
                item.kind()
            )
        });
        Some(entity)
    }
}
