//! Typed views over records holding fixed-size elements.

use crate::item::ItemRef;
use plat_core::{Element, ItemKind};
use std::marker::PhantomData;

/// A record payload viewed as a sequence of fixed-size elements.
///
/// The element count is derived from the record length, so the payload
/// must divide exactly by [`Element::SIZE`]; a remainder means the
/// record was written under a different layout and the view panics
/// rather than guess.
#[derive(Clone, Copy, Debug)]
pub struct Collection<'a, T: Element> {
    item: ItemRef<'a>,
    _elements: PhantomData<fn() -> T>,
}

impl<'a, T: Element> Collection<'a, T> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        let payload = item.payload().len();
        assert!(
            payload % T::SIZE == 0,
            "corrupt arena: {} payload of {payload} bytes does not divide into {}-byte elements",
            item.kind(),
            T::SIZE
        );
        Self {
            item,
            _elements: PhantomData,
        }
    }

    /// The kind tag of the underlying record.
    pub fn kind(&self) -> ItemKind {
        self.item.kind()
    }

    /// Number of elements in the record.
    pub fn len(&self) -> usize {
        self.item.payload().len() / T::SIZE
    }

    /// Whether the record holds no elements.
    pub fn is_empty(&self) -> bool {
        self.item.payload().is_empty()
    }

    /// Decode the `n`-th element. Panics if `n` is out of range.
    pub fn get(&self, n: usize) -> T {
        let len = self.len();
        assert!(n < len, "element index {n} out of range for {len}");
        T::read(&self.item.payload()[n * T::SIZE..(n + 1) * T::SIZE])
    }

    /// Iterate over the elements in storage order.
    pub fn iter(&self) -> CollectionIter<'a, T> {
        CollectionIter {
            payload: self.item.payload(),
            pos: 0,
            _elements: PhantomData,
        }
    }
}

impl<'a, T: Element> IntoIterator for Collection<'a, T> {
    type Item = T;
    type IntoIter = CollectionIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`Collection`].
pub struct CollectionIter<'a, T: Element> {
    payload: &'a [u8],
    pos: usize,
    _elements: PhantomData<fn() -> T>,
}

impl<T: Element> Iterator for CollectionIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.pos == self.payload.len() {
            return None;
        }
        let element = T::read(&self.payload[self.pos..self.pos + T::SIZE]);
        self.pos += T::SIZE;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.payload.len() - self.pos) / T::SIZE;
        (remaining, Some(remaining))
    }
}

impl<T: Element> ExactSizeIterator for CollectionIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use plat_core::{Location, NodeRef};

    fn ring_buffer(refs: &[NodeRef]) -> Buffer {
        let mut payload = Vec::new();
        for r in refs {
            r.write(&mut payload);
        }
        let mut buf = Buffer::new();
        buf.append_item(ItemKind::OuterRing, &payload);
        buf.commit();
        buf
    }

    #[test]
    fn elements_come_back_in_storage_order() {
        let refs = [
            NodeRef::with_location(1, Location::new(10, 20)),
            NodeRef::with_location(2, Location::new(30, 40)),
            NodeRef::new(3),
        ];
        let buf = ring_buffer(&refs);
        let item = buf.iter().next().unwrap();
        let coll = Collection::<NodeRef>::new(item);
        assert_eq!(coll.len(), 3);
        assert!(!coll.is_empty());
        assert_eq!(coll.kind(), ItemKind::OuterRing);
        let decoded: Vec<_> = coll.iter().collect();
        assert_eq!(decoded, refs);
        assert_eq!(coll.get(1), refs[1]);
    }

    #[test]
    fn empty_record_is_an_empty_collection() {
        let buf = ring_buffer(&[]);
        let coll = Collection::<NodeRef>::new(buf.iter().next().unwrap());
        assert_eq!(coll.len(), 0);
        assert!(coll.is_empty());
        assert_eq!(coll.iter().len(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let buf = ring_buffer(&[NodeRef::new(1)]);
        let coll = Collection::<NodeRef>::new(buf.iter().next().unwrap());
        coll.get(1);
    }

    #[test]
    #[should_panic(expected = "does not divide")]
    fn payload_with_a_remainder_panics() {
        let mut buf = Buffer::new();
        // 8 bytes is aligned but not a whole 16-byte element.
        buf.append_item(ItemKind::WayNodeList, &[0u8; 8]);
        buf.commit();
        Collection::<NodeRef>::new(buf.iter().next().unwrap());
    }
}
