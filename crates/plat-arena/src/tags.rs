//! Zero-copy views over tag list records.

use crate::item::ItemRef;
use plat_core::ItemKind;

/// Borrowed view of an entity's key/value tags.
///
/// The payload is a run of `key NUL value NUL` pairs, zero-padded to
/// the arena alignment. Keys are never empty, so a NUL where a key
/// should start is the padding and ends iteration.
#[derive(Clone, Copy, Debug)]
pub struct TagsRef<'a> {
    payload: &'a [u8],
}

impl<'a> TagsRef<'a> {
    pub(crate) fn new(item: ItemRef<'a>) -> Self {
        debug_assert_eq!(item.kind(), ItemKind::TagList);
        Self {
            payload: item.payload(),
        }
    }

    /// The view an entity without a tag list reports.
    pub(crate) const fn empty() -> Self {
        Self { payload: &[] }
    }

    /// Iterate over `(key, value)` pairs in storage order.
    pub fn iter(&self) -> TagIter<'a> {
        TagIter { rest: self.payload }
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Whether there are no tags at all.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of tag pairs. Walks the payload, so this is linear.
    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for TagsRef<'a> {
    type Item = (&'a str, &'a str);
    type IntoIter = TagIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the `(key, value)` pairs of a [`TagsRef`].
pub struct TagIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for TagIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<(&'a str, &'a str)> {
        if self.rest.first().is_none_or(|&b| b == 0) {
            return None;
        }
        let (key, rest) = take_string(self.rest);
        let (value, rest) = take_string(rest);
        self.rest = rest;
        Some((key, value))
    }
}

/// Cut one NUL-terminated string off the front of `bytes`.
fn take_string(bytes: &[u8]) -> (&str, &[u8]) {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .expect("corrupt arena: unterminated tag string");
    let s = std::str::from_utf8(&bytes[..nul]).expect("corrupt arena: tag bytes are not UTF-8");
    (s, &bytes[nul + 1..])
}
