//! Record headers and raw record views.

use plat_core::ItemKind;

/// Alignment of every record inside an arena, in bytes.
///
/// Record starts, record lengths, and element widths are all multiples
/// of this value, so decoding never reads an unaligned scalar.
pub const ALIGN: usize = 8;

/// Width of the record header: a `u32` length, a kind tag byte, and
/// three padding bytes.
pub const HEADER_SIZE: usize = 8;

/// Round `len` up to the arena alignment.
pub(crate) fn padded(len: usize) -> usize {
    (len + ALIGN - 1) & !(ALIGN - 1)
}

/// Encode a record header. The length may be a placeholder that is
/// patched when the record is closed.
pub(crate) fn encoded_header(kind: ItemKind, byte_size: u32) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&byte_size.to_le_bytes());
    header[4] = kind.as_u8();
    header
}

pub(crate) fn read_u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().expect("4-byte slice"))
}

pub(crate) fn read_i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(bytes[at..at + 4].try_into().expect("4-byte slice"))
}

pub(crate) fn read_i64_at(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(bytes[at..at + 8].try_into().expect("8-byte slice"))
}

/// Cut the record starting at `pos` out of `region`.
///
/// Returns the record view and the offset just past it. Panics if the
/// header does not describe a well-formed record that fits inside the
/// region: a bad header means the arena bytes themselves are wrong,
/// and there is no way to resynchronise an append-only layout past a
/// corrupt length field.
pub(crate) fn split_item(region: &[u8], pos: usize) -> (ItemRef<'_>, usize) {
    assert!(
        pos + HEADER_SIZE <= region.len(),
        "corrupt arena: truncated record header at offset {pos}"
    );
    let size = read_u32_at(region, pos) as usize;
    assert!(
        size >= HEADER_SIZE,
        "corrupt arena: record length {size} at offset {pos} is shorter than a header"
    );
    assert!(
        size % ALIGN == 0,
        "corrupt arena: record length {size} at offset {pos} is not a multiple of {ALIGN}"
    );
    assert!(
        pos + size <= region.len(),
        "corrupt arena: record of length {size} at offset {pos} overruns the region"
    );
    let tag = region[pos + 4];
    assert!(
        ItemKind::from_u8(tag).is_some(),
        "corrupt arena: unknown record kind tag 0x{tag:02x} at offset {pos}"
    );
    let item = ItemRef {
        data: &region[pos..pos + size],
    };
    (item, pos + size)
}

/// A borrowed view of one record: header, payload, and trailing
/// padding.
///
/// Obtained from buffer iteration or a handle lookup; the header has
/// already been validated by then, so accessors read it directly.
#[derive(Clone, Copy, Debug)]
pub struct ItemRef<'a> {
    data: &'a [u8],
}

impl<'a> ItemRef<'a> {
    /// The record's kind tag.
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_u8(self.data[4]).expect("kind tag was validated when the view was cut")
    }

    /// Total encoded length including header and padding.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// The bytes after the header, padding included.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[HEADER_SIZE..]
    }
}
