//! Allocator-produced byte regions.
//!
//! A [`Storage`] is the raw backing of one or more
//! [`TextBuffer`](crate::TextBuffer) headers. It knows nothing about logical
//! sizes; its length is the capacity of the region. Buffers only ever obtain
//! regions through a [`Heap`](crate::Heap).

use alloc::{boxed::Box, vec};
use core::cell::Cell;

/// Encoding tag attached to a storage region.
///
/// The tag is metadata only; no conversion is performed on the bytes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Raw bytes.
    Binary,
    /// 7-bit ASCII.
    UsAscii,
    /// UTF-8.
    Utf8,
    /// EUC-JP.
    EucJp,
    /// Shift_JIS.
    ShiftJis,
}

/// A fixed-capacity byte region.
#[derive(Debug, Clone)]
pub struct Storage {
    bytes: Box<[u8]>,
    pinned: bool,
    // Interior so that headers sharing the region observe the same tag.
    encoding: Cell<Option<Encoding>>,
}

impl Storage {
    /// Zero-filled region of `capacity` bytes.
    #[must_use]
    pub fn zeroed(capacity: usize, pinned: bool) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            pinned,
            encoding: Cell::new(None),
        }
    }

    /// Copy of `other`. Pinning is not inherited: a duplicate is an ordinary
    /// movable region.
    #[must_use]
    pub fn duplicate_of(other: &Storage) -> Self {
        Self {
            bytes: other.bytes.clone(),
            pinned: false,
            encoding: Cell::new(other.encoding.get()),
        }
    }

    /// Total bytes in the region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the region was allocated as non-relocatable.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// The encoding tag, if one was set.
    #[inline]
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding.get()
    }

    /// Replaces the encoding tag.
    #[inline]
    pub fn set_encoding(&self, encoding: Option<Encoding>) {
        self.encoding.set(encoding);
    }

    /// The whole region, including bytes past any logical size.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::{Encoding, Storage};

    #[test]
    fn duplicate_copies_bytes_and_tag() {
        let mut s = Storage::zeroed(4, true);
        s.bytes_mut().copy_from_slice(b"abc\0");
        s.set_encoding(Some(Encoding::Utf8));

        let d = Storage::duplicate_of(&s);
        assert_eq!(d.bytes(), b"abc\0");
        assert_eq!(d.encoding(), Some(Encoding::Utf8));
        assert!(!d.is_pinned());
        assert!(s.is_pinned());
    }
}
