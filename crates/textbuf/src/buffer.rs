//! The `TextBuffer` header and its copy-on-write mutation engine.
//!
//! A header owns a logical size and a handle to a [`Storage`] region that
//! may be shared with other headers. The logical size is never trusted on
//! its own: every read goes through [`TextBuffer::as_bytes`], which clamps
//! to the real capacity of the region, and every write goes through
//! [`TextBuffer::storage_mut`], which unshares first.
//!
//! Invariant: a header whose `shared` flag is clear is the only holder of
//! its region. Every path that clears the flag installs a fresh region.

use alloc::{rc::Rc, vec::Vec};
use core::{cell::Cell, fmt};

use bstr::ByteSlice;

use crate::{
    context::Context,
    error::TextError,
    storage::{Encoding, Storage},
    types::TypeTag,
};

/// A growable, copy-on-write byte string.
pub struct TextBuffer {
    pub(crate) size: usize,
    pub(crate) storage: Rc<Storage>,
    pub(crate) shared: bool,
    pub(crate) hash: Cell<Option<usize>>,
    pub(crate) tainted: bool,
    pub(crate) type_tag: TypeTag,
}

/// Fill source for [`TextBuffer::pattern`].
#[derive(Debug, Clone, Copy)]
pub enum Fill<'a> {
    /// Repeat a single byte.
    Byte(u8),
    /// Repeat the logical bytes of another buffer, truncating the last copy.
    Bytes(&'a TextBuffer),
}

#[inline]
pub(crate) fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl TextBuffer {
    fn from_storage(storage: Storage, size: usize) -> Self {
        Self {
            size,
            storage: Rc::new(storage),
            shared: false,
            hash: Cell::new(None),
            tainted: false,
            type_tag: TypeTag::STRING,
        }
    }

    /// A buffer of `size` zero bytes with room for the terminator.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `size` is negative.
    pub fn new(cx: &Context, size: isize) -> Result<Self, TextError> {
        let size = usize::try_from(size)
            .map_err(|_| TextError::invalid_argument("negative byte array size"))?;
        Ok(Self::zeroed(cx, size))
    }

    pub(crate) fn zeroed(cx: &Context, size: usize) -> Self {
        Self::from_storage(cx.allocate(size + 1), size)
    }

    /// An empty buffer that can take `bytes` bytes before growing.
    pub fn with_reserved(cx: &Context, bytes: usize) -> Self {
        Self::from_storage(cx.allocate(bytes + 1), 0)
    }

    /// A buffer of `size` zero bytes in a pinned region, for passing to
    /// native reads.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `size` is negative.
    pub fn pinned(cx: &Context, size: isize) -> Result<Self, TextError> {
        let size = usize::try_from(size)
            .map_err(|_| TextError::invalid_argument("negative byte array size"))?;
        Ok(Self::from_storage(cx.allocate_pinned(size + 1), size))
    }

    /// A buffer holding a copy of `bytes`.
    pub fn from_bytes(cx: &Context, bytes: &[u8]) -> Self {
        let mut storage = cx.allocate(bytes.len() + 1);
        storage.bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        Self::from_storage(storage, bytes.len())
    }

    /// A buffer holding a copy of `count` bytes of `source` starting at
    /// `start`, both clamped to the region.
    pub fn from_storage_range(cx: &Context, source: &Storage, start: usize, count: usize) -> Self {
        let start = start.min(source.capacity());
        let count = count.min(source.capacity() - start);
        let buf = Self::from_bytes(cx, &source.bytes()[start..start + count]);
        buf.set_encoding(source.encoding());
        buf
    }

    /// A buffer of type `type_tag` holding `size` bytes of `fill`.
    ///
    /// An empty byte-string fill leaves the bytes zeroed.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `size` is negative.
    pub fn pattern(
        cx: &Context,
        type_tag: TypeTag,
        size: isize,
        fill: Fill<'_>,
    ) -> Result<Self, TextError> {
        let size = usize::try_from(size)
            .map_err(|_| TextError::invalid_argument("size must be positive"))?;
        let mut out = Self::zeroed(cx, size);
        out.type_tag = type_tag;
        if let Fill::Bytes(pat) = fill {
            out.tainted = pat.tainted;
        }

        let dest = &mut out.storage_mut(cx).bytes_mut()[..size];
        match fill {
            Fill::Byte(b) => dest.fill(b),
            Fill::Bytes(pat) => {
                let src = pat.as_bytes();
                if !src.is_empty() {
                    for chunk in dest.chunks_mut(src.len()) {
                        chunk.copy_from_slice(&src[..chunk.len()]);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Builds a derived value of the receiver's concrete type carrying its
    /// taint.
    pub(crate) fn derive(&self, cx: &Context, bytes: &[u8]) -> Self {
        let mut out = Self::from_bytes(cx, bytes);
        out.type_tag = cx.types().concrete(self.type_tag);
        out.tainted = self.tainted;
        out
    }

    // ---------------------------------------------------------------------
    // Header accessors
    // ---------------------------------------------------------------------

    /// Logical size as recorded in the header. May exceed
    /// [`capacity`](Self::capacity) after [`set_size`](Self::set_size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the clamped logical range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clamped_size() == 0
    }

    /// Capacity of the backing region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Logical size clamped to the real capacity of the region.
    #[inline]
    pub fn clamped_size(&self) -> usize {
        self.size.min(self.storage.capacity())
    }

    /// The logical bytes, clamped to the backing region.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.bytes()[..self.clamped_size()]
    }

    /// Owned copy of the logical bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// The backing region.
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Whether both headers currently point at the same region.
    #[inline]
    pub fn shares_storage_with(&self, other: &TextBuffer) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Whether the region may be referenced by another header.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Whether the value derives from untrusted input.
    #[inline]
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Marks the value as derived from untrusted input.
    #[inline]
    pub fn taint(&mut self) {
        self.tainted = true;
    }

    /// Sets or clears the taint marker.
    #[inline]
    pub fn set_tainted(&mut self, tainted: bool) {
        self.tainted = tainted;
    }

    /// The dynamic type tag.
    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Replaces the dynamic type tag.
    #[inline]
    pub fn set_type_tag(&mut self, tag: TypeTag) {
        self.type_tag = tag;
    }

    /// The encoding tag of the backing region.
    #[inline]
    pub fn encoding(&self) -> Option<Encoding> {
        self.storage.encoding()
    }

    /// Tags the backing region. Headers sharing the region see the change.
    #[inline]
    pub fn set_encoding(&self, encoding: Option<Encoding>) {
        self.storage.set_encoding(encoding);
    }

    /// Overwrites the logical size without touching storage.
    ///
    /// The size may exceed the capacity; readers clamp.
    #[inline]
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
        self.invalidate_hash();
    }

    #[inline]
    pub(crate) fn invalidate_hash(&self) {
        self.hash.set(None);
    }

    // ---------------------------------------------------------------------
    // Copy-on-write engine
    // ---------------------------------------------------------------------

    /// Gives the header a private copy of its region if it is shared.
    pub fn unshare(&mut self, cx: &Context) {
        if self.shared {
            self.storage = Rc::new(cx.duplicate(&self.storage));
            self.shared = false;
            self.invalidate_hash();
        }
    }

    /// Write access to the backing region, unsharing first.
    pub(crate) fn storage_mut(&mut self, cx: &Context) -> &mut Storage {
        self.unshare(cx);
        if Rc::get_mut(&mut self.storage).is_none() {
            // Another header holds the region without having been marked.
            self.storage = Rc::new(cx.duplicate(&self.storage));
        }
        Rc::make_mut(&mut self.storage)
    }

    /// Installs `fresh` as a private region.
    pub(crate) fn replace_storage(&mut self, fresh: Storage) {
        fresh.set_encoding(self.storage.encoding());
        self.storage = Rc::new(fresh);
        self.shared = false;
        self.invalidate_hash();
    }

    /// A second header on the same region. Both become shared; no bytes are
    /// copied.
    pub fn dup(&mut self, cx: &Context) -> TextBuffer {
        self.shared = true;
        TextBuffer {
            size: self.size,
            storage: Rc::clone(&self.storage),
            shared: true,
            hash: Cell::new(self.hash.get()),
            tainted: self.tainted,
            type_tag: cx.types().concrete(self.type_tag),
        }
    }

    /// Appends `bytes` after the clamped logical range.
    ///
    /// Grows by doubling the capacity until the new size plus terminator
    /// fits. Growing replaces the region outright, so a shared region is
    /// never duplicated just to be discarded.
    pub fn append(&mut self, cx: &Context, bytes: &[u8]) {
        let current = self.clamped_size();
        let new_size = current + bytes.len();
        let capacity = self.storage.capacity();

        if capacity < new_size + 1 {
            let mut grown = capacity.max(1);
            while grown < new_size + 1 {
                grown = grown.saturating_mul(2);
            }
            log::trace!("growing storage {capacity} -> {grown} for {new_size} bytes");

            let mut fresh = cx.allocate(grown);
            fresh.bytes_mut()[..current].copy_from_slice(&self.storage.bytes()[..current]);
            self.replace_storage(fresh);
        }

        let dest = self.storage_mut(cx).bytes_mut();
        dest[current..new_size].copy_from_slice(bytes);
        dest[new_size] = 0;

        self.size = new_size;
        self.invalidate_hash();
    }

    /// Appends the clamped logical bytes of `other`.
    pub fn append_buffer(&mut self, cx: &Context, other: &TextBuffer) {
        self.append(cx, other.as_bytes());
        self.tainted |= other.tainted;
    }

    /// A new buffer holding the receiver's bytes followed by `other`'s.
    /// The receiver becomes shared but is otherwise untouched.
    pub fn add(&mut self, cx: &Context, other: &TextBuffer) -> TextBuffer {
        let mut sum = self.dup(cx);
        sum.append_buffer(cx, other);
        sum
    }

    /// Reallocates the region to hold exactly `n` bytes plus terminator.
    ///
    /// Copies at most `n` bytes of the clamped logical range, so bytes past
    /// the logical size never survive a resize. Shrinking below the logical
    /// size clamps the size.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `n` is negative or not below the
    /// configured maximum capacity.
    pub fn resize_capacity(&mut self, cx: &Context, n: isize) -> Result<(), TextError> {
        let n = usize::try_from(n)
            .map_err(|_| TextError::invalid_argument("negative byte array size"))?;
        if n >= cx.options().max_capacity {
            return Err(TextError::invalid_argument("too large byte array size"));
        }

        let keep = n.min(self.clamped_size());
        let mut fresh = cx.allocate(n + 1);
        fresh.bytes_mut()[..keep].copy_from_slice(&self.storage.bytes()[..keep]);
        log::trace!("resized storage {} -> {}", self.storage.capacity(), n + 1);
        self.replace_storage(fresh);

        if self.size > n {
            self.size = n;
        }
        Ok(())
    }

    /// The logical bytes followed by a zero byte, for native interop.
    ///
    /// Repairs the region when the terminator is missing: a logical size at
    /// or past the capacity gets a fresh region, an overwritten terminator
    /// gets rewritten after unsharing.
    pub fn null_terminated(&mut self, cx: &Context) -> &[u8] {
        let size = self.size;
        let capacity = self.storage.capacity();

        if size >= capacity {
            let mut fresh = cx.allocate(size + 1);
            fresh.bytes_mut()[..capacity].copy_from_slice(self.storage.bytes());
            self.replace_storage(fresh);
        } else if self.storage.bytes()[size] != 0 {
            self.storage_mut(cx).bytes_mut()[size] = 0;
        }

        &self.storage.bytes()[..=size]
    }

    /// Character-wise logical AND with `other`, in place: each byte becomes
    /// `1` when both inputs are non-zero and `0` otherwise. A tainted `other`
    /// taints the receiver when any byte is combined.
    pub fn apply_and(&mut self, cx: &Context, other: &TextBuffer) {
        let count = self.clamped_size().min(other.clamped_size());
        self.tainted |= other.tainted && count > 0;
        let theirs = &other.as_bytes()[..count];
        let ours = &mut self.storage_mut(cx).bytes_mut()[..count];
        for (a, b) in ours.iter_mut().zip(theirs) {
            *a = u8::from(*a != 0 && *b != 0);
        }
        self.invalidate_hash();
    }

    /// Copies `count` bytes of `other` starting at `src` into the receiver
    /// at `dst`.
    ///
    /// The destination is bounded by the receiver's capacity rather than its
    /// logical size, and the logical size is left alone. Ranges that fall
    /// outside either side are clamped; a source past the end, a destination
    /// past the capacity, or a negative count make the call a no-op. Copying
    /// at least one byte from a tainted `other` taints the receiver.
    pub fn copy_from(
        &mut self,
        cx: &Context,
        other: &TextBuffer,
        src: isize,
        count: isize,
        dst: isize,
    ) {
        let other_size = signed(other.clamped_size());
        if src >= other_size || count < 0 {
            return;
        }
        let src = src.max(0);
        let mut count = count.min(other_size - src);

        let capacity = signed(self.storage.capacity());
        if dst >= capacity {
            return;
        }
        let dst = dst.max(0);
        count = count.min(capacity - dst);

        // All three are non-negative here.
        let (src, dst, count) = (src.unsigned_abs(), dst.unsigned_abs(), count.unsigned_abs());
        self.tainted |= other.tainted && count > 0;
        let theirs = &other.as_bytes()[src..src + count];
        self.storage_mut(cx).bytes_mut()[dst..dst + count].copy_from_slice(theirs);
        self.invalidate_hash();
    }

    #[cfg(any(test, feature = "fuzzing"))]
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        assert!(self.storage.capacity() >= 1, "region lost its terminator slot");
        if !self.shared {
            assert_eq!(
                Rc::strong_count(&self.storage),
                1,
                "unshared header does not own its region"
            );
        }
        if let Some(h) = self.hash.get() {
            assert_eq!(h, crate::hash::hash_bytes(self.as_bytes()), "stale hash memo");
        }
    }
}

impl PartialEq for TextBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for TextBuffer {}

impl PartialEq<[u8]> for TextBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for TextBuffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for TextBuffer {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == other.as_slice()
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bytes().as_bstr(), f)
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("bytes", &self.as_bytes().as_bstr())
            .field("size", &self.size)
            .field("capacity", &self.storage.capacity())
            .field("shared", &self.shared)
            .field("tainted", &self.tainted)
            .finish_non_exhaustive()
    }
}
