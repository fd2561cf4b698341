use crate::storage::Storage;

/// Abstraction over the memory manager that hands out storage regions.
///
/// Every region a [`TextBuffer`](crate::TextBuffer) ever holds comes from
/// one of these calls, reached through the [`Context`](crate::Context).
/// Allocation failure is not recoverable and aborts like any Rust
/// allocation.
pub trait Heap {
    /// A zero-filled, relocatable region of `bytes` bytes.
    fn allocate(&self, bytes: usize) -> Storage;

    /// A zero-filled region that will not move, suitable for handing to
    /// native I/O.
    fn allocate_pinned(&self, bytes: usize) -> Storage;

    /// A byte-for-byte copy of `storage`.
    fn duplicate(&self, storage: &Storage) -> Storage;
}

/// Heap backed by the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHeap;

impl Heap for SystemHeap {
    #[inline]
    fn allocate(&self, bytes: usize) -> Storage {
        Storage::zeroed(bytes, false)
    }

    #[inline]
    fn allocate_pinned(&self, bytes: usize) -> Storage {
        Storage::zeroed(bytes, true)
    }

    #[inline]
    fn duplicate(&self, storage: &Storage) -> Storage {
        Storage::duplicate_of(storage)
    }
}
