use alloc::boxed::Box;
use core::{cell::Cell, fmt};

use crate::{
    heap::{Heap, SystemHeap},
    options::RuntimeOptions,
    storage::Storage,
    symbol::SymbolTable,
    types::TypeRegistry,
};

/// Execution-context handle threaded through every allocating or fallible
/// [`TextBuffer`](crate::TextBuffer) operation.
///
/// It is the single gate to the memory manager and carries the
/// process-wide registries. It is not `Sync`: the runtime serialises access
/// to an object graph at a higher level.
pub struct Context {
    heap: Box<dyn Heap>,
    options: RuntimeOptions,
    types: TypeRegistry,
    symbols: SymbolTable,
    allocations: Cell<usize>,
    bytes_allocated: Cell<usize>,
}

impl Context {
    /// Context backed by the global allocator.
    #[must_use]
    pub fn new(options: RuntimeOptions) -> Self {
        Self::with_heap(options, SystemHeap)
    }

    /// Context backed by a caller-supplied memory manager.
    pub fn with_heap(options: RuntimeOptions, heap: impl Heap + 'static) -> Self {
        Self {
            heap: Box::new(heap),
            options,
            types: TypeRegistry::default(),
            symbols: SymbolTable::default(),
            allocations: Cell::new(0),
            bytes_allocated: Cell::new(0),
        }
    }

    /// The options the context was created with.
    #[inline]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Registry of byte-string subtypes.
    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Symbol table used by [`TextBuffer::to_sym`](crate::TextBuffer::to_sym).
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Regions obtained through this context so far, duplicates included.
    #[inline]
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Sum of the capacities of every region obtained so far.
    #[inline]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.get()
    }

    pub(crate) fn allocate(&self, bytes: usize) -> Storage {
        self.record(bytes);
        self.heap.allocate(bytes)
    }

    pub(crate) fn allocate_pinned(&self, bytes: usize) -> Storage {
        self.record(bytes);
        self.heap.allocate_pinned(bytes)
    }

    pub(crate) fn duplicate(&self, storage: &Storage) -> Storage {
        self.record(storage.capacity());
        log::trace!("duplicating storage of {} bytes", storage.capacity());
        self.heap.duplicate(storage)
    }

    fn record(&self, bytes: usize) {
        self.allocations.set(self.allocations.get() + 1);
        self.bytes_allocated
            .set(self.bytes_allocated.get().saturating_add(bytes));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("allocations", &self.allocations.get())
            .field("bytes_allocated", &self.bytes_allocated.get())
            .finish_non_exhaustive()
    }
}
