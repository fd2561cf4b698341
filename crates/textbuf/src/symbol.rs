use alloc::{collections::BTreeMap, vec::Vec};
use core::cell::RefCell;

/// Interned byte-string handle returned by
/// [`TextBuffer::to_sym`](crate::TextBuffer::to_sym).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Position of the symbol in its table.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Byte strings interned so far, in insertion order.
#[derive(Debug, Default)]
pub struct SymbolTable {
    inner: RefCell<Interned>,
}

#[derive(Debug, Default)]
struct Interned {
    by_bytes: BTreeMap<Vec<u8>, Symbol>,
    names: Vec<Vec<u8>>,
}

impl SymbolTable {
    /// Returns the symbol for `bytes`, creating it on first use.
    pub fn intern(&self, bytes: &[u8]) -> Symbol {
        let mut inner = self.inner.borrow_mut();
        if let Some(sym) = inner.by_bytes.get(bytes) {
            return *sym;
        }
        let sym = Symbol(u32::try_from(inner.names.len()).unwrap_or(u32::MAX));
        inner.names.push(bytes.to_vec());
        inner.by_bytes.insert(bytes.to_vec(), sym);
        sym
    }

    /// The bytes a symbol was interned from.
    pub fn name(&self, sym: Symbol) -> Option<Vec<u8>> {
        self.inner.borrow().names.get(sym.0 as usize).cloned()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.inner.borrow().names.len()
    }

    /// Whether nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolTable;

    #[test]
    fn interning_is_stable() {
        let table = SymbolTable::default();
        let a = table.intern(b"foo");
        let b = table.intern(b"bar");
        assert_ne!(a, b);
        assert_eq!(table.intern(b"foo"), a);
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(b).as_deref(), Some(&b"bar"[..]));
    }
}
