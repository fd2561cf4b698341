//! Opaque dynamic type tags for byte-string instances.
//!
//! The surrounding runtime owns the real class hierarchy; this crate only
//! needs to carry a tag through derived values and, for duplication, find
//! the nearest instantiable ancestor of an abstract tag.

use alloc::{borrow::Cow, vec::Vec};
use core::cell::RefCell;

/// Identifies the dynamic type of a [`TextBuffer`](crate::TextBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(u32);

impl TypeTag {
    /// The built-in concrete byte-string type.
    pub const STRING: TypeTag = TypeTag(0);

    /// Raw index of the tag inside its registry.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: Cow<'static, str>,
    parent: Option<TypeTag>,
    is_abstract: bool,
}

/// Registry of byte-string subtypes.
///
/// Tag `0` is always [`TypeTag::STRING`], concrete and parentless.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: RefCell<Vec<TypeEntry>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            entries: RefCell::new(alloc::vec![TypeEntry {
                name: Cow::Borrowed("String"),
                parent: None,
                is_abstract: false,
            }]),
        }
    }
}

impl TypeRegistry {
    /// Registers a subtype of `parent`. Unknown parents fall back to
    /// [`TypeTag::STRING`].
    pub fn register(
        &self,
        name: impl Into<Cow<'static, str>>,
        parent: TypeTag,
        is_abstract: bool,
    ) -> TypeTag {
        let mut entries = self.entries.borrow_mut();
        let parent = if (parent.0 as usize) < entries.len() {
            parent
        } else {
            TypeTag::STRING
        };
        let tag = TypeTag(u32::try_from(entries.len()).unwrap_or(u32::MAX));
        entries.push(TypeEntry {
            name: name.into(),
            parent: Some(parent),
            is_abstract,
        });
        tag
    }

    /// Name the tag was registered under.
    pub fn name(&self, tag: TypeTag) -> Option<Cow<'static, str>> {
        self.entries
            .borrow()
            .get(tag.0 as usize)
            .map(|e| e.name.clone())
    }

    /// Whether instances may be created with `tag` directly.
    pub fn is_abstract(&self, tag: TypeTag) -> bool {
        self.entries
            .borrow()
            .get(tag.0 as usize)
            .is_some_and(|e| e.is_abstract)
    }

    /// Nearest non-abstract type at or above `tag`.
    ///
    /// Walks parents until a concrete entry is found; an unknown tag or an
    /// all-abstract chain resolves to [`TypeTag::STRING`].
    pub fn concrete(&self, tag: TypeTag) -> TypeTag {
        let entries = self.entries.borrow();
        let mut cur = Some(tag);
        while let Some(t) = cur {
            match entries.get(t.0 as usize) {
                Some(e) if !e.is_abstract => return t,
                Some(e) => cur = e.parent,
                None => break,
            }
        }
        TypeTag::STRING
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeRegistry, TypeTag};

    #[test]
    fn concrete_walks_past_abstract_types() {
        let reg = TypeRegistry::default();
        let base = reg.register("Base", TypeTag::STRING, false);
        let mid = reg.register("Mixin", base, true);
        let leaf = reg.register("Leaf", mid, true);

        assert_eq!(reg.concrete(base), base);
        assert_eq!(reg.concrete(leaf), base);
        assert_eq!(reg.concrete(TypeTag::STRING), TypeTag::STRING);
        assert_eq!(reg.name(mid).as_deref(), Some("Mixin"));
        assert!(reg.is_abstract(mid));
    }
}
