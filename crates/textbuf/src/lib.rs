//! A copy-on-write byte string for a managed language runtime.
//!
//! [`TextBuffer`] is a header (logical size, taint, type tag, memoized hash)
//! over a [`Storage`] region that several headers may share until one of
//! them writes. Every allocation goes through a [`Context`], which also
//! carries the runtime's options and registries.
//!
//! ```rust
//! use textbuf::{Context, TextBuffer};
//!
//! let cx = Context::default();
//! let mut a = TextBuffer::from_bytes(&cx, b"hello");
//! let mut b = a.dup(&cx);
//! assert!(a.shares_storage_with(&b));
//!
//! b.append(&cx, b" world");
//! assert_eq!(a, b"hello");
//! assert_eq!(b, b"hello world");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod compare;
mod context;
mod error;
mod hash;
mod heap;
mod kcode;
mod numeric;
mod options;
mod search;
mod split;
mod storage;
mod symbol;
mod tr;
mod transform;
mod types;

#[cfg(test)]
mod tests;

pub use buffer::{Fill, TextBuffer};
pub use context::Context;
pub use error::TextError;
pub use hash::{TAGGED_INT_MAX, TAGGED_INT_WIDTH, hash_bytes, hash_c_str};
pub use heap::{Heap, SystemHeap};
pub use kcode::{KCode, MultiByteTable};
pub use options::{DEFAULT_MAX_CAPACITY, RuntimeOptions};
pub use storage::{Encoding, Storage};
pub use symbol::{Symbol, SymbolTable};
pub use transform::{TransformEntry, TransformTable};
pub use types::{TypeRegistry, TypeTag};
