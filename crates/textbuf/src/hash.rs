//! FNV-1a hashing folded into the runtime's tagged-integer range.
//!
//! See <http://isthe.com/chongo/tech/comp/fnv/#FNV-param> for the
//! parameters.

use crate::buffer::TextBuffer;

#[cfg(target_pointer_width = "64")]
const FNV_OFFSET_BASIS: usize = 14_695_981_039_346_656_037;
#[cfg(target_pointer_width = "64")]
const FNV_PRIME: usize = 1_099_511_628_211;

#[cfg(not(target_pointer_width = "64"))]
const FNV_OFFSET_BASIS: usize = 2_166_136_261;
#[cfg(not(target_pointer_width = "64"))]
const FNV_PRIME: usize = 16_777_619;

/// Bits available to a tagged integer (two are taken by the tag).
pub const TAGGED_INT_WIDTH: u32 = usize::BITS - 2;

/// Largest value representable as a tagged integer.
pub const TAGGED_INT_MAX: usize = (1 << TAGGED_INT_WIDTH) - 1;

#[inline]
fn update(h: usize, byte: u8) -> usize {
    (h ^ usize::from(byte)).wrapping_mul(FNV_PRIME)
}

#[inline]
fn finish(h: usize) -> usize {
    (h >> TAGGED_INT_WIDTH) ^ (h & TAGGED_INT_MAX)
}

/// Hash of every byte in `bytes`.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> usize {
    finish(bytes.iter().fold(FNV_OFFSET_BASIS, |h, &b| update(h, b)))
}

/// Hash of `bytes` up to (not including) the first zero byte.
#[must_use]
pub fn hash_c_str(bytes: &[u8]) -> usize {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    hash_bytes(&bytes[..end])
}

impl TextBuffer {
    /// Hash of the clamped logical bytes, memoized until the next mutation.
    pub fn hash_value(&self) -> usize {
        if let Some(h) = self.hash.get() {
            return h;
        }
        let h = hash_bytes(self.as_bytes());
        self.hash.set(Some(h));
        h
    }
}
