use crate::kcode::KCode;

/// Ceiling (exclusive) for [`TextBuffer::resize_capacity`]. One byte of every
/// region is reserved for the terminator, so the largest accepted request is
/// `i32::MAX - 1`.
///
/// [`TextBuffer::resize_capacity`]: crate::TextBuffer::resize_capacity
pub const DEFAULT_MAX_CAPACITY: usize = 0x7fff_ffff;

/// Runtime-wide settings consulted through the [`Context`](crate::Context).
///
/// # Examples
///
/// ```rust
/// use textbuf::{Context, KCode, RuntimeOptions};
///
/// let cx = Context::new(RuntimeOptions {
///     kcode: KCode::Utf8,
///     ..Default::default()
/// });
/// assert_eq!(cx.options().kcode, KCode::Utf8);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Multi-byte table used when a caller asks for "the current kcode".
    ///
    /// # Default
    ///
    /// [`KCode::None`]
    pub kcode: KCode,

    /// Exclusive upper bound on the size accepted by `resize_capacity`.
    ///
    /// Requests at or above this value fail with
    /// [`TextError::InvalidArgument`](crate::TextError::InvalidArgument).
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_CAPACITY`]
    pub max_capacity: usize,

    /// Whether descending ranges such as `z-a` expand to nothing in
    /// [`TextBuffer::tr_expand_default`](crate::TextBuffer::tr_expand_default).
    ///
    /// # Default
    ///
    /// `false`
    pub invalid_ranges_empty: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            kcode: KCode::None,
            max_capacity: DEFAULT_MAX_CAPACITY,
            invalid_ranges_empty: false,
        }
    }
}
