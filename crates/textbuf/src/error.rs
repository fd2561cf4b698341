use alloc::borrow::Cow;

use thiserror::Error;

/// Typed faults raised by [`TextBuffer`](crate::TextBuffer) operations.
///
/// Most out-of-range inputs are not errors: they produce `None` or leave the
/// receiver untouched. Only the argument checks below are reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// An argument was outside the domain the operation accepts (negative
    /// sizes, negative start offsets, unsupported numeric bases).
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),
    /// An explicit index fell outside the bounds of the other operand.
    #[error("bounds exceeded: {0}")]
    BoundsExceeded(Cow<'static, str>),
}

impl TextError {
    pub(crate) fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        let err = Self::InvalidArgument(msg.into());
        log::debug!("rejecting call: {err}");
        err
    }

    pub(crate) fn bounds_exceeded(msg: impl Into<Cow<'static, str>>) -> Self {
        let err = Self::BoundsExceeded(msg.into());
        log::debug!("rejecting call: {err}");
        err
    }
}
