use core::cmp::Ordering;

use crate::{
    buffer::{TextBuffer, signed},
    error::TextError,
};

impl TextBuffer {
    /// Equality check whose running time depends only on the longer of the
    /// two clamped sizes, never on where the first difference is.
    ///
    /// Bytes past the end of the shorter side read as zero, so a trailing
    /// run of NULs is invisible: `"ab"` equals `"ab\0"`.
    pub fn secure_compare(&self, other: &TextBuffer) -> bool {
        let a = self.as_bytes();
        let b = other.as_bytes();
        let max = a.len().max(b.len());

        let mut acc = 0u8;
        for i in 0..max {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            acc |= x ^ y;
        }
        acc == 0
    }

    /// Compares the receiver's prefix with `count` bytes of `other` starting
    /// at `start`, like `memcmp`.
    ///
    /// A negative `start` counts back from the end of `other`. `count` is
    /// clamped to what remains in `other` and to the receiver's size.
    ///
    /// # Errors
    ///
    /// [`TextError::BoundsExceeded`] if the normalized start is not inside
    /// `other`.
    pub fn compare_substring(
        &self,
        other: &TextBuffer,
        start: isize,
        count: isize,
    ) -> Result<Ordering, TextError> {
        let ours = self.as_bytes();
        let theirs = other.as_bytes();
        let other_size = signed(theirs.len());

        let start = if start < 0 { other_size + start } else { start };
        if start >= other_size {
            return Err(TextError::bounds_exceeded("start exceeds size of other"));
        }
        let start = usize::try_from(start)
            .map_err(|_| TextError::bounds_exceeded("start less than zero"))?;

        let count = usize::try_from(count)
            .unwrap_or(0)
            .min(theirs.len() - start)
            .min(ours.len());

        Ok(ours[..count].cmp(&theirs[start..start + count]))
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;

    use crate::{Context, TextBuffer, TextError};

    fn buf(cx: &Context, s: &[u8]) -> TextBuffer {
        TextBuffer::from_bytes(cx, s)
    }

    #[test]
    fn secure_compare_cases() {
        let cx = Context::default();
        let abc = buf(&cx, b"abc");
        assert!(abc.secure_compare(&buf(&cx, b"abc")));
        assert!(!abc.secure_compare(&buf(&cx, b"abd")));
        assert!(!buf(&cx, b"ab").secure_compare(&abc));
        assert!(buf(&cx, b"ab").secure_compare(&buf(&cx, b"ab\0")));
        assert!(buf(&cx, b"").secure_compare(&buf(&cx, b"")));
    }

    #[test]
    fn secure_compare_clamps() {
        let cx = Context::default();
        let mut a = buf(&cx, b"abc");
        a.set_size(10);
        assert!(a.secure_compare(&buf(&cx, b"abc\0")));
    }

    #[test]
    fn compare_substring_orders() {
        let cx = Context::default();
        let hay = buf(&cx, b"hello world");
        assert_eq!(buf(&cx, b"wor").compare_substring(&hay, 6, 3), Ok(Ordering::Equal));
        assert_eq!(buf(&cx, b"wox").compare_substring(&hay, 6, 3), Ok(Ordering::Greater));
        assert_eq!(buf(&cx, b"abc").compare_substring(&hay, -5, 3), Ok(Ordering::Less));
        // count clamps to the receiver
        assert_eq!(buf(&cx, b"w").compare_substring(&hay, 6, 100), Ok(Ordering::Equal));
        assert_eq!(buf(&cx, b"zz").compare_substring(&hay, 0, -3), Ok(Ordering::Equal));
    }

    #[test]
    fn compare_substring_bounds() {
        let cx = Context::default();
        let hay = buf(&cx, b"abc");
        let needle = buf(&cx, b"a");
        assert_eq!(
            needle.compare_substring(&hay, 3, 1),
            Err(TextError::BoundsExceeded("start exceeds size of other".into()))
        );
        assert_eq!(
            needle.compare_substring(&hay, -4, 1),
            Err(TextError::BoundsExceeded("start less than zero".into()))
        );
    }
}
