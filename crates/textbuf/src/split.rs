use alloc::vec::Vec;

use crate::{buffer::TextBuffer, context::Context};

/// C `isspace` in the "C" locale.
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t'..=b'\r')
}

impl TextBuffer {
    /// Splits on runs of ASCII whitespace, ignoring leading whitespace.
    ///
    /// With a positive `limit` at most `limit` fields are produced and the
    /// last one holds the unsplit remainder. A `limit` of zero drops a
    /// trailing empty field; a negative one keeps it.
    ///
    /// ```rust
    /// use textbuf::{Context, TextBuffer};
    ///
    /// let cx = Context::default();
    /// let s = TextBuffer::from_bytes(&cx, b"a b c");
    /// let fields = s.awk_split(&cx, 2);
    /// assert_eq!(fields[0], b"a");
    /// assert_eq!(fields[1], b"b c");
    /// ```
    pub fn awk_split(&self, cx: &Context, limit: isize) -> Vec<TextBuffer> {
        let bytes = self.as_bytes();
        let mut fields = Vec::new();

        let mut begin = 0;
        let mut end = 0;
        let mut skip = true;
        let mut produced: isize = isize::from(limit > 0);

        for &b in bytes {
            if skip {
                if is_space(b) {
                    begin += 1;
                } else {
                    end = begin + 1;
                    skip = false;
                    if limit > 0 && limit <= produced {
                        break;
                    }
                }
            } else if is_space(b) {
                fields.push(self.derive(cx, &bytes[begin..end]));
                skip = true;
                begin = end + 1;
                if limit > 0 {
                    produced += 1;
                }
            } else {
                end += 1;
            }
        }

        let tail = &bytes[begin.min(bytes.len())..];
        if !tail.is_empty() || (limit > 0 && produced <= limit) || limit < 0 {
            fields.push(self.derive(cx, tail));
        }
        fields
    }
}
