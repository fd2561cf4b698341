//! Table-driven recoding of a buffer, the primitive behind `inspect`/`dump`
//! style escaping.

use alloc::vec::Vec;

use crate::{buffer::TextBuffer, context::Context, error::TextError, kcode::MultiByteTable};

/// What one input byte maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformEntry {
    /// Emit these bytes and consume the input byte.
    Replace(Vec<u8>),
    /// Try each `(pattern, replacement)` pair in order against the input at
    /// the current position (the pattern includes the current byte). The
    /// first match wins. With no match the byte is escaped.
    Patterns(Vec<(Vec<u8>, Vec<u8>)>),
}

/// A 256-entry recoding table indexed by input byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTable {
    entries: Vec<TransformEntry>,
}

impl TransformTable {
    /// Wraps a table with one entry per byte value.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] unless exactly 256 entries are given.
    pub fn new(entries: Vec<TransformEntry>) -> Result<Self, TextError> {
        if entries.len() != 256 {
            return Err(TextError::invalid_argument("transform table must have 256 entries"));
        }
        Ok(Self { entries })
    }

    /// Table built by calling `f` for every byte value.
    pub fn from_fn(f: impl FnMut(u8) -> TransformEntry) -> Self {
        Self {
            entries: (0..=u8::MAX).map(f).collect(),
        }
    }

    /// Table mapping every byte to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_fn(|b| TransformEntry::Replace(alloc::vec![b]))
    }

    /// Entry for `byte`.
    #[inline]
    pub fn get(&self, byte: u8) -> &TransformEntry {
        &self.entries[usize::from(byte)]
    }

    /// Replaces the entry for `byte`.
    pub fn set(&mut self, byte: u8, entry: TransformEntry) {
        self.entries[usize::from(byte)] = entry;
    }
}

fn octal_escape(byte: u8) -> [u8; 4] {
    [
        b'\\',
        b'0' + (byte >> 6),
        b'0' + ((byte >> 3) & 7),
        b'0' + (byte & 7),
    ]
}

impl TextBuffer {
    /// Recodes the clamped logical bytes through `table`.
    ///
    /// Characters that `mb` recognises as multi-byte are copied verbatim
    /// when complete. Bytes the table cannot map are written as `\nnn`
    /// octal escapes. The result is a plain string carrying the receiver's
    /// taint.
    pub fn transform(&self, cx: &Context, table: &TransformTable, mb: &dyn MultiByteTable) -> TextBuffer {
        let input = self.as_bytes();
        let end = input.len();

        let chunk = (end * 5).div_ceil(4);
        let mut limit = chunk;
        let mut out: Vec<u8> = Vec::with_capacity(limit);

        let mut pos = 0;
        while pos < end {
            let byte = input[pos];
            let rem = end - pos;
            let mut emitted: Option<&[u8]> = None;

            if mb.is_lead_byte(byte) {
                let width = mb.width(byte);
                if rem >= width {
                    emitted = Some(&input[pos..pos + width]);
                    pos += width;
                }
            } else {
                match table.get(byte) {
                    TransformEntry::Replace(bytes) => {
                        emitted = Some(bytes.as_slice());
                        pos += 1;
                    }
                    TransformEntry::Patterns(pairs) => {
                        let hit = pairs.iter().find(|(pattern, _)| {
                            !pattern.is_empty() && input[pos..].starts_with(pattern)
                        });
                        if let Some((pattern, replacement)) = hit {
                            emitted = Some(replacement.as_slice());
                            pos += pattern.len();
                        }
                    }
                }
            }

            let escape;
            let bytes = match emitted {
                Some(bytes) => bytes,
                None => {
                    escape = octal_escape(byte);
                    pos += 1;
                    &escape[..]
                }
            };

            if out.len() + bytes.len() > limit {
                limit += bytes.len().max(chunk);
                log::trace!("transform output grown to {limit} bytes");
                out.reserve_exact(limit - out.len());
            }
            out.extend_from_slice(bytes);
        }

        let mut result = TextBuffer::from_bytes(cx, &out);
        result.tainted = self.tainted;
        result
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::{TransformEntry, TransformTable, octal_escape};
    use crate::{Context, KCode, TextBuffer, TextError, TypeTag};

    fn escaping_table() -> TransformTable {
        TransformTable::from_fn(|b| {
            if b.is_ascii_graphic() || b == b' ' {
                TransformEntry::Replace(vec![b])
            } else {
                TransformEntry::Patterns(Vec::new())
            }
        })
    }

    #[test]
    fn rejects_short_tables() {
        let short = vec![TransformEntry::Replace(Vec::new()); 255];
        assert_eq!(
            TransformTable::new(short),
            Err(TextError::InvalidArgument("transform table must have 256 entries".into()))
        );
        assert!(TransformTable::new(vec![TransformEntry::Replace(Vec::new()); 256]).is_ok());
    }

    #[test]
    fn escapes_octal() {
        assert_eq!(&octal_escape(0), b"\\000");
        assert_eq!(&octal_escape(b'\n'), b"\\012");
        assert_eq!(&octal_escape(0xff), b"\\377");
    }

    #[test]
    fn unmapped_bytes_become_escapes() {
        let cx = Context::default();
        let b = TextBuffer::from_bytes(&cx, b"a\nb\xff");
        let out = b.transform(&cx, &escaping_table(), &KCode::None);
        assert_eq!(out, b"a\\012b\\377");
    }

    #[test]
    fn first_matching_pattern_wins() {
        let cx = Context::default();
        let mut table = escaping_table();
        table.set(
            b'\r',
            TransformEntry::Patterns(vec![
                (Vec::new(), b"never".to_vec()),
                (b"\r\n".to_vec(), b"\\r\\n".to_vec()),
                (b"\r".to_vec(), b"\\r".to_vec()),
            ]),
        );
        let b = TextBuffer::from_bytes(&cx, b"x\r\ny\r");
        let out = b.transform(&cx, &table, &KCode::None);
        assert_eq!(out, b"x\\r\\ny\\r");
    }

    #[test]
    fn multibyte_characters_pass_through() {
        let cx = Context::default();
        let b = TextBuffer::from_bytes(&cx, "añb".as_bytes());
        assert_eq!(b.transform(&cx, &escaping_table(), &KCode::Utf8), "añb".as_bytes());
        assert_eq!(b.transform(&cx, &escaping_table(), &KCode::None), b"a\\303\\261b");
    }

    #[test]
    fn truncated_multibyte_is_escaped() {
        let cx = Context::default();
        let b = TextBuffer::from_bytes(&cx, b"a\xe3\x81");
        let out = b.transform(&cx, &TransformTable::identity(), &KCode::Utf8);
        // The lead byte is escaped, the continuation byte goes through the table.
        assert_eq!(out, b"a\\343\x81");
    }

    #[test]
    fn output_grows_past_estimate() {
        let cx = Context::default();
        let input = [0u8; 64];
        let b = TextBuffer::from_bytes(&cx, &input);
        let out = b.transform(&cx, &escaping_table(), &KCode::None);
        assert_eq!(out.len(), 256);
        assert!(out.as_bytes().chunks(4).all(|c| c == b"\\000"));
    }

    #[test]
    fn result_is_plain_and_tainted() {
        let cx = Context::default();
        let sub = cx.types().register("Sub", TypeTag::STRING, false);
        let mut b = TextBuffer::from_bytes(&cx, b"abc");
        b.set_type_tag(sub);
        b.taint();
        let out = b.transform(&cx, &TransformTable::identity(), &KCode::None);
        assert_eq!(out, b"abc");
        assert_eq!(out.type_tag(), TypeTag::STRING);
        assert!(out.is_tainted());
    }

    #[test]
    fn empty_input() {
        let cx = Context::default();
        let b = TextBuffer::from_bytes(&cx, b"");
        assert!(b.transform(&cx, &escaping_table(), &KCode::None).is_empty());
    }
}
