use crate::{
    buffer::{TextBuffer, signed},
    context::Context,
    error::TextError,
    kcode::MultiByteTable,
};

fn start_offset(start: isize) -> Result<usize, TextError> {
    usize::try_from(start).map_err(|_| TextError::invalid_argument("negative start given"))
}

impl TextBuffer {
    /// Copy of `count` bytes starting at `start`.
    ///
    /// A negative `start` counts back from the end. Returns `None` for a
    /// negative `count` or a start outside `0..=len`; `count` is clamped to
    /// what remains. The copy keeps the receiver's concrete type and taint.
    pub fn substring(&self, cx: &Context, start: isize, count: isize) -> Option<TextBuffer> {
        let bytes = self.as_bytes();
        let total = signed(bytes.len());

        if count < 0 {
            return None;
        }
        let start = if start < 0 { start + total } else { start };
        if start < 0 || start > total {
            return None;
        }
        let count = count.min(total - start);

        let (start, count) = (start.unsigned_abs(), count.unsigned_abs());
        Some(self.derive(cx, &bytes[start..start + count]))
    }

    /// Offset of the first occurrence of `pattern` at or after `start`.
    ///
    /// An empty pattern matches at `start` itself, even past the end.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `start` is negative.
    pub fn index(&self, pattern: &[u8], start: isize) -> Result<Option<usize>, TextError> {
        let start = start_offset(start)?;
        let hay = self.as_bytes();

        Ok(match pattern {
            [] => Some(start),
            [byte] => hay
                .get(start..)
                .and_then(|tail| tail.iter().position(|b| b == byte))
                .map(|i| start + i),
            [first, ..] => {
                let Some(last) = hay.len().checked_sub(pattern.len()) else {
                    return Ok(None);
                };
                (start..=last)
                    .find(|&pos| hay[pos] == *first && &hay[pos..pos + pattern.len()] == pattern)
            }
        })
    }

    /// Offset of the last occurrence of `pattern` starting at or before
    /// `start`.
    ///
    /// A `start` past the end is pulled back to the last position where the
    /// pattern still fits. An empty pattern matches at `start` unchanged.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] if `start` is negative.
    pub fn rindex(&self, pattern: &[u8], start: isize) -> Result<Option<usize>, TextError> {
        let start = start_offset(start)?;
        let hay = self.as_bytes();

        Ok(match pattern {
            [] => Some(start),
            [byte] => {
                let Some(last) = hay.len().checked_sub(1) else {
                    return Ok(None);
                };
                hay[..=start.min(last)].iter().rposition(|b| b == byte)
            }
            _ => {
                let Some(last) = hay.len().checked_sub(pattern.len()) else {
                    return Ok(None);
                };
                (0..=start.min(last))
                    .rev()
                    .find(|&pos| &hay[pos..pos + pattern.len()] == pattern)
            }
        })
    }

    /// The character starting at `offset`: the whole multi-byte sequence if
    /// `mb` says one starts there and it fits, otherwise the single byte.
    ///
    /// Returns `None` for a negative offset or one at or past the end.
    pub fn find_character(
        &self,
        cx: &Context,
        offset: isize,
        mb: &dyn MultiByteTable,
    ) -> Option<TextBuffer> {
        let bytes = self.as_bytes();
        let offset = usize::try_from(offset).ok().filter(|&o| o < bytes.len())?;

        let lead = bytes[offset];
        let width = if mb.is_lead_byte(lead) && offset + mb.width(lead) <= bytes.len() {
            mb.width(lead)
        } else {
            1
        };
        Some(self.derive(cx, &bytes[offset..offset + width]))
    }
}
