//! Transliteration set expansion (`tr_expand`).
//!
//! A set description such as `a-cx\-` is expanded into the ordered list of
//! distinct bytes it denotes. Adding a byte that is already present moves
//! it to the end, so the table reflects the most recent position of every
//! member.

use crate::{buffer::TextBuffer, context::Context};

struct TrTable {
    tr: [u8; 256],
    // Position of each byte inside `tr`.
    set: [Option<u8>; 256],
    steps: usize,
    last: usize,
    limit: Option<usize>,
}

impl TrTable {
    fn new(limit: Option<usize>) -> Self {
        Self {
            tr: [0; 256],
            set: [None; 256],
            steps: 0,
            last: 0,
            limit,
        }
    }

    /// Inserts `chr` or moves it to the end. Returns `true` once the step
    /// limit has been reached, without touching the table.
    fn assign(&mut self, chr: u8) -> bool {
        if self.limit.is_some_and(|limit| self.steps >= limit) {
            return true;
        }

        if let Some(pos) = self.set[usize::from(chr)] {
            let pos = usize::from(pos);
            for j in pos + 1..self.last {
                let moved = self.tr[j];
                self.tr[j - 1] = moved;
                self.set[usize::from(moved)] = self.set[usize::from(moved)].map(|p| p - 1);
            }
            self.last -= 1;
        }

        self.tr[self.last] = chr;
        self.set[usize::from(chr)] = Some(u8::try_from(self.last).unwrap_or(u8::MAX));
        self.last += 1;
        self.steps += 1;
        false
    }

    fn as_slice(&self) -> &[u8] {
        &self.tr[..self.last]
    }
}

fn expand(desc: &[u8], limit: Option<usize>, invalid_as_empty: bool) -> TrTable {
    let mut table = TrTable::new(limit);
    let n = desc.len();
    // A leading `^` marks a negated set. It is skipped here; applying the
    // negation is up to whoever consumes the table.
    let mut i = usize::from(n > 1 && desc[0] == b'^');

    while i < n {
        let chr = desc[i];
        i += 1;
        let seq = desc.get(i).copied();

        if chr == b'\\' && seq.is_some() {
            // The escaped byte is handled as a plain byte on the next turn.
            continue;
        }

        if seq == Some(b'-') {
            i += 1;
            match desc.get(i).copied() {
                Some(max) if chr > max && invalid_as_empty => i += 1,
                Some(max) => {
                    let mut c = chr;
                    loop {
                        if table.assign(c) {
                            return table;
                        }
                        if c >= max {
                            break;
                        }
                        c += 1;
                    }
                    i += 1;
                }
                None => {
                    if table.assign(chr) || table.assign(b'-') {
                        return table;
                    }
                }
            }
        } else if table.assign(chr) {
            return table;
        }
    }

    table
}

impl TextBuffer {
    /// Replaces the receiver's bytes (a set description) with the expanded,
    /// deduplicated member list and returns the number of insert/move steps
    /// performed.
    ///
    /// `limit` caps the number of steps; expansion stops as soon as it is
    /// reached. With `invalid_as_empty`, descending ranges such as `z-a`
    /// contribute nothing; otherwise they contribute their first byte.
    pub fn tr_expand(&mut self, cx: &Context, limit: Option<usize>, invalid_as_empty: bool) -> usize {
        let table = expand(self.as_bytes(), limit, invalid_as_empty);
        self.tr_replace(cx, &table)
    }

    /// [`tr_expand`](Self::tr_expand) with the context's default handling of
    /// descending ranges.
    pub fn tr_expand_default(&mut self, cx: &Context, limit: Option<usize>) -> usize {
        let invalid_as_empty = cx.options().invalid_ranges_empty;
        self.tr_expand(cx, limit, invalid_as_empty)
    }

    fn tr_replace(&mut self, cx: &Context, table: &TrTable) -> usize {
        let last = table.last;
        if last + 1 > self.capacity() || self.shared {
            self.replace_storage(cx.allocate(last + 1));
        }

        let dest = self.storage_mut(cx).bytes_mut();
        dest[..last].copy_from_slice(table.as_slice());
        dest[last] = 0;

        self.size = last;
        self.invalidate_hash();
        table.steps
    }
}
