use alloc::vec::Vec;

use quickcheck::QuickCheck;

use super::{
    arbitrary::{Bytes, Op},
    quickcheck_tests,
};
use crate::{Context, TextBuffer, buffer::signed, hash_bytes};

const MAX_POOL: usize = 8;

struct Pool {
    buffers: Vec<TextBuffer>,
    model: Vec<Vec<u8>>,
}

impl Pool {
    fn new(cx: &Context, seed: &[u8]) -> Self {
        Self {
            buffers: alloc::vec![TextBuffer::from_bytes(cx, seed)],
            model: alloc::vec![seed.to_vec()],
        }
    }

    fn slot(&self, i: usize) -> usize {
        i % self.buffers.len()
    }

    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, cx: &Context, op: Op) {
        match op {
            Op::Append(i, Bytes(bytes)) => {
                let i = self.slot(i);
                self.buffers[i].append(cx, &bytes);
                self.model[i].extend_from_slice(&bytes);
            }
            Op::AppendBuffer(i, j) => {
                let (i, j) = (self.slot(i), self.slot(j));
                let other = self.buffers[j].dup(cx);
                self.buffers[i].append_buffer(cx, &other);
                let theirs = self.model[j].clone();
                self.model[i].extend_from_slice(&theirs);
            }
            Op::Dup(i) => {
                let i = self.slot(i);
                if self.buffers.len() < MAX_POOL {
                    let copy = self.buffers[i].dup(cx);
                    assert!(copy.is_shared() && self.buffers[i].is_shared());
                    assert!(copy.shares_storage_with(&self.buffers[i]));
                    self.buffers.push(copy);
                    self.model.push(self.model[i].clone());
                }
            }
            Op::Unshare(i) => {
                let i = self.slot(i);
                self.buffers[i].unshare(cx);
                assert!(!self.buffers[i].is_shared());
            }
            Op::Resize(i, n) => {
                let i = self.slot(i);
                self.buffers[i]
                    .resize_capacity(cx, isize::from(n))
                    .unwrap();
                self.model[i].truncate(usize::from(n));
            }
            Op::ApplyAnd(i, j) => {
                let (i, j) = (self.slot(i), self.slot(j));
                let other = self.buffers[j].dup(cx);
                self.buffers[i].apply_and(cx, &other);
                let theirs = self.model[j].clone();
                for (a, b) in self.model[i].iter_mut().zip(&theirs) {
                    *a = u8::from(*a != 0 && *b != 0);
                }
            }
            Op::CopyFrom {
                target,
                source,
                src,
                count,
                dst,
            } => {
                let (i, j) = (self.slot(target), self.slot(source));
                let capacity = self.buffers[i].capacity();
                let other = self.buffers[j].dup(cx);
                let (src, count, dst) = (isize::from(src), isize::from(count), isize::from(dst));
                self.buffers[i].copy_from(cx, &other, src, count, dst);

                let theirs = self.model[j].clone();
                let other_size = signed(theirs.len());
                let capacity = signed(capacity);
                if src < other_size && count >= 0 && dst < capacity {
                    let (src, dst) = (src.max(0), dst.max(0));
                    let count = count.min(other_size - src).min(capacity - dst);
                    for k in 0..count {
                        let at = (dst + k).unsigned_abs();
                        if let Some(byte) = self.model[i].get_mut(at) {
                            *byte = theirs[(src + k).unsigned_abs()];
                        }
                    }
                }
            }
            Op::TrExpand(i) => {
                let i = self.slot(i);
                let mut fresh = TextBuffer::from_bytes(cx, &self.model[i]);
                let expected_steps = fresh.tr_expand(cx, None, false);
                let steps = self.buffers[i].tr_expand(cx, None, false);
                assert_eq!(steps, expected_steps);
                self.model[i] = fresh.to_vec();
            }
            Op::Hash(i) => {
                let i = self.slot(i);
                assert_eq!(self.buffers[i].hash_value(), hash_bytes(&self.model[i]));
            }
            Op::NullTerminated(i) => {
                let i = self.slot(i);
                let view = self.buffers[i].null_terminated(cx);
                assert_eq!(view.split_last(), Some((&0, &self.model[i][..])));
            }
        }
    }

    fn check(&self) -> bool {
        self.buffers.iter().zip(&self.model).all(|(buffer, model)| {
            buffer.assert_invariants();
            buffer.as_bytes() == model.as_slice()
        })
    }
}

/// Property: any interleaving of mutations over headers that share storage
/// behaves exactly like the same mutations on independent byte vectors.
#[test]
fn cow_isolation_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(seed: Bytes, ops: Vec<Op>) -> bool {
        let cx = Context::default();
        let mut pool = Pool::new(&cx, &seed.0);
        for op in ops {
            pool.apply(&cx, op);
            if !pool.check() {
                return false;
            }
        }
        true
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Bytes, Vec<Op>) -> bool);
}

/// Property: `dup` never copies bytes; the first write through either side
/// does, and only once.
#[test]
fn dup_defers_copy_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(seed: Bytes, extra: Bytes) -> bool {
        let cx = Context::default();
        let mut a = TextBuffer::from_bytes(&cx, &seed.0);
        let before = cx.allocations();
        let b = a.dup(&cx);
        if cx.allocations() != before {
            return false;
        }

        a.unshare(&cx);
        let after_unshare = cx.allocations();
        a.append(&cx, &extra.0);
        let grew = a.capacity() > b.capacity();

        after_unshare == before + 1
            && (grew || cx.allocations() == after_unshare)
            && b.as_bytes() == seed.0.as_slice()
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Bytes, Bytes) -> bool);
}
