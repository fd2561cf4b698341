#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use textbuf::{Context, KCode, RuntimeOptions, TextBuffer, TextError, TransformTable, hash_bytes};

const MAX_POOL: usize = 8;

/// Fragments that exercise set syntax, whitespace runs and multi-byte leads.
static TOKENS: &[&[u8]] = &[
    b"a-z",
    b"z-a",
    b"\\-",
    b"\\\\",
    b"^",
    b"-",
    b"  \t\n",
    b"\x0b\x0c\r",
    b"0x1F",
    b"1_000",
    b"1e5",
    "\u{e9}".as_bytes(),
    "\u{3042}".as_bytes(),
    b"\xe3\x81",
    b"\x8f\xa1",
    b"\x00",
];

/// Splices a token into the input every tenth run, otherwise defers to
/// libFuzzer's own mutations.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if !seed.is_multiple_of(10) {
        return fuzzer_mutate(data, size, max_size);
    }

    let mut rng = SmallRng::seed_from_u64(u64::from(seed));
    let token = TOKENS[rng.random_range(0..TOKENS.len())];
    if size + token.len() > max_size {
        return fuzzer_mutate(data, size, max_size);
    }

    let at = rng.random_range(0..=size);
    data.copy_within(at..size, at + token.len());
    data[at..at + token.len()].copy_from_slice(token);
    size + token.len()
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug, Arbitrary)]
enum Op {
    Append(u8, Vec<u8>),
    AppendBuffer(u8, u8),
    Dup(u8),
    Unshare(u8),
    Resize(u8, u8),
    ApplyAnd(u8, u8),
    CopyFrom { target: u8, source: u8, src: i8, count: i8, dst: i8 },
    TrExpand(u8, Option<u8>, bool),
    Substring(u8, i8, i8),
    Index(u8, Vec<u8>, u8),
    Rindex(u8, Vec<u8>, u8),
    FindCharacter(u8, i8, u8),
    AwkSplit(u8, i8),
    Transform(u8, u8),
    SecureCompare(u8, u8),
    ToI(u8, u8, bool),
    ToF(u8),
    NullTerminated(u8),
    Hash(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    seed: Vec<u8>,
    ops: Vec<Op>,
}

fn kcode(n: u8) -> KCode {
    match n % 4 {
        0 => KCode::None,
        1 => KCode::Euc,
        2 => KCode::Sjis,
        _ => KCode::Utf8,
    }
}

struct Pool<'cx> {
    cx: &'cx Context,
    buffers: Vec<TextBuffer>,
    model: Vec<Vec<u8>>,
}

impl Pool<'_> {
    fn slot(&self, i: u8) -> usize {
        usize::from(i) % self.buffers.len()
    }

    fn apply(&mut self, op: Op) {
        let cx = self.cx;
        match op {
            Op::Append(i, bytes) => {
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
                    self.buffers.push(copy);
                    self.model.push(self.model[i].clone());
                }
            }
            Op::Unshare(i) => {
                let i = self.slot(i);
                self.buffers[i].unshare(cx);
            }
            Op::Resize(i, n) => {
                let i = self.slot(i);
                self.buffers[i].resize_capacity(cx, isize::from(n)).unwrap();
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
            Op::CopyFrom { target, source, src, count, dst } => {
                let (i, j) = (self.slot(target), self.slot(source));
                let capacity = self.buffers[i].capacity() as isize;
                let other = self.buffers[j].dup(cx);
                let (src, count, dst) = (isize::from(src), isize::from(count), isize::from(dst));
                self.buffers[i].copy_from(cx, &other, src, count, dst);

                let theirs = self.model[j].clone();
                let other_size = theirs.len() as isize;
                if src < other_size && count >= 0 && dst < capacity {
                    let (src, dst) = (src.max(0), dst.max(0));
                    let count = count.min(other_size - src).min(capacity - dst);
                    for k in 0..count {
                        if let Some(byte) = self.model[i].get_mut((dst + k) as usize) {
                            *byte = theirs[(src + k) as usize];
                        }
                    }
                }
            }
            Op::TrExpand(i, limit, invalid_as_empty) => {
                let i = self.slot(i);
                let limit = limit.map(usize::from);
                let mut fresh = TextBuffer::from_bytes(cx, &self.model[i]);
                let expected = fresh.tr_expand(cx, limit, invalid_as_empty);
                let steps = self.buffers[i].tr_expand(cx, limit, invalid_as_empty);
                assert_eq!(steps, expected);
                assert!(limit.is_none_or(|l| steps <= l));
                let table = fresh.to_vec();
                let mut seen = [false; 256];
                assert!(table.iter().all(|&b| !std::mem::replace(&mut seen[usize::from(b)], true)));
                self.model[i] = table;
            }
            Op::Substring(i, start, count) => {
                let i = self.slot(i);
                let sub = self.buffers[i].substring(cx, isize::from(start), isize::from(count));
                if let Some(sub) = sub {
                    let total = self.model[i].len() as isize;
                    let start = if start < 0 { isize::from(start) + total } else { isize::from(start) };
                    let start = start as usize;
                    assert_eq!(sub.as_bytes(), &self.model[i][start..start + sub.len()]);
                }
            }
            Op::Index(i, pattern, start) => {
                let i = self.slot(i);
                let hay = &self.model[i];
                let found = self.buffers[i].index(&pattern, isize::from(start)).unwrap();
                if let Some(pos) = found {
                    assert!(pos >= usize::from(start));
                    if !pattern.is_empty() {
                        assert_eq!(&hay[pos..pos + pattern.len()], pattern.as_slice());
                    }
                }
            }
            Op::Rindex(i, pattern, start) => {
                let i = self.slot(i);
                let hay = &self.model[i];
                let found = self.buffers[i].rindex(&pattern, isize::from(start)).unwrap();
                if let Some(pos) = found {
                    assert!(pos <= usize::from(start));
                    if !pattern.is_empty() {
                        assert_eq!(&hay[pos..pos + pattern.len()], pattern.as_slice());
                    }
                }
            }
            Op::FindCharacter(i, offset, code) => {
                let i = self.slot(i);
                let ch = self.buffers[i].find_character(cx, isize::from(offset), &kcode(code));
                assert_eq!(ch.is_some(), offset >= 0 && (offset as usize) < self.model[i].len());
            }
            Op::AwkSplit(i, limit) => {
                let i = self.slot(i);
                let fields = self.buffers[i].awk_split(cx, isize::from(limit));
                if limit > 0 {
                    assert!(fields.len() <= limit as usize);
                }
            }
            Op::Transform(i, code) => {
                let i = self.slot(i);
                let out = self.buffers[i].transform(cx, &TransformTable::identity(), &kcode(code));
                assert!(out.len() >= self.model[i].len());
            }
            Op::SecureCompare(i, j) => {
                let (i, j) = (self.slot(i), self.slot(j));
                let equal = self.buffers[i].secure_compare(&self.buffers[j]);
                let (a, b) = (&self.model[i], &self.model[j]);
                let longest = a.len().max(b.len());
                let padded = |v: &Vec<u8>| {
                    let mut v = v.clone();
                    v.resize(longest, 0);
                    v
                };
                assert_eq!(equal, padded(a) == padded(b));
            }
            Op::ToI(i, base, strict) => {
                let i = self.slot(i);
                let base = u32::from(base % 38);
                let result = self.buffers[i].to_i(cx, base, strict);
                if base == 1 || base > 36 {
                    assert!(matches!(result, Err(TextError::InvalidArgument(_))));
                } else {
                    assert!(result.is_ok());
                }
            }
            Op::ToF(i) => {
                let i = self.slot(i);
                let value = self.buffers[i].to_f();
                assert!(!value.is_nan());
                if !self.model[i].iter().any(u8::is_ascii_digit) {
                    assert!(value == 0.0);
                }
            }
            Op::NullTerminated(i) => {
                let i = self.slot(i);
                let view = self.buffers[i].null_terminated(cx);
                assert_eq!(view.split_last(), Some((&0, &self.model[i][..])));
            }
            Op::Hash(i) => {
                let i = self.slot(i);
                assert_eq!(self.buffers[i].hash_value(), hash_bytes(&self.model[i]));
            }
        }
    }

    fn check(&self) {
        for (buffer, model) in self.buffers.iter().zip(&self.model) {
            buffer.assert_invariants();
            assert_eq!(buffer.as_bytes(), model.as_slice());
        }
    }
}

fn run(input: Input) {
    let cx = Context::new(RuntimeOptions::default());
    let mut pool = Pool {
        cx: &cx,
        buffers: vec![TextBuffer::from_bytes(&cx, &input.seed)],
        model: vec![input.seed],
    };
    for op in input.ops {
        pool.apply(op);
        pool.check();
    }
}

fuzz_target!(|input: Input| run(input));
