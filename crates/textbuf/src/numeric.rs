//! Conversions out of byte strings: symbols, floats and integers.

use alloc::{format, vec::Vec};

use crate::{
    buffer::TextBuffer, context::Context, error::TextError, split::is_space, symbol::Symbol,
};

/// Up to the first NUL, the way a C reader sees the bytes.
fn c_str(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn skip_space(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Length of the longest prefix of `bytes` that reads as a decimal float.
fn float_prefix(bytes: &[u8]) -> usize {
    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int = digits(&bytes[i..]);
    i += int;
    let mut mantissa = int;
    if bytes.get(i) == Some(&b'.') {
        let frac = digits(&bytes[i + 1..]);
        if frac > 0 {
            i += 1 + frac;
            mantissa += frac;
        }
    }
    if mantissa == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp = digits(&bytes[j..]);
        if exp > 0 {
            i = j + exp;
        }
    }
    i
}

/// Splits off a radix prefix. A bare leading `0` selects octal in auto
/// mode but stays part of the digits.
fn radix_prefix(bytes: &[u8], base: u32) -> (u32, &[u8]) {
    if bytes.first() != Some(&b'0') {
        return (if base == 0 { 10 } else { base }, bytes);
    }
    let prefixed = match (bytes.get(1).map(u8::to_ascii_lowercase), base) {
        (Some(b'b'), 0 | 2) => Some(2),
        (Some(b'o'), 0 | 8) => Some(8),
        (Some(b'd'), 0 | 10) => Some(10),
        (Some(b'x'), 0 | 16) => Some(16),
        _ => None,
    };
    match prefixed {
        Some(radix) => (radix, &bytes[2..]),
        None => (if base == 0 { 8 } else { base }, bytes),
    }
}

fn parse_int(bytes: &[u8], base: u32, strict: bool) -> Option<i64> {
    let mut s = skip_space(bytes);
    let negative = match s.first() {
        Some(b'-') => {
            s = &s[1..];
            true
        }
        Some(b'+') => {
            s = &s[1..];
            false
        }
        _ => false,
    };
    let (radix, s) = radix_prefix(s, base);

    let mut value: i64 = 0;
    let mut seen = 0usize;
    let mut underscore = false;
    let mut i = 0;
    while let Some(&b) = s.get(i) {
        if b == b'_' {
            if seen == 0 || underscore {
                break;
            }
            underscore = true;
        } else {
            let Some(d) = char::from(b).to_digit(radix) else {
                break;
            };
            let d = i64::from(d);
            // Accumulate toward the sign so i64::MIN is reachable.
            value = value.checked_mul(i64::from(radix))?;
            value = if negative { value.checked_sub(d)? } else { value.checked_add(d)? };
            seen += 1;
            underscore = false;
        }
        i += 1;
    }

    if strict && (seen == 0 || underscore || !s[i..].iter().all(|&b| is_space(b))) {
        return None;
    }
    Some(value)
}

impl TextBuffer {
    /// Interns the logical bytes in the context's symbol table.
    pub fn to_sym(&self, cx: &Context) -> Symbol {
        cx.symbols().intern(self.as_bytes())
    }

    /// Parses a leading decimal float, `0.0` when there is none.
    ///
    /// Leading whitespace is skipped and underscores are ignored anywhere.
    /// Reading stops at the first byte that cannot be part of a float or at
    /// a second exponent marker.
    pub fn to_f(&self) -> f64 {
        let bytes = skip_space(c_str(self.as_bytes()));

        let mut kept = Vec::with_capacity(bytes.len());
        let mut seen_exponent = false;
        for &b in bytes {
            match b {
                b'_' => continue,
                b'e' | b'E' if seen_exponent => break,
                b'e' | b'E' => seen_exponent = true,
                b'0'..=b'9' | b'.' | b'-' | b'+' => {}
                _ => break,
            }
            kept.push(b);
        }

        let len = float_prefix(&kept);
        core::str::from_utf8(&kept[..len])
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    }

    /// Parses an integer in `base` (0 detects the base from a `0b`, `0o`,
    /// `0d`, `0x` or `0` prefix).
    ///
    /// Reads the null-terminated view. Surrounding whitespace, one sign and
    /// single underscores between digits are accepted. In strict mode a NUL
    /// inside the logical bytes, a missing number or trailing garbage give
    /// `None`; otherwise the longest valid prefix is used and a missing
    /// number reads as 0. Values outside `i64` give `None`.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidArgument`] unless `base` is 0 or in `2..=36`.
    pub fn to_i(&mut self, cx: &Context, base: u32, strict: bool) -> Result<Option<i64>, TextError> {
        if base == 1 || base > 36 {
            return Err(TextError::invalid_argument(format!("illegal radix {base}")));
        }
        if strict && self.as_bytes().contains(&0) {
            return Ok(None);
        }

        let view = self.null_terminated(cx);
        Ok(parse_int(c_str(view), base, strict))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::float_prefix;
    use crate::{Context, TextBuffer, TextError};

    #[rstest]
    #[case(b"1.5", 1.5)]
    #[case(b"  -2.25e2xyz", -225.0)]
    #[case(b"1_000.5", 1000.5)]
    #[case(b"1e3e4", 1000.0)]
    #[case(b"1.5.3", 1.5)]
    #[case(b".5", 0.5)]
    #[case(b"3.", 3.0)]
    #[case(b"1e", 1.0)]
    #[case(b"--1", 0.0)]
    #[case(b"abc", 0.0)]
    #[case(b"", 0.0)]
    #[case(b"12\x0034", 12.0)]
    fn to_f_cases(#[case] input: &[u8], #[case] expected: f64) {
        let cx = Context::default();
        let value = TextBuffer::from_bytes(&cx, input).to_f();
        assert!((value - expected).abs() < f64::EPSILON, "{input:?} -> {value}");
    }

    #[test]
    fn float_prefix_needs_a_digit() {
        assert_eq!(float_prefix(b"+."), 0);
        assert_eq!(float_prefix(b"-.5e+2"), 6);
        assert_eq!(float_prefix(b"7e+"), 1);
    }

    #[rstest]
    #[case(b"42", 10, false, Some(42))]
    #[case(b"  -42  ", 10, true, Some(-42))]
    #[case(b"0x1f", 0, true, Some(31))]
    #[case(b"0b101", 0, true, Some(5))]
    #[case(b"0o17", 0, true, Some(15))]
    #[case(b"017", 0, true, Some(15))]
    #[case(b"0d19", 0, true, Some(19))]
    #[case(b"0", 0, true, Some(0))]
    #[case(b"1_000", 10, true, Some(1000))]
    #[case(b"1__000", 10, false, Some(1))]
    #[case(b"1__000", 10, true, None)]
    #[case(b"_1", 10, true, None)]
    #[case(b"12abc", 10, false, Some(12))]
    #[case(b"12abc", 10, true, None)]
    #[case(b"abc", 10, false, Some(0))]
    #[case(b"abc", 10, true, None)]
    #[case(b"zz", 36, true, Some(1295))]
    #[case(b"0b1", 16, true, Some(177))]
    #[case(b"ff", 16, true, Some(255))]
    #[case(b"9223372036854775807", 10, true, Some(i64::MAX))]
    #[case(b"-9223372036854775808", 10, true, Some(i64::MIN))]
    #[case(b"9223372036854775808", 10, true, None)]
    #[case(b"12\x0034", 10, false, Some(12))]
    #[case(b"12\x0034", 10, true, None)]
    fn to_i_cases(
        #[case] input: &[u8],
        #[case] base: u32,
        #[case] strict: bool,
        #[case] expected: Option<i64>,
    ) {
        let cx = Context::default();
        let mut b = TextBuffer::from_bytes(&cx, input);
        assert_eq!(b.to_i(&cx, base, strict), Ok(expected));
    }

    #[test]
    fn to_i_rejects_bad_radix() {
        let cx = Context::default();
        let mut b = TextBuffer::from_bytes(&cx, b"1");
        assert_eq!(
            b.to_i(&cx, 37, false),
            Err(TextError::InvalidArgument("illegal radix 37".into()))
        );
        assert!(b.to_i(&cx, 1, false).is_err());
    }

    #[test]
    fn to_i_repairs_terminator() {
        let cx = Context::default();
        let mut b = TextBuffer::from_bytes(&cx, b"12345");
        b.set_size(3);
        assert_eq!(b.to_i(&cx, 10, true), Ok(Some(123)));
    }

    #[test]
    fn to_sym_interns() {
        let cx = Context::default();
        let a = TextBuffer::from_bytes(&cx, b"name").to_sym(&cx);
        let b = TextBuffer::from_bytes(&cx, b"name").to_sym(&cx);
        let c = TextBuffer::from_bytes(&cx, b"other").to_sym(&cx);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cx.symbols().name(a).as_deref(), Some(&b"name"[..]));
    }
}
