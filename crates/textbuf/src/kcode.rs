//! Legacy multi-byte character width tables.
//!
//! The runtime predates full encoding support: multi-byte awareness is a
//! single "how wide is the character starting with this byte" lookup. The
//! [`MultiByteTable`] trait is the seam; [`KCode`] provides the classic
//! tables (`NONE`, `EUC`, `SJIS`, `UTF8`).

/// Width lookup for legacy multi-byte encodings.
///
/// Passed explicitly to the algorithms that care (transform and
/// character lookup) so no global selection is involved.
pub trait MultiByteTable {
    /// Declared width in bytes of the character introduced by `byte`.
    /// Always at least 1.
    fn width(&self, byte: u8) -> usize;

    /// Whether `byte` starts a sequence wider than one byte.
    #[inline]
    fn is_lead_byte(&self, byte: u8) -> bool {
        self.width(byte) > 1
    }
}

/// The legacy `$KCODE` selection.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KCode {
    /// Multi-byte awareness disabled: every byte has width 1.
    #[default]
    None,
    /// EUC-JP.
    Euc,
    /// Shift_JIS.
    Sjis,
    /// UTF-8 as understood by the legacy tables (up to 6-byte forms).
    Utf8,
}

impl MultiByteTable for KCode {
    fn width(&self, byte: u8) -> usize {
        match self {
            KCode::None => 1,
            KCode::Euc => match byte {
                0x8e | 0xa1..=0xfe => 2,
                0x8f => 3,
                _ => 1,
            },
            KCode::Sjis => match byte {
                0x81..=0x9f | 0xe0..=0xfc => 2,
                _ => 1,
            },
            KCode::Utf8 => match byte {
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                0xf8..=0xfb => 5,
                0xfc..=0xfd => 6,
                _ => 1,
            },
        }
    }
}
