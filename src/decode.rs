//! Decoder primitives.
//!
//! Everything here takes the compressed byte stream and a [`Cursor`] and
//! produces code units. The destination type decides the shape: `u16` for
//! general UTF-16 output, `u8` for ranges the caller has already proven
//! ASCII via [`is_ascii_range`] (hitting a Unicode escape in that mode is a
//! contract violation, not a runtime condition).

use crate::cursor::Cursor;
use crate::tables::{
    decode_bytecode, is_bytecode, unicode_payload, ASCII_ESCAPE, MAX_TOKEN_LENGTH,
    TOKEN_LENGTHS, UNICODE_ESCAPE,
};
use crate::utf16::{lead_surrogate, trail_surrogate, MAX_BMP};

/// Destination code unit for [`decode`].
pub(crate) trait DecodeUnit: Copy + Default + From<u8> {
    /// Write `scalar` as code units, as many as fit. Returns the count
    /// written; a supplementary scalar's trailing surrogate is dropped when
    /// only one slot remains, which can only legally happen at the end of a
    /// requested range.
    fn write_scalar(scalar: u32, dest: &mut [Self]) -> usize;
}

impl DecodeUnit for u16 {
    fn write_scalar(scalar: u32, dest: &mut [u16]) -> usize {
        if scalar <= MAX_BMP {
            if let Some(slot) = dest.first_mut() {
                *slot = scalar as u16;
            }
            dest.len().min(1)
        } else {
            if let Some(slot) = dest.get_mut(0) {
                *slot = lead_surrogate(scalar);
            }
            if let Some(slot) = dest.get_mut(1) {
                *slot = trail_surrogate(scalar);
            }
            dest.len().min(2)
        }
    }
}

impl DecodeUnit for u8 {
    fn write_scalar(scalar: u32, dest: &mut [u8]) -> usize {
        debug_assert!(false, "unicode escape in an ascii-only range");
        if let Some(slot) = dest.first_mut() {
            *slot = scalar as u8;
        }
        dest.len().min(1)
    }
}

/// Fill `dest` with code units starting at `cursor`.
///
/// Phase one handles a cursor resting inside a token by expanding that token
/// into a scratch buffer and copying the tail. Phase two decodes whole
/// tokens straight into `dest`; dictionary expansions truncate cleanly when
/// the destination runs out mid-token.
pub(crate) fn decode<T: DecodeUnit>(data: &[u8], cursor: Cursor, dest: &mut [T]) {
    let mut src = cursor.byte_offset();
    let mut pos = 0usize;

    if cursor.sub_token_offset() > 0 {
        let code = data[src];
        src += 1;
        let mut scratch = [T::default(); MAX_TOKEN_LENGTH];
        let decoded = if is_bytecode(code) {
            decode_bytecode(code, &mut scratch)
        } else {
            // A one-unit ASCII token cannot hold a sub-token cursor.
            debug_assert_eq!(code, UNICODE_ESCAPE);
            let scalar = unicode_payload(&data[src..]);
            src += 3;
            T::write_scalar(scalar, &mut scratch)
        };
        let skip = cursor.sub_token_offset();
        debug_assert!(skip < decoded);
        let n = (decoded - skip).min(dest.len());
        dest[..n].copy_from_slice(&scratch[skip..skip + n]);
        pos = n;
    }

    while pos < dest.len() {
        let code = data[src];
        src += 1;
        if is_bytecode(code) {
            pos += decode_bytecode(code, &mut dest[pos..]);
        } else if code == ASCII_ESCAPE {
            dest[pos] = T::from(data[src]);
            src += 1;
            pos += 1;
        } else {
            debug_assert_eq!(code, UNICODE_ESCAPE);
            let scalar = unicode_payload(&data[src..]);
            src += 3;
            pos += T::write_scalar(scalar, &mut dest[pos..]);
        }
    }
}

/// True iff no Unicode escape contributes any code unit to the `chars`
/// units at `cursor`. A token partially covered by the range counts as
/// touched, including the one a sub-token cursor starts inside.
pub(crate) fn is_ascii_range(data: &[u8], cursor: Cursor, chars: usize) -> bool {
    let mut src = cursor.byte_offset();
    let mut remaining = (chars + cursor.sub_token_offset()) as isize;

    while remaining > 0 {
        let code = data[src];
        src += 1;
        remaining -= TOKEN_LENGTHS[code as usize] as isize;
        if !is_bytecode(code) {
            if code == ASCII_ESCAPE {
                src += 1;
            } else {
                debug_assert_eq!(code, UNICODE_ESCAPE);
                return false;
            }
        }
    }

    true
}

/// Code-unit iterator from a cursor, re-expanding one token at a time. Used
/// by the per-character consumers (equality, line lookup, single-unit get);
/// bulk decoding goes through [`decode`]. Ends at the end of the stream
/// slice; callers bound it by the logical range instead where one applies.
pub(crate) struct Units<'a> {
    data: &'a [u8],
    cursor: Cursor,
}

impl<'a> Units<'a> {
    pub(crate) fn new(data: &'a [u8], cursor: Cursor) -> Self {
        Units { data, cursor }
    }
}

impl Iterator for Units<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let src = self.cursor.byte_offset();
        if src >= self.data.len() {
            return None;
        }

        let mut scratch = [0u16; MAX_TOKEN_LENGTH];
        let code = self.data[src];
        let (decoded, token_size) = if is_bytecode(code) {
            (decode_bytecode(code, &mut scratch), 1)
        } else if code == ASCII_ESCAPE {
            scratch[0] = self.data[src + 1] as u16;
            (1, 2)
        } else {
            let scalar = unicode_payload(&self.data[src + 1..]);
            (u16::write_scalar(scalar, &mut scratch), 4)
        };

        let sub = self.cursor.sub_token_offset();
        debug_assert!(sub < decoded);
        let unit = scratch[sub];
        self.cursor = if sub + 1 == decoded {
            Cursor::new(src + token_size, 0)
        } else {
            Cursor::new(src, sub + 1)
        };
        Some(unit)
    }
}
