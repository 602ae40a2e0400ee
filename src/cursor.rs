//! Cursors and the positional index.
//!
//! A cursor is a position inside the compressed byte stream: the offset of a
//! token plus an offset into that token's expansion. It is a plain value;
//! operations take the byte stream alongside it. The index maps every
//! `CHARS_PER_INDEX_ENTRY`th logical position to the byte offset of the
//! token starting there, so random access costs at most one block walk.

use crate::tables::{
    is_bytecode, unicode_payload, ASCII_ESCAPE, TOKEN_LENGTHS, UNICODE_ESCAPE,
};
use crate::utf16::scalar_units;

/// Logical characters per index entry. Compile-time constant; changing it
/// breaks the compressed layout.
pub const CHARS_PER_INDEX_ENTRY: usize = 1024;

/// Bytes per index entry. Entries are `u32` little-endian regardless of the
/// build target so a compressed stream means the same thing everywhere.
pub(crate) const INDEX_ENTRY_SIZE: usize = 4;

/// A position inside a compressed byte stream: the logical character
/// `sub_token_offset` of the token starting at `byte_offset`.
/// `sub_token_offset == 0` is the canonical token-boundary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    byte_offset: usize,
    sub_token_offset: usize,
}

impl Cursor {
    /// Start of the stream.
    pub const START: Cursor = Cursor { byte_offset: 0, sub_token_offset: 0 };

    pub fn new(byte_offset: usize, sub_token_offset: usize) -> Self {
        Cursor { byte_offset, sub_token_offset }
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn sub_token_offset(&self) -> usize {
        self.sub_token_offset
    }
}

/// Size in bytes of the index for a source of `char_length` code units.
pub(crate) fn index_size(char_length: usize) -> usize {
    (char_length / CHARS_PER_INDEX_ENTRY) * INDEX_ENTRY_SIZE
}

/// Record the byte offset of the token starting at logical position `pos`
/// into the pre-sized index buffer. `pos` must be a positive multiple of
/// `CHARS_PER_INDEX_ENTRY`.
pub(crate) fn write_index_entry(index: &mut [u8], pos: usize, byte_offset: usize) {
    debug_assert!(pos >= CHARS_PER_INDEX_ENTRY);
    debug_assert_eq!(pos % CHARS_PER_INDEX_ENTRY, 0);
    let entry = pos / CHARS_PER_INDEX_ENTRY - 1;
    let bytes = (byte_offset as u32).to_le_bytes();
    index[entry * INDEX_ENTRY_SIZE..][..INDEX_ENTRY_SIZE].copy_from_slice(&bytes);
}

/// Anchor byte offset for logical position `pos`. Unlike
/// [`write_index_entry`], which takes the index buffer directly, this reads
/// the index from its appended position at the end of `data`.
pub(crate) fn read_index_entry(data: &[u8], pos: usize, char_length: usize) -> usize {
    if pos < CHARS_PER_INDEX_ENTRY {
        return 0;
    }
    let index_base = data.len() - index_size(char_length);
    let entry = pos / CHARS_PER_INDEX_ENTRY - 1;
    let offset = entry * INDEX_ENTRY_SIZE;
    let mut bytes = [0u8; INDEX_ENTRY_SIZE];
    bytes.copy_from_slice(&data[index_base + offset..index_base + offset + INDEX_ENTRY_SIZE]);
    u32::from_le_bytes(bytes) as usize
}

/// Move `cursor` forward by `chars` logical characters.
///
/// Walks whole tokens until the target is met; when the target lands inside
/// a token the cursor backs up to that token's start and records the
/// remainder as a sub-token offset. Advancing is additive: advancing by `a`
/// then `b` equals advancing by `a + b`.
pub fn advance_cursor(data: &[u8], cursor: &mut Cursor, chars: usize) {
    let mut byte_offset = cursor.byte_offset;
    let target = chars + cursor.sub_token_offset;
    let mut consumed = 0usize;
    let mut token_start = byte_offset;
    let mut consumed_before_token = 0usize;

    while consumed < target {
        token_start = byte_offset;
        consumed_before_token = consumed;

        let code = data[byte_offset];
        byte_offset += 1;
        consumed += TOKEN_LENGTHS[code as usize] as usize;
        if !is_bytecode(code) {
            if code == ASCII_ESCAPE {
                byte_offset += 1;
            } else {
                debug_assert_eq!(code, UNICODE_ESCAPE);
                let scalar = unicode_payload(&data[byte_offset..]);
                consumed += scalar_units(scalar) - 1;
                byte_offset += 3;
            }
        }
    }

    if consumed == target {
        *cursor = Cursor::new(byte_offset, 0);
    } else {
        *cursor = Cursor::new(token_start, target - consumed_before_token);
    }
}

/// Cursor addressing logical position `pos`: nearest index anchor at or
/// below `pos`, advanced by the remainder.
pub fn get_cursor(data: &[u8], pos: usize, char_length: usize) -> Cursor {
    let mut cursor = Cursor::new(read_index_entry(data, pos, char_length), 0);
    advance_cursor(data, &mut cursor, pos % CHARS_PER_INDEX_ENTRY);
    cursor
}
