//! Compressed source values and the operations on them.
//!
//! A [`CompressedSource`] owns the compressed byte stream with the
//! positional index appended, the logical length, and the full-range hash.
//! It optionally keeps a strong reference to the original string; while
//! present, most operations short-circuit to plain substring work. The
//! cache is an optimization only and the host may drop it at any time.

use std::fmt;
use std::io;
use std::sync::{Arc, RwLock};

use crate::cursor::{self, index_size, Cursor};
use crate::decode::{decode, is_ascii_range, Units};
use crate::encode::encode;
use crate::error::VellumError;
use crate::hash::{hash_units, SourceHasher};
use crate::text::SourceString;
use crate::utf16::{
    combine_surrogate_pair, encode_wtf8, is_lead_surrogate, is_trail_surrogate,
};

/// Units decoded per chunk when hashing a range.
const HASH_CHUNK: usize = 32;

pub struct CompressedSource {
    /// Compressed byte stream with the index appended.
    data: Box<[u8]>,
    /// Logical length in UTF-16 code units.
    char_length: usize,
    /// Hash of the full range, fixed at construction.
    hash: u32,
    /// The original string, kept as a fast path until the host drops it.
    cached: RwLock<Option<Arc<SourceString>>>,
}

impl CompressedSource {
    /// Compress `source`, retaining it as the cached fast path.
    pub fn compress(source: Arc<SourceString>) -> CompressedSource {
        let char_length = source.len();
        let mut index = vec![0u8; index_size(char_length)];
        let mut out = Vec::with_capacity(char_length / 2 + 16);
        encode(source.units(), char_length, &mut out, &mut index);

        #[cfg(debug_assertions)]
        {
            let mut end = Cursor::START;
            cursor::advance_cursor(&out, &mut end, char_length);
            debug_assert_eq!(end, Cursor::new(out.len(), 0));
        }

        let hash = hash_units(source.units(), char_length);
        out.extend_from_slice(&index);
        CompressedSource {
            data: out.into_boxed_slice(),
            char_length,
            hash,
            cached: RwLock::new(Some(source)),
        }
    }

    /// Logical length in UTF-16 code units.
    pub fn char_length(&self) -> usize {
        self.char_length
    }

    /// Total owned bytes: compressed stream plus index.
    pub fn compressed_len(&self) -> usize {
        self.data.len()
    }

    /// Hash of the full range.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Drop the cached original; later operations decode for real.
    pub fn drop_cached_string(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }

    /// Cursor addressing logical position `pos`.
    pub fn cursor_at(&self, pos: usize) -> Cursor {
        debug_assert!(pos <= self.char_length);
        cursor::get_cursor(&self.data, pos, self.char_length)
    }

    /// Move `cursor` forward by `chars` logical characters.
    pub fn advance_cursor(&self, cursor: &mut Cursor, chars: usize) {
        cursor::advance_cursor(&self.data, cursor, chars);
    }

    /// The entire original as a fresh string.
    pub fn decompress(&self) -> SourceString {
        self.decompress_range(0, self.char_length)
    }

    /// The `length` code units starting at `start` as a fresh string. The
    /// result is narrow exactly when no Unicode escape touches the range.
    pub fn decompress_range(&self, start: usize, length: usize) -> SourceString {
        debug_assert!(start + length <= self.char_length);
        if let Some(cached) = self.cached() {
            return cached.sub_string(start, start + length);
        }

        let cursor = self.cursor_at(start);
        let stream = self.stream();
        if is_ascii_range(stream, cursor, length) {
            let mut buf = vec![0u8; length];
            decode(stream, cursor, &mut buf);
            SourceString::Narrow(buf.into())
        } else {
            let mut buf = vec![0u16; length];
            decode(stream, cursor, &mut buf);
            SourceString::Wide(buf.into())
        }
    }

    /// True iff no Unicode escape contributes any code unit to the range.
    pub fn is_ascii(&self, start: usize, length: usize) -> bool {
        debug_assert!(start + length <= self.char_length);
        is_ascii_range(self.stream(), self.cursor_at(start), length)
    }

    /// Code-unit equality of the substring at `start` with `other`; the
    /// length is `other`'s. A range past the end is unequal, not an error.
    pub fn sub_string_equals(&self, start: usize, other: &SourceString) -> bool {
        if start + other.len() > self.char_length {
            return false;
        }
        if let Some(cached) = self.cached() {
            return cached.sub_string_equals(start, other);
        }
        let units = Units::new(self.stream(), self.cursor_at(start));
        units.take(other.len()).eq(other.units())
    }

    /// Incremental hash of the range, decoded in fixed-size chunks. The
    /// full range returns the hash computed at construction.
    pub fn sub_string_hash(&self, start: usize, length: usize) -> u32 {
        debug_assert!(start + length <= self.char_length);
        if start == 0 && length == self.char_length {
            return self.hash;
        }
        if let Some(cached) = self.cached() {
            return hash_units(cached.units().skip(start), length);
        }

        let stream = self.stream();
        let mut cursor = self.cursor_at(start);
        let mut hasher = SourceHasher::new(length);
        if !hasher.has_trivial_hash() {
            let mut buf = [0u16; HASH_CHUNK];
            let mut remaining = length;
            while remaining > 0 {
                let count = remaining.min(HASH_CHUNK);
                decode(stream, cursor, &mut buf[..count]);
                hasher.add_units(buf[..count].iter().copied());
                cursor::advance_cursor(&self.data, &mut cursor, count);
                remaining -= count;
            }
        }
        hasher.finish()
    }

    /// The single code unit at `pos`.
    pub fn code_unit_at(&self, pos: usize) -> u16 {
        debug_assert!(pos < self.char_length);
        if let Some(cached) = self.cached() {
            return cached.unit(pos);
        }
        Units::new(self.stream(), self.cursor_at(pos))
            .next()
            .expect("cursor past end of stream")
    }

    /// Count of line-feed code units strictly before `pos`, walking from
    /// the start of the stream. Positions past the end clamp. Meant for
    /// rarely-taken paths; there is deliberately no line index.
    pub fn line_number_slow(&self, pos: usize) -> usize {
        let pos = pos.min(self.char_length);
        Units::new(self.stream(), Cursor::START)
            .take(pos)
            .filter(|&unit| unit == 0x000A)
            .count()
    }

    /// Write the range to `out` as UTF-8, recombining surrogate pairs into
    /// scalar values first. A range edge that splits a pair emits the bare
    /// surrogate in its generalized 3-byte form. Returns the count of code
    /// units fully written; a sink reporting `WriteZero` truncates silently
    /// and the count says how far it got.
    pub fn dump<W: io::Write>(
        &self,
        out: &mut W,
        start: usize,
        length: usize,
    ) -> Result<usize, VellumError> {
        debug_assert!(start + length <= self.char_length);
        let mut units = Units::new(self.stream(), self.cursor_at(start))
            .take(length)
            .peekable();
        let mut written = 0usize;
        let mut buf = [0u8; 4];

        while let Some(unit) = units.next() {
            let mut scalar = unit as u32;
            let mut consumed = 1usize;
            if is_lead_surrogate(unit) {
                if let Some(&trail) = units.peek() {
                    if is_trail_surrogate(trail) {
                        units.next();
                        scalar = combine_surrogate_pair(unit, trail);
                        consumed = 2;
                    }
                }
            }
            let n = encode_wtf8(scalar, &mut buf);
            match out.write_all(&buf[..n]) {
                Ok(()) => written += consumed,
                Err(e) if e.kind() == io::ErrorKind::WriteZero => return Ok(written),
                Err(e) => return Err(VellumError::Sink(e)),
            }
        }

        Ok(written)
    }

    pub fn stats(&self) -> CompressionStats {
        let index_bytes = index_size(self.char_length);
        CompressionStats {
            char_length: self.char_length,
            compressed_bytes: self.data.len() - index_bytes,
            index_bytes,
        }
    }

    fn cached(&self) -> Option<Arc<SourceString>> {
        // A poisoned lock degrades to the slow path; the cache is an
        // optimization, never load-bearing.
        self.cached.read().ok().and_then(|guard| guard.clone())
    }

    fn stream(&self) -> &[u8] {
        &self.data[..self.data.len() - index_size(self.char_length)]
    }
}

impl fmt::Debug for CompressedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedSource")
            .field("char_length", &self.char_length)
            .field("compressed_len", &self.data.len())
            .field("hash", &self.hash)
            .finish()
    }
}

/// Sizes of a compressed source, for callers that report ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Logical length of the original in code units.
    pub char_length: usize,
    /// Bytes in the compressed stream, index excluded.
    pub compressed_bytes: usize,
    /// Bytes in the appended index.
    pub index_bytes: usize,
}

impl CompressionStats {
    /// Owned bytes per original code unit; below 1.0 means it shrank
    /// relative to one-byte-per-character storage.
    pub fn ratio(&self) -> f64 {
        if self.char_length == 0 {
            return 1.0;
        }
        (self.compressed_bytes + self.index_bytes) as f64 / self.char_length as f64
    }
}
