//! Incremental UTF-16 string hash.
//!
//! The running one-at-a-time hash the codec's consumers key identifiers by.
//! Feeding the same unit sequence in any chunking produces the same value,
//! which is what lets [`crate::CompressedSource`] hash a range through the
//! decoder in fixed-size buffers and still agree with the hash of the flat
//! original.

/// Seed folded into every hash; fixed so values are stable across runs.
const HASH_SEED: u32 = 0x5645_4C4C;

/// Sources longer than this skip per-unit hashing and take the trivial
/// length-based hash instead.
const MAX_HASH_CALC_LENGTH: usize = 16383;

/// Substitute for a computed hash of zero, which is reserved.
const ZERO_HASH: u32 = 27;

pub struct SourceHasher {
    running: u32,
    length: usize,
}

impl SourceHasher {
    pub fn new(length: usize) -> Self {
        SourceHasher { running: HASH_SEED, length }
    }

    /// Long strings hash by length alone; callers skip feeding units.
    pub fn has_trivial_hash(&self) -> bool {
        self.length > MAX_HASH_CALC_LENGTH
    }

    pub fn add_unit(&mut self, unit: u16) {
        debug_assert!(!self.has_trivial_hash());
        let mut h = self.running.wrapping_add(unit as u32);
        h = h.wrapping_add(h << 10);
        h ^= h >> 6;
        self.running = h;
    }

    pub fn add_units<I: Iterator<Item = u16>>(&mut self, units: I) {
        for unit in units {
            self.add_unit(unit);
        }
    }

    pub fn finish(self) -> u32 {
        if self.has_trivial_hash() {
            return self.length as u32;
        }
        let mut h = self.running;
        h = h.wrapping_add(h << 3);
        h ^= h >> 11;
        h = h.wrapping_add(h << 15);
        if h == 0 {
            ZERO_HASH
        } else {
            h
        }
    }
}

/// Hash `length` code units drawn from `units`.
pub(crate) fn hash_units<I: Iterator<Item = u16>>(units: I, length: usize) -> u32 {
    let mut hasher = SourceHasher::new(length);
    if !hasher.has_trivial_hash() {
        hasher.add_units(units.take(length));
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_does_not_matter() {
        let units: Vec<u16> = "var x = 1;\n".encode_utf16().collect();
        let whole = hash_units(units.iter().copied(), units.len());

        let mut hasher = SourceHasher::new(units.len());
        for chunk in units.chunks(3) {
            hasher.add_units(chunk.iter().copied());
        }
        assert_eq!(hasher.finish(), whole);
    }

    #[test]
    fn never_zero() {
        for s in ["", "a", "xyz", "\u{1F600}"] {
            let units: Vec<u16> = s.encode_utf16().collect();
            assert_ne!(hash_units(units.iter().copied(), units.len()), 0);
        }
    }

    #[test]
    fn long_strings_hash_by_length() {
        let hasher = SourceHasher::new(MAX_HASH_CALC_LENGTH + 1);
        assert!(hasher.has_trivial_hash());
        assert_eq!(hasher.finish(), (MAX_HASH_CALC_LENGTH + 1) as u32);
    }
}
