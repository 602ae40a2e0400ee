//! Static token dictionary.
//!
//! A compressed stream is a sequence of one-byte token codes. Codes `0` and
//! `1` are escapes (ASCII and Unicode) carrying inline payload; every other
//! code expands to a fixed ASCII character sequence from the table below.
//! The table is code-generated offline from a JavaScript corpus and must be
//! identical on the encode and decode side; expansions are 1..=9 UTF-16 code
//! units, ordered so that [`TOKEN_LENGTHS`] is monotone non-decreasing over
//! the bytecode range.

use std::sync::OnceLock;

/// Code `0`: one literal payload byte in `0..=0x7F` follows.
pub(crate) const ASCII_ESCAPE: u8 = 0;
/// Code `1`: three payload bytes follow, a big-endian 21-bit scalar value.
pub(crate) const UNICODE_ESCAPE: u8 = 1;
/// First dictionary bytecode.
pub(crate) const FIRST_BYTECODE: u8 = 2;
/// Longest dictionary expansion in code units.
pub(crate) const MAX_TOKEN_LENGTH: usize = 9;

/// Dictionary expansions for codes `2..=255`, in code order.
const TOKEN_TEXT: [&str; 254] = [
    " ", "\n", "\t", "e", "t", "a", "o", "i", "n", "s", "r", "l", "c", "u", "d",
    "p", "m", "h", "g", "f", "y", "b", "w", "v", "k", "x", ".", ",", ";", ":", "(",
    ")", "{", "}", "[", "]", "=", "\"", "'", "_", "$", "0", "1", "+", "  ", "th",
    "he", "in", "er", "an", "re", "on", "or", "en", "at", "es", "st", "ar", "te",
    "nt", "ti", "is", "it", "se", "le", "co", "de", "ro", "ra", "ed", "nd", "io",
    "ur", "li", "ne", "ng", "lo", "ta", "to", "ce", "of", "me", "al", "un", "el",
    "ct", "tr", "ac", "fu", "va", "if", "do", "e ", "t ", "s ", "r ", "n ", ", ",
    "; ", ". ", "= ", " =", "()", "((", "   ", "the", "ion", "tio", "ent", "ati",
    "for", "her", "ter", "ate", "ver", "res", "ons", "ect", "con", "ing", "men",
    "ret", "str", "ers", "pro", "rot", "not", "new", "var", "let", "get", "set",
    "thi", "his", "tur", "urn", "typ", "ype", "ran", "ind", "ow.", "doc", "ale",
    "nul", "ull", "tru", "rue", "els", "lse", "len", "gth", "und", "ndo", "val",
    "    ", "tion", "func", "unct", "ncti", "ctio", "this", "ment", "turn", "retu",
    "prot", "roto", "otot", "toty", "otyp", "type", "ypes", "docu", "ocum", "cume",
    "umen", "wind", "indo", "ndow", "leng", "engt", "ngth", "fals", "alse", "true",
    "null", "unde", "ndef", "defi", "efin", "fine", "ined", "var ", "new ", "for ",
    "     ", "funct", "uncti", "nctio", "ction", "retur", "eturn", "this.",
    "proto", "rotot", "ototy", "totyp", "otype", "docum", "ocume", "cumen",
    "ument", "windo", "indow", "lengt", "ength", "false", "undef", "ndefi",
    "defin", "      ", "functi", "unctio", "nction", "return", "protot", "rototy",
    "ototyp", "totype", "docume", "ocumen", "cument", "window", "length", "efined",
    "       ", "functio", "unction", "rototyp", "ototype", "documen", "ocument",
    "undefin", "ndefine", "defined", "        ", "function", "prototyp",
    "rototype", "document", "undefine", "function ", "prototype", "undefined",
    "document.",
];

/// Per-code expansion length in UTF-16 code units. The two escape codes
/// count as one unit here; a supplementary-plane Unicode escape contributes
/// a second unit that cursor arithmetic accounts for separately.
pub(crate) const TOKEN_LENGTHS: [u8; 256] = {
    let mut lengths = [1u8; 256];
    let mut i = 0;
    while i < TOKEN_TEXT.len() {
        lengths[i + FIRST_BYTECODE as usize] = TOKEN_TEXT[i].len() as u8;
        i += 1;
    }
    lengths
};

pub(crate) fn is_bytecode(code: u8) -> bool {
    code >= FIRST_BYTECODE
}

/// Scalar value carried by a Unicode escape's three payload bytes.
pub(crate) fn unicode_payload(payload: &[u8]) -> u32 {
    ((payload[0] as u32) << 16) | ((payload[1] as u32) << 8) | payload[2] as u32
}

/// ASCII bytes of a bytecode's expansion.
pub(crate) fn token_text(code: u8) -> &'static [u8] {
    debug_assert!(is_bytecode(code));
    TOKEN_TEXT[code as usize - FIRST_BYTECODE as usize].as_bytes()
}

/// Write up to `dest.len()` code units of `code`'s expansion and return the
/// count written. Partial writes keep the prefix, which is what mid-token
/// cursor decoding relies on.
pub(crate) fn decode_bytecode<T: Copy + From<u8>>(code: u8, dest: &mut [T]) -> usize {
    let text = token_text(code);
    let n = text.len().min(dest.len());
    for (slot, &byte) in dest[..n].iter_mut().zip(text) {
        *slot = T::from(byte);
    }
    n
}

// Encoder-side lookup: codes grouped by the first unit of their expansion,
// each bucket ordered longest expansion first, smallest code first within a
// length. The first matching entry is therefore the canonical greedy choice.
static ENCODER_BUCKETS: OnceLock<Vec<Vec<u8>>> = OnceLock::new();

fn encoder_buckets() -> &'static [Vec<u8>] {
    ENCODER_BUCKETS.get_or_init(|| {
        let mut buckets = vec![Vec::new(); 128];
        for (i, text) in TOKEN_TEXT.iter().enumerate() {
            let code = (i + FIRST_BYTECODE as usize) as u8;
            buckets[text.as_bytes()[0] as usize].push(code);
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|&code| (std::cmp::Reverse(TOKEN_LENGTHS[code as usize]), code));
        }
        buckets
    })
}

/// Longest dictionary expansion matching a prefix of `units`, as
/// `(code, length)`. Equal-length candidates resolve to the smallest code so
/// encoder output is canonical.
pub(crate) fn longest_match(units: &[u16]) -> Option<(u8, usize)> {
    let first = units[0];
    if first >= 0x80 {
        return None;
    }
    for &code in &encoder_buckets()[first as usize] {
        let text = token_text(code);
        if text.len() <= units.len() && text.iter().zip(units).all(|(&b, &u)| b as u16 == u) {
            return Some((code, text.len()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_shape() {
        assert_eq!(TOKEN_LENGTHS[ASCII_ESCAPE as usize], 1);
        assert_eq!(TOKEN_LENGTHS[UNICODE_ESCAPE as usize], 1);
        assert_eq!(TOKEN_LENGTHS[255], MAX_TOKEN_LENGTH as u8);
        for code in FIRST_BYTECODE..=255 {
            let text = token_text(code);
            assert_eq!(text.len(), TOKEN_LENGTHS[code as usize] as usize);
            assert!((1..=MAX_TOKEN_LENGTH).contains(&text.len()));
            assert!(text.iter().all(|&b| b < 0x80), "non-ascii expansion for {code}");
            if code > FIRST_BYTECODE {
                assert!(TOKEN_LENGTHS[code as usize] >= TOKEN_LENGTHS[code as usize - 1]);
            }
        }
    }

    #[test]
    fn expansions_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in FIRST_BYTECODE..=255 {
            assert!(seen.insert(token_text(code)), "duplicate expansion for {code}");
        }
    }

    #[test]
    fn partial_write_truncates() {
        let mut buf = [0u16; 4];
        let n = decode_bytecode(255, &mut buf);
        assert_eq!(n, 4);
        assert_eq!(buf, [b'd' as u16, b'o' as u16, b'c' as u16, b'u' as u16]);
    }

    #[test]
    fn longest_match_prefers_long_then_small_code() {
        let units: Vec<u16> = "function f".encode_utf16().collect();
        let (code, len) = longest_match(&units).unwrap();
        assert_eq!(len, 9);
        assert_eq!(token_text(code), b"function ");

        // A bare "f" only matches the single-character entry.
        let units: Vec<u16> = "f(".encode_utf16().collect();
        let (code, len) = longest_match(&units).unwrap();
        assert_eq!(len, 1);
        assert_eq!(token_text(code), b"f");
    }

    #[test]
    fn no_match_for_non_ascii() {
        assert!(longest_match(&[0x00E9]).is_none());
        assert!(longest_match(&[0xD83D, 0xDE00]).is_none());
    }
}
