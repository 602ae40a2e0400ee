use std::sync::Arc;
use vellum::{CompressedSource, SourceString};

fn compress_str(s: &str) -> CompressedSource {
    let source = CompressedSource::compress(Arc::new(SourceString::from_str(s)));
    source.drop_cached_string();
    source
}

#[test]
fn all_ascii_source() {
    let source = compress_str("function f() { return 42; }\n");
    assert!(source.is_ascii(0, source.char_length()));
    assert!(source.is_ascii(5, 10));
    assert!(source.is_ascii(source.char_length(), 0));
}

#[test]
fn unicode_poisons_only_touched_ranges() {
    //               0123      4567
    let source = compress_str("abcd\u{00E9}efg");
    assert_eq!(source.char_length(), 8);
    assert!(source.is_ascii(0, 4));
    assert!(!source.is_ascii(0, 5));
    assert!(!source.is_ascii(4, 1));
    assert!(!source.is_ascii(3, 2));
    assert!(source.is_ascii(5, 3));
}

#[test]
fn narrow_decode_only_on_ascii_ranges() {
    let source = compress_str("abcd\u{00E9}efg");
    // The ascii prefix decodes narrow, the full string decodes wide.
    assert!(matches!(source.decompress_range(0, 4), SourceString::Narrow(_)));
    assert!(matches!(source.decompress(), SourceString::Wide(_)));
}

#[test]
fn supplementary_escape_counts_two_units() {
    let source = compress_str("ab\u{1F600}cd");
    assert!(source.is_ascii(0, 2));
    assert!(!source.is_ascii(2, 1));
    assert!(!source.is_ascii(3, 1));
    assert!(source.is_ascii(4, 2));
}

#[test]
fn dictionary_tokens_never_poison() {
    // Dictionary expansions are pure ASCII by construction, so a text that
    // compresses entirely to bytecodes is ascii over every range.
    let source = compress_str("function prototype undefined document.length");
    for start in 0..source.char_length() {
        assert!(source.is_ascii(start, source.char_length() - start));
    }
}
