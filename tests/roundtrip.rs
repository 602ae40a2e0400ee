use std::sync::Arc;
use vellum::{CompressedSource, SourceString};

fn compress_str(s: &str) -> CompressedSource {
    CompressedSource::compress(Arc::new(SourceString::from_str(s)))
}

#[test]
fn empty_string() {
    let source = compress_str("");
    assert_eq!(source.char_length(), 0);
    assert_eq!(source.compressed_len(), 0);
    assert!(source.is_ascii(0, 0));
    source.drop_cached_string();
    assert_eq!(source.decompress(), SourceString::from_str(""));
}

#[test]
fn pure_ascii_below_block_size() {
    let source = compress_str("abc");
    assert_eq!(source.char_length(), 3);
    assert_eq!(source.stats().index_bytes, 0);
    assert!(source.is_ascii(0, 3));
    source.drop_cached_string();
    assert_eq!(source.decompress_range(1, 1), SourceString::from_str("b"));
    assert_eq!(source.decompress(), SourceString::from_str("abc"));
}

#[test]
fn javascript_snippet_roundtrips() {
    let text = "function add(a, b) {\n  return a + b;\n}\nwindow.document.length;\n";
    let source = compress_str(text);
    // Cached fast path first, then the real decoder.
    assert_eq!(source.decompress(), SourceString::from_str(text));
    source.drop_cached_string();
    assert_eq!(source.decompress(), SourceString::from_str(text));
    assert!(source.stats().compressed_bytes < text.len());
}

#[test]
fn non_ascii_roundtrips() {
    let text = "var café = \"émoji: \u{1F600}\";\nlet Σ = 1;\n";
    let expected = SourceString::from_str(text);
    let source = compress_str(text);
    source.drop_cached_string();
    assert_eq!(source.char_length(), expected.len());
    assert_eq!(source.decompress(), expected);
    assert!(!source.is_ascii(0, source.char_length()));
}

#[test]
fn supplementary_plane_positions() {
    // "A" + U+1F600 + "B": the emoji occupies two code units.
    let source = compress_str("A\u{1F600}B");
    source.drop_cached_string();
    assert_eq!(source.char_length(), 4);

    let pair = source.decompress_range(1, 2);
    assert_eq!(pair, SourceString::Wide(vec![0xD83D, 0xDE00].into()));

    // A one-unit range ending between the halves keeps the lead alone.
    let lead = source.decompress_range(1, 1);
    assert_eq!(lead, SourceString::Wide(vec![0xD83D].into()));
    let trail = source.decompress_range(2, 1);
    assert_eq!(trail, SourceString::Wide(vec![0xDE00].into()));

    assert_eq!(source.code_unit_at(0), b'A' as u16);
    assert_eq!(source.code_unit_at(2), 0xDE00);
    assert_eq!(source.code_unit_at(3), b'B' as u16);
}

#[test]
fn lone_surrogates_roundtrip() {
    // A wide source may hold unpaired surrogates; the codec must not
    // normalize them away.
    let units = vec![b'x' as u16, 0xD83D, b'y' as u16, 0xDE00, b'z' as u16];
    let text = SourceString::Wide(units.into());
    let source = CompressedSource::compress(Arc::new(text.clone()));
    source.drop_cached_string();
    assert_eq!(source.decompress(), text);
    assert!(!source.is_ascii(0, 5));
    assert_eq!(source.code_unit_at(1), 0xD83D);
}

#[test]
fn long_ascii_source() {
    let text = "var x = 1;\n".repeat(400); // 4400 units, spans four blocks
    let source = compress_str(&text);
    source.drop_cached_string();
    assert_eq!(source.char_length(), 4400);
    assert_eq!(source.stats().index_bytes, 4 * 4);
    assert_eq!(source.decompress(), SourceString::from_str(&text));
    assert_eq!(
        source.decompress_range(2500, 100),
        SourceString::from_str(&text[2500..2600])
    );
}

#[test]
fn every_suffix_decodes_correctly() {
    let text = "function f() { return \"\u{1F600}\"; }\n".repeat(8);
    let expected = SourceString::from_str(&text);
    let source = compress_str(&text);
    source.drop_cached_string();
    for start in 0..expected.len() {
        let got = source.decompress_range(start, expected.len() - start);
        assert_eq!(got, expected.sub_string(start, expected.len()), "start {start}");
    }
}
