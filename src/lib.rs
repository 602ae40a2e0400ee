//! Compressed source-text codec with random-access substring decode.
//!
//! Source text is held as a byte stream of dictionary tokens and escape
//! sequences, a fraction of the size of the flat text for typical
//! JavaScript, while still answering substring, equality, hash and
//! line-number queries without decompressing the whole thing. A sparse
//! index maps every 1024th character position to its byte offset, so a
//! random access walks at most one block of tokens.
//!
//! ```
//! use std::sync::Arc;
//! use vellum::{CompressedSource, SourceString};
//!
//! let text = SourceString::from_str("function add(a, b) { return a + b; }\n");
//! let source = CompressedSource::compress(Arc::new(text));
//! source.drop_cached_string();
//!
//! assert_eq!(source.decompress_range(9, 3), SourceString::from_str("add"));
//! assert!(source.is_ascii(0, source.char_length()));
//! ```
//!
//! The companion [`Classifier`] is the buffered error log a speculative
//! parser uses to track which syntactic productions a stretch of text can
//! still be.

mod classifier;
mod cursor;
mod decode;
mod encode;
mod error;
mod hash;
mod source;
mod tables;
mod text;
mod utf16;

pub use classifier::{
    Classifier, ClassifierScope, Location, ParseError, ParseMessage, Productions,
};
pub use cursor::{advance_cursor, get_cursor, Cursor, CHARS_PER_INDEX_ENTRY};
pub use error::VellumError;
pub use hash::SourceHasher;
pub use source::{CompressedSource, CompressionStats};
pub use text::SourceString;
