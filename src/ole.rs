//! Compound-file container collaborator.
//!
//! The OLE2 structured-storage layer itself is outside this crate; the parser
//! only needs a source that answers whether the input is a compound document
//! and hands out named sub-streams as fully buffered bytes.

use bytes::Bytes;

/// Sub-stream paths of a Publisher compound document.
pub mod stream_path {
    /// Text, styles, fonts and text colors.
    pub const QUILL: &str = "Quill/QuillSub/CONTENTS";
    /// Main contents stream (trailer directory, chunks).
    pub const CONTENTS: &str = "Contents";
    /// Drawing-object stream.
    pub const ESCHER: &str = "Escher/EscherStm";
    /// Embedded image stream (optional).
    pub const ESCHER_DELAY: &str = "Escher/EscherDelayStm";
}

/// A compound-file source exposing named sub-streams.
///
/// Implementations typically wrap an OLE2 reader; tests use an in-memory map.
/// Returning `None` from [`sub_stream`](OleSource::sub_stream) means the
/// stream does not exist, which is fatal for every stream except
/// [`stream_path::ESCHER_DELAY`].
pub trait OleSource {
    /// Whether the input is an OLE compound document at all.
    fn is_compound(&self) -> bool;

    /// Fetch a named sub-stream as a contiguous buffer.
    fn sub_stream(&mut self, path: &str) -> Option<Bytes>;
}
