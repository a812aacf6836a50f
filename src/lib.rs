//! Longan - A Rust library for parsing Microsoft Publisher (.pub) documents
//!
//! Publisher documents are OLE2 compound files whose streams together
//! describe pages, shapes, text, images, colors and styling. This crate
//! implements the core multi-stream parser: it walks the `Quill` text
//! stream, the `Contents` trailer directory, the `Escher` drawing stream and
//! the optional `EscherDelayStm` image stream, resolves cross-stream
//! references by sequence number, and emits parsed facts into a
//! caller-supplied [`Collector`].
//!
//! The compound-file container itself, image decoding and final output are
//! out of scope: the container is abstracted as [`OleSource`] and the
//! document model as [`Collector`].
//!
//! # Example
//!
//! ```no_run
//! use longan::{Collector, OleSource, PubParser};
//!
//! # fn run(source: impl OleSource, collector: &mut impl Collector) -> longan::Result<bool> {
//! let parser = PubParser::new(source, collector);
//! let committed = parser.parse()?;
//! # Ok(committed)
//! # }
//! ```

/// Little-endian read helpers and the stream cursor.
pub mod binary;

/// The block grammar shared by the contents and quill streams.
pub mod blocks;

/// The collector contract the parser emits facts into.
pub mod collector;

/// Error types.
pub mod error;

/// OfficeArt (Escher) record primitives and the drawing sub-parsers.
pub mod escher;

/// Shape fill variants.
pub mod fill;

/// The compound-file container collaborator.
pub mod ole;

/// The parser itself: orchestration and the contents pass.
pub mod parser;

/// Quill text stream parsing.
mod quill;

/// Shape-level types.
pub mod shape;

/// Color and text-style types.
pub mod style;

pub use collector::Collector;
pub use error::{Error, Result};
pub use fill::{Fill, GradientFill, ImgFill, PatternFill, SolidFill};
pub use ole::{OleSource, stream_path};
pub use parser::{ContentChunkKind, ContentChunkReference, PubParser};
pub use shape::{BorderPosition, Coordinate, ImgType, Line, PageType, ShapeType};
pub use style::{
    Alignment, CharacterStyle, Color, ColorReference, ParagraphStyle, TextParagraph, TextSpan,
};
