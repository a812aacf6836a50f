//! The Publisher parser: stream orchestration and the contents pass.
//!
//! Parsing runs in a fixed order because later stages depend on indices
//! built by earlier ones: quill (text, styles, fonts, text colors), then the
//! contents trailer (chunk directory, palettes, document, pages, shapes),
//! then the optional delay stream (embedded images), then the drawing
//! stream (shape geometry and properties). The collector's `go` commits the
//! result.

use crate::binary::StreamCursor;
use crate::blocks::{self, BlockInfo, block_id, block_type};
use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::ole::{OleSource, stream_path};
use crate::shape::PageType;
use crate::style::Color;
use log::{debug, warn};

/// Categories of top-level regions in the contents stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChunkKind {
    Document,
    Page,
    Shape,
    AltShape,
    Group,
    Palette,
    Unknown,
}

impl ContentChunkKind {
    /// Chunk-type tags observed in Publisher trailer directories.
    pub fn from_raw(value: u32) -> Self {
        match value {
            0x10 => Self::Document,
            0x14 => Self::Page,
            0x18 => Self::Shape,
            0x19 => Self::AltShape,
            0x1A => Self::Group,
            0x1C => Self::Palette,
            _ => Self::Unknown,
        }
    }
}

/// One entry of the content-chunk table.
///
/// `seq_num` is the chunk's ordinal in the trailer directory and the key the
/// drawing stream uses to address it. `end` is backpatched to the next
/// chunk's offset once that chunk is read, and to the directory end for the
/// last chunk.
#[derive(Debug, Clone)]
pub struct ContentChunkReference {
    pub kind: ContentChunkKind,
    pub offset: usize,
    pub end: usize,
    pub seq_num: u32,
    pub parent_seq_num: u32,
}

/// Parser for the core streams of a Publisher compound document.
///
/// Construct with a compound-file source and a collector, then call
/// [`parse`](PubParser::parse) once; all indices live for a single run.
pub struct PubParser<'c, S: OleSource, C: Collector> {
    pub(crate) source: S,
    pub(crate) collector: &'c mut C,
    pub(crate) content_chunks: Vec<ContentChunkReference>,
    pub(crate) page_chunk_indices: Vec<usize>,
    pub(crate) shape_chunk_indices: Vec<usize>,
    pub(crate) palette_chunk_indices: Vec<usize>,
    pub(crate) unknown_chunk_indices: Vec<usize>,
    pub(crate) document_chunk_index: Option<usize>,
    pub(crate) alternate_shape_seq_nums: Vec<u32>,
    /// 1-based positions into the stored-image sequence, indexed by
    /// `pxId - 1`; `None` where a B-store entry carries no image data.
    pub(crate) delay_indices: Vec<Option<u32>>,
    pub(crate) last_added_image: u32,
}

impl<'c, S: OleSource, C: Collector> PubParser<'c, S, C> {
    pub fn new(source: S, collector: &'c mut C) -> Self {
        Self {
            source,
            collector,
            content_chunks: Vec::new(),
            page_chunk_indices: Vec::new(),
            shape_chunk_indices: Vec::new(),
            palette_chunk_indices: Vec::new(),
            unknown_chunk_indices: Vec::new(),
            document_chunk_index: None,
            alternate_shape_seq_nums: Vec::new(),
            delay_indices: Vec::new(),
            last_added_image: 0,
        }
    }

    /// Parse the document and commit it to the collector.
    ///
    /// Returns the collector's commit result; errors are the fatal
    /// conditions (not a compound file, missing required stream, no document
    /// chunk, truncated required records).
    pub fn parse(mut self) -> Result<bool> {
        if !self.source.is_compound() {
            return Err(Error::NotCompound);
        }
        let quill = self
            .source
            .sub_stream(stream_path::QUILL)
            .ok_or_else(|| Error::StreamNotFound(stream_path::QUILL.to_string()))?;
        self.parse_quill(&quill)?;

        let contents = self
            .source
            .sub_stream(stream_path::CONTENTS)
            .ok_or_else(|| Error::StreamNotFound(stream_path::CONTENTS.to_string()))?;
        self.parse_contents(&contents)?;

        if let Some(delay) = self.source.sub_stream(stream_path::ESCHER_DELAY) {
            self.parse_escher_delay(&delay)?;
        }

        let escher = self
            .source
            .sub_stream(stream_path::ESCHER)
            .ok_or_else(|| Error::StreamNotFound(stream_path::ESCHER.to_string()))?;
        self.parse_escher(&escher)?;

        Ok(self.collector.go())
    }

    pub(crate) fn parse_contents(&mut self, data: &[u8]) -> Result<()> {
        let mut cursor = StreamCursor::new(data);
        cursor.seek(0x1A);
        let trailer_offset = cursor.read_u32()? as usize;
        cursor.seek(trailer_offset);
        let trailer_length = cursor.read_u32()? as usize;
        debug!("contents trailer at 0x{trailer_offset:x}, length 0x{trailer_length:x}");

        for _ in 0..3 {
            let part = blocks::parse_block(&mut cursor, false)?;
            if part.block_type == block_type::TRAILER_DIRECTORY {
                self.parse_trailer_directory(&mut cursor, &part)?;
                break;
            }
        }
        cursor.seek(trailer_offset + trailer_length);
        Ok(())
    }

    fn parse_trailer_directory(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        directory: &BlockInfo,
    ) -> Result<()> {
        let directory_end = directory.data_end();
        let mut next_seq_num: u32 = 0;
        while cursor.still_reading(directory_end) {
            let block = blocks::parse_block(cursor, false)?;
            let seq_num = next_seq_num;
            next_seq_num += 1;
            if block.block_type == block_type::GENERAL_CONTAINER {
                if self.parse_content_chunk_reference(cursor, &block, seq_num)? {
                    let count = self.content_chunks.len();
                    if count > 1 {
                        let next_offset = self.content_chunks[count - 1].offset;
                        self.content_chunks[count - 2].end = next_offset;
                    }
                }
            } else {
                blocks::skip_block(cursor, &block);
            }
        }
        if let Some(last) = self.content_chunks.last_mut() {
            last.end = directory_end;
        }
        if !self.unknown_chunk_indices.is_empty() {
            debug!(
                "{} content chunks of unknown kind",
                self.unknown_chunk_indices.len()
            );
        }

        let document_index = self
            .document_chunk_index
            .ok_or(Error::MissingDocumentChunk)?;

        for index in self.palette_chunk_indices.clone() {
            let chunk = self.content_chunks[index].clone();
            cursor.seek(chunk.offset);
            self.parse_palette_chunk(cursor, &chunk)?;
        }

        let document_chunk = self.content_chunks[document_index].clone();
        cursor.seek(document_chunk.offset);
        self.parse_document_chunk(cursor, &document_chunk)?;

        for index in self.page_chunk_indices.clone() {
            let chunk = self.content_chunks[index].clone();
            cursor.seek(chunk.offset);
            self.parse_page_chunk(cursor, &chunk)?;
        }
        Ok(())
    }

    /// Decode one directory entry into a chunk reference and index it.
    ///
    /// The cursor is at the entry's sub-block list. Returns whether a
    /// reference was appended (entries lacking a type or offset are dropped).
    fn parse_content_chunk_reference(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        block: &BlockInfo,
        seq_num: u32,
    ) -> Result<bool> {
        let mut kind = None;
        let mut offset = None;
        let mut parent_seq_num = None;
        while cursor.still_reading(block.data_end()) {
            let sub = blocks::parse_block(cursor, true)?;
            match sub.id {
                block_id::CHUNK_TYPE => kind = Some(ContentChunkKind::from_raw(sub.data)),
                block_id::CHUNK_OFFSET => offset = Some(sub.data as usize),
                block_id::CHUNK_PARENT_SEQNUM => parent_seq_num = Some(sub.data),
                _ => {},
            }
        }
        let (Some(kind), Some(offset)) = (kind, offset) else {
            return Ok(false);
        };

        debug!("chunk {kind:?}: offset 0x{offset:x}, seqnum 0x{seq_num:x}");
        let index = self.content_chunks.len();
        self.content_chunks.push(ContentChunkReference {
            kind,
            offset,
            end: 0,
            seq_num,
            parent_seq_num: parent_seq_num.unwrap_or(0),
        });
        match kind {
            ContentChunkKind::Page => self.page_chunk_indices.push(index),
            ContentChunkKind::Document => self.document_chunk_index = Some(index),
            ContentChunkKind::Shape | ContentChunkKind::AltShape | ContentChunkKind::Group => {
                self.shape_chunk_indices.push(index);
                if kind == ContentChunkKind::AltShape {
                    self.alternate_shape_seq_nums.push(seq_num);
                }
            },
            ContentChunkKind::Palette => self.palette_chunk_indices.push(index),
            ContentChunkKind::Unknown => self.unknown_chunk_indices.push(index),
        }
        Ok(true)
    }

    fn parse_document_chunk(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &ContentChunkReference,
    ) -> Result<()> {
        debug!("parse_document_chunk: offset 0x{:x}, end 0x{:x}", chunk.offset, chunk.end);
        let begin = cursor.tell();
        let length = cursor.read_u32()? as usize;
        while cursor.still_reading(begin + length) {
            let info = blocks::parse_block(cursor, false)?;
            if info.id == block_id::DOCUMENT_SIZE {
                while cursor.still_reading(info.data_end()) {
                    let sub = blocks::parse_block(cursor, true)?;
                    if sub.id == block_id::DOCUMENT_WIDTH {
                        self.collector.set_width_in_emu(sub.data);
                    } else if sub.id == block_id::DOCUMENT_HEIGHT {
                        self.collector.set_height_in_emu(sub.data);
                    }
                }
            } else {
                blocks::skip_block(cursor, &info);
            }
        }
        Ok(())
    }

    fn parse_page_chunk(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &ContentChunkReference,
    ) -> Result<()> {
        debug!("parse_page_chunk: seqnum 0x{:x}", chunk.seq_num);
        let length = cursor.read_u32()? as usize;
        let page_type = PageType::from_seq_num(chunk.seq_num);
        if matches!(page_type, PageType::Normal | PageType::Master) {
            self.collector.add_page(chunk.seq_num);
            if page_type == PageType::Master {
                self.collector.designate_master_page(chunk.seq_num);
            }
        }
        while cursor.still_reading(chunk.offset + length) {
            let info = blocks::parse_block(cursor, false)?;
            if info.id == block_id::PAGE_BG_SHAPE {
                self.collector.set_page_bg_shape(chunk.seq_num, info.data);
            } else if info.id == block_id::PAGE_SHAPES {
                self.parse_shapes(cursor, &info, chunk.seq_num)?;
            } else {
                blocks::skip_block(cursor, &info);
            }
        }
        Ok(())
    }

    /// Walk a page's shape-list block, resolving each referenced shape chunk
    /// through the shape table and parsing its body.
    fn parse_shapes(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        info: &BlockInfo,
        page_seq_num: u32,
    ) -> Result<()> {
        while cursor.still_reading(info.data_end()) {
            let sub = blocks::parse_block(cursor, true)?;
            if sub.block_type != block_type::SHAPE_SEQNUM {
                continue;
            }
            let found = self.shape_chunk_indices.iter().find_map(|&index| {
                let chunk = &self.content_chunks[index];
                (chunk.seq_num == sub.data).then(|| chunk.clone())
            });
            let Some(chunk) = found else {
                warn!("shape of seqnum 0x{:x} not found", sub.data);
                continue;
            };
            let resume = cursor.tell();
            cursor.seek(chunk.offset);
            let parse_without_dimensions = self.alternate_shape_seq_nums.contains(&sub.data);
            self.parse_shape(
                cursor,
                sub.data,
                page_seq_num,
                parse_without_dimensions,
                chunk.kind == ContentChunkKind::Group,
            )?;
            cursor.seek(resume);
        }
        Ok(())
    }

    fn parse_shape(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        seq_num: u32,
        page_seq_num: u32,
        parse_without_dimensions: bool,
        is_group: bool,
    ) -> Result<()> {
        let begin = cursor.tell();
        let length = cursor.read_u32()? as usize;
        let mut width = 0;
        let mut height = 0;
        let mut text_id = None;
        while cursor.still_reading(begin + length) {
            let info = blocks::parse_block(cursor, true)?;
            match info.id {
                block_id::SHAPE_WIDTH => width = info.data,
                block_id::SHAPE_HEIGHT => height = info.data,
                block_id::SHAPE_TEXT_ID => text_id = Some(info.data),
                _ => {},
            }
        }
        if is_group || (width > 0 && height > 0) || parse_without_dimensions {
            if !is_group {
                if let Some(text_id) = text_id {
                    self.collector.add_text_shape(text_id, seq_num, page_seq_num);
                }
                self.collector.add_shape(seq_num);
            }
            self.collector.set_shape_page(seq_num, page_seq_num);
        } else {
            debug!(
                "shape 0x{seq_num:x} without both dimensions ignored (width 0x{width:x}, height 0x{height:x})"
            );
        }
        Ok(())
    }

    fn parse_palette_chunk(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &ContentChunkReference,
    ) -> Result<()> {
        let length = cursor.read_u32()? as usize;
        while cursor.still_reading(chunk.offset + length) {
            let info = blocks::parse_block(cursor, false)?;
            if info.block_type == 0xA0 {
                while cursor.still_reading(info.data_end()) {
                    let sub = blocks::parse_block(cursor, false)?;
                    if sub.block_type == block_type::GENERAL_CONTAINER {
                        self.parse_palette_entry(cursor, &sub)?;
                    }
                    blocks::skip_block(cursor, &sub);
                }
            }
            blocks::skip_block(cursor, &info);
        }
        Ok(())
    }

    fn parse_palette_entry(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        entry: &BlockInfo,
    ) -> Result<()> {
        while cursor.still_reading(entry.data_end()) {
            let sub = blocks::parse_block(cursor, true)?;
            if sub.id == block_id::COLOR_VALUE_ID {
                self.collector.add_palette_color(Color::new(
                    (sub.data & 0xFF) as u8,
                    ((sub.data >> 8) & 0xFF) as u8,
                    ((sub.data >> 16) & 0xFF) as u8,
                ));
            }
        }
        Ok(())
    }
}
