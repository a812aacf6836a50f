//! The Quill text stream: text blocks, character and paragraph styles,
//! fonts and text colors.
//!
//! The stream opens with a linked list of chunk references. Most chunks are
//! decoded as they are met; the `TEXT` chunk is deferred until the style,
//! length and id tables it depends on have all been seen, then split into
//! blocks and paragraphs in a single pass.

use crate::binary::StreamCursor;
use crate::blocks::{self, BlockInfo, block_id};
use crate::collector::Collector;
use crate::error::Result;
use crate::ole::OleSource;
use crate::parser::PubParser;
use crate::style::{
    Alignment, CharacterStyle, ColorReference, EMUS_IN_INCH, POINTS_IN_INCH, ParagraphStyle,
    TextParagraph, TextSpan,
};
use log::{debug, warn};
use std::collections::HashSet;

/// Offset of the first chunk-reference list header.
const CHUNK_LIST_HEAD: usize = 0x18;

/// Terminator for the chunk-reference list chain.
const CHUNK_LIST_END: u32 = 0xFFFF_FFFF;

/// One entry of the quill chunk-reference list. The id and secondary name
/// are carried for diagnostics only.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct QuillChunkReference {
    name: [u8; 4],
    id: u16,
    name2: [u8; 4],
    offset: usize,
    length: usize,
}

/// A character-style run: the style applies up to `span_end`.
#[derive(Debug, Clone)]
pub(crate) struct CharStyleRun {
    pub span_end: u32,
    pub style: CharacterStyle,
}

/// A paragraph-style run: the style applies up to `span_end`.
#[derive(Debug, Clone)]
pub(crate) struct ParaStyleRun {
    pub span_end: u32,
    pub style: ParagraphStyle,
}

fn parse_quill_chunk_reference(cursor: &mut StreamCursor<'_>) -> Result<QuillChunkReference> {
    cursor.read_u16()?;
    let mut name = [0u8; 4];
    name.copy_from_slice(cursor.read_bytes(4)?);
    let id = cursor.read_u16()?;
    cursor.read_u32()?; // normally 0x01000000, meaning unknown
    let mut name2 = [0u8; 4];
    name2.copy_from_slice(cursor.read_bytes(4)?);
    let offset = cursor.read_u32()? as usize;
    let length = cursor.read_u32()? as usize;
    Ok(QuillChunkReference {
        name,
        id,
        name2,
        offset,
        length,
    })
}

impl<S: OleSource, C: Collector> PubParser<'_, S, C> {
    pub(crate) fn parse_quill(&mut self, data: &[u8]) -> Result<()> {
        let mut cursor = StreamCursor::new(data);
        let mut references = Vec::new();
        let mut list_offset = CHUNK_LIST_HEAD as u32;
        let mut visited_lists = HashSet::new();
        while list_offset != CHUNK_LIST_END {
            if !visited_lists.insert(list_offset) {
                warn!("quill chunk list loops at 0x{list_offset:x}");
                break;
            }
            cursor.seek(list_offset as usize + 2);
            let num_chunks = cursor.read_u16()?;
            list_offset = cursor.read_u32()?;
            for _ in 0..num_chunks {
                references.push(parse_quill_chunk_reference(&mut cursor)?);
            }
        }
        debug!("found {} quill chunks", references.len());

        let mut text_reference: Option<usize> = None;
        let mut text_lengths: Vec<u32> = Vec::new();
        let mut text_ids: Vec<u32> = Vec::new();
        let mut spans: Vec<CharStyleRun> = Vec::new();
        let mut paragraphs: Vec<ParaStyleRun> = Vec::new();
        let mut parsed_strs = false;
        let mut parsed_syid = false;
        let mut parsed_fdpc = false;
        let mut parsed_fdpp = false;
        let mut parsed_stsh = false;
        let mut parsed_font = false;
        let mut stsh_count = 0u32;

        for index in 0..references.len() {
            let reference = references[index].clone();
            match &reference.name {
                b"TEXT" => text_reference = Some(index),
                b"STRS" => {
                    cursor.seek(reference.offset);
                    let num_lengths = cursor.read_u32()?;
                    let start = cursor.read_u32()? as usize;
                    cursor.seek(4 + reference.offset + start);
                    for _ in 0..num_lengths {
                        text_lengths.push(cursor.read_u32()?);
                    }
                    parsed_strs = true;
                },
                b"SYID" => {
                    cursor.seek(reference.offset);
                    cursor.read_u32()?;
                    let num_ids = cursor.read_u32()?;
                    for _ in 0..num_ids {
                        text_ids.push(cursor.read_u32()?);
                    }
                    parsed_syid = true;
                },
                b"PL  " => {
                    cursor.seek(reference.offset);
                    self.parse_text_colors(&mut cursor)?;
                },
                b"FDPC" => {
                    cursor.seek(reference.offset);
                    spans.extend(self.parse_character_style_runs(&mut cursor, &reference)?);
                    parsed_fdpc = true;
                },
                b"FDPP" => {
                    cursor.seek(reference.offset);
                    paragraphs.extend(self.parse_paragraph_style_runs(&mut cursor, &reference)?);
                    parsed_fdpp = true;
                },
                b"STSH" => {
                    stsh_count += 1;
                    // Only the second STSH carries the defaults consumed by
                    // the style runs; the first one's role is unknown.
                    if stsh_count == 2 {
                        cursor.seek(reference.offset);
                        self.parse_default_styles(&mut cursor, &reference)?;
                        parsed_stsh = true;
                    }
                },
                b"FONT" => {
                    cursor.seek(reference.offset);
                    self.parse_fonts(&mut cursor)?;
                    parsed_font = true;
                },
                _ => {},
            }
            if parsed_strs
                && parsed_syid
                && parsed_fdpc
                && parsed_fdpp
                && parsed_stsh
                && parsed_font
            {
                if let Some(text_index) = text_reference.take() {
                    self.parse_text_blocks(
                        &mut cursor,
                        &references[text_index],
                        &text_lengths,
                        &text_ids,
                        &spans,
                        &paragraphs,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Split the TEXT chunk into blocks using the STRS lengths, cutting
    /// spans at FDPC boundaries and paragraphs at FDPP boundaries.
    fn parse_text_blocks(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        text_reference: &QuillChunkReference,
        text_lengths: &[u32],
        text_ids: &[u32],
        spans: &[CharStyleRun],
        paragraphs: &[ParaStyleRun],
    ) -> Result<()> {
        // Style-run boundaries are stream offsets; rebase them against the
        // TEXT chunk. A walk past the last run never cuts again.
        let span_end = |index: usize| {
            spans
                .get(index)
                .map(|run| run.span_end.saturating_sub(text_reference.offset as u32))
                .unwrap_or(u32::MAX)
        };
        let span_style = |index: usize| {
            spans
                .get(index)
                .map(|run| run.style.clone())
                .unwrap_or_default()
        };
        let para_end = |index: usize| {
            paragraphs
                .get(index)
                .map(|run| run.span_end.saturating_sub(text_reference.offset as u32))
                .unwrap_or(u32::MAX)
        };
        let para_style = |index: usize| {
            paragraphs
                .get(index)
                .map(|run| run.style.clone())
                .unwrap_or_default()
        };

        cursor.seek(text_reference.offset);
        let mut bytes_read: u32 = 0;
        let mut span_index = 0usize;
        let mut para_index = 0usize;
        for (length, id) in text_lengths.iter().zip(text_ids) {
            debug!("parsing a text block of {length} code units");
            let mut read_paragraphs: Vec<TextParagraph> = Vec::new();
            let mut read_spans: Vec<TextSpan> = Vec::new();
            let mut text: Vec<u8> = Vec::new();
            for _ in 0..*length {
                text.push(cursor.read_u8()?);
                text.push(cursor.read_u8()?);
                bytes_read += 2;
                if bytes_read >= span_end(span_index) {
                    if !text.is_empty() {
                        read_spans.push(TextSpan {
                            chars: std::mem::take(&mut text),
                            style: span_style(span_index),
                        });
                    }
                    span_index += 1;
                    text.clear();
                }
                if bytes_read >= para_end(para_index) {
                    if !text.is_empty() {
                        read_spans.push(TextSpan {
                            chars: std::mem::take(&mut text),
                            style: span_style(span_index),
                        });
                    }
                    text.clear();
                    if !read_spans.is_empty() {
                        read_paragraphs.push(TextParagraph {
                            spans: std::mem::take(&mut read_spans),
                            style: para_style(para_index),
                        });
                    }
                    para_index += 1;
                }
            }
            if !read_spans.is_empty() {
                if !text.is_empty() {
                    read_spans.push(TextSpan {
                        chars: std::mem::take(&mut text),
                        style: span_style(span_index),
                    });
                }
                read_paragraphs.push(TextParagraph {
                    spans: read_spans,
                    style: para_style(para_index),
                });
            }
            self.collector.add_text_string(read_paragraphs, *id);
        }
        Ok(())
    }

    /// Text colors from the `PL  ` chunk, appended in file order.
    fn parse_text_colors(&mut self, cursor: &mut StreamCursor<'_>) -> Result<()> {
        let num_entries = cursor.read_u32()?;
        let resume = cursor.tell();
        cursor.seek(resume + 8);
        for _ in 0..num_entries {
            let blocks_offset = cursor.tell();
            let length = cursor.read_u32()? as usize;
            while cursor.still_reading(blocks_offset + length) {
                let info = blocks::parse_block(cursor, true)?;
                if info.id == block_id::COLOR_VALUE_ID {
                    self.collector.add_text_color(ColorReference::new(info.data));
                }
            }
        }
        Ok(())
    }

    /// Character-style run table from an `FDPC` chunk.
    fn parse_character_style_runs(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &QuillChunkReference,
    ) -> Result<Vec<CharStyleRun>> {
        let (text_offsets, chunk_offsets) = parse_run_table_header(cursor)?;
        let mut runs = Vec::with_capacity(text_offsets.len());
        for (text_offset, chunk_offset) in text_offsets.iter().zip(&chunk_offsets) {
            cursor.seek(chunk.offset + *chunk_offset as usize);
            let style = self.parse_character_style(cursor, false)?;
            runs.push(CharStyleRun {
                span_end: *text_offset,
                style,
            });
        }
        Ok(runs)
    }

    /// Paragraph-style run table from an `FDPP` chunk.
    fn parse_paragraph_style_runs(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &QuillChunkReference,
    ) -> Result<Vec<ParaStyleRun>> {
        let (text_offsets, chunk_offsets) = parse_run_table_header(cursor)?;
        let mut runs = Vec::with_capacity(text_offsets.len());
        for (text_offset, chunk_offset) in text_offsets.iter().zip(&chunk_offsets) {
            cursor.seek(chunk.offset + *chunk_offset as usize);
            let style = self.parse_paragraph_style(cursor)?;
            runs.push(ParaStyleRun {
                span_end: *text_offset,
                style,
            });
        }
        Ok(runs)
    }

    /// Default styles from the second `STSH` chunk: even entries are
    /// character-style defaults, odd entries paragraph-style defaults.
    fn parse_default_styles(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        chunk: &QuillChunkReference,
    ) -> Result<()> {
        cursor.read_u32()?;
        let num_entries = cursor.read_u32()?;
        let resume = cursor.tell();
        cursor.seek(resume + 12);
        let mut offsets = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            offsets.push(cursor.read_u32()? as usize);
        }
        for (index, offset) in offsets.iter().enumerate() {
            cursor.seek(chunk.offset + 20 + offset);
            cursor.read_u16()?;
            if index % 2 == 0 {
                let style = self.parse_character_style(cursor, true)?;
                self.collector.add_default_character_style(style);
            } else {
                let style = self.parse_paragraph_style(cursor)?;
                self.collector.add_default_paragraph_style(style);
            }
        }
        Ok(())
    }

    /// Font-name table from the `FONT` chunk. Names are UTF-16LE with a
    /// 16-bit length in code units.
    fn parse_fonts(&mut self, cursor: &mut StreamCursor<'_>) -> Result<()> {
        cursor.read_u32()?;
        let num_elements = cursor.read_u32()?;
        let resume = cursor.tell();
        cursor.seek(resume + 12 + 4 * num_elements as usize);
        for _ in 0..num_elements {
            let name_length = cursor.read_u16()? as usize;
            let name = cursor.read_bytes(name_length * 2)?.to_vec();
            self.collector.add_font(name);
            cursor.read_u32()?;
        }
        Ok(())
    }

    /// Decode one block-structured character-style entry.
    ///
    /// Bold and italic each appear as two ids that must both be present;
    /// the text size appears twice and the two are kept equal. Font indices
    /// are ignored inside STSH entries.
    fn parse_character_style(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        in_stsh: bool,
    ) -> Result<CharacterStyle> {
        let offset = cursor.tell();
        let length = cursor.read_u32()? as usize;
        let mut seen_underline = false;
        let mut seen_bold1 = false;
        let mut seen_bold2 = false;
        let mut seen_italic1 = false;
        let mut seen_italic2 = false;
        let mut text_size1: Option<u32> = None;
        let mut text_size2: Option<u32> = None;
        let mut color_index: Option<u32> = None;
        let mut font_index = 0u32;
        while cursor.still_reading(offset + length) {
            let info = blocks::parse_block(cursor, true)?;
            match info.id {
                block_id::BOLD_1_ID => seen_bold1 = true,
                block_id::BOLD_2_ID => seen_bold2 = true,
                block_id::ITALIC_1_ID => seen_italic1 = true,
                block_id::ITALIC_2_ID => seen_italic2 = true,
                block_id::UNDERLINE_ID => seen_underline = true,
                block_id::TEXT_SIZE_1_ID => text_size1 = Some(info.data),
                block_id::TEXT_SIZE_2_ID => text_size2 = Some(info.data),
                block_id::BARE_COLOR_INDEX_ID => color_index = Some(info.data),
                block_id::COLOR_INDEX_CONTAINER_ID => {
                    color_index = self.parse_color_index(cursor, &info)?;
                },
                block_id::FONT_INDEX_CONTAINER_ID => {
                    if !in_stsh {
                        font_index = self.parse_font_index(cursor, &info)?;
                    }
                },
                _ => {},
            }
        }
        if let (Some(size1), Some(size2)) = (text_size1, text_size2) {
            if size1 != size2 {
                debug!("character style text sizes disagree: {size1} vs {size2}");
            }
        }
        // The two size fields are kept equal; no document with differing
        // values has been seen.
        let size_in_pt = text_size1
            .map(|size| f64::from(size) * f64::from(POINTS_IN_INCH) / f64::from(EMUS_IN_INCH));
        Ok(CharacterStyle {
            underline: seen_underline,
            italic: seen_italic1 && seen_italic2,
            bold: seen_bold1 && seen_bold2,
            size_in_pt,
            color_index,
            font_index,
        })
    }

    /// Decode one block-structured paragraph-style entry.
    fn parse_paragraph_style(&mut self, cursor: &mut StreamCursor<'_>) -> Result<ParagraphStyle> {
        let offset = cursor.tell();
        let length = cursor.read_u32()? as usize;
        let mut style = ParagraphStyle::default();
        while cursor.still_reading(offset + length) {
            let info = blocks::parse_block(cursor, true)?;
            match info.id {
                block_id::PARAGRAPH_ALIGNMENT => {
                    style.alignment = Alignment::from_raw((info.data & 0xFF) as u8);
                },
                block_id::PARAGRAPH_DEFAULT_CHAR_STYLE => {
                    style.default_char_style_index = info.data;
                },
                block_id::PARAGRAPH_LINE_SPACING => style.line_spacing = info.data,
                block_id::PARAGRAPH_SPACE_BEFORE => style.space_before_emu = info.data,
                block_id::PARAGRAPH_SPACE_AFTER => style.space_after_emu = info.data,
                block_id::PARAGRAPH_FIRST_LINE_INDENT => {
                    style.first_line_indent_emu = info.data as i32;
                },
                block_id::PARAGRAPH_LEFT_INDENT => style.left_indent_emu = info.data,
                block_id::PARAGRAPH_RIGHT_INDENT => style.right_indent_emu = info.data,
                _ => {},
            }
        }
        Ok(style)
    }

    /// Color index from its container block: the index sits in a nested
    /// block under [`block_id::COLOR_INDEX_ID`].
    fn parse_color_index(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        container: &BlockInfo,
    ) -> Result<Option<u32>> {
        cursor.seek(container.data_offset + 4);
        while cursor.still_reading(container.data_end()) {
            let sub = blocks::parse_block(cursor, true)?;
            if sub.id == block_id::COLOR_INDEX_ID {
                blocks::skip_block(cursor, container);
                return Ok(Some(sub.data));
            }
        }
        warn!("color index container without color index");
        Ok(None)
    }

    /// Font index from its doubly nested container block.
    fn parse_font_index(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        container: &BlockInfo,
    ) -> Result<u32> {
        cursor.seek(container.data_offset + 4);
        let mut font_index = 0;
        while cursor.still_reading(container.data_end()) {
            let sub = blocks::parse_block(cursor, true)?;
            if sub.block_type == blocks::block_type::GENERAL_CONTAINER {
                cursor.seek(sub.data_offset + 4);
                if cursor.still_reading(sub.data_end()) {
                    font_index = blocks::parse_block(cursor, true)?.data;
                    break;
                }
            }
        }
        blocks::skip_block(cursor, container);
        Ok(font_index)
    }
}

/// Shared header of the FDPC/FDPP run tables: a 16-bit entry count, six
/// skipped bytes, then parallel arrays of 32-bit text offsets and 16-bit
/// chunk-relative style offsets.
fn parse_run_table_header(cursor: &mut StreamCursor<'_>) -> Result<(Vec<u32>, Vec<u16>)> {
    let num_entries = cursor.read_u16()? as usize;
    let resume = cursor.tell();
    cursor.seek(resume + 6);
    let mut text_offsets = Vec::with_capacity(num_entries);
    for _ in 0..num_entries {
        text_offsets.push(cursor.read_u32()?);
    }
    let mut chunk_offsets = Vec::with_capacity(num_entries);
    for _ in 0..num_entries {
        chunk_offsets.push(cursor.read_u16()?);
    }
    Ok((text_offsets, chunk_offsets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::test_support::RecordingCollector;
    use bytes::Bytes;

    struct NoStreams;

    impl OleSource for NoStreams {
        fn is_compound(&self) -> bool {
            true
        }
        fn sub_stream(&mut self, _path: &str) -> Option<Bytes> {
            None
        }
    }

    fn fixed_block(id: u8, block_type: u8, value: u32) -> Vec<u8> {
        let mut out = vec![id, block_type];
        match blocks::block_data_length(block_type) {
            Some(0) => {},
            Some(2) => out.extend_from_slice(&(value as u16).to_le_bytes()),
            Some(4) => out.extend_from_slice(&value.to_le_bytes()),
            _ => panic!("not a fixed block type"),
        }
        out
    }

    /// A style entry: leading length DWORD plus its blocks.
    fn style_entry(body: &[u8]) -> Vec<u8> {
        let mut out = ((body.len() + 4) as u32).to_le_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_character_style_bold_requires_both_ids() {
        let mut body = fixed_block(block_id::BOLD_1_ID, 0x00, 0);
        body.extend(fixed_block(block_id::UNDERLINE_ID, 0x00, 0));
        let entry = style_entry(&body);
        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        let mut cursor = StreamCursor::new(&entry);
        let style = parser.parse_character_style(&mut cursor, false).unwrap();
        assert!(!style.bold);
        assert!(style.underline);
        assert!(!style.italic);
        assert_eq!(style.size_in_pt, None);
    }

    #[test]
    fn test_character_style_size_in_points() {
        // 12700 EMU per point; 152400 EMU is 12pt.
        let mut body = fixed_block(block_id::TEXT_SIZE_1_ID, 0x20, 152_400);
        body.extend(fixed_block(block_id::TEXT_SIZE_2_ID, 0x20, 152_400));
        body.extend(fixed_block(block_id::BOLD_1_ID, 0x00, 0));
        body.extend(fixed_block(block_id::BOLD_2_ID, 0x00, 0));
        let entry = style_entry(&body);
        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        let mut cursor = StreamCursor::new(&entry);
        let style = parser.parse_character_style(&mut cursor, false).unwrap();
        assert!(style.bold);
        assert_eq!(style.size_in_pt, Some(12.0));
    }

    #[test]
    fn test_paragraph_style_fields() {
        let mut body = fixed_block(block_id::PARAGRAPH_ALIGNMENT, 0x10, 1);
        body.extend(fixed_block(block_id::PARAGRAPH_SPACE_BEFORE, 0x20, 1000));
        body.extend(fixed_block(block_id::PARAGRAPH_LEFT_INDENT, 0x20, 2000));
        let entry = style_entry(&body);
        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        let mut cursor = StreamCursor::new(&entry);
        let style = parser.parse_paragraph_style(&mut cursor).unwrap();
        assert_eq!(style.alignment, Some(Alignment::Center));
        assert_eq!(style.space_before_emu, 1000);
        assert_eq!(style.left_indent_emu, 2000);
        assert_eq!(style.space_after_emu, 0);
    }

    #[test]
    fn test_fonts_parsed_with_length_prefix() {
        let mut chunk = Vec::new();
        chunk.extend(0u32.to_le_bytes());
        chunk.extend(2u32.to_le_bytes());
        chunk.extend([0u8; 12 + 8]); // gap plus the 4-byte table per element
        for name in ["Arial", "Times"] {
            chunk.extend((name.len() as u16).to_le_bytes());
            for unit in name.encode_utf16() {
                chunk.extend(unit.to_le_bytes());
            }
            chunk.extend(0u32.to_le_bytes());
        }
        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        let mut cursor = StreamCursor::new(&chunk);
        parser.parse_fonts(&mut cursor).unwrap();
        assert_eq!(
            collector.events,
            vec!["font(10 bytes)".to_string(), "font(10 bytes)".to_string()]
        );
    }

    #[test]
    fn test_text_colors_appended_in_order() {
        let mut chunk = Vec::new();
        chunk.extend(2u32.to_le_bytes());
        chunk.extend([0u8; 8]);
        for color in [0x0000FFu32, 0x00FF00] {
            let body = fixed_block(block_id::COLOR_VALUE_ID, 0x20, color);
            chunk.extend(((body.len() + 4) as u32).to_le_bytes());
            chunk.extend(body);
        }
        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        let mut cursor = StreamCursor::new(&chunk);
        parser.parse_text_colors(&mut cursor).unwrap();
        assert_eq!(
            collector.events,
            vec![
                "text_color(0xff)".to_string(),
                "text_color(0xff00)".to_string()
            ]
        );
    }

    /// Full quill stream: reference list, styles, fonts, defaults and one
    /// text block split into a span and paragraph.
    #[test]
    fn test_quill_stream_end_to_end() {
        let mut chunks: Vec<([u8; 4], Vec<u8>)> = Vec::new();

        let text: Vec<u8> = "Test"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        chunks.push((*b"TEXT", text));

        // STRS: one block of four code units, lengths at offset + 8.
        let mut strs = Vec::new();
        strs.extend(1u32.to_le_bytes());
        strs.extend(4u32.to_le_bytes());
        strs.extend(4u32.to_le_bytes());
        chunks.push((*b"STRS", strs));

        // SYID: one id.
        let mut syid = Vec::new();
        syid.extend(0u32.to_le_bytes());
        syid.extend(1u32.to_le_bytes());
        syid.extend(0xABCu32.to_le_bytes());
        chunks.push((*b"SYID", syid));

        // FDPC/FDPP built after offsets are known; placeholders for now.
        chunks.push((*b"FDPC", Vec::new()));
        chunks.push((*b"FDPP", Vec::new()));

        // Two STSH chunks; only the second is read. It holds one character
        // entry and one paragraph entry.
        chunks.push((*b"STSH", vec![0xEE; 4]));
        let mut stsh2 = Vec::new();
        stsh2.extend(0u32.to_le_bytes());
        stsh2.extend(2u32.to_le_bytes());
        stsh2.extend([0u8; 12]);
        stsh2.extend(8u32.to_le_bytes()); // first entry at chunk offset 28
        let char_entry = {
            let mut entry = vec![0u8, 0]; // leading u16
            entry.extend(style_entry(&fixed_block(block_id::UNDERLINE_ID, 0x00, 0)));
            entry
        };
        let para_entry = {
            let mut entry = vec![0u8, 0];
            entry.extend(style_entry(&fixed_block(
                block_id::PARAGRAPH_ALIGNMENT,
                0x10,
                0,
            )));
            entry
        };
        stsh2.extend(((8 + char_entry.len()) as u32).to_le_bytes());
        stsh2.extend(&char_entry);
        stsh2.extend(&para_entry);
        chunks.push((*b"STSH", stsh2));

        // FONT: one name.
        let mut font = Vec::new();
        font.extend(0u32.to_le_bytes());
        font.extend(1u32.to_le_bytes());
        font.extend([0u8; 12 + 4]);
        font.extend(5u16.to_le_bytes());
        for unit in "Arial".encode_utf16() {
            font.extend(unit.to_le_bytes());
        }
        font.extend(0u32.to_le_bytes());
        chunks.push((*b"FONT", font));

        // Lay the chunks out after the reference list.
        let list_start = CHUNK_LIST_HEAD;
        let refs_start = list_start + 8;
        let data_start = refs_start + 24 * chunks.len();
        let mut offsets = Vec::new();
        let mut position = data_start;
        for (_, body) in &chunks {
            offsets.push(position);
            position += body.len().max(1);
        }

        // The single span and paragraph both end at the end of the text.
        let text_end = (offsets[0] + 8) as u32;
        let fdpc_offset = offsets[3];
        let mut fdpc = Vec::new();
        fdpc.extend(1u16.to_le_bytes());
        fdpc.extend([0u8; 6]);
        fdpc.extend(text_end.to_le_bytes());
        fdpc.extend(14u16.to_le_bytes());
        fdpc.extend(style_entry(&fixed_block(block_id::BOLD_1_ID, 0x00, 0)));
        let mut fdpp = Vec::new();
        fdpp.extend(1u16.to_le_bytes());
        fdpp.extend([0u8; 6]);
        fdpp.extend(text_end.to_le_bytes());
        fdpp.extend(14u16.to_le_bytes());
        fdpp.extend(style_entry(&fixed_block(
            block_id::PARAGRAPH_ALIGNMENT,
            0x10,
            2,
        )));
        chunks[3].1 = fdpc;
        chunks[4].1 = fdpp;

        // Recompute offsets now that every chunk has its final size.
        let mut offsets = Vec::new();
        let mut position = data_start;
        for (_, body) in &chunks {
            offsets.push(position);
            position += body.len().max(1);
        }
        assert_eq!(text_end, (offsets[0] + 8) as u32);

        let mut stream = vec![0u8; list_start];
        stream.extend(0x18u16.to_le_bytes());
        stream.extend((chunks.len() as u16).to_le_bytes());
        stream.extend(CHUNK_LIST_END.to_le_bytes());
        for (index, (name, body)) in chunks.iter().enumerate() {
            stream.extend(0x18u16.to_le_bytes());
            stream.extend_from_slice(name);
            stream.extend((index as u16).to_le_bytes());
            stream.extend(0x01000000u32.to_le_bytes());
            stream.extend_from_slice(name);
            stream.extend((offsets[index] as u32).to_le_bytes());
            stream.extend((body.len() as u32).to_le_bytes());
        }
        for (index, (_, body)) in chunks.iter().enumerate() {
            assert_eq!(stream.len(), offsets[index]);
            stream.extend_from_slice(body);
            if body.is_empty() {
                stream.push(0);
            }
        }

        let mut collector = RecordingCollector::default();
        let mut parser = PubParser::new(NoStreams, &mut collector);
        parser.parse_quill(&stream).unwrap();

        assert!(collector.events.contains(&"font(10 bytes)".to_string()));
        assert!(
            collector
                .events
                .contains(&"default_char_style(b=false,i=false,u=true)".to_string())
        );
        assert!(
            collector
                .events
                .contains(&"default_para_style(Some(Left))".to_string())
        );
        assert_eq!(collector.texts.len(), 1);
        let (id, paragraphs) = &collector.texts[0];
        assert_eq!(*id, 0xABC);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].style.alignment, Some(Alignment::Right));
        assert_eq!(paragraphs[0].spans.len(), 1);
        let expected: Vec<u8> = "Test"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        assert_eq!(paragraphs[0].spans[0].chars, expected);
    }
}
