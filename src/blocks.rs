//! The block grammar shared by the contents and quill streams.
//!
//! A block is a one-byte id (semantic tag), a one-byte type (data shape) and
//! a payload whose length is either fixed by the type or, for container
//! types, read from the first DWORD of the payload. Fixed payloads up to four
//! bytes are decoded into an integer; wider fixed payloads are skipped.

use crate::binary::StreamCursor;
use crate::error::Result;
use log::warn;

/// Block type tags (the data-shape byte).
pub mod block_type {
    pub const DUMMY: u8 = 0x00;
    /// 4-byte payload carrying a shape sequence number inside a page's
    /// shape-list block.
    pub const SHAPE_SEQNUM: u8 = 0x70;
    /// Variable-length payload holding a string.
    pub const STRING_CONTAINER: u8 = 0x78;
    /// Variable-length payload holding nested blocks.
    pub const GENERAL_CONTAINER: u8 = 0x88;
    /// The trailer sub-block holding the content-chunk directory.
    pub const TRAILER_DIRECTORY: u8 = 0x90;
}

/// Block id tags. Ids are context-local: the same byte means different
/// things under different parents.
pub mod block_id {
    // Content chunk reference sub-blocks.
    pub const CHUNK_TYPE: u8 = 0x02;
    pub const CHUNK_OFFSET: u8 = 0x04;
    pub const CHUNK_PARENT_SEQNUM: u8 = 0x05;

    // Document chunk.
    pub const DOCUMENT_SIZE: u8 = 0x12;
    pub const DOCUMENT_WIDTH: u8 = 0x01;
    pub const DOCUMENT_HEIGHT: u8 = 0x02;

    // Page chunk.
    pub const PAGE_BG_SHAPE: u8 = 0x0A;
    pub const PAGE_SHAPES: u8 = 0x02;

    // Shape chunk.
    pub const SHAPE_WIDTH: u8 = 0x0B;
    pub const SHAPE_HEIGHT: u8 = 0x0C;
    pub const SHAPE_TEXT_ID: u8 = 0x09;

    // Quill character-style entries.
    pub const BOLD_1_ID: u8 = 0x02;
    pub const ITALIC_1_ID: u8 = 0x03;
    pub const TEXT_SIZE_1_ID: u8 = 0x05;
    pub const BARE_COLOR_INDEX_ID: u8 = 0x0C;
    pub const COLOR_INDEX_CONTAINER_ID: u8 = 0x0D;
    pub const FONT_INDEX_CONTAINER_ID: u8 = 0x0E;
    pub const UNDERLINE_ID: u8 = 0x1E;
    pub const BOLD_2_ID: u8 = 0x37;
    pub const ITALIC_2_ID: u8 = 0x38;
    pub const TEXT_SIZE_2_ID: u8 = 0x39;
    /// Nested inside a color-index container.
    pub const COLOR_INDEX_ID: u8 = 0x01;
    /// Color value inside quill `PL  ` entries and palette entries.
    pub const COLOR_VALUE_ID: u8 = 0x01;

    // Quill paragraph-style entries.
    pub const PARAGRAPH_DEFAULT_CHAR_STYLE: u8 = 0x00;
    pub const PARAGRAPH_LINE_SPACING: u8 = 0x02;
    pub const PARAGRAPH_ALIGNMENT: u8 = 0x04;
    pub const PARAGRAPH_SPACE_BEFORE: u8 = 0x05;
    pub const PARAGRAPH_SPACE_AFTER: u8 = 0x06;
    pub const PARAGRAPH_FIRST_LINE_INDENT: u8 = 0x08;
    pub const PARAGRAPH_LEFT_INDENT: u8 = 0x09;
    pub const PARAGRAPH_RIGHT_INDENT: u8 = 0x0A;
}

/// One parsed block record.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    /// Stream position of the id byte.
    pub start: usize,
    pub id: u8,
    pub block_type: u8,
    /// Stream position where the payload begins. For container types the
    /// payload starts with its own 32-bit length.
    pub data_offset: usize,
    /// Payload length in bytes, including the length DWORD for containers.
    pub data_length: usize,
    /// Integer value for fixed payloads of up to four bytes, zero otherwise.
    pub data: u32,
    /// Eagerly read payload of a string container.
    pub string_data: Option<Vec<u8>>,
}

impl BlockInfo {
    /// Exclusive end of the payload span.
    #[inline]
    pub fn data_end(&self) -> usize {
        self.data_offset + self.data_length
    }
}

/// Fixed payload length for a block type, or `None` for the container types
/// whose length is the first DWORD of the payload.
pub fn block_data_length(block_type: u8) -> Option<usize> {
    match block_type {
        0x00 | 0x05 | 0x08 | 0x0A => Some(0),
        0x07 | 0x10 | 0x12 | 0x18 | 0x1A => Some(2),
        0x20 | 0x22 | 0x58 | 0x68 | 0x70 | 0xB8 => Some(4),
        0x28 => Some(8),
        0x38 => Some(16),
        0x48 => Some(24),
        0x78 | 0x80 | 0x82 | 0x88 | 0x8A | 0x90 | 0x98 | 0xA0 => None,
        other => {
            warn!("block of unknown type 0x{other:02x}");
            Some(0)
        },
    }
}

/// Whether a block type carries string data.
#[inline]
pub fn is_block_data_string(block_type: u8) -> bool {
    block_type == block_type::STRING_CONTAINER
}

/// Parse one block at the cursor.
///
/// For container types the cursor is left just past the length DWORD (inside
/// the container) unless `skip_hierarchical` is set, in which case the whole
/// payload is skipped. String payloads are always consumed. Fixed payloads
/// are consumed either way.
pub fn parse_block(cursor: &mut StreamCursor<'_>, skip_hierarchical: bool) -> Result<BlockInfo> {
    let start = cursor.tell();
    let id = cursor.read_u8()?;
    let block_type = cursor.read_u8()?;
    let data_offset = cursor.tell();

    let mut info = BlockInfo {
        start,
        id,
        block_type,
        data_offset,
        data_length: 0,
        data: 0,
        string_data: None,
    };

    match block_data_length(block_type) {
        None => {
            info.data_length = cursor.read_u32()? as usize;
            if is_block_data_string(block_type) {
                let payload = info.data_length.saturating_sub(4);
                info.string_data = Some(cursor.read_bytes(payload)?.to_vec());
            } else if skip_hierarchical {
                skip_block(cursor, &info);
            }
        },
        Some(len) => {
            info.data_length = len;
            match len {
                2 => info.data = u32::from(cursor.read_u16()?),
                4 => info.data = cursor.read_u32()?,
                8 | 16 | 24 => skip_block(cursor, &info),
                _ => {},
            }
        },
    }
    Ok(info)
}

/// Reposition the cursor past a block's payload.
#[inline]
pub fn skip_block(cursor: &mut StreamCursor<'_>, block: &BlockInfo) {
    cursor.seek(block.data_end());
}
