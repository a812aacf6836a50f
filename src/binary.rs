//! Little-endian read primitives and the stream cursor used by all
//! sub-parsers.
//!
//! Publisher streams are parsed from fully buffered sub-streams, so the
//! cursor is a position over a borrowed byte slice with explicit seek/tell
//! semantics.

use crate::error::{Error, Result};
use zerocopy::FromBytes;
use zerocopy::byteorder::{LittleEndian, U16, U32};

/// Read a little-endian u16 from a byte slice at the given offset.
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    if offset + 2 > data.len() {
        return Err(Error::Corrupted(format!(
            "not enough data for u16 at 0x{offset:x}"
        )));
    }
    U16::<LittleEndian>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| Error::Corrupted("failed to read u16".to_string()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(Error::Corrupted(format!(
            "not enough data for u32 at 0x{offset:x}"
        )));
    }
    U32::<LittleEndian>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| Error::Corrupted("failed to read u32".to_string()))
}

/// Seekable cursor over a buffered sub-stream.
///
/// Seeks are unchecked (a position past the end is representable); reads are
/// bounds-checked and fail with [`Error::Corrupted`] when they would run past
/// the end of the stream.
#[derive(Debug, Clone)]
pub struct StreamCursor<'data> {
    data: &'data [u8],
    pos: usize,
}

impl<'data> StreamCursor<'data> {
    /// Create a cursor positioned at the start of the stream.
    #[inline]
    pub fn new(data: &'data [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The underlying stream bytes.
    #[inline]
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Total stream length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stream is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current position.
    #[inline]
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor. Positions past the end are allowed; subsequent
    /// reads fail and `still_reading` reports false.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// True while the cursor is before `limit` and before the end of the
    /// stream. This is the loop guard used by every bounded record walk.
    #[inline]
    pub fn still_reading(&self, limit: usize) -> bool {
        self.pos < limit && self.pos < self.data.len()
    }

    /// Read one byte and advance.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or_else(|| {
            Error::Corrupted(format!("not enough data for u8 at 0x{:x}", self.pos))
        })?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a little-endian u16 and advance.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let v = read_u16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    /// Read a little-endian u32 and advance.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let v = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Borrow `count` bytes from the current position and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'data [u8]> {
        if self.pos + count > self.data.len() {
            return Err(Error::Corrupted(format!(
                "not enough data for {count} bytes at 0x{:x}",
                self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }
}
