//! OfficeArt (Escher) record primitives for the drawing streams.
//!
//! Escher records carry an 8-byte header: a 16-bit version/instance word, a
//! 16-bit type and a 32-bit contents length. Two container types drag a
//! 4-byte tail behind their contents, and the Publisher client records repeat
//! their length in an extra 4-byte header inside the contents; both oddities
//! are table-driven here so every walk advances identically.

pub mod delay;
pub mod field_ids;
pub mod shapes;

use crate::binary::StreamCursor;
use crate::error::Result;
use std::collections::HashMap;

/// Escher record type tags.
pub mod container_type {
    pub const DGG_CONTAINER: u16 = 0xF000;
    pub const B_STORE_CONTAINER: u16 = 0xF001;
    pub const DG_CONTAINER: u16 = 0xF002;
    pub const SPGR_CONTAINER: u16 = 0xF003;
    pub const SP_CONTAINER: u16 = 0xF004;
    pub const FSPGR: u16 = 0xF009;
    pub const FSP: u16 = 0xF00A;
    pub const FOPT: u16 = 0xF00B;
    pub const CHILD_ANCHOR: u16 = 0xF00F;
    pub const CLIENT_ANCHOR: u16 = 0xF010;
    pub const CLIENT_DATA: u16 = 0xF011;
    pub const BLIP_EMF: u16 = 0xF01A;
    pub const BLIP_WMF: u16 = 0xF01B;
    pub const BLIP_PICT: u16 = 0xF01C;
    pub const BLIP_JPEG: u16 = 0xF01D;
    pub const BLIP_PNG: u16 = 0xF01E;
    pub const BLIP_DIB: u16 = 0xF01F;
    pub const BLIP_TIFF: u16 = 0xF029;
    pub const TERTIARY_FOPT: u16 = 0xF122;
}

/// Header of one Escher record, with the contents located in the stream.
#[derive(Debug, Clone, Copy)]
pub struct EscherContainerInfo {
    /// Version (low 4 bits) and record instance (high 12 bits).
    pub initial: u16,
    pub record_type: u16,
    pub contents_offset: usize,
    pub contents_length: usize,
}

impl EscherContainerInfo {
    /// Exclusive end of the contents span.
    #[inline]
    pub fn contents_end(&self) -> usize {
        self.contents_offset + self.contents_length
    }

    /// The record instance from the high 12 bits of the initial word.
    #[inline]
    pub fn rec_instance(&self) -> u16 {
        self.initial >> 4
    }
}

/// Bytes trailing a record's declared contents that a walk must also skip.
pub fn element_tail_length(record_type: u16) -> usize {
    match record_type {
        container_type::DGG_CONTAINER | container_type::DG_CONTAINER => 4,
        _ => 0,
    }
}

/// Extra header bytes inside the contents of the Publisher client records
/// (the length appears a second time there).
pub fn extra_header_length(record_type: u16) -> usize {
    match record_type {
        container_type::CLIENT_ANCHOR | container_type::CLIENT_DATA => 4,
        _ => 0,
    }
}

/// Read one record header; the cursor is left at the contents.
pub fn parse_escher_container(cursor: &mut StreamCursor<'_>) -> Result<EscherContainerInfo> {
    let initial = cursor.read_u16()?;
    let record_type = cursor.read_u16()?;
    let contents_length = cursor.read_u32()? as usize;
    Ok(EscherContainerInfo {
        initial,
        record_type,
        contents_offset: cursor.tell(),
        contents_length,
    })
}

/// Scan forward within `parent` for the next sibling of `target_type`.
///
/// Non-matching siblings are stepped over (contents plus tail). On a match
/// the cursor is at the match's contents and the header is returned; `None`
/// when the parent span runs out.
pub fn find_escher_container(
    cursor: &mut StreamCursor<'_>,
    parent: &EscherContainerInfo,
    target_type: u16,
) -> Result<Option<EscherContainerInfo>> {
    find_escher_container_in_set(cursor, parent, &[target_type])
}

/// Scan forward within `parent` for the next sibling whose type is in `types`.
pub fn find_escher_container_in_set(
    cursor: &mut StreamCursor<'_>,
    parent: &EscherContainerInfo,
    types: &[u16],
) -> Result<Option<EscherContainerInfo>> {
    while cursor.still_reading(parent.contents_end()) {
        let next = parse_escher_container(cursor)?;
        if types.contains(&next.record_type) {
            return Ok(Some(next));
        }
        cursor.seek(next.contents_end() + element_tail_length(next.record_type));
    }
    Ok(None)
}

/// Decode a record's contents as alternating 16-bit id / 32-bit value pairs.
///
/// Later pairs overwrite earlier ones for duplicate ids. A trailing fragment
/// shorter than one pair is ignored.
pub fn extract_escher_values(
    cursor: &mut StreamCursor<'_>,
    record: &EscherContainerInfo,
) -> Result<HashMap<u16, u32>> {
    let mut values = HashMap::new();
    cursor.seek(record.contents_offset + extra_header_length(record.record_type));
    let end = record.contents_end();
    while cursor.still_reading(end) {
        if end - cursor.tell() < 6 {
            break;
        }
        let id = cursor.read_u16()?;
        let value = cursor.read_u32()?;
        values.insert(id, value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(initial: u16, record_type: u16, contents: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&initial.to_le_bytes());
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(contents.len() as u32).to_le_bytes());
        out.extend_from_slice(contents);
        out
    }

    #[test]
    fn test_parse_container_header() {
        let data = record(0x6E02, 0xF00A, &[1, 2, 3, 4]);
        let mut cur = StreamCursor::new(&data);
        let info = parse_escher_container(&mut cur).unwrap();
        assert_eq!(info.record_type, 0xF00A);
        assert_eq!(info.rec_instance(), 0x6E0);
        assert_eq!(info.contents_offset, 8);
        assert_eq!(info.contents_length, 4);
        assert_eq!(cur.tell(), 8);
    }

    #[test]
    fn test_find_skips_non_matching_siblings() {
        let mut data = record(0, 0xF00A, &[0u8; 8]);
        data.extend(record(0, 0xF00B, &[0u8; 6]));
        data.extend(record(0, 0xF010, &[0u8; 4]));
        let parent = EscherContainerInfo {
            initial: 0,
            record_type: 0,
            contents_offset: 0,
            contents_length: data.len(),
        };
        let mut cur = StreamCursor::new(&data);
        let found = find_escher_container(&mut cur, &parent, 0xF010)
            .unwrap()
            .unwrap();
        assert_eq!(found.record_type, 0xF010);
        assert_eq!(cur.tell(), found.contents_offset);
    }

    #[test]
    fn test_find_misses_within_span() {
        let data = record(0, 0xF00A, &[0u8; 8]);
        let parent = EscherContainerInfo {
            initial: 0,
            record_type: 0,
            contents_offset: 0,
            contents_length: data.len(),
        };
        let mut cur = StreamCursor::new(&data);
        assert!(
            find_escher_container(&mut cur, &parent, 0xF010)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_extract_values_with_duplicates() {
        let mut contents = Vec::new();
        for (id, value) in [(1u16, 10u32), (2, 20), (1, 30)] {
            contents.extend_from_slice(&id.to_le_bytes());
            contents.extend_from_slice(&value.to_le_bytes());
        }
        let data = record(0, 0xF00B, &contents);
        let mut cur = StreamCursor::new(&data);
        let info = parse_escher_container(&mut cur).unwrap();
        let values = extract_escher_values(&mut cur, &info).unwrap();
        assert_eq!(values.get(&1), Some(&30));
        assert_eq!(values.get(&2), Some(&20));
    }

    #[test]
    fn test_extract_values_client_record_extra_header() {
        // Client anchors repeat the length in the first contents DWORD.
        let mut contents = vec![0x1C, 0x00, 0x00, 0x00];
        for (id, value) in [(1u16, 100u32), (2, 200)] {
            contents.extend_from_slice(&id.to_le_bytes());
            contents.extend_from_slice(&value.to_le_bytes());
        }
        let data = record(0, container_type::CLIENT_ANCHOR, &contents);
        let mut cur = StreamCursor::new(&data);
        let info = parse_escher_container(&mut cur).unwrap();
        let values = extract_escher_values(&mut cur, &info).unwrap();
        assert_eq!(values.get(&1), Some(&100));
        assert_eq!(values.get(&2), Some(&200));
    }
}
