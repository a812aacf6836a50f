//! Embedded image extraction from the `Escher/EscherDelayStm` stream.
//!
//! Each top-level record is a BLIP. Unknown types, garbage DIBs and inflate
//! failures all still advance the image counter so that 1-based delay
//! addressing stays aligned with source ordering.

use super::{container_type, parse_escher_container};
use crate::binary::{StreamCursor, read_u16_le, read_u32_le};
use crate::collector::Collector;
use crate::error::Result;
use crate::ole::OleSource;
use crate::parser::PubParser;
use crate::shape::ImgType;
use log::warn;
use std::io::Read;

/// Map a BLIP record type to its image kind.
pub(crate) fn img_type_by_blip_type(record_type: u16) -> Option<ImgType> {
    match record_type {
        container_type::BLIP_PNG => Some(ImgType::Png),
        container_type::BLIP_JPEG => Some(ImgType::Jpeg),
        container_type::BLIP_WMF => Some(ImgType::Wmf),
        container_type::BLIP_DIB => Some(ImgType::Dib),
        container_type::BLIP_EMF => Some(ImgType::Emf),
        container_type::BLIP_TIFF => Some(ImgType::Tiff),
        container_type::BLIP_PICT => Some(ImgType::Pict),
        _ => None,
    }
}

/// Offset of the image bytes within a BLIP's contents.
///
/// BLIPs carry one or two 16-byte UIDs depending on whether the record
/// instance matches the kind's single-UID value; metafile kinds additionally
/// carry a 34-byte metafile header.
pub(crate) fn blip_data_offset(kind: ImgType, initial: u16) -> usize {
    let rec_instance = initial >> 4;
    let (one_uid, offset) = match kind {
        ImgType::Wmf => (rec_instance == 0x216, 0x34),
        ImgType::Emf => (rec_instance == 0x3D4, 0x34),
        ImgType::Png => (rec_instance == 0x6E0, 0x11),
        ImgType::Jpeg => (rec_instance == 0x46A || rec_instance == 0x6E2, 0x11),
        ImgType::Dib => (rec_instance == 0x7A8, 0x11),
        _ => (true, 0x11),
    };
    offset + if one_uid { 0 } else { 0x10 }
}

/// Inflate a raw-DEFLATE metafile payload.
fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// DIBs below this size lack even a full info header and are dropped.
const MIN_DIB_SIZE: usize = 0x32;

/// Prepend the 14-byte BMP file header a DIB payload is missing.
///
/// The pixel-data offset is the file header plus the 40-byte info header
/// plus the palette (`1 << bpp` entries when the palette-count field is zero
/// and bpp is at most 8).
pub(crate) fn wrap_dib(img: &[u8]) -> Result<Vec<u8>> {
    let bits_per_pixel = read_u16_le(img, 0x0E)?;
    let mut palette_colors = read_u32_le(img, 0x20)?;
    if palette_colors == 0 && bits_per_pixel <= 8 {
        palette_colors = 1u32 << bits_per_pixel;
    }
    let mut out = Vec::with_capacity(img.len() + 14);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(img.len() as u32 + 14).to_le_bytes());
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&(0x36 + 4 * palette_colors).to_le_bytes());
    out.extend_from_slice(img);
    Ok(out)
}

impl<S: OleSource, C: Collector> PubParser<'_, S, C> {
    pub(crate) fn parse_escher_delay(&mut self, data: &[u8]) -> Result<()> {
        let mut cursor = StreamCursor::new(data);
        while cursor.still_reading(data.len()) {
            let info = parse_escher_container(&mut cursor)?;
            if let Some(kind) = img_type_by_blip_type(info.record_type) {
                let start = info.contents_offset + blip_data_offset(kind, info.initial);
                let end = (start + info.contents_length).min(data.len());
                let img = if start < end {
                    data[start..end].to_vec()
                } else {
                    Vec::new()
                };

                let img = match kind {
                    ImgType::Wmf | ImgType::Emf => match inflate(&img) {
                        Ok(decompressed) => decompressed,
                        Err(e) => {
                            self.last_added_image += 1;
                            warn!(
                                "could not inflate {kind:?} at image index 0x{:x}: {e}",
                                self.last_added_image
                            );
                            cursor.seek(info.contents_end());
                            continue;
                        },
                    },
                    ImgType::Dib => {
                        if img.len() < MIN_DIB_SIZE {
                            self.last_added_image += 1;
                            warn!("garbage DIB at image index 0x{:x}", self.last_added_image);
                            cursor.seek(info.contents_end());
                            continue;
                        }
                        wrap_dib(&img)?
                    },
                    _ => img,
                };

                self.last_added_image += 1;
                self.collector.add_image(self.last_added_image, kind, img);
            } else {
                self.last_added_image += 1;
                warn!(
                    "image of unknown blip type 0x{:04x} at index 0x{:x}",
                    info.record_type, self.last_added_image
                );
            }
            cursor.seek(info.contents_end());
        }
        Ok(())
    }
}
