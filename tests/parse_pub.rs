//! End-to-end parse of a synthetic Publisher document: all four streams,
//! checked as the exact sequence of collector calls.

use bytes::Bytes;
use longan::{
    Collector, Fill, ImgType, Line, OleSource, PubParser, ShapeType, stream_path,
};
use longan::shape::BorderPosition;
use longan::style::{CharacterStyle, Color, ColorReference, ParagraphStyle, TextParagraph};
use std::collections::HashMap;

#[derive(Default)]
struct MemorySource {
    streams: HashMap<&'static str, Vec<u8>>,
}

impl OleSource for MemorySource {
    fn is_compound(&self) -> bool {
        true
    }
    fn sub_stream(&mut self, path: &str) -> Option<Bytes> {
        self.streams.get(path).map(|data| Bytes::from(data.clone()))
    }
}

#[derive(Default)]
struct EventCollector {
    events: Vec<String>,
    texts: Vec<(u32, Vec<TextParagraph>)>,
    images: Vec<(u32, ImgType, Vec<u8>)>,
}

impl Collector for EventCollector {
    fn set_width_in_emu(&mut self, width: u32) {
        self.events.push(format!("width({width})"));
    }
    fn set_height_in_emu(&mut self, height: u32) {
        self.events.push(format!("height({height})"));
    }
    fn add_page(&mut self, seq_num: u32) {
        self.events.push(format!("add_page(0x{seq_num:x})"));
    }
    fn designate_master_page(&mut self, seq_num: u32) {
        self.events.push(format!("master_page(0x{seq_num:x})"));
    }
    fn set_page_bg_shape(&mut self, page_seq_num: u32, bg_shape_seq_num: u32) {
        self.events
            .push(format!("page_bg(0x{page_seq_num:x},0x{bg_shape_seq_num:x})"));
    }
    fn add_shape(&mut self, seq_num: u32) {
        self.events.push(format!("add_shape(0x{seq_num:x})"));
    }
    fn set_shape_page(&mut self, seq_num: u32, page_seq_num: u32) {
        self.events
            .push(format!("shape_page(0x{seq_num:x},0x{page_seq_num:x})"));
    }
    fn set_shape_type(&mut self, seq_num: u32, shape_type: ShapeType) {
        self.events
            .push(format!("shape_type(0x{seq_num:x},{shape_type:?})"));
    }
    fn set_shape_flip(&mut self, seq_num: u32, flip_vertical: bool, flip_horizontal: bool) {
        self.events.push(format!(
            "shape_flip(0x{seq_num:x},{flip_vertical},{flip_horizontal})"
        ));
    }
    fn set_shape_order(&mut self, seq_num: u32) {
        self.events.push(format!("shape_order(0x{seq_num:x})"));
    }
    fn set_current_group_seq_num(&mut self, seq_num: u32) {
        self.events.push(format!("current_group(0x{seq_num:x})"));
    }
    fn begin_group(&mut self) {
        self.events.push("begin_group".to_string());
    }
    fn end_group(&mut self) {
        self.events.push("end_group".to_string());
    }
    fn set_shape_coordinates_in_emu(&mut self, seq_num: u32, xs: i32, ys: i32, xe: i32, ye: i32) {
        self.events
            .push(format!("coords(0x{seq_num:x},{xs},{ys},{xe},{ye})"));
    }
    fn set_shape_rotation(&mut self, seq_num: u32, degrees: i16) {
        self.events.push(format!("rotation(0x{seq_num:x},{degrees})"));
    }
    fn set_shape_margins(&mut self, seq_num: u32, left: u32, top: u32, right: u32, bottom: u32) {
        self.events.push(format!(
            "margins(0x{seq_num:x},{left},{top},{right},{bottom})"
        ));
    }
    fn set_adjust_value(&mut self, seq_num: u32, index: usize, value: i32) {
        self.events
            .push(format!("adjust(0x{seq_num:x},{index},{value})"));
    }
    fn add_shape_line(&mut self, seq_num: u32, line: Line) {
        self.events.push(format!(
            "line(0x{seq_num:x},0x{:x},{},{})",
            line.color.base, line.width_in_emu, line.visible
        ));
    }
    fn set_shape_border_position(&mut self, seq_num: u32, position: BorderPosition) {
        self.events.push(format!("border(0x{seq_num:x},{position:?})"));
    }
    fn set_shape_fill(&mut self, seq_num: u32, fill: Fill, skip_if_not_bg: bool) {
        let kind = match fill {
            Fill::Solid(_) => "solid",
            Fill::Gradient(_) => "gradient",
            Fill::Image(_) => "image",
            Fill::Pattern(_) => "pattern",
        };
        self.events
            .push(format!("fill(0x{seq_num:x},{kind},{skip_if_not_bg})"));
    }
    fn set_shape_img_index(&mut self, seq_num: u32, delay_index: u32) {
        self.events
            .push(format!("img_index(0x{seq_num:x},{delay_index})"));
    }
    fn add_image(&mut self, index: u32, kind: ImgType, data: Vec<u8>) {
        self.events.push(format!("add_image({index},{kind:?})"));
        self.images.push((index, kind, data));
    }
    fn add_text_string(&mut self, paragraphs: Vec<TextParagraph>, id: u32) {
        self.events.push(format!("text(0x{id:x})"));
        self.texts.push((id, paragraphs));
    }
    fn add_text_shape(&mut self, text_id: u32, seq_num: u32, page_seq_num: u32) {
        self.events.push(format!(
            "text_shape(0x{text_id:x},0x{seq_num:x},0x{page_seq_num:x})"
        ));
    }
    fn add_font(&mut self, name: Vec<u8>) {
        self.events.push(format!("font({} bytes)", name.len()));
    }
    fn add_text_color(&mut self, color: ColorReference) {
        self.events.push(format!("text_color(0x{:x})", color.base));
    }
    fn add_palette_color(&mut self, color: Color) {
        self.events
            .push(format!("palette({},{},{})", color.r, color.g, color.b));
    }
    fn add_default_character_style(&mut self, style: CharacterStyle) {
        self.events.push(format!(
            "default_char_style(b={},i={},u={})",
            style.bold, style.italic, style.underline
        ));
    }
    fn add_default_paragraph_style(&mut self, style: ParagraphStyle) {
        self.events
            .push(format!("default_para_style({:?})", style.alignment));
    }
    fn go(&mut self) -> bool {
        self.events.push("go".to_string());
        true
    }
}

// Byte builders.

fn fixed_block_u16(id: u8, value: u16) -> Vec<u8> {
    let mut out = vec![id, 0x10];
    out.extend_from_slice(&value.to_le_bytes());
    out
}

fn fixed_block_u32(id: u8, value: u32) -> Vec<u8> {
    let mut out = vec![id, 0x20];
    out.extend_from_slice(&value.to_le_bytes());
    out
}

fn flag_block(id: u8) -> Vec<u8> {
    vec![id, 0x00]
}

fn container_block(id: u8, block_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![id, block_type];
    out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn length_prefixed(body: &[u8]) -> Vec<u8> {
    let mut out = ((body.len() + 4) as u32).to_le_bytes().to_vec();
    out.extend_from_slice(body);
    out
}

fn escher_record(initial: u16, record_type: u16, contents: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&initial.to_le_bytes());
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(contents.len() as u32).to_le_bytes());
    out.extend_from_slice(contents);
    out
}

fn escher_pairs(entries: &[(u16, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, value) in entries {
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

fn escher_client_record(record_type: u16, entries: &[(u16, u32)]) -> Vec<u8> {
    let body = escher_pairs(entries);
    let mut contents = ((body.len() + 4) as u32).to_le_bytes().to_vec();
    contents.extend(body);
    escher_record(0, record_type, &contents)
}

fn utf16_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

/// Quill stream: TEXT, STRS, SYID, PL, FDPC, FDPP, two STSH chunks, FONT.
fn build_quill() -> Vec<u8> {
    let mut chunks: Vec<([u8; 4], Vec<u8>)> = Vec::new();

    chunks.push((*b"TEXT", utf16_bytes("Test")));

    let mut strs = Vec::new();
    strs.extend(1u32.to_le_bytes());
    strs.extend(4u32.to_le_bytes());
    strs.extend(4u32.to_le_bytes());
    chunks.push((*b"STRS", strs));

    let mut syid = Vec::new();
    syid.extend(0u32.to_le_bytes());
    syid.extend(1u32.to_le_bytes());
    syid.extend(0xABCu32.to_le_bytes());
    chunks.push((*b"SYID", syid));

    let mut colors = Vec::new();
    colors.extend(1u32.to_le_bytes());
    colors.extend([0u8; 8]);
    colors.extend(length_prefixed(&fixed_block_u32(0x01, 0x0000FF)));
    chunks.push((*b"PL  ", colors));

    chunks.push((*b"FDPC", Vec::new()));
    chunks.push((*b"FDPP", Vec::new()));

    chunks.push((*b"STSH", vec![0xEE; 4]));
    let char_entry = {
        let mut entry = vec![0u8, 0];
        entry.extend(length_prefixed(&flag_block(0x1E)));
        entry
    };
    let para_entry = {
        let mut entry = vec![0u8, 0];
        entry.extend(length_prefixed(&fixed_block_u16(0x04, 0)));
        entry
    };
    let mut stsh2 = Vec::new();
    stsh2.extend(0u32.to_le_bytes());
    stsh2.extend(2u32.to_le_bytes());
    stsh2.extend([0u8; 12]);
    stsh2.extend(8u32.to_le_bytes());
    stsh2.extend(((8 + char_entry.len()) as u32).to_le_bytes());
    stsh2.extend(&char_entry);
    stsh2.extend(&para_entry);
    chunks.push((*b"STSH", stsh2));

    let mut font = Vec::new();
    font.extend(0u32.to_le_bytes());
    font.extend(1u32.to_le_bytes());
    font.extend([0u8; 12 + 4]);
    font.extend(5u16.to_le_bytes());
    font.extend(utf16_bytes("Arial"));
    font.extend(0u32.to_le_bytes());
    chunks.push((*b"FONT", font));

    let list_start = 0x18;
    let refs_start = list_start + 8;
    let data_start = refs_start + 24 * chunks.len();

    // The text chunk is laid out first; its single span and paragraph end
    // with it.
    let text_end = (data_start + 8) as u32;
    let mut fdpc = Vec::new();
    fdpc.extend(1u16.to_le_bytes());
    fdpc.extend([0u8; 6]);
    fdpc.extend(text_end.to_le_bytes());
    fdpc.extend(14u16.to_le_bytes());
    fdpc.extend(length_prefixed(&flag_block(0x02)));
    chunks[4].1 = fdpc;
    let mut fdpp = Vec::new();
    fdpp.extend(1u16.to_le_bytes());
    fdpp.extend([0u8; 6]);
    fdpp.extend(text_end.to_le_bytes());
    fdpp.extend(14u16.to_le_bytes());
    fdpp.extend(length_prefixed(&fixed_block_u16(0x04, 2)));
    chunks[5].1 = fdpp;

    let mut offsets = Vec::new();
    let mut position = data_start;
    for (_, body) in &chunks {
        offsets.push(position);
        position += body.len();
    }

    let mut stream = vec![0u8; list_start];
    stream.extend(0x18u16.to_le_bytes());
    stream.extend((chunks.len() as u16).to_le_bytes());
    stream.extend(0xFFFF_FFFFu32.to_le_bytes());
    for (index, (name, body)) in chunks.iter().enumerate() {
        stream.extend(0x18u16.to_le_bytes());
        stream.extend_from_slice(name);
        stream.extend((index as u16).to_le_bytes());
        stream.extend(0x01000000u32.to_le_bytes());
        stream.extend_from_slice(name);
        stream.extend((offsets[index] as u32).to_le_bytes());
        stream.extend((body.len() as u32).to_le_bytes());
    }
    for (_, body) in &chunks {
        stream.extend_from_slice(body);
    }
    stream
}

/// Contents stream: master page, normal page with one text shape, document
/// size and a one-color palette.
fn build_contents() -> Vec<u8> {
    let mut stream = vec![0u8; 0x1E];

    let master_offset = stream.len();
    stream.extend(4u32.to_le_bytes());

    let page_offset = stream.len();
    let mut shape_ref = vec![0x00u8, 0x70];
    shape_ref.extend(0x109u32.to_le_bytes());
    let shapes_block = container_block(0x02, 0x88, &shape_ref);
    stream.extend(((shapes_block.len() + 4) as u32).to_le_bytes());
    stream.extend(&shapes_block);

    let shape_offset = stream.len();
    let mut shape_body = Vec::new();
    shape_body.extend(fixed_block_u32(0x0B, 914_400));
    shape_body.extend(fixed_block_u32(0x0C, 914_400));
    shape_body.extend(fixed_block_u32(0x09, 0xABC));
    stream.extend(((shape_body.len() + 4) as u32).to_le_bytes());
    stream.extend(&shape_body);

    let document_offset = stream.len();
    let mut size_body = Vec::new();
    size_body.extend(fixed_block_u32(0x01, 9_144_000));
    size_body.extend(fixed_block_u32(0x02, 6_858_000));
    let size_block = container_block(0x12, 0x88, &size_body);
    stream.extend(((size_block.len() + 4) as u32).to_le_bytes());
    stream.extend(&size_block);

    let palette_offset = stream.len();
    let entry = container_block(0x00, 0x88, &fixed_block_u32(0x01, 0x00FF8040));
    let wrapper = container_block(0x00, 0xA0, &entry);
    stream.extend(((wrapper.len() + 4) as u32).to_le_bytes());
    stream.extend(&wrapper);

    let trailer_offset = stream.len();
    let mut directory = Vec::new();
    for _ in 0..0x107 {
        directory.extend_from_slice(&[0x00, 0x00]);
    }
    let chunk_entry = |kind: u32, offset: usize| {
        let mut body = Vec::new();
        body.extend(fixed_block_u32(0x02, kind));
        body.extend(fixed_block_u32(0x04, offset as u32));
        container_block(0x00, 0x88, &body)
    };
    directory.extend(chunk_entry(0x14, master_offset)); // seq 0x107: master page
    directory.extend(chunk_entry(0x14, page_offset)); // seq 0x108: page
    directory.extend(chunk_entry(0x18, shape_offset)); // seq 0x109: shape
    directory.extend(chunk_entry(0x10, document_offset)); // seq 0x10A: document
    directory.extend(chunk_entry(0x1C, palette_offset)); // seq 0x10B: palette
    let dir_block = container_block(0x00, 0x90, &directory);

    stream.extend(((dir_block.len() + 4) as u32).to_le_bytes());
    stream.extend(&dir_block);
    stream[0x1A..0x1E].copy_from_slice(&(trailer_offset as u32).to_le_bytes());
    stream
}

/// Delay stream: a single PNG blip with a one-UID record instance.
fn build_delay() -> Vec<u8> {
    let mut contents = vec![0u8; 0x11];
    contents.extend_from_slice(b"fakepng!");
    escher_record(0x6E0 << 4, 0xF01E, &contents)
}

/// Drawing stream: a B-store entry with image data, then one drawing with a
/// single top-level shape referencing shape chunk 0x109 and the image.
fn build_escher() -> Vec<u8> {
    let mut bse = vec![0u8; 44];
    bse[10] = 1;
    let bstore = escher_record(0x0F, 0xF001, &bse);
    let dgg = escher_record(0x0F, 0xF000, &bstore);

    let fsp_contents = {
        let mut contents = 0u32.to_le_bytes().to_vec();
        contents.extend(0u32.to_le_bytes());
        contents
    };
    let fsp = escher_record(1 << 4, 0xF00A, &fsp_contents);
    let client_data = escher_client_record(0xF011, &[(0x0001, 0x109)]);
    let fopt = escher_record(
        0x03,
        0xF00B,
        &escher_pairs(&[
            (0x0104, 1),          // pxId
            (0x0147, 42),         // first adjust value
            (0x0181, 0x00FF0000), // fill color
            (0x01C0, 0x0000FF),   // line color
            (0x01FF, 0x0008_0008), // line on
        ]),
    );
    let client_anchor = escher_client_record(
        0xF010,
        &[(0x0001, 100), (0x0002, 200), (0x0003, 300), (0x0004, 400)],
    );

    let sp_contents: Vec<u8> = [fsp, client_data, fopt, client_anchor].concat();
    let sp = escher_record(0x0F, 0xF004, &sp_contents);
    let spgr = escher_record(0x0F, 0xF003, &sp);
    let dg = escher_record(0x0F, 0xF002, &spgr);

    let mut stream = dgg;
    stream.extend_from_slice(&[0u8; 4]); // drawing-group tail
    stream.extend(dg);
    stream.extend_from_slice(&[0u8; 4]); // drawing tail
    stream
}

#[test]
fn parse_full_document() {
    let mut source = MemorySource::default();
    source.streams.insert(stream_path::QUILL, build_quill());
    source.streams.insert(stream_path::CONTENTS, build_contents());
    source.streams.insert(stream_path::ESCHER_DELAY, build_delay());
    source.streams.insert(stream_path::ESCHER, build_escher());

    let mut collector = EventCollector::default();
    let parser = PubParser::new(source, &mut collector);
    assert!(parser.parse().unwrap());

    assert_eq!(
        collector.events,
        vec![
            // Quill: colors, defaults, fonts, then the deferred text.
            "text_color(0xff)".to_string(),
            "default_char_style(b=false,i=false,u=true)".to_string(),
            "default_para_style(Some(Left))".to_string(),
            "font(10 bytes)".to_string(),
            "text(0xabc)".to_string(),
            // Contents: palettes, document, then pages in order.
            "palette(64,128,255)".to_string(),
            "width(9144000)".to_string(),
            "height(6858000)".to_string(),
            "add_page(0x107)".to_string(),
            "master_page(0x107)".to_string(),
            "add_page(0x108)".to_string(),
            "text_shape(0xabc,0x109,0x108)".to_string(),
            "add_shape(0x109)".to_string(),
            "shape_page(0x109,0x108)".to_string(),
            // Delay stream.
            "add_image(1,Png)".to_string(),
            // Drawing stream.
            "shape_type(0x109,Rectangle)".to_string(),
            "shape_flip(0x109,false,false)".to_string(),
            "shape_order(0x109)".to_string(),
            "img_index(0x109,1)".to_string(),
            "line(0x109,0xff,9525,true)".to_string(),
            "fill(0x109,solid,false)".to_string(),
            "adjust(0x109,0,42)".to_string(),
            "margins(0x109,91440,91440,91440,91440)".to_string(),
            "coords(0x109,100,200,300,400)".to_string(),
            "go".to_string(),
        ]
    );

    assert_eq!(collector.images.len(), 1);
    assert_eq!(collector.images[0].1, ImgType::Png);
    assert_eq!(collector.images[0].2, b"fakepng!");

    assert_eq!(collector.texts.len(), 1);
    let (id, paragraphs) = &collector.texts[0];
    assert_eq!(*id, 0xABC);
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].spans.len(), 1);
    assert_eq!(paragraphs[0].spans[0].chars, utf16_bytes("Test"));
}

#[test]
fn missing_required_stream_is_fatal() {
    let mut source = MemorySource::default();
    source.streams.insert(stream_path::QUILL, build_quill());
    let mut collector = EventCollector::default();
    let parser = PubParser::new(source, &mut collector);
    assert!(parser.parse().is_err());
}

#[test]
fn missing_delay_stream_is_not_fatal() {
    let mut source = MemorySource::default();
    source.streams.insert(stream_path::QUILL, build_quill());
    source.streams.insert(stream_path::CONTENTS, build_contents());
    source.streams.insert(stream_path::ESCHER, build_escher());

    let mut collector = EventCollector::default();
    let parser = PubParser::new(source, &mut collector);
    assert!(parser.parse().unwrap());
    // The shape's pxId no longer resolves to a stored image, but the B-store
    // entry still claims image data, so the reference is still emitted.
    assert!(collector.events.contains(&"img_index(0x109,1)".to_string()));
    assert!(collector.images.is_empty());
}
