//! The collector contract.
//!
//! The parser is a producer of parsed facts; the document model that absorbs
//! them lives outside this crate. Facts arrive in a fixed order: colors and
//! fonts before text, text before shapes, delay images before the shape fills
//! that reference them.

use crate::fill::Fill;
use crate::shape::{BorderPosition, ImgType, Line, ShapeType};
use crate::style::{CharacterStyle, Color, ColorReference, ParagraphStyle, TextParagraph};

/// Sink for every fact the parser emits.
///
/// `seq_num` arguments are content-chunk sequence numbers, the cross-stream
/// key shared by the contents and drawing streams. Text payloads are raw
/// UTF-16LE bytes; decoding is the implementation's concern.
pub trait Collector {
    fn set_width_in_emu(&mut self, width: u32);
    fn set_height_in_emu(&mut self, height: u32);

    fn add_page(&mut self, seq_num: u32);
    fn designate_master_page(&mut self, seq_num: u32);
    fn set_page_bg_shape(&mut self, page_seq_num: u32, bg_shape_seq_num: u32);

    fn add_shape(&mut self, seq_num: u32);
    fn set_shape_page(&mut self, seq_num: u32, page_seq_num: u32);
    fn set_shape_type(&mut self, seq_num: u32, shape_type: ShapeType);
    fn set_shape_flip(&mut self, seq_num: u32, flip_vertical: bool, flip_horizontal: bool);
    fn set_shape_order(&mut self, seq_num: u32);
    fn set_current_group_seq_num(&mut self, seq_num: u32);
    fn begin_group(&mut self);
    fn end_group(&mut self);

    fn set_shape_coordinates_in_emu(&mut self, seq_num: u32, xs: i32, ys: i32, xe: i32, ye: i32);
    fn set_shape_rotation(&mut self, seq_num: u32, degrees: i16);
    fn set_shape_margins(&mut self, seq_num: u32, left: u32, top: u32, right: u32, bottom: u32);
    fn set_adjust_value(&mut self, seq_num: u32, index: usize, value: i32);

    fn add_shape_line(&mut self, seq_num: u32, line: Line);
    fn set_shape_border_position(&mut self, seq_num: u32, position: BorderPosition);
    fn set_shape_fill(&mut self, seq_num: u32, fill: Fill, skip_if_not_bg: bool);
    fn set_shape_img_index(&mut self, seq_num: u32, delay_index: u32);

    fn add_image(&mut self, index: u32, kind: ImgType, data: Vec<u8>);

    fn add_text_string(&mut self, paragraphs: Vec<TextParagraph>, id: u32);
    fn add_text_shape(&mut self, text_id: u32, seq_num: u32, page_seq_num: u32);
    fn add_font(&mut self, name: Vec<u8>);
    fn add_text_color(&mut self, color: ColorReference);
    fn add_palette_color(&mut self, color: Color);
    fn add_default_character_style(&mut self, style: CharacterStyle);
    fn add_default_paragraph_style(&mut self, style: ParagraphStyle);

    /// Commit the collected document. The return value becomes the parser's
    /// overall success.
    fn go(&mut self) -> bool;
}
