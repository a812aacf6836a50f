//! Property field ids consumed from FOPT, tertiary FOPT and the Publisher
//! client records.
//!
//! FOPT ids are MS-ODRAW property ids and must stay bit-exact with that
//! specification. The client anchor and client data records are
//! Publisher-specific; their ids are local to the containing record.

// Publisher client data.
pub const SHAPE_ID: u16 = 0x0001;

// Publisher client anchor.
pub const XS: u16 = 0x0001;
pub const YS: u16 = 0x0002;
pub const XE: u16 = 0x0003;
pub const YE: u16 = 0x0004;

// Transform property set.
pub const ROTATION: u16 = 0x0004;

// Text property set (inset margins).
pub const DY_TEXT_LEFT: u16 = 0x0081;
pub const DY_TEXT_TOP: u16 = 0x0082;
pub const DY_TEXT_RIGHT: u16 = 0x0083;
pub const DY_TEXT_BOTTOM: u16 = 0x0084;

// Blip property set.
pub const PXID: u16 = 0x0104;

// Geometry property set.
pub const ADJUST_VALUE_1: u16 = 0x0147;
pub const ADJUST_VALUE_2: u16 = 0x0148;
pub const ADJUST_VALUE_3: u16 = 0x0149;

// Fill property set.
pub const FILL_TYPE: u16 = 0x0180;
pub const FILL_COLOR: u16 = 0x0181;
pub const FILL_OPACITY: u16 = 0x0182;
pub const FILL_BACK_COLOR: u16 = 0x0183;
pub const FILL_BACK_OPACITY: u16 = 0x0184;
pub const BG_PXID: u16 = 0x0186;
pub const FILL_ANGLE: u16 = 0x018B;
pub const FILL_FOCUS: u16 = 0x018C;
pub const FIELD_STYLE_BOOL_PROPS: u16 = 0x01BF;

// Line property set.
pub const LINE_COLOR: u16 = 0x01C0;
pub const LINE_WIDTH: u16 = 0x01CB;
pub const LINE_STYLE_BOOL_PROPS: u16 = 0x01FF;

// Per-side line property sets in the tertiary FOPT.
pub const LINE_LEFT_COLOR: u16 = 0x0538;
pub const LINE_LEFT_WIDTH: u16 = 0x0543;
pub const LINE_LEFT_BOOL_PROPS: u16 = 0x0577;
pub const LINE_TOP_COLOR: u16 = 0x0578;
pub const LINE_TOP_WIDTH: u16 = 0x0583;
pub const LINE_TOP_BOOL_PROPS: u16 = 0x05B7;
pub const LINE_RIGHT_COLOR: u16 = 0x05B8;
pub const LINE_RIGHT_WIDTH: u16 = 0x05C3;
pub const LINE_RIGHT_BOOL_PROPS: u16 = 0x05F7;
pub const LINE_BOTTOM_COLOR: u16 = 0x05F8;
pub const LINE_BOTTOM_WIDTH: u16 = 0x0603;
pub const LINE_BOTTOM_BOOL_PROPS: u16 = 0x0637;
