//! Shape-level types: geometry, shape kinds, lines and flags.

use crate::style::ColorReference;

/// Default line width in EMU when a line carries no explicit width.
pub const DEFAULT_LINE_WIDTH_EMU: u32 = 9525;

/// Default text inset margin in EMU (0.1 inch) for each unset side.
pub const DEFAULT_TEXT_MARGIN_EMU: u32 = 91_440;

// OfficeArt shape flags (FSP flags word).
pub const SF_GROUP: u32 = 0x0001;
pub const SF_CHILD: u32 = 0x0002;
pub const SF_PATRIARCH: u32 = 0x0004;
pub const SF_DELETED: u32 = 0x0008;
pub const SF_OLE_SHAPE: u32 = 0x0010;
pub const SF_HAVE_MASTER: u32 = 0x0020;
pub const SF_FLIP_H: u32 = 0x0040;
pub const SF_FLIP_V: u32 = 0x0080;
pub const SF_CONNECTOR: u32 = 0x0100;
pub const SF_HAVE_ANCHOR: u32 = 0x0200;
pub const SF_BACKGROUND: u32 = 0x0400;
pub const SF_HAVE_SPT: u32 = 0x0800;

// Line-style boolean property bits, with their use-flags shifted up 16.
pub const FLAG_LINE: u32 = 0x0000_0008;
pub const FLAG_USE_LINE: u32 = 0x0008_0000;
pub const FLAG_LEFT_INSET_PEN_OK: u32 = 0x0000_0020;
pub const FLAG_LEFT_INSET_PEN: u32 = 0x0000_0040;
pub const FLAG_USE_LEFT_INSET_PEN_OK: u32 = 0x0020_0000;
pub const FLAG_USE_LEFT_INSET_PEN: u32 = 0x0040_0000;

/// Axis-aligned rectangle in EMU.
///
/// Shape-group containers use these both as the logical coordinate system
/// declared by an FSPGR record and as resolved absolute page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinate {
    pub xs: i32,
    pub ys: i32,
    pub xe: i32,
    pub ye: i32,
}

impl Coordinate {
    #[inline]
    pub const fn new(xs: i32, ys: i32, xe: i32, ye: i32) -> Self {
        Self { xs, ys, xe, ye }
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.xe - self.xs
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.ye - self.ys
    }
}

/// One border line of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub color: ColorReference,
    pub width_in_emu: u32,
    /// False for the zero-width placeholder emitted when a per-side line is
    /// absent from a tertiary property set.
    pub visible: bool,
}

impl Line {
    #[inline]
    pub const fn new(color: ColorReference, width_in_emu: u32, visible: bool) -> Self {
        Self {
            color,
            width_in_emu,
            visible,
        }
    }

    /// The placeholder line for an absent side.
    #[inline]
    pub const fn invisible() -> Self {
        Self::new(ColorReference::new(0), 0, false)
    }
}

/// Where a border is drawn relative to the shape outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderPosition {
    InsideShape,
    HalfInsideShape,
    OutsideShape,
}

/// Embedded image formats found in the delay stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImgType {
    Png,
    Jpeg,
    Wmf,
    Emf,
    Tiff,
    Dib,
    Pict,
}

/// Page classification by content-chunk sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    Normal,
    Master,
    Dummy,
}

impl PageType {
    /// Publisher stores the master page and a handful of internal dummy
    /// pages at fixed sequence numbers.
    pub fn from_seq_num(seq_num: u32) -> Self {
        match seq_num {
            0x107 => Self::Master,
            0x10D | 0x110 | 0x113 | 0x117 => Self::Dummy,
            _ => Self::Normal,
        }
    }
}

/// OfficeArt shape geometry kinds (MSOSPT), reduced to the values Publisher
/// documents actually use plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ShapeType {
    NotPrimitive = 0,
    Rectangle = 1,
    RoundRectangle = 2,
    Ellipse = 3,
    Diamond = 4,
    IsoscelesTriangle = 5,
    RightTriangle = 6,
    Parallelogram = 7,
    Trapezoid = 8,
    Hexagon = 9,
    Octagon = 10,
    Plus = 11,
    Star = 12,
    Arrow = 13,
    ThickArrow = 14,
    HomePlate = 15,
    Cube = 16,
    Balloon = 17,
    Seal = 18,
    Arc = 19,
    Line = 20,
    Plaque = 21,
    Can = 22,
    Donut = 23,
    StraightConnector1 = 32,
    BentConnector2 = 33,
    BentConnector3 = 34,
    CurvedConnector3 = 38,
    Callout1 = 41,
    Callout2 = 42,
    Callout3 = 43,
    Ribbon = 53,
    Ribbon2 = 54,
    Chevron = 55,
    Pentagon = 56,
    NoSmoking = 57,
    Seal8 = 58,
    Seal16 = 59,
    Seal32 = 60,
    Wave = 64,
    FoldedCorner = 65,
    LeftArrow = 66,
    DownArrow = 67,
    UpArrow = 68,
    LeftRightArrow = 69,
    UpDownArrow = 70,
    IrregularSeal1 = 71,
    IrregularSeal2 = 72,
    LightningBolt = 73,
    Heart = 74,
    PictureFrame = 75,
    QuadArrow = 76,
    Bevel = 84,
    LeftBracket = 85,
    RightBracket = 86,
    LeftBrace = 87,
    RightBrace = 88,
    Seal24 = 92,
    StripedRightArrow = 93,
    NotchedRightArrow = 94,
    BlockArc = 95,
    SmileyFace = 96,
    VerticalScroll = 97,
    HorizontalScroll = 98,
    CircularArrow = 99,
    UturnArrow = 101,
    FlowChartProcess = 109,
    FlowChartDecision = 110,
    FlowChartInputOutput = 111,
    FlowChartDocument = 114,
    FlowChartTerminator = 116,
    FlowChartConnector = 120,
    Seal4 = 187,
    DoubleWave = 188,
    TextBox = 202,
    Unknown = 0xFFFF,
}

impl From<u16> for ShapeType {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::NotPrimitive,
            1 => Self::Rectangle,
            2 => Self::RoundRectangle,
            3 => Self::Ellipse,
            4 => Self::Diamond,
            5 => Self::IsoscelesTriangle,
            6 => Self::RightTriangle,
            7 => Self::Parallelogram,
            8 => Self::Trapezoid,
            9 => Self::Hexagon,
            10 => Self::Octagon,
            11 => Self::Plus,
            12 => Self::Star,
            13 => Self::Arrow,
            14 => Self::ThickArrow,
            15 => Self::HomePlate,
            16 => Self::Cube,
            17 => Self::Balloon,
            18 => Self::Seal,
            19 => Self::Arc,
            20 => Self::Line,
            21 => Self::Plaque,
            22 => Self::Can,
            23 => Self::Donut,
            32 => Self::StraightConnector1,
            33 => Self::BentConnector2,
            34 => Self::BentConnector3,
            38 => Self::CurvedConnector3,
            41 => Self::Callout1,
            42 => Self::Callout2,
            43 => Self::Callout3,
            53 => Self::Ribbon,
            54 => Self::Ribbon2,
            55 => Self::Chevron,
            56 => Self::Pentagon,
            57 => Self::NoSmoking,
            58 => Self::Seal8,
            59 => Self::Seal16,
            60 => Self::Seal32,
            64 => Self::Wave,
            65 => Self::FoldedCorner,
            66 => Self::LeftArrow,
            67 => Self::DownArrow,
            68 => Self::UpArrow,
            69 => Self::LeftRightArrow,
            70 => Self::UpDownArrow,
            71 => Self::IrregularSeal1,
            72 => Self::IrregularSeal2,
            73 => Self::LightningBolt,
            74 => Self::Heart,
            75 => Self::PictureFrame,
            76 => Self::QuadArrow,
            84 => Self::Bevel,
            85 => Self::LeftBracket,
            86 => Self::RightBracket,
            87 => Self::LeftBrace,
            88 => Self::RightBrace,
            92 => Self::Seal24,
            93 => Self::StripedRightArrow,
            94 => Self::NotchedRightArrow,
            95 => Self::BlockArc,
            96 => Self::SmileyFace,
            97 => Self::VerticalScroll,
            98 => Self::HorizontalScroll,
            99 => Self::CircularArrow,
            101 => Self::UturnArrow,
            109 => Self::FlowChartProcess,
            110 => Self::FlowChartDecision,
            111 => Self::FlowChartInputOutput,
            114 => Self::FlowChartDocument,
            116 => Self::FlowChartTerminator,
            120 => Self::FlowChartConnector,
            187 => Self::Seal4,
            188 => Self::DoubleWave,
            202 => Self::TextBox,
            _ => Self::Unknown,
        }
    }
}
