//! Shape fill variants.
//!
//! Fills are a tagged enum rather than trait objects; the collector matches
//! on the variant.

use crate::style::ColorReference;

/// Raw OfficeArt fill-type values (MSOFILLTYPE). The shade family (4 through
/// 8) all render as linear gradients here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Solid,
    Pattern,
    Texture,
    Bitmap,
    Gradient,
    Other,
}

impl From<u32> for FillKind {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Solid,
            1 => Self::Pattern,
            2 => Self::Texture,
            3 => Self::Bitmap,
            4..=8 => Self::Gradient,
            _ => Self::Other,
        }
    }
}

/// A resolved shape fill.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(SolidFill),
    Gradient(GradientFill),
    Image(ImgFill),
    Pattern(PatternFill),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidFill {
    pub color: ColorReference,
    /// 0.0 transparent to 1.0 opaque.
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: ColorReference,
    /// Position along the gradient axis, 0 to 100.
    pub offset_percent: i32,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientFill {
    /// Gradient axis angle in degrees.
    pub angle: i32,
    pub stops: Vec<GradientStop>,
}

impl GradientFill {
    #[inline]
    pub fn new(angle: i32) -> Self {
        Self {
            angle,
            stops: Vec::new(),
        }
    }

    /// Append a color stop. Stops must be added in increasing offset order.
    pub fn add_color(&mut self, color: ColorReference, offset_percent: i32, opacity: f64) {
        debug_assert!(
            self.stops
                .last()
                .is_none_or(|s| s.offset_percent <= offset_percent),
            "gradient stops out of order"
        );
        self.stops.push(GradientStop {
            color,
            offset_percent,
            opacity,
        });
    }
}

/// Fill with an embedded image, stretched or tiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImgFill {
    /// 1-based delay index of the image.
    pub img_index: u32,
    /// Tiled as a texture rather than stretched.
    pub is_texture: bool,
}

/// Two-color pattern fill keyed by an embedded pattern image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternFill {
    /// 1-based delay index of the pattern image.
    pub img_index: u32,
    pub foreground: ColorReference,
    pub background: ColorReference,
}
