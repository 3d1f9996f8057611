//! Text operators for content streams

use std::fmt::Write;

use crate::document::Color;
use crate::Align;

/// Orientation of the text baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    /// Left-to-right along the x axis
    #[default]
    Upright,
    /// Rotated 90° counter-clockwise: reads bottom-to-top
    Ccw90,
}

impl Rotation {
    /// Unit vector of the baseline direction in page space
    pub fn baseline_direction(self) -> (f64, f64) {
        match self {
            Rotation::Upright => (1.0, 0.0),
            Rotation::Ccw90 => (0.0, 1.0),
        }
    }
}

/// Font, size, color and orientation of one text run
pub struct TextRenderContext {
    /// Resource name in the page's /Font dictionary
    pub font_name: String,
    pub font_size: f32,
    /// Advance width of the whole run, used to align it
    pub text_width: f64,
    pub color: Color,
    pub rotation: Rotation,
}

impl TextRenderContext {
    /// Where the run must start so that `align` holds at the anchor
    fn start_point(&self, x: f64, y: f64, align: Align) -> (f64, f64) {
        let shift = match align {
            Align::Left => 0.0,
            Align::Center => self.text_width / 2.0,
            Align::Right => self.text_width,
        };
        let (dx, dy) = self.rotation.baseline_direction();
        (x - dx * shift, y - dy * shift)
    }
}

/// Hex-encode bytes as a PDF string operand, e.g. `<414243>`
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push('<');
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('>');
    out
}

/// Build a `BT ... ET` block drawing `text_hex` anchored at `(x, y)`
///
/// Upright runs are positioned with `Td`. Rotated runs set the text matrix
/// directly, and alignment moves the start point along the rotated baseline.
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let (sx, sy) = ctx.start_point(x, y, align);
    let Color { r, g, b } = ctx.color;

    let mut out = String::from("BT\n");
    let _ = writeln!(out, "{r} {g} {b} rg");
    let _ = writeln!(out, "/{} {} Tf", ctx.font_name, ctx.font_size);
    let _ = match ctx.rotation {
        Rotation::Upright => writeln!(out, "{sx} {sy} Td"),
        Rotation::Ccw90 => writeln!(out, "0 1 -1 0 {sx} {sy} Tm"),
    };
    let _ = writeln!(out, "{text_hex} Tj");
    out.push_str("ET\n");
    out.into_bytes()
}
