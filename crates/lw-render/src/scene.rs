//! Backend-neutral display list and the `Surface` capability.
//!
//! The painter turns editor state into a flat list of primitives in graph
//! space plus one layer transform. Backends (Vello, SVG, Canvas2D in the
//! WASM bridge) only need to know how to draw five primitives.

use kurbo::{Affine, CubicBez, Point, Rect, Size};

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB` or `#RRGGBB`, with or without the leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::rgb(
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            )),
            _ => None,
        }
    }

    /// Multiply alpha by `factor` (clamped to 0..=1).
    pub fn fade(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * f).round() as u8,
            ..self
        }
    }

    /// CSS `rgba(...)` notation.
    pub fn css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

// ─── Primitives ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
    /// Dash pattern `(on, off)`; `None` is solid.
    pub dash: Option<(f64, f64)>,
}

impl StrokeStyle {
    pub const fn solid(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Rgba, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }

    pub fn fade(self, factor: f32) -> Self {
        Self {
            color: self.color.fade(factor),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Rect {
        rect: Rect,
        radius: f64,
        fill: Option<Rgba>,
        stroke: Option<StrokeStyle>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Rgba>,
        stroke: Option<StrokeStyle>,
    },
    Curve {
        curve: CubicBez,
        stroke: StrokeStyle,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    Text {
        anchor: Point,
        text: String,
        size: f64,
        color: Rgba,
        align: TextAlign,
        bold: bool,
    },
}

/// One frame's worth of drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub size: Size,
    pub background: Rgba,
    /// Graph → surface transform applied to every item.
    pub transform: Affine,
    pub items: Vec<DrawItem>,
}

/// Something the display list can be drawn onto.
pub trait Surface {
    /// Reset to an empty surface of the given size.
    fn clear(&mut self, size: Size, background: Rgba);

    /// Set the graph → surface transform for subsequent items.
    fn set_transform(&mut self, transform: Affine);

    fn draw(&mut self, item: &DrawItem);
}

/// Draw a whole display list onto `surface`.
pub fn replay<S: Surface + ?Sized>(list: &DisplayList, surface: &mut S) {
    surface.clear(list.size, list.background);
    surface.set_transform(list.transform);
    for item in &list.items {
        surface.draw(item);
    }
    log::trace!("replayed {} items", list.items.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgba::from_hex("#22c55e"), Some(Rgba::rgb(0x22, 0xc5, 0x5e)));
        assert_eq!(Rgba::from_hex("fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn fade_scales_alpha() {
        assert_eq!(Rgba::BLACK.fade(0.6).a, 153);
        assert_eq!(Rgba::BLACK.fade(2.0).a, 255);
        assert_eq!(Rgba::rgb(249, 115, 22).fade(0.6).css(), "rgba(249, 115, 22, 0.600)");
        assert_eq!(Rgba::rgb(34, 197, 94).css(), "#22c55e");
    }
}
