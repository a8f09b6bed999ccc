//! Display list → standalone SVG document (diagram export).

use crate::scene::{DrawItem, Rgba, StrokeStyle, Surface, TextAlign};
use kurbo::{Affine, Size};
use std::fmt::Write;

#[derive(Default)]
pub struct SvgSurface {
    header: String,
    body: String,
    transform: Option<Affine>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close any open group and return the document.
    pub fn finish(mut self) -> String {
        if self.transform.is_some() {
            self.body.push_str("</g>\n");
        }
        format!("{}{}</svg>\n", self.header, self.body)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn color_attr(name: &str, c: Rgba) -> String {
    if c.a == 255 {
        format!(r##" {name}="#{:02X}{:02X}{:02X}""##, c.r, c.g, c.b)
    } else {
        format!(
            r##" {name}="#{:02X}{:02X}{:02X}" {name}-opacity="{:.3}""##,
            c.r,
            c.g,
            c.b,
            c.a as f32 / 255.0
        )
    }
}

fn paint_attrs(fill: Option<Rgba>, stroke: Option<&StrokeStyle>) -> String {
    let mut out = match fill {
        Some(c) => color_attr("fill", c),
        None => r#" fill="none""#.to_owned(),
    };
    if let Some(s) = stroke {
        out.push_str(&color_attr("stroke", s.color));
        let _ = write!(out, r#" stroke-width="{}""#, s.width);
        if let Some((on, off)) = s.dash {
            let _ = write!(out, r#" stroke-dasharray="{on} {off}""#);
        }
    }
    out
}

impl Surface for SvgSurface {
    fn clear(&mut self, size: Size, background: Rgba) {
        self.body.clear();
        self.transform = None;
        self.header = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n  <rect width=\"100%\" height=\"100%\"{bg}/>\n",
            w = size.width,
            h = size.height,
            bg = color_attr("fill", background),
        );
    }

    fn set_transform(&mut self, transform: Affine) {
        if self.transform.is_some() {
            self.body.push_str("</g>\n");
        }
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let _ = writeln!(self.body, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#);
        self.transform = Some(transform);
    }

    fn draw(&mut self, item: &DrawItem) {
        let out = &mut self.body;
        let _ = match item {
            DrawItem::Rect {
                rect,
                radius,
                fill,
                stroke,
            } => writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{radius}"{}/>"#,
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
                paint_attrs(*fill, stroke.as_ref()),
            ),
            DrawItem::Circle {
                center,
                radius,
                fill,
                stroke,
            } => writeln!(
                out,
                r#"  <circle cx="{}" cy="{}" r="{radius}"{}/>"#,
                center.x,
                center.y,
                paint_attrs(*fill, stroke.as_ref()),
            ),
            DrawItem::Curve { curve, stroke } => writeln!(
                out,
                r#"  <path d="M{} {} C{} {} {} {} {} {}"{}/>"#,
                curve.p0.x,
                curve.p0.y,
                curve.p1.x,
                curve.p1.y,
                curve.p2.x,
                curve.p2.y,
                curve.p3.x,
                curve.p3.y,
                paint_attrs(None, Some(stroke)),
            ),
            DrawItem::Line { from, to, stroke } => writeln!(
                out,
                r#"  <line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                from.x,
                from.y,
                to.x,
                to.y,
                paint_attrs(None, Some(stroke)),
            ),
            DrawItem::Text {
                anchor,
                text,
                size,
                color,
                align,
                bold,
            } => {
                let anchor_attr = match align {
                    TextAlign::Start => "start",
                    TextAlign::Center => "middle",
                    TextAlign::End => "end",
                };
                let weight = if *bold { " font-weight=\"600\"" } else { "" };
                writeln!(
                    out,
                    r#"  <text x="{}" y="{}" font-size="{size}" text-anchor="{anchor_attr}" dominant-baseline="middle"{weight}{}>{}</text>"#,
                    anchor.x,
                    anchor.y,
                    color_attr("fill", *color),
                    escape(text),
                )
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DisplayList, replay};
    use kurbo::{Point, Rect};

    #[test]
    fn writes_grouped_document() {
        let list = DisplayList {
            size: Size::new(200.0, 100.0),
            background: Rgba::WHITE,
            transform: Affine::translate((50.0, 0.0)),
            items: vec![
                DrawItem::Rect {
                    rect: Rect::new(0.0, 0.0, 140.0, 80.0),
                    radius: 6.0,
                    fill: Some(Rgba::rgb(0xE8, 0xE8, 0xE8)),
                    stroke: Some(StrokeStyle::dashed(Rgba::BLACK, 1.5, 6.0, 3.0)),
                },
                DrawItem::Text {
                    anchor: Point::new(70.0, 18.0),
                    text: "Fish & Chips".into(),
                    size: 13.0,
                    color: Rgba::BLACK,
                    align: TextAlign::Center,
                    bold: true,
                },
            ],
        };
        let mut svg = SvgSurface::new();
        replay(&list, &mut svg);
        let doc = svg.finish();

        assert!(doc.starts_with("<svg "));
        assert!(doc.contains(r#"<g transform="matrix(1 0 0 1 50 0)">"#));
        assert!(doc.contains(r#"stroke-dasharray="6 3""#));
        assert!(doc.contains("Fish &amp; Chips"));
        assert!(doc.ends_with("</g>\n</svg>\n"));
    }
}
