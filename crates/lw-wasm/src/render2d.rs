//! Canvas2D backend: replays a display list onto an HTML `<canvas>`.

use kurbo::{Affine, Size};
use lw_render::{DrawItem, Rgba, StrokeStyle, Surface, TextAlign};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

pub struct Canvas2dSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Canvas2dSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn apply_stroke(&self, stroke: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&stroke.color.css());
        self.ctx.set_line_width(stroke.width);
        let dash = match stroke.dash {
            Some((on, off)) => js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off)),
            None => js_sys::Array::new(),
        };
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn fill_and_stroke(&self, fill: Option<Rgba>, stroke: Option<&StrokeStyle>) {
        if let Some(color) = fill {
            self.ctx.set_fill_style_str(&color.css());
            self.ctx.fill();
        }
        if let Some(stroke) = stroke {
            self.apply_stroke(stroke);
            self.ctx.stroke();
        }
    }
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

impl Surface for Canvas2dSurface<'_> {
    fn clear(&mut self, size: Size, background: Rgba) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_fill_style_str(&background.css());
        self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
    }

    fn set_transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let _ = self.ctx.set_transform(a, b, c, d, e, f);
    }

    fn draw(&mut self, item: &DrawItem) {
        let ctx = self.ctx;
        match item {
            DrawItem::Rect {
                rect,
                radius,
                fill,
                stroke,
            } => {
                rounded_rect_path(ctx, rect.x0, rect.y0, rect.width(), rect.height(), *radius);
                self.fill_and_stroke(*fill, stroke.as_ref());
            }
            DrawItem::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                ctx.begin_path();
                let _ = ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU);
                self.fill_and_stroke(*fill, stroke.as_ref());
            }
            DrawItem::Curve { curve, stroke } => {
                ctx.begin_path();
                ctx.move_to(curve.p0.x, curve.p0.y);
                ctx.bezier_curve_to(
                    curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y,
                );
                self.fill_and_stroke(None, Some(stroke));
            }
            DrawItem::Line { from, to, stroke } => {
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                self.fill_and_stroke(None, Some(stroke));
            }
            DrawItem::Text {
                anchor,
                text,
                size,
                color,
                align,
                bold,
            } => {
                let weight = if *bold { "600" } else { "400" };
                ctx.set_font(&format!("{weight} {size}px {FONT_FAMILY}"));
                ctx.set_text_align(match align {
                    TextAlign::Start => "left",
                    TextAlign::Center => "center",
                    TextAlign::End => "right",
                });
                ctx.set_text_baseline("middle");
                ctx.set_fill_style_str(&color.css());
                let _ = ctx.fill_text(text, anchor.x, anchor.y);
            }
        }
    }
}
