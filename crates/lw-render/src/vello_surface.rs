//! Display list → Vello scene.
//!
//! The host owns the wgpu device and presents the scene; this only records
//! drawing commands.

use crate::scene::{DrawItem, Rgba, StrokeStyle, Surface};
use kurbo::{Affine, BezPath, Circle, Line, Rect, RoundedRect, Shape, Size, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

pub struct VelloSurface<'a> {
    scene: &'a mut Scene,
    transform: Affine,
}

impl<'a> VelloSurface<'a> {
    /// Wrap a scene. It is reset on [`Surface::clear`].
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            transform: Affine::IDENTITY,
        }
    }

    fn fill<S: Shape>(&mut self, shape: &S, color: Rgba) {
        self.scene
            .fill(Fill::NonZero, self.transform, to_color(color), None, shape);
    }

    fn stroke<S: Shape>(&mut self, shape: &S, style: &StrokeStyle) {
        let mut stroke = Stroke::new(style.width);
        if let Some((on, off)) = style.dash {
            stroke = stroke.with_dashes(0.0, [on, off]);
        }
        self.scene
            .stroke(&stroke, self.transform, to_color(style.color), None, shape);
    }
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

impl Surface for VelloSurface<'_> {
    fn clear(&mut self, size: Size, background: Rgba) {
        self.scene.reset();
        let bg = Rect::from_origin_size((0.0, 0.0), size);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_color(background), None, &bg);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn draw(&mut self, item: &DrawItem) {
        match item {
            DrawItem::Rect {
                rect,
                radius,
                fill,
                stroke,
            } => {
                let shape = RoundedRect::from_rect(*rect, *radius);
                if let Some(color) = fill {
                    self.fill(&shape, *color);
                }
                if let Some(style) = stroke {
                    self.stroke(&shape, style);
                }
            }
            DrawItem::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let shape = Circle::new(*center, *radius);
                if let Some(color) = fill {
                    self.fill(&shape, *color);
                }
                if let Some(style) = stroke {
                    self.stroke(&shape, style);
                }
            }
            DrawItem::Curve { curve, stroke } => {
                let mut path = BezPath::new();
                path.move_to(curve.p0);
                path.curve_to(curve.p1, curve.p2, curve.p3);
                self.stroke(&path, stroke);
            }
            DrawItem::Line { from, to, stroke } => {
                self.stroke(&Line::new(*from, *to), stroke);
            }
            DrawItem::Text { text, .. } => {
                // Glyph layout needs a font context the host has not provided.
                log::trace!("vello: skipping text {text:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DisplayList, replay};

    #[test]
    fn replays_without_text_support() {
        let mut scene = Scene::new();
        let list = DisplayList {
            size: Size::new(100.0, 100.0),
            background: Rgba::WHITE,
            transform: Affine::scale(2.0),
            items: vec![
                DrawItem::Rect {
                    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                    radius: 2.0,
                    fill: Some(Rgba::BLACK),
                    stroke: Some(StrokeStyle::dashed(Rgba::BLACK, 1.0, 5.0, 5.0)),
                },
                DrawItem::Text {
                    anchor: (5.0, 5.0).into(),
                    text: "hen".into(),
                    size: 10.0,
                    color: Rgba::BLACK,
                    align: crate::scene::TextAlign::Center,
                    bold: false,
                },
            ],
        };
        let mut surface = VelloSurface::new(&mut scene);
        replay(&list, &mut surface);
        assert_eq!(surface.transform, Affine::scale(2.0));
    }
}
