//! Zoom and pan.
//!
//! The layer transform is `scale(zoom) · translate(pan) · translate(offset)`
//! where `offset` comes from the canvas bounds manager. Nodes and edges share
//! this one transform so they can never drift apart.

use crate::config::EditorConfig;
use kurbo::{Affine, Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    zoom_min: f64,
    zoom_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl Viewport {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Multiply zoom by `factor`, clamped. Returns `true` if zoom changed.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let next = (self.zoom * factor).clamp(self.zoom_min, self.zoom_max);
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }

    /// Shift the layer by `(dx, dy)` graph units.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan += Vec2::new(dx, dy);
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    pub fn transform(&self, origin_offset: Vec2) -> Affine {
        Affine::scale(self.zoom) * Affine::translate(self.pan) * Affine::translate(origin_offset)
    }

    pub fn screen_to_graph(&self, p: Point, origin_offset: Vec2) -> Point {
        self.transform(origin_offset).inverse() * p
    }

    pub fn graph_to_screen(&self, p: Point, origin_offset: Vec2) -> Point {
        self.transform(origin_offset) * p
    }

    /// Surface-pixel distance expressed in graph units.
    pub fn screen_len_to_graph(&self, len: f64) -> f64 {
        len / self.zoom
    }
}
