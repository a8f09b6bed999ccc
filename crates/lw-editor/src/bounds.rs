//! Canvas bounds: how big the drawable surface must be.
//!
//! Nodes may sit at negative coordinates. The surface shifts its origin by
//! an offset so they stay reachable, grows to cover all content plus
//! padding, and never shrinks below the visible viewport.

use crate::config::EditorConfig;
use kurbo::{Point, Rect, Size, Vec2};
use lw_core::geometry::union_all;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    pub size: Size,
    /// Added to graph coordinates before zoom and pan.
    pub origin_offset: Vec2,
    pub scroll_x: bool,
    pub scroll_y: bool,
}

impl SurfaceLayout {
    pub fn empty(viewport: Size) -> Self {
        Self {
            size: viewport,
            origin_offset: Vec2::ZERO,
            scroll_x: false,
            scroll_y: false,
        }
    }
}

/// A layout change for the host to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsUpdate {
    pub layout: SurfaceLayout,
    /// Scroll position to restore after applying the layout, so the
    /// viewport does not snap when the surface grows or its origin shifts.
    pub restore_scroll: Point,
}

/// Pure layout computation from visible node rectangles.
pub fn compute_layout(
    rects: &[Rect],
    viewport: Size,
    padding: f64,
    margin: f64,
) -> SurfaceLayout {
    let Some(bbox) = union_all(rects.iter().copied()) else {
        return SurfaceLayout::empty(viewport);
    };

    let offset = Vec2::new(
        if bbox.x0 < 0.0 { -bbox.x0 + padding } else { 0.0 },
        if bbox.y0 < 0.0 { -bbox.y0 + padding } else { 0.0 },
    );
    let adjusted: Vec<Rect> = rects.iter().map(|r| *r + offset).collect();
    let scroll_x = adjusted
        .iter()
        .any(|r| r.x0 < margin || r.x1 > viewport.width - margin);
    let scroll_y = adjusted
        .iter()
        .any(|r| r.y0 < margin || r.y1 > viewport.height - margin);

    let adj = bbox + offset;
    let extent_w = (adj.x1 + padding) - (adj.x0 - padding).min(0.0);
    let extent_h = (adj.y1 + padding) - (adj.y0 - padding).min(0.0);

    SurfaceLayout {
        size: Size::new(viewport.width.max(extent_w), viewport.height.max(extent_h)),
        origin_offset: offset,
        scroll_x,
        scroll_y,
    }
}

/// Tracks the current surface layout and defers recomputation during drags.
#[derive(Debug, Clone)]
pub struct CanvasBounds {
    viewport: Size,
    padding: f64,
    margin: f64,
    layout: SurfaceLayout,
    scroll: Point,
    /// Scroll captured when a drag suspended updates.
    saved_scroll: Option<Point>,
}

impl CanvasBounds {
    pub fn new(viewport: Size, config: &EditorConfig) -> Self {
        Self {
            viewport,
            padding: config.canvas_padding,
            margin: config.edge_margin,
            layout: SurfaceLayout::empty(viewport),
            scroll: Point::ZERO,
            saved_scroll: None,
        }
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    pub fn is_suspended(&self) -> bool {
        self.saved_scroll.is_some()
    }

    /// Stop recomputing until [`resume`](Self::resume); remembers the scroll.
    pub fn suspend(&mut self) {
        if self.saved_scroll.is_none() {
            self.saved_scroll = Some(self.scroll);
        }
    }

    /// Recompute now, unless suspended. Returns an update only on change.
    pub fn recompute(&mut self, rects: &[Rect]) -> Option<BoundsUpdate> {
        if self.is_suspended() {
            log::trace!("bounds: deferred while dragging");
            return None;
        }
        self.apply(rects, self.scroll)
    }

    /// End a suspension: recompute and hand back the scroll to restore.
    pub fn resume(&mut self, rects: &[Rect]) -> Option<BoundsUpdate> {
        let saved = self.saved_scroll.take()?;
        self.scroll = saved;
        let update = self.apply(rects, saved);
        update.or(Some(BoundsUpdate {
            layout: self.layout,
            restore_scroll: saved,
        }))
    }

    fn apply(&mut self, rects: &[Rect], restore: Point) -> Option<BoundsUpdate> {
        let next = compute_layout(rects, self.viewport, self.padding, self.margin);
        if next == self.layout {
            return None;
        }
        log::debug!(
            "bounds: surface {}x{}, offset ({}, {})",
            next.size.width,
            next.size.height,
            next.origin_offset.x,
            next.origin_offset.y
        );
        self.layout = next;
        Some(BoundsUpdate {
            layout: next,
            restore_scroll: restore,
        })
    }
}
