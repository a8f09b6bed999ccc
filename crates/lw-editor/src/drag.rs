//! Node dragging, single or multi.
//!
//! Positions are always `origin + cumulative delta` from the press point,
//! never accumulated per frame, so rounding cannot drift. Snapping happens
//! once, at release.

use crate::sync::Intent;
use kurbo::{Point, Vec2};
use lw_core::geometry::snap_to_grid;
use lw_core::{GraphStore, NodeId, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pressed: NodeId,
    /// Press point in surface and graph space.
    press_screen: Point,
    press_graph: Point,
    /// Every moving node with its pre-drag position.
    origins: Vec<(NodeId, Position)>,
    moved: bool,
    /// Release without movement should narrow the selection to `pressed`.
    pub narrow_on_click: bool,
}

impl DragSession {
    /// Start dragging `pressed`. If it belongs to a selection of two or more
    /// nodes, every selected visible node comes along.
    pub fn begin(
        store: &GraphStore,
        pressed: NodeId,
        press_screen: Point,
        press_graph: Point,
        narrow_on_click: bool,
    ) -> Self {
        let selection = &store.selection().nodes;
        let members: Vec<NodeId> = if selection.len() >= 2 && selection.contains(&pressed) {
            selection
                .iter()
                .copied()
                .filter(|id| store.is_visible(*id))
                .collect()
        } else {
            vec![pressed]
        };
        let origins = members
            .into_iter()
            .filter_map(|id| store.node(id).map(|n| (id, n.position)))
            .collect();
        Self {
            pressed,
            press_screen,
            press_graph,
            origins,
            moved: false,
            narrow_on_click,
        }
    }

    pub fn pressed(&self) -> NodeId {
        self.pressed
    }

    pub fn moved(&self) -> bool {
        self.moved
    }

    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.origins.iter().map(|(id, _)| *id)
    }

    /// Move members to follow the pointer. Returns `true` if anything moved.
    pub fn update(
        &mut self,
        store: &mut GraphStore,
        screen: Point,
        graph: Point,
        threshold: f64,
    ) -> bool {
        if !self.moved && screen.distance(self.press_screen) <= threshold {
            return false;
        }
        if !self.moved {
            log::debug!("drag: {} node(s) from {}", self.origins.len(), self.pressed);
        }
        self.moved = true;
        let delta = graph - self.press_graph;
        for (id, origin) in &self.origins {
            store.set_position(*id, offset(*origin, delta));
        }
        true
    }

    /// Snap every member and report one `node_moved` per member.
    pub fn finish(self, store: &mut GraphStore, grid: f64) -> Vec<Intent> {
        if !self.moved {
            return Vec::new();
        }
        self.origins
            .iter()
            .filter_map(|(id, _)| {
                let current = store.node(*id)?.position.to_point();
                let snapped = snap_to_grid(current, grid);
                store.set_position(*id, snapped.into());
                Some(Intent::NodeMoved {
                    node_id: *id,
                    x: snapped.x,
                    y: snapped.y,
                })
            })
            .collect()
    }

    /// Put every member back where it started.
    pub fn cancel(self, store: &mut GraphStore) {
        for (id, origin) in self.origins {
            store.set_position(id, origin);
        }
    }
}

fn offset(p: Position, delta: Vec2) -> Position {
    Position::new(p.x + delta.x, p.y + delta.y)
}
