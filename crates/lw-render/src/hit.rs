//! Hit testing: graph-space point → what is under it.
//!
//! Walks the painted layers front to back: ports, info buttons, node cards,
//! composite frame headers, edges, then suggested edges.

use crate::paint::{edge_curve, edge_endpoints, potential_endpoints};
use kurbo::{ParamCurveNearest, Point, Rect};
use lw_core::geometry::overlaps;
use lw_core::layout::{CompositeFrame, NodeGeometry, PORT_RADIUS};
use lw_core::{EdgeId, GraphStore, NodeId, PortRef};
use std::collections::HashMap;

/// Extra slack around port circles, in graph units.
const PORT_SLOP: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Port(PortRef),
    /// The info button on a node card.
    NodeInfo(NodeId),
    Node(NodeId),
    /// Title strip of an expanded composite's container frame.
    FrameHeader(NodeId),
    Edge(EdgeId),
    /// Index into the store's potential edges.
    PotentialEdge(usize),
    Canvas,
}

/// Point and rectangle queries against whatever is on screen.
pub trait HitTester {
    fn hit(&self, point: Point) -> Hit;

    /// Visible nodes whose card overlaps `rect`. Used by marquee selection.
    fn hit_rect(&self, rect: Rect) -> Vec<NodeId>;
}

/// Hit testing from resolved node geometry.
pub struct GeometricHitTester<'a> {
    pub store: &'a GraphStore,
    pub layouts: &'a HashMap<NodeId, NodeGeometry>,
    pub frames: &'a [CompositeFrame],
    /// Edge pick distance in graph units.
    pub edge_tolerance: f64,
}

impl GeometricHitTester<'_> {
    fn hit_port(&self, point: Point) -> Option<PortRef> {
        let reach = PORT_RADIUS + PORT_SLOP;
        for node in self.visible_front_to_back() {
            let Some(g) = self.layouts.get(&node) else {
                continue;
            };
            if !g.ports_active {
                continue;
            }
            if let Some(a) = g.outputs.iter().find(|a| a.center.distance(point) <= reach) {
                return Some(PortRef::output(node, a.name.clone()));
            }
            if let Some(a) = g.inputs.iter().find(|a| a.center.distance(point) <= reach) {
                return Some(PortRef::input(node, a.name.clone()));
            }
        }
        None
    }

    fn hit_node(&self, point: Point) -> Option<NodeId> {
        self.visible_front_to_back().find(|id| {
            self.layouts
                .get(id)
                .is_some_and(|g| g.rect.contains(point))
        })
    }

    fn hit_edge(&self, point: Point) -> Option<EdgeId> {
        let tol_sq = self.edge_tolerance * self.edge_tolerance;
        self.store
            .renderable_edges()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find(|edge| {
                edge_endpoints(edge, self.layouts).is_some_and(|(from, to)| {
                    edge_curve(from, to).nearest(point, 0.1).distance_sq <= tol_sq
                })
            })
            .map(|e| e.id)
    }

    fn hit_potential(&self, point: Point) -> Option<usize> {
        let tol_sq = self.edge_tolerance * self.edge_tolerance;
        self.store
            .renderable_potential_edges()
            .find(|(_, p)| {
                potential_endpoints(p.source, p.target, &p.resource_type, self.layouts)
                    .is_some_and(|(from, to)| {
                        edge_curve(from, to).nearest(point, 0.1).distance_sq <= tol_sq
                    })
            })
            .map(|(i, _)| i)
    }

    fn visible_front_to_back(&self) -> impl Iterator<Item = NodeId> + '_ {
        let ids: Vec<NodeId> = self.store.visible_nodes().map(|n| n.id).collect();
        ids.into_iter().rev()
    }
}

impl HitTester for GeometricHitTester<'_> {
    fn hit(&self, point: Point) -> Hit {
        if let Some(port) = self.hit_port(point) {
            return Hit::Port(port);
        }
        if let Some(node) = self.hit_node(point) {
            let on_info = self
                .layouts
                .get(&node)
                .and_then(|g| g.info_button)
                .is_some_and(|b| b.contains(point));
            return if on_info { Hit::NodeInfo(node) } else { Hit::Node(node) };
        }
        if let Some(frame) = self.frames.iter().rev().find(|f| f.header().contains(point)) {
            return Hit::FrameHeader(frame.id);
        }
        if let Some(edge) = self.hit_edge(point) {
            return Hit::Edge(edge);
        }
        if let Some(i) = self.hit_potential(point) {
            return Hit::PotentialEdge(i);
        }
        Hit::Canvas
    }

    fn hit_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.store
            .visible_nodes()
            .filter(|n| !n.placeholder)
            .filter(|n| {
                self.layouts
                    .get(&n.id)
                    .is_some_and(|g| overlaps(g.rect, rect))
            })
            .map(|n| n.id)
            .collect()
    }
}
