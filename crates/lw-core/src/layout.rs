//! Node geometry: on-screen size of each visible node and where its ports sit.
//!
//! Nodes are fixed-width cards. Input ports stack down the left edge,
//! output ports down the right edge, below a header row holding the name.
//! All coordinates are graph space.

use crate::geometry::union_all;
use crate::id::NodeId;
use crate::model::{Node, NodeKind, PortName, PortRef, PortSide};
use crate::store::GraphStore;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use std::collections::HashMap;

pub const NODE_WIDTH: f64 = 140.0;
pub const NODE_MIN_HEIGHT: f64 = 80.0;
pub const COMPOSITE_WIDTH: f64 = 160.0;
pub const COMPOSITE_MIN_HEIGHT: f64 = 90.0;
pub const HEADER_HEIGHT: f64 = 36.0;
pub const PORT_SPACING: f64 = 18.0;
pub const PORT_RADIUS: f64 = 6.0;
/// Height of the title strip above a composite container frame.
pub const FRAME_HEADER_HEIGHT: f64 = 24.0;
/// Square info button in the bottom-right corner of every card.
pub const INFO_BUTTON_SIZE: f64 = 20.0;
pub const INFO_BUTTON_INSET: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PortAnchor {
    pub name: PortName,
    pub center: Point,
}

/// Resolved geometry of one visible node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    pub rect: Rect,
    pub inputs: SmallVec<[PortAnchor; 4]>,
    pub outputs: SmallVec<[PortAnchor; 4]>,
    /// Ports accept connection gestures. Only top-level resource nodes do;
    /// composites and composite children show static port labels.
    pub ports_active: bool,
    /// Placeholders have none.
    pub info_button: Option<Rect>,
}

impl NodeGeometry {
    pub fn anchor(&self, side: PortSide, port: &PortName) -> Option<Point> {
        let anchors = match side {
            PortSide::Input => &self.inputs,
            PortSide::Output => &self.outputs,
        };
        anchors.iter().find(|a| &a.name == port).map(|a| a.center)
    }

    /// Right-center: where an edge without a named source port leaves.
    pub fn default_source_anchor(&self) -> Point {
        Point::new(self.rect.x1, self.rect.center().y)
    }

    /// Left-center: where an edge without a named target port arrives.
    pub fn default_target_anchor(&self) -> Point {
        Point::new(self.rect.x0, self.rect.center().y)
    }
}

/// Labelled frame drawn around the visible children of an expanded composite.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFrame {
    pub id: NodeId,
    pub title: String,
    pub rect: Rect,
}

impl CompositeFrame {
    pub fn header(&self) -> Rect {
        Rect::new(
            self.rect.x0,
            self.rect.y0 - FRAME_HEADER_HEIGHT,
            self.rect.x1,
            self.rect.y0,
        )
    }
}

/// Node size from its kind and port count.
pub fn node_size(node: &Node) -> Size {
    let rows = node.input_ports.len().max(node.output_ports.len()) as f64;
    let (width, min_height) = match node.kind {
        NodeKind::Resource => (NODE_WIDTH, NODE_MIN_HEIGHT),
        NodeKind::Composite => (COMPOSITE_WIDTH, COMPOSITE_MIN_HEIGHT),
    };
    let needed = HEADER_HEIGHT + rows * PORT_SPACING + PORT_SPACING / 2.0;
    Size::new(width, min_height.max(needed))
}

pub fn node_geometry(node: &Node) -> NodeGeometry {
    let origin = node.position.to_point();
    let rect = Rect::from_origin_size(origin, node_size(node));
    let anchor = |x: f64, i: usize, name: &PortName| PortAnchor {
        name: name.clone(),
        center: Point::new(
            x,
            rect.y0 + HEADER_HEIGHT + i as f64 * PORT_SPACING + PORT_SPACING / 2.0,
        ),
    };
    NodeGeometry {
        rect,
        inputs: node
            .input_ports
            .iter()
            .enumerate()
            .map(|(i, p)| anchor(rect.x0, i, p))
            .collect(),
        outputs: node
            .output_ports
            .iter()
            .enumerate()
            .map(|(i, p)| anchor(rect.x1, i, p))
            .collect(),
        ports_active: node.kind == NodeKind::Resource
            && node.parent_composite_id.is_none()
            && !node.placeholder,
        info_button: (!node.placeholder).then(|| {
            let corner = Point::new(rect.x1 - INFO_BUTTON_INSET, rect.y1 - INFO_BUTTON_INSET);
            Rect::new(
                corner.x - INFO_BUTTON_SIZE,
                corner.y - INFO_BUTTON_SIZE,
                corner.x,
                corner.y,
            )
        }),
    }
}

/// Resolve geometry for every visible node.
pub fn resolve_layout(store: &GraphStore) -> HashMap<NodeId, NodeGeometry> {
    store
        .visible_nodes()
        .map(|n| (n.id, node_geometry(n)))
        .collect()
}

/// Container frames for expanded composites that have visible children.
pub fn composite_frames(
    store: &GraphStore,
    layouts: &HashMap<NodeId, NodeGeometry>,
    padding: f64,
) -> Vec<CompositeFrame> {
    store
        .expanded()
        .iter()
        .filter_map(|&id| {
            let composite = store.node(id)?;
            let bounds = union_all(
                store
                    .visible_children(id)
                    .filter_map(|c| layouts.get(&c.id).map(|g| g.rect)),
            )?;
            Some(CompositeFrame {
                id,
                title: composite.display_name().to_owned(),
                rect: bounds.inflate(padding, padding),
            })
        })
        .collect()
}

/// Every active input port with the given name, across all visible nodes.
/// Order follows the layout map and is unspecified.
pub fn matching_inputs<'a>(
    layouts: &'a HashMap<NodeId, NodeGeometry>,
    port: &'a PortName,
) -> impl Iterator<Item = PortRef> + 'a {
    layouts.iter().filter(|(_, g)| g.ports_active).flat_map(move |(id, g)| {
        g.inputs
            .iter()
            .filter(move |a| &a.name == port)
            .map(move |a| PortRef::input(*id, a.name.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn resource_card_grows_with_ports() {
        let small = Node::resource("a", 0.0, 0.0).with_inputs(["water"]);
        assert_eq!(node_size(&small), Size::new(140.0, 80.0));

        let tall = Node::resource("b", 0.0, 0.0)
            .with_outputs(["water", "heat", "compost", "eggs", "meat"]);
        assert_eq!(node_size(&tall).height, HEADER_HEIGHT + 5.0 * PORT_SPACING + 9.0);
    }

    #[test]
    fn ports_anchor_on_card_edges() {
        let node = Node::resource("a", 100.0, 40.0)
            .with_inputs(["water"])
            .with_outputs(["compost", "heat"]);
        let g = node_geometry(&node);
        assert_eq!(g.anchor(PortSide::Input, &"water".into()), Some(Point::new(100.0, 85.0)));
        assert_eq!(g.anchor(PortSide::Output, &"heat".into()), Some(Point::new(240.0, 103.0)));
        assert_eq!(g.anchor(PortSide::Output, &"water".into()), None);
        assert!(g.ports_active);
    }

    #[test]
    fn composite_children_have_inactive_ports() {
        let child = Node::resource("c", 0.0, 0.0)
            .with_inputs(["water"])
            .in_composite(NodeId::intern("sys"));
        assert!(!node_geometry(&child).ports_active);
        let placeholder = Node::placeholder(NodeId::intern("temp_l"), Position::new(0.0, 0.0));
        assert!(!node_geometry(&placeholder).ports_active);
        assert_eq!(node_geometry(&placeholder).info_button, None);
    }

    #[test]
    fn info_button_sits_in_bottom_right_corner() {
        let g = node_geometry(&Node::resource("a", 100.0, 40.0));
        assert_eq!(g.info_button, Some(Rect::new(216.0, 96.0, 236.0, 116.0)));
    }

    #[test]
    fn matching_inputs_only_on_active_ports() {
        let sys = NodeId::intern("mi_sys");
        let mut store = GraphStore::new();
        store.replace_nodes(vec![
            Node::resource("mi_a", 0.0, 0.0).with_inputs(["water", "heat"]),
            Node::resource("mi_b", 300.0, 0.0).with_inputs(["heat"]),
            Node::composite("mi_sys", 0.0, 300.0),
            Node::resource("mi_c", 0.0, 400.0).with_inputs(["water"]).in_composite(sys),
        ]);
        store.set_expanded(sys, true);
        let layouts = resolve_layout(&store);
        let water = PortName::from("water");
        let found: Vec<PortRef> = matching_inputs(&layouts, &water).collect();
        assert_eq!(found, vec![PortRef::input(NodeId::intern("mi_a"), "water")]);
    }

    #[test]
    fn frame_wraps_visible_children() {
        let sys = NodeId::intern("frame_sys");
        let mut store = GraphStore::new();
        store.replace_nodes(vec![
            Node::composite("frame_sys", 0.0, 0.0),
            Node::resource("k1", 0.0, 0.0).in_composite(sys),
            Node::resource("k2", 200.0, 100.0).in_composite(sys),
        ]);
        store.set_expanded(sys, true);
        let layouts = resolve_layout(&store);
        let frames = composite_frames(&store, &layouts, 20.0);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].rect, Rect::new(-20.0, -20.0, 360.0, 200.0));
    }
}
