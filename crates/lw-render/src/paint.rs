//! Editor state → display list.
//!
//! Paint order, back to front: composite frames, actual edges, potential
//! edges, fading ghosts, node cards with their ports, the connection rubber
//! band, and finally the marquee rectangle.

use crate::scene::{DisplayList, DrawItem, Rgba, StrokeStyle, TextAlign};
use kurbo::{Affine, CubicBez, ParamCurve, Point, Rect, Size};
use lw_core::layout::{CompositeFrame, NodeGeometry, PORT_RADIUS, matching_inputs, node_geometry};
use lw_core::{Edge, FlowView, GraphStore, Node, NodeId, NodeStatus, PortRef, PortSide};
use std::collections::{HashMap, HashSet};

/// Horizontal pull of edge control points, as a fraction of the x distance.
pub const EDGE_CURVATURE: f64 = 0.5;

// ─── Theme ───────────────────────────────────────────────────────────────

/// Theme-dependent colors.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Rgba,
    pub node_border: Rgba,
    pub node_text: Rgba,
    pub selected_border: Rgba,
    pub problem_border: Rgba,
    pub placeholder_border: Rgba,
    pub placeholder_fill: Rgba,
    pub port_fill: Rgba,
    pub port_inactive: Rgba,
    pub port_source: Rgba,
    pub port_compatible: Rgba,
    pub edge_actual: Rgba,
    pub edge_potential: Rgba,
    pub edge_selected: Rgba,
    pub edge_label: Rgba,
    pub frame_fill: Rgba,
    pub frame_border: Rgba,
    pub marquee_fill: Rgba,
    pub marquee_border: Rgba,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Rgba::rgb(0xFA, 0xFA, 0xFA),
            node_border: Rgba::BLACK,
            node_text: Rgba::rgb(0x11, 0x18, 0x27),
            selected_border: Rgba::rgb(0x25, 0x63, 0xEB),
            problem_border: Rgba::rgb(0xDC, 0x26, 0x26),
            placeholder_border: Rgba::rgb(0x9C, 0xA3, 0xAF),
            placeholder_fill: Rgba::rgb(0xF3, 0xF4, 0xF6),
            port_fill: Rgba::rgb(0xE5, 0xE7, 0xEB),
            port_inactive: Rgba::rgb(0xD1, 0xD5, 0xDB),
            port_source: Rgba::rgb(0x3B, 0x82, 0xF6),
            port_compatible: Rgba::rgb(0x22, 0xC5, 0x5E),
            edge_actual: Rgba::rgb(0x22, 0xC5, 0x5E),
            edge_potential: Rgba::rgb(0xF9, 0x73, 0x16),
            edge_selected: Rgba::BLACK,
            edge_label: Rgba::rgb(0x37, 0x41, 0x51),
            frame_fill: Rgba::rgba(0x3B, 0x82, 0xF6, 0x14),
            frame_border: Rgba::rgb(0x93, 0xC5, 0xFD),
            marquee_fill: Rgba::rgba(0x3B, 0x82, 0xF6, 0x1F),
            marquee_border: Rgba::rgb(0x3B, 0x82, 0xF6),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(0x1C, 0x1C, 0x1E),
            node_border: Rgba::rgb(0xE5, 0xE7, 0xEB),
            node_text: Rgba::rgb(0x11, 0x18, 0x27),
            edge_selected: Rgba::WHITE,
            edge_label: Rgba::rgb(0xD1, 0xD5, 0xDB),
            ..Self::light()
        }
    }

    /// Card fill by resource category.
    pub fn category_fill(&self, category: &str) -> Rgba {
        match category {
            "food" => Rgba::rgb(0xE8, 0xE8, 0xE8),
            "water" => Rgba::rgb(0xD8, 0xD8, 0xD8),
            "waste" => Rgba::rgb(0xC8, 0xC8, 0xC8),
            "energy" => Rgba::rgb(0xB8, 0xB8, 0xB8),
            "processing" | "storage" => Rgba::rgb(0xD0, 0xD0, 0xD0),
            _ => Rgba::rgb(0xE8, 0xE8, 0xE8),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

// ─── Input ───────────────────────────────────────────────────────────────

/// A node visual that is no longer in the store's visible set but is still
/// fading out.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub node: Node,
    pub opacity: f32,
}

/// Everything the painter reads. Built by the editor once per frame.
pub struct PaintInput<'a> {
    pub store: &'a GraphStore,
    pub layouts: &'a HashMap<NodeId, NodeGeometry>,
    pub frames: &'a [CompositeFrame],
    pub size: Size,
    pub transform: Affine,
    pub theme: &'a Theme,
    /// Output port chosen as connection source, if any.
    pub connection_source: Option<&'a PortRef>,
    /// Drag-to-connect line from the source anchor to the pointer.
    pub rubber_band: Option<(Point, Point)>,
    pub marquee: Option<Rect>,
    /// Per-node opacity for fades; absent means fully opaque.
    pub opacity: &'a HashMap<NodeId, f32>,
    pub ghosts: &'a [Ghost],
}

// ─── Geometry shared with hit testing ────────────────────────────────────

/// Cubic from `from` to `to` leaving and arriving horizontally.
pub fn edge_curve(from: Point, to: Point) -> CubicBez {
    let dx = to.x - from.x;
    CubicBez::new(
        from,
        Point::new(from.x + dx * EDGE_CURVATURE, from.y),
        Point::new(to.x - dx * EDGE_CURVATURE, to.y),
        to,
    )
}

/// Endpoints of an edge: its named ports if present, else the card sides.
pub fn edge_endpoints(edge: &Edge, layouts: &HashMap<NodeId, NodeGeometry>) -> Option<(Point, Point)> {
    let src = layouts.get(&edge.source)?;
    let dst = layouts.get(&edge.target)?;
    let from = edge
        .source_port
        .as_ref()
        .and_then(|p| src.anchor(PortSide::Output, p))
        .unwrap_or_else(|| src.default_source_anchor());
    let to = edge
        .target_port
        .as_ref()
        .and_then(|p| dst.anchor(PortSide::Input, p))
        .unwrap_or_else(|| dst.default_target_anchor());
    Some((from, to))
}

/// Endpoints of a suggested edge: ports named after its resource type.
pub fn potential_endpoints(
    source: NodeId,
    target: NodeId,
    resource: &lw_core::PortName,
    layouts: &HashMap<NodeId, NodeGeometry>,
) -> Option<(Point, Point)> {
    let src = layouts.get(&source)?;
    let dst = layouts.get(&target)?;
    Some((
        src.anchor(PortSide::Output, resource)
            .unwrap_or_else(|| src.default_source_anchor()),
        dst.anchor(PortSide::Input, resource)
            .unwrap_or_else(|| dst.default_target_anchor()),
    ))
}

// ─── Painter ─────────────────────────────────────────────────────────────

pub fn build_display_list(input: &PaintInput<'_>) -> DisplayList {
    let mut items = Vec::new();
    let theme = input.theme;

    for frame in input.frames {
        paint_frame(&mut items, frame, theme);
    }

    paint_edges(&mut items, input);

    // Inputs a pending connection could land on; never the source's own.
    let compatible: HashSet<PortRef> = input
        .connection_source
        .map(|src| {
            matching_inputs(input.layouts, &src.port)
                .filter(|p| p.node != src.node)
                .collect()
        })
        .unwrap_or_default();

    for ghost in input.ghosts {
        let geometry = node_geometry(&ghost.node);
        let none = HashSet::new();
        paint_node(&mut items, &ghost.node, &geometry, input, &none, ghost.opacity, false);
    }

    for node in input.store.visible_nodes() {
        let Some(geometry) = input.layouts.get(&node.id) else {
            continue;
        };
        let opacity = input.opacity.get(&node.id).copied().unwrap_or(1.0);
        let selected = input.store.selection().contains_node(node.id);
        paint_node(&mut items, node, geometry, input, &compatible, opacity, selected);
    }

    if let Some((from, to)) = input.rubber_band {
        items.push(DrawItem::Line {
            from,
            to,
            stroke: StrokeStyle::dashed(theme.port_source, 2.0, 6.0, 4.0),
        });
    }

    if let Some(rect) = input.marquee {
        items.push(DrawItem::Rect {
            rect,
            radius: 0.0,
            fill: Some(theme.marquee_fill),
            stroke: Some(StrokeStyle::dashed(theme.marquee_border, 1.0, 4.0, 4.0)),
        });
    }

    DisplayList {
        size: input.size,
        background: theme.background,
        transform: input.transform,
        items,
    }
}

fn paint_frame(items: &mut Vec<DrawItem>, frame: &CompositeFrame, theme: &Theme) {
    items.push(DrawItem::Rect {
        rect: frame.rect,
        radius: 12.0,
        fill: Some(theme.frame_fill),
        stroke: Some(StrokeStyle::dashed(theme.frame_border, 2.0, 8.0, 4.0)),
    });
    let header = frame.header();
    items.push(DrawItem::Text {
        anchor: Point::new(header.x0 + 8.0, header.center().y),
        text: format!("{}  (double-click to collapse)", frame.title),
        size: 12.0,
        color: theme.frame_border,
        align: TextAlign::Start,
        bold: true,
    });
}

fn paint_edges(items: &mut Vec<DrawItem>, input: &PaintInput<'_>) {
    let theme = input.theme;
    let flow = FlowView::build(input.store);
    let selection = input.store.selection();

    for (edge_id, _, _) in flow.edges() {
        let Some(edge) = input.store.edge(edge_id) else {
            continue;
        };
        let Some((from, to)) = edge_endpoints(edge, input.layouts) else {
            log::warn!("edge {edge_id}: endpoint has no layout, skipping");
            continue;
        };
        let faded = input
            .opacity
            .get(&edge.source)
            .copied()
            .unwrap_or(1.0)
            .min(input.opacity.get(&edge.target).copied().unwrap_or(1.0));
        let stroke = if selection.contains_edge(edge_id) {
            StrokeStyle::solid(theme.edge_selected, 4.0)
        } else if edge.connection_type == lw_core::ConnectionType::Potential {
            StrokeStyle::dashed(theme.edge_potential, 1.0, 5.0, 5.0)
        } else {
            StrokeStyle::solid(theme.edge_actual, 2.0)
        };
        let curve = edge_curve(from, to);
        items.push(DrawItem::Curve {
            curve,
            stroke: stroke.fade(faded),
        });
        push_edge_label(items, &curve, edge.label_text(), theme.edge_label.fade(faded));
    }

    for (_, potential) in input.store.renderable_potential_edges() {
        let Some((from, to)) = potential_endpoints(
            potential.source,
            potential.target,
            &potential.resource_type,
            input.layouts,
        ) else {
            continue;
        };
        let curve = edge_curve(from, to);
        items.push(DrawItem::Curve {
            curve,
            stroke: StrokeStyle::dashed(theme.edge_potential, 2.0, 5.0, 5.0).fade(0.6),
        });
        push_edge_label(
            items,
            &curve,
            potential.resource_type.as_str(),
            theme.edge_potential.fade(0.6),
        );
    }
}

fn push_edge_label(items: &mut Vec<DrawItem>, curve: &CubicBez, text: &str, color: Rgba) {
    items.push(DrawItem::Text {
        anchor: curve.eval(0.5),
        text: text.to_owned(),
        size: 11.0,
        color,
        align: TextAlign::Center,
        bold: false,
    });
}

fn paint_node(
    items: &mut Vec<DrawItem>,
    node: &Node,
    geometry: &NodeGeometry,
    input: &PaintInput<'_>,
    compatible: &HashSet<PortRef>,
    opacity: f32,
    selected: bool,
) {
    let theme = input.theme;
    let rect = geometry.rect;

    let (fill, border) = if node.placeholder {
        (
            theme.placeholder_fill,
            StrokeStyle::dashed(theme.placeholder_border, 1.5, 6.0, 4.0),
        )
    } else {
        let fill = theme.category_fill(&node.category);
        let border = match (selected, node.status) {
            (true, _) => StrokeStyle::solid(theme.selected_border, 3.0),
            (false, NodeStatus::Problem) => StrokeStyle::solid(theme.problem_border, 2.0),
            (false, NodeStatus::Planned) => StrokeStyle::dashed(theme.node_border, 1.5, 6.0, 3.0),
            (false, NodeStatus::Normal) => StrokeStyle::solid(theme.node_border, 1.5),
        };
        (fill, border)
    };

    items.push(DrawItem::Rect {
        rect,
        radius: if node.is_composite() { 12.0 } else { 6.0 },
        fill: Some(fill.fade(opacity)),
        stroke: Some(border.fade(opacity)),
    });
    if node.is_composite() {
        // Inner outline marks a collapsed sub-system.
        items.push(DrawItem::Rect {
            rect: rect.inset(-4.0),
            radius: 9.0,
            fill: None,
            stroke: Some(StrokeStyle::solid(theme.node_border, 1.0).fade(opacity)),
        });
    }
    items.push(DrawItem::Text {
        anchor: Point::new(rect.center().x, rect.y0 + 18.0),
        text: node.display_name().to_owned(),
        size: 13.0,
        color: theme.node_text.fade(opacity),
        align: TextAlign::Center,
        bold: true,
    });

    if let Some(button) = geometry.info_button {
        items.push(DrawItem::Rect {
            rect: button,
            radius: 0.0,
            fill: Some(theme.port_fill.fade(opacity)),
            stroke: Some(StrokeStyle::solid(theme.node_border, 1.0).fade(opacity)),
        });
        items.push(DrawItem::Text {
            anchor: button.center(),
            text: "i".to_owned(),
            size: 12.0,
            color: theme.node_text.fade(opacity),
            align: TextAlign::Center,
            bold: true,
        });
    }

    if node.placeholder {
        return;
    }

    paint_ports(items, node.id, PortSide::Input, geometry, input, compatible, opacity);
    paint_ports(items, node.id, PortSide::Output, geometry, input, compatible, opacity);
}

fn paint_ports(
    items: &mut Vec<DrawItem>,
    node: NodeId,
    side: PortSide,
    geometry: &NodeGeometry,
    input: &PaintInput<'_>,
    compatible: &HashSet<PortRef>,
    opacity: f32,
) {
    let theme = input.theme;
    let anchors = match side {
        PortSide::Input => &geometry.inputs,
        PortSide::Output => &geometry.outputs,
    };
    for anchor in anchors {
        let (fill, radius) = match input.connection_source {
            Some(src) if src.node == node && src.side == side && src.port == anchor.name => {
                (theme.port_source, PORT_RADIUS + 2.0)
            }
            Some(_)
                if side == PortSide::Input
                    && compatible.contains(&PortRef::input(node, anchor.name.clone())) =>
            {
                (theme.port_compatible, PORT_RADIUS + 2.0)
            }
            _ if geometry.ports_active => (theme.port_fill, PORT_RADIUS),
            _ => (theme.port_inactive, PORT_RADIUS - 2.0),
        };
        items.push(DrawItem::Circle {
            center: anchor.center,
            radius,
            fill: Some(fill.fade(opacity)),
            stroke: Some(StrokeStyle::solid(theme.node_border, 1.0).fade(opacity)),
        });
        let (dx, align) = match side {
            PortSide::Input => (PORT_RADIUS + 4.0, TextAlign::Start),
            PortSide::Output => (-(PORT_RADIUS + 4.0), TextAlign::End),
        };
        items.push(DrawItem::Text {
            anchor: Point::new(anchor.center.x + dx, anchor.center.y),
            text: anchor.name.to_string(),
            size: 10.0,
            color: theme.node_text.fade(opacity),
            align,
            bold: false,
        });
    }
}
