//! Core data model for living-web flow diagrams.
//!
//! A diagram is a directed graph: nodes are resource producers/consumers
//! (or composite sub-systems grouping other nodes), edges carry a named
//! resource from an output port to an input port. Positions are graph-space
//! coordinates and may be negative.

use crate::id::{EdgeId, NodeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ─── Ports ───────────────────────────────────────────────────────────────

/// Name of a resource port, e.g. `water` or `compost`.
/// Ports connect iff their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortName(pub String);

impl PortName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered port list. Most nodes have a handful of ports.
pub type Ports = SmallVec<[PortName; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Input,
    Output,
}

/// A specific port on a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub side: PortSide,
    pub port: PortName,
}

impl PortRef {
    pub fn output(node: NodeId, port: impl Into<PortName>) -> Self {
        Self {
            node,
            side: PortSide::Output,
            port: port.into(),
        }
    }

    pub fn input(node: NodeId, port: impl Into<PortName>) -> Self {
        Self {
            node,
            side: PortSide::Input,
            port: port.into(),
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Graph-space position (top-left corner of the node).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Resource,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Normal,
    Planned,
    Problem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub input_ports: Ports,
    pub output_ports: Ports,
    /// Set when this node is a child of a composite.
    pub parent_composite_id: Option<NodeId>,
    /// Composite nodes only: the saved system they instantiate.
    pub composite_system_id: Option<String>,
    /// Authority-provided name.
    pub name: String,
    /// User override of `name`.
    pub custom_name: Option<String>,
    pub category: String,
    pub status: NodeStatus,
    pub hidden: bool,
    pub project_id: Option<String>,
    /// Local-only optimistic node awaiting the authority.
    pub placeholder: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            input_ports: Ports::new(),
            output_ports: Ports::new(),
            parent_composite_id: None,
            composite_system_id: None,
            name: id.as_str().to_owned(),
            custom_name: None,
            category: match kind {
                NodeKind::Resource => String::new(),
                NodeKind::Composite => "composite".to_owned(),
            },
            status: NodeStatus::Normal,
            hidden: false,
            project_id: None,
            placeholder: false,
        }
    }

    pub fn resource(id: &str, x: f64, y: f64) -> Self {
        Self::new(NodeId::intern(id), NodeKind::Resource, Position::new(x, y))
    }

    pub fn composite(id: &str, x: f64, y: f64) -> Self {
        Self::new(NodeId::intern(id), NodeKind::Composite, Position::new(x, y))
    }

    /// Optimistic stand-in rendered while a drop awaits the authority.
    pub fn placeholder(id: NodeId, position: Position) -> Self {
        let mut node = Self::new(id, NodeKind::Resource, position);
        node.name = "Loading...".to_owned();
        node.placeholder = true;
        node
    }

    pub fn with_inputs<I, P>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PortName>,
    {
        self.input_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, P>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PortName>,
    {
        self.output_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_composite(mut self, parent: NodeId) -> Self {
        self.parent_composite_id = Some(parent);
        self
    }

    pub fn is_composite(&self) -> bool {
        self.kind == NodeKind::Composite
    }

    /// The name shown on the canvas: custom name if set, else the authority name.
    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.name)
    }

    pub fn has_port(&self, side: PortSide, port: &PortName) -> bool {
        let ports = match side {
            PortSide::Input => &self.input_ports,
            PortSide::Output => &self.output_ports,
        };
        ports.contains(port)
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Actual,
    Potential,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_port: Option<PortName>,
    pub target_port: Option<PortName>,
    pub connection_type: ConnectionType,
    pub resource_type: Option<String>,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: EdgeId::intern(id),
            source: NodeId::intern(source),
            target: NodeId::intern(target),
            source_port: None,
            target_port: None,
            connection_type: ConnectionType::Actual,
            resource_type: None,
            label: None,
        }
    }

    pub fn with_ports(mut self, source_port: &str, target_port: &str) -> Self {
        self.source_port = Some(source_port.into());
        self.target_port = Some(target_port.into());
        self
    }

    /// Text drawn at the curve midpoint.
    pub fn label_text(&self) -> &str {
        self.resource_type
            .as_deref()
            .or(self.source_port.as_ref().map(PortName::as_str))
            .or(self.target_port.as_ref().map(PortName::as_str))
            .or(self.label.as_deref())
            .unwrap_or("connection")
    }
}

/// An authority-suggested connection the user may accept with a click.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub resource_type: PortName,
}
