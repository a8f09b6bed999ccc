//! Normalization of authority payloads into model types.
//!
//! Node and edge collections arrive either as a JSON array or as an object
//! keyed by id, with a handful of field aliases depending on which server
//! path produced them. Everything funnels into ordered `Vec`s here so the
//! rest of the editor never sees the variation.

use crate::id::{EdgeId, NodeId};
use crate::model::{
    ConnectionType, Edge, Node, NodeKind, NodeStatus, PortName, Ports, Position, PotentialEdge,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{what}: expected a list or a map, got {found}")]
    NotACollection { what: &'static str, found: &'static str },

    #[error("{what} entry {key}: {source}")]
    Entry {
        what: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} entry {key} has no id")]
    MissingId { what: &'static str, key: String },
}

// ─── Raw records ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPorts {
    List(Vec<String>),
    Map(serde_json::Map<String, Value>),
}

impl RawPorts {
    fn into_ports(self) -> Ports {
        match self {
            RawPorts::List(names) => names.into_iter().map(PortName).collect(),
            RawPorts::Map(map) => map.into_iter().map(|(k, _)| PortName(k)).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawNode {
    id: Option<NodeId>,
    x: Option<f64>,
    y: Option<f64>,
    position: Option<RawPosition>,
    #[serde(alias = "input_ports")]
    inputs: Option<RawPorts>,
    #[serde(alias = "output_ports")]
    outputs: Option<RawPorts>,
    name: Option<String>,
    label: Option<String>,
    custom_name: Option<String>,
    category: Option<String>,
    status: Option<String>,
    hidden: Option<bool>,
    parent_composite_id: Option<NodeId>,
    composite_system_id: Option<Value>,
    project_id: Option<Value>,
}

#[derive(Deserialize)]
struct RawEdge {
    id: Option<EdgeId>,
    #[serde(alias = "source")]
    source_id: NodeId,
    #[serde(alias = "target")]
    target_id: NodeId,
    #[serde(alias = "source_port")]
    source_handle: Option<String>,
    #[serde(alias = "target_port")]
    target_handle: Option<String>,
    label: Option<String>,
    resource_type: Option<String>,
    connection_type: Option<String>,
}

#[derive(Deserialize)]
struct RawPotentialEdge {
    #[serde(alias = "source")]
    source_id: NodeId,
    #[serde(alias = "target")]
    target_id: NodeId,
    resource_type: String,
}

/// Scalar ids (`"7"` or `7`) as text.
fn scalar_text(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

impl RawNode {
    fn into_node(self, key: Option<&str>) -> Result<Node, DecodeError> {
        let id = match (self.id, key) {
            (Some(id), _) => id,
            (None, Some(k)) => NodeId::intern(k),
            (None, None) => {
                return Err(DecodeError::MissingId {
                    what: "node",
                    key: "<anonymous>".into(),
                });
            }
        };
        let composite_system_id = self.composite_system_id.and_then(scalar_text);
        let category = self.category.unwrap_or_default().to_lowercase();
        let kind = if category == "composite" || composite_system_id.is_some() {
            NodeKind::Composite
        } else {
            NodeKind::Resource
        };
        let position = match (self.x, self.y, self.position) {
            (Some(x), Some(y), _) => Position::new(x, y),
            (_, _, Some(p)) => Position::new(p.x, p.y),
            _ => Position::default(),
        };
        let status = match self.status.as_deref() {
            Some("planned") => NodeStatus::Planned,
            Some("problem") => NodeStatus::Problem,
            _ => NodeStatus::Normal,
        };

        let mut node = Node::new(id, kind, position);
        node.input_ports = self.inputs.map(RawPorts::into_ports).unwrap_or_default();
        node.output_ports = self.outputs.map(RawPorts::into_ports).unwrap_or_default();
        node.name = non_empty(self.name)
            .or(non_empty(self.label))
            .unwrap_or_else(|| id.as_str().to_owned());
        node.custom_name = non_empty(self.custom_name);
        node.category = category;
        node.status = status;
        node.hidden = self.hidden.unwrap_or(false);
        node.parent_composite_id = self.parent_composite_id;
        node.composite_system_id = composite_system_id;
        node.project_id = self.project_id.and_then(scalar_text);
        Ok(node)
    }
}

impl RawEdge {
    fn into_edge(self, key: Option<&str>) -> Edge {
        let id = match (self.id, key) {
            (Some(id), _) => id,
            (None, Some(k)) => EdgeId::intern(k),
            (None, None) => EdgeId::intern(&format!(
                "{}:{}->{}:{}",
                self.source_id,
                self.source_handle.as_deref().unwrap_or(""),
                self.target_id,
                self.target_handle.as_deref().unwrap_or(""),
            )),
        };
        Edge {
            id,
            source: self.source_id,
            target: self.target_id,
            source_port: non_empty(self.source_handle).map(PortName),
            target_port: non_empty(self.target_handle).map(PortName),
            connection_type: match self.connection_type.as_deref() {
                Some("potential") => ConnectionType::Potential,
                _ => ConnectionType::Actual,
            },
            resource_type: non_empty(self.resource_type),
            label: non_empty(self.label),
        }
    }
}

// ─── Collections ─────────────────────────────────────────────────────────

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// Flatten a list or keyed map into `(key, record)` pairs, in payload order.
fn entries<'v>(
    value: &'v Value,
    what: &'static str,
) -> Result<Vec<(Option<&'v str>, &'v Value)>, DecodeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.iter().map(|v| (None, v)).collect()),
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect()),
        other => Err(DecodeError::NotACollection {
            what,
            found: json_kind(other),
        }),
    }
}

fn parse<T: for<'de> Deserialize<'de>>(
    value: &Value,
    what: &'static str,
    key: Option<&str>,
    position: usize,
) -> Result<T, DecodeError> {
    T::deserialize(value).map_err(|source| DecodeError::Entry {
        what,
        key: key.map_or_else(|| format!("#{position}"), str::to_owned),
        source,
    })
}

pub fn decode_node(value: &Value) -> Result<Node, DecodeError> {
    parse::<RawNode>(value, "node", None, 0)?.into_node(None)
}

pub fn decode_nodes(value: &Value) -> Result<Vec<Node>, DecodeError> {
    entries(value, "nodes")?
        .into_iter()
        .enumerate()
        .map(|(i, (key, v))| parse::<RawNode>(v, "node", key, i)?.into_node(key))
        .collect()
}

pub fn decode_edges(value: &Value) -> Result<Vec<Edge>, DecodeError> {
    entries(value, "edges")?
        .into_iter()
        .enumerate()
        .map(|(i, (key, v))| Ok(parse::<RawEdge>(v, "edge", key, i)?.into_edge(key)))
        .collect()
}

pub fn decode_potential_edges(value: &Value) -> Result<Vec<PotentialEdge>, DecodeError> {
    entries(value, "potential edges")?
        .into_iter()
        .enumerate()
        .map(|(i, (key, v))| {
            let raw = parse::<RawPotentialEdge>(v, "potential edge", key, i)?;
            Ok(PotentialEdge {
                source: raw.source_id,
                target: raw.target_id,
                resource_type: PortName(raw.resource_type),
            })
        })
        .collect()
}

/// Decode, or drop the whole payload with a warning and yield an empty list.
pub fn or_empty<T>(what: &str, decoded: Result<Vec<T>, DecodeError>) -> Vec<T> {
    decoded.unwrap_or_else(|e| {
        log::warn!("dropping malformed {what} payload: {e}");
        Vec::new()
    })
}
