//! Sync bridge: the only path between the editor and the authority.
//!
//! - **Outbound**: every local mutation becomes an [`Intent`], serialized as
//!   `{"event": "<name>", "payload": {...}}` and sent fire-and-forget.
//! - **Inbound**: authority replies arrive in the same envelope and decode
//!   into [`AuthorityEvent`]s. Node and edge payloads go through
//!   [`lw_core::wire`]; malformed collections are dropped with a warning and
//!   replaced by an empty list rather than failing the whole event.

use crate::error::SyncError;
use crate::input::PaletteKind;
use lw_core::wire::{self, decode_edges, decode_node, decode_nodes, decode_potential_edges};
use lw_core::{Edge, EdgeId, Node, NodeId, PortName, PotentialEdge};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Outbound ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    NodeMoved {
        node_id: NodeId,
        x: f64,
        y: f64,
    },
    EdgeAdded {
        source_id: NodeId,
        target_id: NodeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        source_port: Option<PortName>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_port: Option<PortName>,
    },
    EdgesDeleted {
        edge_ids: Vec<EdgeId>,
    },
    NodesDeleted {
        node_ids: Vec<NodeId>,
    },
    NodesSelected {
        node_ids: Vec<NodeId>,
    },
    EdgesSelected {
        edge_ids: Vec<EdgeId>,
    },
    DeselectAll,
    NodeAdded {
        project_id: String,
        x: f64,
        y: f64,
        placeholder_id: NodeId,
    },
    CompositeNodeAdded {
        composite_id: String,
        x: f64,
        y: f64,
        placeholder_id: NodeId,
    },
    NodeRenamed {
        node_id: NodeId,
        custom_name: Option<String>,
    },
    ExpandCompositeNode {
        node_id: NodeId,
    },
    CollapseCompositeNode {
        node_id: NodeId,
    },
    SaveCompositeSystem {
        name: String,
        description: String,
        icon_name: Option<String>,
        node_ids: Vec<NodeId>,
    },
    NodesHidden {
        node_ids: Vec<NodeId>,
    },
    ShowAllNodes,
    ClearCanvas,
    Undo,
    Redo,
    ToggleKeyboardHelp,
    NodeInfoClicked {
        node_id: NodeId,
    },
    ShowSuggestions,
    ApplySuggestion {
        #[serde(rename = "type")]
        kind: String,
        action: Value,
    },
}

impl Intent {
    /// Wire event name, e.g. `node_moved`.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::NodeMoved { .. } => "node_moved",
            Intent::EdgeAdded { .. } => "edge_added",
            Intent::EdgesDeleted { .. } => "edges_deleted",
            Intent::NodesDeleted { .. } => "nodes_deleted",
            Intent::NodesSelected { .. } => "nodes_selected",
            Intent::EdgesSelected { .. } => "edges_selected",
            Intent::DeselectAll => "deselect_all",
            Intent::NodeAdded { .. } => "node_added",
            Intent::CompositeNodeAdded { .. } => "composite_node_added",
            Intent::NodeRenamed { .. } => "node_renamed",
            Intent::ExpandCompositeNode { .. } => "expand_composite_node",
            Intent::CollapseCompositeNode { .. } => "collapse_composite_node",
            Intent::SaveCompositeSystem { .. } => "save_composite_system",
            Intent::NodesHidden { .. } => "nodes_hidden",
            Intent::ShowAllNodes => "show_all_nodes",
            Intent::ClearCanvas => "clear_canvas",
            Intent::Undo => "undo",
            Intent::Redo => "redo",
            Intent::ToggleKeyboardHelp => "toggle_keyboard_help",
            Intent::NodeInfoClicked { .. } => "node_info_clicked",
            Intent::ShowSuggestions => "show_suggestions",
            Intent::ApplySuggestion { .. } => "apply_suggestion",
        }
    }

    pub fn to_json(&self) -> Value {
        // Serializing plain data into a Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ─── Suggestions ─────────────────────────────────────────────────────────

/// An improvement the authority proposes for the current diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `high`, `medium` or `low`.
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub description: String,
    /// Opaque; echoed back in `apply_suggestion`.
    #[serde(default)]
    pub action: Value,
}

impl Suggestion {
    pub fn apply_intent(&self) -> Intent {
        Intent::ApplySuggestion {
            kind: self.kind.clone(),
            action: self.action.clone(),
        }
    }
}

fn suggestions_field(payload: &Value) -> Vec<Suggestion> {
    match field(payload, "suggestions") {
        Value::Null => Vec::new(),
        value => Vec::<Suggestion>::deserialize(value).unwrap_or_else(|e| {
            log::warn!("sync: dropping malformed suggestions: {e}");
            Vec::new()
        }),
    }
}

// ─── Inbound ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityEvent {
    NodesUpdated {
        nodes: Vec<Node>,
        edges: Option<Vec<Edge>>,
    },
    EdgesUpdated {
        edges: Vec<Edge>,
    },
    NodeAddedSuccess {
        placeholder_id: Option<NodeId>,
        node: Node,
    },
    NodeAddError {
        placeholder_id: Option<NodeId>,
        message: String,
    },
    CompositeExpanded {
        node_id: NodeId,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
    CompositeCollapsed {
        node_id: NodeId,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    },
    CompositeSystemSaved {
        success: bool,
        message: Option<String>,
        nodes: Option<Vec<Node>>,
        edges: Option<Vec<Edge>>,
    },
    SelectionCleared,
    NodesSelected {
        node_ids: Vec<NodeId>,
    },
    PotentialEdgesUpdated {
        potential_edges: Vec<PotentialEdge>,
    },
    /// `edge_added_success` and `edges_deleted_success` both carry the full edge list.
    EdgesReplaced {
        edges: Vec<Edge>,
    },
    NodesDeleted {
        node_ids: Vec<NodeId>,
    },
    NodesHidden {
        node_ids: Vec<NodeId>,
    },
    ShowAll {
        nodes: Vec<Node>,
    },
    CanvasCleared,
    ResetZoom,
    SuggestionsLoaded {
        suggestions: Vec<Suggestion>,
    },
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

fn field<'a>(payload: &'a Value, name: &str) -> &'a Value {
    payload.get(name).unwrap_or(&Value::Null)
}

fn nodes_field(payload: &Value, name: &str) -> Vec<Node> {
    wire::or_empty("nodes", decode_nodes(field(payload, name)))
}

fn edges_field(payload: &Value, name: &str) -> Vec<Edge> {
    wire::or_empty("edges", decode_edges(field(payload, name)))
}

fn optional<T>(payload: &Value, name: &str, decode: impl Fn(&Value, &str) -> Vec<T>) -> Option<Vec<T>> {
    match payload.get(name) {
        None | Some(Value::Null) => None,
        Some(_) => Some(decode(payload, name)),
    }
}

fn node_id(payload: &Value, event: &'static str, name: &'static str) -> Result<NodeId, SyncError> {
    match field(payload, name) {
        Value::String(s) => Ok(NodeId::intern(s)),
        Value::Number(n) => Ok(NodeId::intern(&n.to_string())),
        _ => Err(SyncError::MissingField { event, field: name }),
    }
}

fn placeholder_id(payload: &Value) -> Option<NodeId> {
    ["placeholder_id", "temp_id"]
        .iter()
        .find_map(|k| match payload.get(*k) {
            Some(Value::String(s)) => Some(NodeId::intern(s)),
            _ => None,
        })
}

/// Ids given either bare or as records with an `id` field.
fn id_list(value: &Value) -> Vec<NodeId> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(NodeId::intern(s)),
            Value::Number(n) => Some(NodeId::intern(&n.to_string())),
            Value::Object(o) => match o.get("id") {
                Some(Value::String(s)) => Some(NodeId::intern(s)),
                Some(Value::Number(n)) => Some(NodeId::intern(&n.to_string())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

impl AuthorityEvent {
    /// Decode a `{"event": ..., "payload": ...}` envelope.
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Self::from_parts(&envelope.event, &envelope.payload)
    }

    pub fn from_parts(event: &str, payload: &Value) -> Result<Self, SyncError> {
        let decoded = match event {
            "nodes_updated" => AuthorityEvent::NodesUpdated {
                nodes: nodes_field(payload, "nodes"),
                edges: optional(payload, "edges", edges_field),
            },
            "edges_updated" => AuthorityEvent::EdgesUpdated {
                edges: edges_field(payload, "edges"),
            },
            "node_added_success" | "composite_node_added_success" => {
                let placeholder_id = placeholder_id(payload);
                let record = payload.get("node").unwrap_or(payload);
                match decode_node(record) {
                    Ok(node) => AuthorityEvent::NodeAddedSuccess {
                        placeholder_id,
                        node,
                    },
                    // The placeholder must still go; report it as a failed add.
                    Err(err) => {
                        log::warn!("sync: {event}: undecodable node record: {err}");
                        AuthorityEvent::NodeAddError {
                            placeholder_id,
                            message: format!("invalid node record ({err})"),
                        }
                    }
                }
            }
            "node_add_error" | "composite_node_add_error" => AuthorityEvent::NodeAddError {
                placeholder_id: placeholder_id(payload),
                message: field(payload, "message")
                    .as_str()
                    .unwrap_or("unknown error")
                    .to_owned(),
            },
            "composite_expanded_success" => AuthorityEvent::CompositeExpanded {
                node_id: node_id(payload, "composite_expanded_success", "node_id")?,
                nodes: nodes_field(payload, "nodes"),
                edges: edges_field(payload, "edges"),
            },
            "composite_collapsed_success" => AuthorityEvent::CompositeCollapsed {
                node_id: node_id(payload, "composite_collapsed_success", "node_id")?,
                nodes: nodes_field(payload, "nodes"),
                edges: edges_field(payload, "edges"),
            },
            "composite_system_saved" => AuthorityEvent::CompositeSystemSaved {
                success: field(payload, "success").as_bool().unwrap_or(false),
                message: field(payload, "message").as_str().map(str::to_owned),
                nodes: optional(payload, "nodes", nodes_field),
                edges: optional(payload, "edges", edges_field),
            },
            "selection_cleared" => AuthorityEvent::SelectionCleared,
            "nodes_selected" => AuthorityEvent::NodesSelected {
                node_ids: id_list(field(payload, "nodes")),
            },
            "potential_edges_updated" => AuthorityEvent::PotentialEdgesUpdated {
                potential_edges: wire::or_empty(
                    "potential edges",
                    decode_potential_edges(field(payload, "potential_edges")),
                ),
            },
            "edge_added_success" | "edges_deleted_success" => AuthorityEvent::EdgesReplaced {
                edges: edges_field(payload, "edges"),
            },
            "nodes_deleted_success" => AuthorityEvent::NodesDeleted {
                node_ids: id_list(field(payload, "node_ids")),
            },
            "nodes_hidden_success" => AuthorityEvent::NodesHidden {
                node_ids: id_list(field(payload, "node_ids")),
            },
            "show_all_success" => AuthorityEvent::ShowAll {
                nodes: nodes_field(payload, "nodes"),
            },
            "canvas_cleared" => AuthorityEvent::CanvasCleared,
            "reset_zoom" => AuthorityEvent::ResetZoom,
            "suggestions_loaded" => AuthorityEvent::SuggestionsLoaded {
                suggestions: suggestions_field(payload),
            },
            other => return Err(SyncError::UnknownEvent(other.to_owned())),
        };
        Ok(decoded)
    }
}

// ─── Pending placements ──────────────────────────────────────────────────

/// A drop awaiting the authority's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    pub placeholder: NodeId,
    pub kind: PaletteKind,
    pub source_id: String,
    pub requested_at_ms: f64,
}

/// Outstanding optimistic placements. Entries never expire on their own;
/// hosts that want a timeout can inspect [`PendingPlacements::iter`].
#[derive(Debug, Default)]
pub struct PendingPlacements {
    entries: Vec<PendingPlacement>,
}

impl PendingPlacements {
    pub fn insert(&mut self, entry: PendingPlacement) {
        self.entries.push(entry);
    }

    pub fn take(&mut self, placeholder: NodeId) -> Option<PendingPlacement> {
        let pos = self.entries.iter().position(|e| e.placeholder == placeholder)?;
        Some(self.entries.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingPlacement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
