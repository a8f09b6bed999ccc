//! In-memory mirror of the authoritative graph.
//!
//! The store holds the full node and edge sets exactly as the authority
//! sent them. Visibility (hidden flags, composite expansion, dangling edges)
//! is applied at read time so nothing is lost when a composite collapses
//! again.

use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, Node, PotentialEdge, Position};
use std::collections::HashMap;

/// Current selection. Node focus and edge focus are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    /// Replace the node selection, clearing any edge focus.
    pub fn set_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.edges.clear();
        self.nodes.clear();
        for id in ids {
            if !self.nodes.contains(&id) {
                self.nodes.push(id);
            }
        }
    }

    /// Add nodes to the selection, clearing any edge focus.
    pub fn extend_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.edges.clear();
        for id in ids {
            if !self.nodes.contains(&id) {
                self.nodes.push(id);
            }
        }
    }

    /// Toggle a node in or out of the selection. Returns the new membership.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        self.edges.clear();
        if let Some(pos) = self.nodes.iter().position(|n| *n == id) {
            self.nodes.remove(pos);
            false
        } else {
            self.nodes.push(id);
            true
        }
    }

    /// Select exactly one edge, clearing node focus.
    pub fn set_edge(&mut self, id: EdgeId) {
        self.nodes.clear();
        self.edges.clear();
        self.edges.push(id);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    potential_edges: Vec<PotentialEdge>,
    expanded: Vec<NodeId>,
    selection: Selection,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Reconciliation ──────────────────────────────────────────────────

    /// Replace every authority node with `nodes`.
    ///
    /// Local placeholders survive unless the payload carries the same id.
    /// Selection entries whose node vanished are pruned.
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        let placeholders: Vec<Node> = self
            .nodes
            .drain(..)
            .filter(|n| n.placeholder && !nodes.iter().any(|m| m.id == n.id))
            .collect();
        self.index.clear();
        for node in nodes.into_iter().chain(placeholders) {
            self.push_or_replace(node);
        }
        self.reindex();
        self.prune_selection();
        log::debug!("store: replaced nodes, {} total", self.nodes.len());
    }

    pub fn replace_edges(&mut self, edges: Vec<Edge>) {
        self.edges.clear();
        for edge in edges {
            if let Some(existing) = self.edges.iter_mut().find(|e| e.id == edge.id) {
                *existing = edge;
            } else {
                self.edges.push(edge);
            }
        }
        self.prune_selection();
    }

    pub fn replace_potential_edges(&mut self, potential: Vec<PotentialEdge>) {
        self.potential_edges = potential;
    }

    /// Insert a node, or replace the node with the same id in place.
    pub fn upsert_node(&mut self, node: Node) {
        self.push_or_replace(node);
    }

    /// Remove nodes, every edge touching them, and their selection entries.
    /// Returns how many nodes were removed.
    pub fn remove_nodes_by_ids(&mut self, ids: &[NodeId]) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        let removed = before - self.nodes.len();
        if removed > 0 {
            self.reindex();
            self.edges
                .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
            self.potential_edges
                .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
            self.expanded.retain(|id| !ids.contains(id));
            self.prune_selection();
        }
        removed
    }

    /// Drop every node and edge, placeholders included.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.potential_edges.clear();
        self.expanded.clear();
        self.selection.clear();
    }

    // ─── Expansion ───────────────────────────────────────────────────────

    /// Add or remove `id` from the expansion set.
    /// Returns `true` if membership changed.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        let present = self.expanded.contains(&id);
        match (present, expanded) {
            (false, true) => {
                self.expanded.push(id);
                true
            }
            (true, false) => {
                self.expanded.retain(|e| *e != id);
                true
            }
            _ => false,
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expanded(&self) -> &[NodeId] {
        &self.expanded
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: NodeId, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_hidden(&mut self, ids: &[NodeId], hidden: bool) {
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            node.hidden = hidden;
        }
        self.prune_selection();
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn potential_edges(&self) -> &[PotentialEdge] {
        &self.potential_edges
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.placeholder)
    }

    /// Visible = not hidden, not an expanded composite, and either top-level
    /// or a child of an expanded composite.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| self.node_visible(n))
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| self.node_visible(n))
    }

    /// Edges whose endpoints are both visible. Dangling edges are skipped.
    pub fn renderable_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| self.is_visible(e.source) && self.is_visible(e.target))
    }

    pub fn renderable_potential_edges(&self) -> impl Iterator<Item = (usize, &PotentialEdge)> {
        self.potential_edges
            .iter()
            .enumerate()
            .filter(|(_, e)| self.is_visible(e.source) && self.is_visible(e.target))
    }

    /// Visible children of an expanded composite.
    pub fn visible_children(&self, composite: NodeId) -> impl Iterator<Item = &Node> {
        self.visible_nodes()
            .filter(move |n| n.parent_composite_id == Some(composite))
    }

    fn node_visible(&self, n: &Node) -> bool {
        if n.hidden {
            return false;
        }
        if n.is_composite() && self.expanded.contains(&n.id) {
            return false;
        }
        match n.parent_composite_id {
            Some(parent) => self.expanded.contains(&parent),
            None => true,
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn push_or_replace(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.index.insert(node.id, self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, n) in self.nodes.iter().enumerate() {
            self.index.insert(n.id, i);
        }
    }

    fn prune_selection(&mut self) {
        let nodes = &self.nodes;
        let index = &self.index;
        self.selection
            .nodes
            .retain(|id| index.get(id).is_some_and(|&i| !nodes[i].hidden));
        let edges = &self.edges;
        self.selection
            .edges
            .retain(|id| edges.iter().any(|e| e.id == *id));
    }
}
