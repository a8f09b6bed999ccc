//! Selection rules: click, shift-click, marquee, edge focus, toolbar state.
//!
//! Each operation mutates the store's selection and returns the intent that
//! echoes the new selection to the authority (or `None` when nothing changed).

use crate::sync::Intent;
use kurbo::{Point, Rect};
use lw_core::geometry::normalize_rect;
use lw_core::{EdgeId, GraphStore, NodeId};
use serde::Serialize;

fn nodes_selected(store: &GraphStore) -> Intent {
    Intent::NodesSelected {
        node_ids: store.selection().nodes.clone(),
    }
}

/// Result of pressing on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePress {
    pub intent: Option<Intent>,
    /// The press kept an existing multi-selection; a release without
    /// movement should narrow it to the pressed node.
    pub narrow_on_click: bool,
    /// The node is selected after the press (and so may be dragged).
    pub selected: bool,
}

pub fn press_node(store: &mut GraphStore, id: NodeId, shift: bool) -> NodePress {
    let before = store.selection().clone();
    let sel = store.selection_mut();
    let mut narrow_on_click = false;
    if shift {
        sel.toggle_node(id);
    } else if !sel.contains_node(id) {
        sel.set_nodes([id]);
    } else {
        // Keep a multi-selection intact so it can be dragged together.
        sel.edges.clear();
        narrow_on_click = sel.nodes.len() > 1;
    }
    let selected = store.selection().contains_node(id);
    let intent = (store.selection() != &before).then(|| nodes_selected(store));
    NodePress {
        intent,
        narrow_on_click,
        selected,
    }
}

/// Narrow the selection to exactly `id`.
pub fn narrow_to(store: &mut GraphStore, id: NodeId) -> Option<Intent> {
    if store.selection().nodes == [id] && store.selection().edges.is_empty() {
        return None;
    }
    store.selection_mut().set_nodes([id]);
    Some(nodes_selected(store))
}

pub fn select_edge(store: &mut GraphStore, id: EdgeId) -> Option<Intent> {
    if store.selection().edges == [id] && store.selection().nodes.is_empty() {
        return None;
    }
    store.selection_mut().set_edge(id);
    Some(Intent::EdgesSelected { edge_ids: vec![id] })
}

pub fn select_all(store: &mut GraphStore) -> Intent {
    let ids: Vec<NodeId> = store
        .visible_nodes()
        .filter(|n| !n.placeholder)
        .map(|n| n.id)
        .collect();
    store.selection_mut().set_nodes(ids);
    nodes_selected(store)
}

/// Clear both sets. Always reports, so the authority's view resets too.
pub fn deselect_all(store: &mut GraphStore) -> Intent {
    store.selection_mut().clear();
    Intent::DeselectAll
}

// ─── Marquee ─────────────────────────────────────────────────────────────

/// Rubber-band rectangle anchored in graph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub anchor: Point,
    pub current: Point,
    /// Shift was held at pointer-down: union instead of replace.
    pub additive: bool,
}

impl Marquee {
    pub fn new(anchor: Point, additive: bool) -> Self {
        Self {
            anchor,
            current: anchor,
            additive,
        }
    }

    pub fn rect(&self) -> Rect {
        normalize_rect(self.anchor, self.current)
    }

    /// Apply the marquee result `hits` (nodes overlapping [`rect`](Self::rect)).
    pub fn finish(&self, store: &mut GraphStore, hits: Vec<NodeId>) -> Option<Intent> {
        let before = store.selection().clone();
        if self.additive {
            store.selection_mut().extend_nodes(hits);
        } else {
            store.selection_mut().set_nodes(hits);
        }
        (store.selection() != &before).then(|| nodes_selected(store))
    }
}

// ─── Toolbar ─────────────────────────────────────────────────────────────

/// Which toolbar actions the current selection enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolbarState {
    pub selected_nodes: usize,
    pub selected_edges: usize,
    pub can_delete: bool,
    pub can_hide: bool,
    pub can_connect: bool,
    pub can_save_system: bool,
}

impl ToolbarState {
    pub fn from_store(store: &GraphStore) -> Self {
        let nodes = store.selection().nodes.len();
        let edges = store.selection().edges.len();
        Self {
            selected_nodes: nodes,
            selected_edges: edges,
            can_delete: nodes + edges > 0,
            can_hide: nodes > 0,
            can_connect: nodes == 2,
            can_save_system: nodes >= 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_core::Node;
    use pretty_assertions::assert_eq;

    fn store() -> GraphStore {
        let mut store = GraphStore::new();
        store.replace_nodes(vec![
            Node::resource("s1", 0.0, 0.0),
            Node::resource("s2", 200.0, 0.0),
            Node::resource("s3", 400.0, 0.0),
        ]);
        store
    }

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn press_replaces_toggles_and_keeps() {
        let mut store = store();
        let press = press_node(&mut store, id("s1"), false);
        assert_eq!(
            press.intent,
            Some(Intent::NodesSelected {
                node_ids: vec![id("s1")]
            })
        );
        press_node(&mut store, id("s2"), true);
        assert_eq!(store.selection().nodes, vec![id("s1"), id("s2")]);

        let keep = press_node(&mut store, id("s1"), false);
        assert_eq!(keep.intent, None);
        assert!(keep.narrow_on_click);
        assert_eq!(narrow_to(&mut store, id("s1")), Some(Intent::NodesSelected { node_ids: vec![id("s1")] }));

        let off = press_node(&mut store, id("s1"), true);
        assert!(!off.selected);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn marquee_replaces_or_unions() {
        let mut store = store();
        store.selection_mut().set_nodes([id("s3")]);
        let m = Marquee::new(Point::new(0.0, 0.0), false);
        m.finish(&mut store, vec![id("s1")]);
        assert_eq!(store.selection().nodes, vec![id("s1")]);

        let m = Marquee::new(Point::new(0.0, 0.0), true);
        m.finish(&mut store, vec![id("s2")]);
        assert_eq!(store.selection().nodes, vec![id("s1"), id("s2")]);
    }

    #[test]
    fn edge_focus_clears_nodes() {
        let mut store = store();
        store.replace_edges(vec![lw_core::Edge::new("s12", "s1", "s2")]);
        store.selection_mut().set_nodes([id("s1")]);
        select_edge(&mut store, EdgeId::intern("s12"));
        assert!(store.selection().nodes.is_empty());
        assert_eq!(select_edge(&mut store, EdgeId::intern("s12")), None);
    }

    #[test]
    fn toolbar_follows_selection() {
        let mut store = store();
        assert_eq!(ToolbarState::from_store(&store).can_delete, false);
        store.selection_mut().set_nodes([id("s1"), id("s2")]);
        let state = ToolbarState::from_store(&store);
        assert!(state.can_connect && state.can_save_system && state.can_hide);
        select_all(&mut store);
        let state = ToolbarState::from_store(&store);
        assert!(!state.can_connect);
        assert_eq!(state.selected_nodes, 3);
    }
}
