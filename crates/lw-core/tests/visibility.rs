//! Integration tests: visibility rules across store, layout, and flow view.
//!
//! Random graphs with composites, hidden flags, and dangling edges must
//! render exactly what direct visibility computation says.

use lw_core::layout::resolve_layout;
use lw_core::wire::{decode_edges, decode_nodes};
use lw_core::{Edge, FlowView, GraphStore, Node, NodeId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn build(
    node_count: usize,
    parents: &[Option<usize>],
    hidden: &[bool],
    edges: &[(usize, usize)],
    expanded: &[bool],
) -> GraphStore {
    let mut nodes = Vec::new();
    // Node 0 and 1 are composites; the rest may live inside them.
    for i in 0..node_count {
        let id = format!("p{i}");
        let mut node = if i < 2 {
            Node::composite(&id, i as f64 * 200.0, 0.0)
        } else {
            Node::resource(&id, i as f64 * 50.0, 100.0)
        };
        if i >= 2 {
            node.parent_composite_id = parents[i].map(|p| NodeId::intern(&format!("p{p}")));
        }
        node.hidden = hidden[i];
        nodes.push(node);
    }
    let edges = edges
        .iter()
        .enumerate()
        .map(|(k, (a, b))| Edge::new(&format!("pe{k}"), &format!("p{a}"), &format!("p{b}")))
        .collect();

    let mut store = GraphStore::new();
    store.replace_nodes(nodes);
    store.replace_edges(edges);
    for (i, e) in expanded.iter().enumerate() {
        store.set_expanded(NodeId::intern(&format!("p{i}")), *e);
    }
    store
}

proptest! {
    #[test]
    fn child_rendered_iff_parent_expanded(
        parents in prop::collection::vec(prop::option::of(0usize..2), 8),
        hidden in prop::collection::vec(any::<bool>(), 8),
        expanded in prop::collection::vec(any::<bool>(), 2),
    ) {
        let store = build(8, &parents, &hidden, &[], &expanded);
        for node in store.nodes() {
            let rendered = store.is_visible(node.id);
            if node.hidden {
                prop_assert!(!rendered);
                continue;
            }
            match node.parent_composite_id {
                Some(p) => prop_assert_eq!(rendered, store.is_expanded(p)),
                None if node.is_composite() => prop_assert_eq!(rendered, !store.is_expanded(node.id)),
                None => prop_assert!(rendered),
            }
        }
    }

    #[test]
    fn flow_view_edges_match_direct_visibility(
        parents in prop::collection::vec(prop::option::of(0usize..2), 8),
        hidden in prop::collection::vec(any::<bool>(), 8),
        edges in prop::collection::vec((0usize..10, 0usize..8), 0..16),
        expanded in prop::collection::vec(any::<bool>(), 2),
    ) {
        // Indices 8 and 9 never exist: those edges dangle.
        let store = build(8, &parents, &hidden, &edges, &expanded);
        let view = FlowView::build(&store);
        let from_view: Vec<String> = view.edges().map(|(e, _, _)| e.to_string()).collect();
        let direct: Vec<String> = store
            .edges()
            .iter()
            .filter(|e| store.is_visible(e.source) && store.is_visible(e.target))
            .map(|e| e.id.to_string())
            .collect();
        prop_assert_eq!(from_view, direct);

        let layouts = resolve_layout(&store);
        prop_assert_eq!(layouts.len(), store.visible_nodes().count());
    }
}

#[test]
fn reconciliation_is_idempotent() {
    let nodes = json!({
        "a": {"x": 0, "y": 0, "outputs": ["water"]},
        "b": {"x": 200, "y": 0, "inputs": ["water"]}
    });
    let edges = json!([{"id": "ab", "source_id": "a", "target_id": "b",
                        "source_handle": "water", "target_handle": "water"}]);

    let mut store = GraphStore::new();
    for _ in 0..2 {
        store.replace_nodes(decode_nodes(&nodes).unwrap());
        store.replace_edges(decode_edges(&edges).unwrap());
    }
    assert_eq!(store.nodes().len(), 2);
    assert_eq!(FlowView::build(&store).edge_count(), 1);
}
