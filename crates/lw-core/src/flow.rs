//! Directed view of what is currently on screen.
//!
//! Built on demand from a [`GraphStore`]: one graph node per visible node,
//! one graph edge per renderable edge. The renderer walks this instead of
//! re-filtering the store for every edge.

use crate::id::{EdgeId, NodeId};
use crate::store::GraphStore;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

pub struct FlowView {
    pub graph: StableDiGraph<NodeId, EdgeId>,
    index: HashMap<NodeId, NodeIndex>,
}

impl FlowView {
    pub fn build(store: &GraphStore) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index = HashMap::new();
        for node in store.visible_nodes() {
            index.insert(node.id, graph.add_node(node.id));
        }
        for edge in store.edges() {
            if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(a, b, edge.id);
            } else {
                log::trace!("flow: skipping dangling edge {}", edge.id);
            }
        }
        Self { graph, index }
    }

    /// Renderable edges as `(edge, source, target)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (*e.weight(), self.graph[e.source()], self.graph[e.target()]))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Visible nodes fed by `id`.
    pub fn downstream(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Visible nodes feeding `id`.
    pub fn upstream(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: NodeId, dir: Direction) -> Vec<NodeId> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n])
            .collect();
        // neighbors_directed yields most recent first
        out.reverse();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};
    use pretty_assertions::assert_eq;

    #[test]
    fn view_matches_store_visibility() {
        let sys = NodeId::intern("flow_sys");
        let mut store = GraphStore::new();
        store.replace_nodes(vec![
            Node::resource("well", 0.0, 0.0),
            Node::composite("flow_sys", 200.0, 0.0),
            Node::resource("tank", 0.0, 0.0).in_composite(sys),
        ]);
        store.replace_edges(vec![
            Edge::new("w-sys", "well", "flow_sys"),
            Edge::new("w-tank", "well", "tank"),
        ]);

        let collapsed = FlowView::build(&store);
        assert_eq!(collapsed.node_count(), 2);
        assert_eq!(collapsed.downstream(NodeId::intern("well")), vec![sys]);

        store.set_expanded(sys, true);
        let expanded = FlowView::build(&store);
        let edges: Vec<_> = expanded.edges().map(|(e, _, _)| e.to_string()).collect();
        assert_eq!(edges, vec!["w-tank".to_owned()]);
        assert_eq!(expanded.upstream(NodeId::intern("tank")), vec![NodeId::intern("well")]);
    }
}
