use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::Dfs;
use petgraph::Undirected;

use crate::Id;

/// Undirected overlap relation over tracked busy times.
///
/// Nodes carry busy time ids; an edge records that two spans strictly
/// overlap. Conflict spans are exactly the connected components with two or
/// more nodes, so cluster membership after any mutation is a graph walk away.
#[derive(Debug, Clone, Default)]
pub(super) struct OverlapGraph {
    graph: StableGraph<Id, (), Undirected>,
    node_by_id: HashMap<Id, NodeIndex>,
}

impl OverlapGraph {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Adds a node for `id`.
    pub(super) fn insert(&mut self, id: Id) -> NodeIndex {
        debug_assert!(
            !self.node_by_id.contains_key(&id),
            "busy time inserted into the overlap graph twice"
        );
        let node = self.graph.add_node(id.clone());
        self.node_by_id.insert(id, node);
        node
    }

    /// Records that `a` and `b` overlap. Missing nodes are ignored; an
    /// existing edge is not duplicated.
    pub(super) fn connect(&mut self, a: &str, b: &str) {
        if let (Some(&na), Some(&nb)) = (self.node_by_id.get(a), self.node_by_id.get(b)) {
            self.graph.update_edge(na, nb, ());
        }
    }

    /// Removes `id` and all its overlap edges. Returns false if absent.
    pub(super) fn remove(&mut self, id: &str) -> bool {
        match self.node_by_id.remove(id) {
            Some(node) => {
                self.graph.remove_node(node);
                true
            }
            None => false,
        }
    }

    /// All ids transitively connected to `id`, including `id` itself.
    pub(super) fn component_of(&self, id: &str) -> Vec<Id> {
        let start = match self.node_of(id) {
            Some(node) => node,
            None => return Vec::new(),
        };
        let mut members = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if let Some(member) = self.graph.node_weight(node) {
                members.push(member.clone());
            }
        }
        members
    }

    pub(super) fn clear(&mut self) {
        self.graph.clear();
        self.node_by_id.clear();
    }

    fn node_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_by_id.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(&str, &str)]) -> OverlapGraph {
        let mut graph = OverlapGraph::new();
        for (a, b) in edges {
            if !graph.node_by_id.contains_key(*a) {
                graph.insert(a.to_string());
            }
            if !graph.node_by_id.contains_key(*b) {
                graph.insert(b.to_string());
            }
            graph.connect(a, b);
        }
        graph
    }

    #[test]
    fn test_component_of_isolated_node() {
        let mut graph = OverlapGraph::new();
        graph.insert("solo".to_string());
        assert_eq!(graph.component_of("solo"), vec!["solo".to_string()]);
    }

    #[test]
    fn test_component_spans_chain() {
        let graph = graph_of(&[("a", "b"), ("b", "c")]);
        let mut component = graph.component_of("a");
        component.sort();
        assert_eq!(component, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_components_stay_separate() {
        let graph = graph_of(&[("a", "b"), ("x", "y")]);
        let mut left = graph.component_of("b");
        left.sort();
        assert_eq!(left, vec!["a", "b"]);
        let mut right = graph.component_of("x");
        right.sort();
        assert_eq!(right, vec!["x", "y"]);
    }

    #[test]
    fn test_remove_disconnects() {
        let mut graph = graph_of(&[("a", "b"), ("b", "c")]);
        assert!(graph.remove("b"));
        assert_eq!(graph.component_of("a"), vec!["a".to_string()]);
        assert_eq!(graph.component_of("c"), vec!["c".to_string()]);
        assert!(!graph.remove("b"));
    }

    #[test]
    fn test_duplicate_connect_keeps_single_edge() {
        let mut graph = graph_of(&[("a", "b")]);
        graph.connect("a", "b");
        graph.connect("b", "a");
        assert_eq!(graph.graph.edge_count(), 1);

        assert!(graph.remove("a"));
        assert_eq!(graph.component_of("b"), vec!["b".to_string()]);
        assert_eq!(graph.graph.node_count(), 1);
    }

    #[test]
    fn test_component_of_unknown_id_is_empty() {
        let graph = OverlapGraph::new();
        assert!(graph.component_of("ghost").is_empty());
    }
}
