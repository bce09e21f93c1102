// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{grid_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

/// Error returned by [Graph] queries about a node which doesn't exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    UnknownNode(i64),
}

/// Represents a road network as a set of [Nodes](Node)
/// and directed [Edges](Edge) between them.
///
/// Nodes are kept ordered by their ids, which makes every iteration
/// (and thus every tie-break depending on iteration order) deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<i64, (Node, Vec<Edge>)>,
    street_names: HashMap<(i64, i64), String>,
}

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of (directed) edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved. Edge costs are not
    /// recomputed, so moving a node should only be done before its edges are added.
    pub fn set_node(&mut self, node: Node) {
        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Finds the closest [Node] to the given position.
    /// If multiple nodes are equally close, the one with the lowest id is returned.
    ///
    /// This function requires computing the distance to every [Node] in the graph;
    /// use a [KDTree](crate::KDTree) for repeated queries.
    pub fn find_nearest_node(&self, x: i32, y: i32) -> Option<Node> {
        self.nodes
            .values()
            .map(|&(nd, _)| (grid_distance(x, y, nd.x, nd.y), nd))
            // min_by returns the first of equal elements, and nodes are iterated by id
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id,
    /// or an empty slice if no such node exists.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.nodes
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    ///
    /// Unlike [Graph::get_edges], asking about a node which is not in the graph
    /// is an error.
    pub fn neighbors(&self, from_id: i64) -> Result<&[Edge], GraphError> {
        self.nodes
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .ok_or(GraphError::UnknownNode(from_id))
    }

    /// Gets the cost of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f32::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f32 {
        self.get_edges(from_id)
            .iter()
            .find(|edge| edge.to == to_id)
            .map(|edge| edge.cost)
            .unwrap_or(f32::INFINITY)
    }

    /// Creates or updates an [Edge] from a node with a given id.
    /// Does nothing if the `from_id` node doesn't exist.
    pub fn set_edge(&mut self, from_id: i64, edge: Edge) {
        if let Some((_, edges)) = self.nodes.get_mut(&from_id) {
            if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                *candidate = edge;
            } else {
                edges.push(edge);
            }
        }
    }

    /// Returns the name of the street along the edge from one node to another, if known.
    pub fn street_name(&self, from_id: i64, to_id: i64) -> Option<&str> {
        self.street_names.get(&(from_id, to_id)).map(String::as_str)
    }

    /// Sets the name of the street along the edge from one node to another.
    /// An empty name removes the stored one.
    pub fn set_street_name(&mut self, from_id: i64, to_id: i64, name: String) {
        if name.is_empty() {
            self.street_names.remove(&(from_id, to_id));
        } else {
            self.street_names.insert((from_id, to_id), name);
        }
    }

    /// Checks whether the sequence of node ids is a walk in the graph:
    /// every node exists, and every consecutive pair is joined by an edge.
    ///
    /// A single existing node is a path of length zero. An empty sequence is not a path.
    pub fn is_path(&self, path: &[i64]) -> bool {
        match path {
            [] => false,
            [single] => self.nodes.contains_key(single),
            _ => path.windows(2).all(|pair| {
                self.get_edges(pair[0]).iter().any(|e| e.to == pair[1])
                    && self.nodes.contains_key(&pair[1])
            }),
        }
    }

    /// Sums the costs of the edges along a path.
    /// Returns `None` if the sequence is not a [path](Graph::is_path).
    pub fn path_cost(&self, path: &[i64]) -> Option<f32> {
        if !self.is_path(path) {
            return None;
        }
        Some(
            path.windows(2)
                .map(|pair| self.get_edge(pair[0], pair[1]))
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> Graph {
        // 1 ─ 2 → 3
        let mut g = Graph::default();
        g.set_node(Node { id: 1, x: 0, y: 0 });
        g.set_node(Node { id: 2, x: 10, y: 0 });
        g.set_node(Node { id: 3, x: 20, y: 0 });
        g.set_edge(1, Edge { to: 2, cost: 10.0 });
        g.set_edge(2, Edge { to: 1, cost: 10.0 });
        g.set_edge(2, Edge { to: 3, cost: 12.0 });
        g
    }

    #[test]
    fn neighbors() {
        let g = line_graph();
        assert_eq!(
            g.neighbors(2).unwrap(),
            &[Edge { to: 1, cost: 10.0 }, Edge { to: 3, cost: 12.0 }]
        );
        assert!(g.neighbors(3).unwrap().is_empty());
        assert_eq!(g.neighbors(4), Err(GraphError::UnknownNode(4)));
        assert!(g.get_edges(4).is_empty());
    }

    #[test]
    fn set_edge_overwrites() {
        let mut g = line_graph();
        g.set_edge(2, Edge { to: 3, cost: 1.0 });
        assert_eq!(g.get_edge(2, 3), 1.0);
        assert_eq!(g.edge_count(), 3);

        g.set_edge(42, Edge { to: 1, cost: 1.0 });
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn get_edge() {
        let g = line_graph();
        assert_eq!(g.get_edge(1, 2), 10.0);
        assert!(g.get_edge(3, 2).is_infinite());
        assert!(g.get_edge(1, 3).is_infinite());
    }

    #[test]
    fn find_nearest_node() {
        let g = line_graph();
        assert_eq!(g.find_nearest_node(-5, 3).map(|n| n.id), Some(1));
        assert_eq!(g.find_nearest_node(16, -1).map(|n| n.id), Some(3));

        // Equally close to 1 and 2 - lower id wins
        assert_eq!(g.find_nearest_node(5, 0).map(|n| n.id), Some(1));

        assert_eq!(Graph::default().find_nearest_node(0, 0), None);
    }

    #[test]
    fn is_path() {
        let g = line_graph();
        assert!(g.is_path(&[1, 2, 3]));
        assert!(g.is_path(&[1, 2, 1, 2]));
        assert!(g.is_path(&[3]));
        assert!(!g.is_path(&[3, 2]));
        assert!(!g.is_path(&[1, 3]));
        assert!(!g.is_path(&[]));
        assert!(!g.is_path(&[4]));
        assert!(!g.is_path(&[1, 1]));
    }

    #[test]
    fn path_cost() {
        let g = line_graph();
        assert_eq!(g.path_cost(&[1, 2, 3]), Some(22.0));
        assert_eq!(g.path_cost(&[2]), Some(0.0));
        assert_eq!(g.path_cost(&[3, 2, 1]), None);
    }

    #[test]
    fn street_names() {
        let mut g = line_graph();
        g.set_street_name(1, 2, "Jasper Avenue".to_string());
        assert_eq!(g.street_name(1, 2), Some("Jasper Avenue"));
        assert_eq!(g.street_name(2, 1), None);

        g.set_street_name(1, 2, String::new());
        assert_eq!(g.street_name(1, 2), None);
    }
}
