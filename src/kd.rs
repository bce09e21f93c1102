// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{grid_distance, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which speeds up nearest-neighbor search. [crate::Graph::find_nearest_node] has to look
/// at every node, and it is called twice for every route the client asks for; a k-d tree
/// trades some memory for answering those queries in logarithmic time.
///
/// Ties are broken the same way as in [crate::Graph::find_nearest_node]:
/// of multiple equally close nodes, the one with the lowest id is returned.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, x: i32, y: i32) -> Node {
        self.find_nearest_node_impl(x, y, false).0
    }

    fn find_nearest_node_impl(&self, x: i32, y: i32, y_divides: bool) -> (Node, f32) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = grid_distance(x, y, best.x, best.y);

        // Select which branch to recurse into first
        let first_left = if y_divides { y < best.y } else { x < best.x };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(x, y, !y_divides);
            if is_better(alt, alt_dist, best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting axis is not further than the current best candidate.
            // Equality still needs a look, as a node with a lower id might be there.
            let dist_to_axis = if y_divides {
                grid_distance(x, y, x, self.pivot.y)
            } else {
                grid_distance(x, y, self.pivot.x, y)
            };

            if dist_to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(x, y, !y_divides);
                if is_better(alt, alt_dist, best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], y_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if y_divides {
                    nodes.sort_by_key(|n| (n.y, n.id));
                } else {
                    nodes.sort_by_key(|n| (n.x, n.id));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !y_divides).map(Box::new),
                    right: Self::build_impl(right, !y_divides).map(Box::new),
                })
            }
        }
    }
}

#[inline]
fn is_better(candidate: Node, candidate_dist: f32, best: Node, best_dist: f32) -> bool {
    candidate_dist < best_dist || (candidate_dist == best_dist && candidate.id < best.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Graph;

    fn nodes() -> Vec<Node> {
        vec![
            Node { id: 1, x: 1, y: 1 },
            Node { id: 2, x: 1, y: 5 },
            Node { id: 3, x: 3, y: 9 },
            Node { id: 4, x: 4, y: 3 },
            Node { id: 5, x: 4, y: 7 },
            Node { id: 6, x: 7, y: 3 },
            Node { id: 7, x: 7, y: 1 },
            Node { id: 8, x: 8, y: 5 },
            Node { id: 9, x: 8, y: 9 },
        ]
    }

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut nodes())
            .expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.find_nearest_node(2, 2).id, 1);
        assert_eq!(tree.find_nearest_node(5, 3).id, 4);
        assert_eq!(tree.find_nearest_node(5, 8).id, 5);
        assert_eq!(tree.find_nearest_node(9, 6).id, 8);
    }

    #[test]
    fn kd_tree_empty() {
        assert!(KDTree::from_iter(Vec::<Node>::new()).is_none());
    }

    #[test]
    fn kd_tree_agrees_with_linear_scan() {
        let mut g = Graph::default();
        nodes().into_iter().for_each(|n| g.set_node(n));
        let tree = KDTree::from_iter(g.iter().cloned()).unwrap();

        for x in -2..12 {
            for y in -2..12 {
                let expected = g.find_nearest_node(x, y).unwrap();
                assert_eq!(tree.find_nearest_node(x, y), expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn kd_tree_tie_break() {
        // Two nodes at the same position, and one equally far on the other side
        let tree = KDTree::from_iter([
            Node { id: 30, x: 0, y: 0 },
            Node { id: 20, x: 10, y: 0 },
            Node { id: 10, x: 10, y: 0 },
        ])
        .unwrap();

        assert_eq!(tree.find_nearest_node(5, 0).id, 10);
        assert_eq!(tree.find_nearest_node(10, 0).id, 10);
    }
}
