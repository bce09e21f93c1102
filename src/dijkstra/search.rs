// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{DijkstraError, Edge, Graph};

/// The result of a successful [find_route]: node ids from the start to the destination
/// (both inclusive), together with the total cost of all traversed edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<i64>,
    pub cost: f32,
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f32,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        // Node ids break ties, so that the order of expansion is always the same.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.at.cmp(&self.at))
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest route between two nodes in the provided graph.
///
/// Returns `Ok(None)` if there is no route between the two nodes, and
/// [DijkstraError::UnknownNode] if either of the nodes is not in the graph.
///
/// The search is deterministic: nodes with equal tentative costs are expanded in
/// ascending id order, and a node's predecessor is only replaced by a strictly cheaper one.
/// With a binary heap as the frontier, the search runs in O((V + E) log V).
pub fn find_route(g: &Graph, from_id: i64, to_id: i64) -> Result<Option<Route>, DijkstraError> {
    g.neighbors(from_id)?;
    g.neighbors(to_id)?;

    if from_id == to_id {
        return Ok(Some(Route {
            nodes: vec![from_id],
            cost: 0.0,
        }));
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f32> = HashMap::default();
    let mut visited: HashSet<i64> = HashSet::default();

    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Ok(Some(Route {
                nodes: reconstruct_path(&came_from, to_id),
                cost: item.cost,
            }));
        }

        // A node may be in the queue multiple times; only its first (cheapest) pop counts.
        if !visited.insert(item.at) {
            continue;
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.get_edges(item.at)
        {
            if visited.contains(&neighbor_id) || g.get_node(neighbor_id).is_none() {
                continue;
            }

            let neighbor_cost = item.cost + edge_cost;
            let best_known = known_costs
                .get(&neighbor_id)
                .cloned()
                .unwrap_or(f32::INFINITY);

            if neighbor_cost < best_known {
                came_from.insert(neighbor_id, item.at);
                known_costs.insert(neighbor_id, neighbor_cost);
                queue.push(QueueItem {
                    at: neighbor_id,
                    cost: neighbor_cost,
                });
            }
        }
    }

    Ok(None)
}
