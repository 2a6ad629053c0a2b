//! Bounded breadth-first closure, the traversal primitive every query
//! operation shares.

use std::collections::{HashSet, VecDeque};

use infragraph_core::{EdgeType, Node};
use infragraph_store::GraphView;

use crate::types::Direction;

/// Collect every node reachable from `start_id` within `max_depth` hops,
/// excluding the start node itself. Cycle-safe: each node is visited at
/// most once. An unknown start id yields an empty set.
pub(crate) fn closure(
    view: &GraphView<'_>,
    start_id: &str,
    direction: Direction,
    edge_types: Option<&[EdgeType]>,
    max_depth: usize,
) -> Vec<Node> {
    if view.node(start_id).is_none() {
        return Vec::new();
    }

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(start_id.to_string());

    let mut reached = Vec::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((start_id.to_string(), 0));

    while let Some((node_id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        let pass = |t: &EdgeType| edge_types.map_or(true, |allowed| allowed.contains(t));
        let neighbors: Vec<String> = match direction {
            Direction::Forward => view
                .out_edges(&node_id)
                .filter(|e| pass(&e.edge_type))
                .map(|e| e.target.clone())
                .collect(),
            Direction::Reverse => view
                .in_edges(&node_id)
                .filter(|e| pass(&e.edge_type))
                .map(|e| e.source.clone())
                .collect(),
        };

        for neighbor in neighbors {
            if !visited.insert(neighbor.clone()) {
                continue;
            }
            if let Some(node) = view.node(&neighbor) {
                reached.push(node.clone());
            }
            queue.push_back((neighbor, depth + 1));
        }
    }

    reached
}
