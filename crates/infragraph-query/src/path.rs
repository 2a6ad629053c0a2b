//! Shortest directed path by hop count.
//!
//! Plain BFS with parent tracking: all edges weigh 1, ties broken by
//! discovery order. Forward direction only.

use std::collections::{HashMap, VecDeque};

use infragraph_store::GraphView;

use crate::types::PathResult;

/// Find one shortest path from `from_id` to `to_id` within `max_depth`
/// hops. Returns an empty result if either endpoint is unknown or no
/// path exists.
pub(crate) fn shortest_path(
    view: &GraphView<'_>,
    from_id: &str,
    to_id: &str,
    max_depth: usize,
) -> PathResult {
    let start = match view.node(from_id) {
        Some(node) if view.node(to_id).is_some() => node,
        _ => return PathResult::empty(),
    };
    if from_id == to_id {
        return PathResult {
            nodes: vec![start.clone()],
            edges: Vec::new(),
            length: 0,
        };
    }

    // parent[node] = (predecessor, edge id used to reach node)
    let mut parent: HashMap<String, (String, String)> = HashMap::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((from_id.to_string(), 0));

    while let Some((node_id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for edge in view.out_edges(&node_id) {
            if edge.target == from_id || parent.contains_key(&edge.target) {
                continue;
            }
            parent.insert(edge.target.clone(), (node_id.clone(), edge.id.clone()));
            if edge.target == to_id {
                return reconstruct(view, from_id, to_id, &parent);
            }
            queue.push_back((edge.target.clone(), depth + 1));
        }
    }

    PathResult::empty()
}

fn reconstruct(
    view: &GraphView<'_>,
    from_id: &str,
    to_id: &str,
    parent: &HashMap<String, (String, String)>,
) -> PathResult {
    let mut node_ids = vec![to_id.to_string()];
    let mut edge_ids = Vec::new();

    let mut cursor = to_id;
    while cursor != from_id {
        let (pred, edge_id) = &parent[cursor];
        edge_ids.push(edge_id.clone());
        node_ids.push(pred.clone());
        cursor = pred.as_str();
    }
    node_ids.reverse();
    edge_ids.reverse();

    let nodes = node_ids
        .iter()
        .filter_map(|id| view.node(id).cloned())
        .collect::<Vec<_>>();
    let edges = edge_ids
        .iter()
        .filter_map(|id| view.edge(id).cloned())
        .collect::<Vec<_>>();
    let length = edges.len();

    PathResult { nodes, edges, length }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infragraph_core::{Edge, EdgeType, Node, NodeType, PropertyMap};
    use infragraph_store::GraphStore;

    fn chain(names: &[&str]) -> GraphStore {
        let store = GraphStore::new();
        for name in names {
            store
                .upsert_node(Node::new(
                    NodeType::Service,
                    name.to_string(),
                    PropertyMap::new(),
                ))
                .unwrap();
        }
        for pair in names.windows(2) {
            store
                .upsert_edge(Edge::new(
                    EdgeType::Calls,
                    format!("service:{}", pair[0]),
                    format!("service:{}", pair[1]),
                    PropertyMap::new(),
                ))
                .unwrap();
        }
        store
    }

    #[test]
    fn chain_path_has_expected_hops() {
        let store = chain(&["a", "b", "c"]);
        let view = store.view().unwrap();
        let result = shortest_path(&view, "service:a", "service:c", 10);
        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["service:a", "service:b", "service:c"]);
        assert_eq!(result.length, 2);
        assert_eq!(result.edges.len(), 2);
    }

    #[test]
    fn wrong_direction_finds_nothing() {
        let store = chain(&["a", "b", "c"]);
        let view = store.view().unwrap();
        let result = shortest_path(&view, "service:c", "service:a", 10);
        assert!(result.is_empty());
        assert_eq!(result.length, 0);
    }

    #[test]
    fn shorter_route_wins() {
        let store = chain(&["a", "b", "c", "d"]);
        // Add a shortcut a -> d.
        store
            .upsert_edge(Edge::new(
                EdgeType::Calls,
                "service:a".to_string(),
                "service:d".to_string(),
                PropertyMap::new(),
            ))
            .unwrap();

        let view = store.view().unwrap();
        let result = shortest_path(&view, "service:a", "service:d", 10);
        assert_eq!(result.length, 1);
    }

    #[test]
    fn depth_bound_cuts_off_long_paths() {
        let store = chain(&["a", "b", "c", "d"]);
        let view = store.view().unwrap();
        assert!(shortest_path(&view, "service:a", "service:d", 2).is_empty());
    }

    #[test]
    fn same_endpoint_is_a_zero_length_path() {
        let store = chain(&["a", "b"]);
        let view = store.view().unwrap();
        let result = shortest_path(&view, "service:a", "service:a", 10);
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.length, 0);
    }

    #[test]
    fn unknown_endpoint_is_empty() {
        let store = chain(&["a", "b"]);
        let view = store.view().unwrap();
        assert!(shortest_path(&view, "service:a", "service:ghost", 10).is_empty());
    }
}
