//! Ownership and on-call resolution.

use infragraph_core::{EdgeType, Node, NodeType};
use infragraph_store::GraphView;

/// Resolve the owning team of a node.
///
/// Prefers an explicit `owns` edge from a team node; falls back to the
/// node's own `team` property, resolved to `team:<value>` if that node
/// exists.
pub(crate) fn get_owner(view: &GraphView<'_>, node_id: &str) -> Option<Node> {
    let owner = view
        .in_edges(node_id)
        .filter(|e| e.edge_type == EdgeType::Owns)
        .filter_map(|e| view.node(&e.source))
        .find(|n| n.node_type == NodeType::Team);
    if let Some(team) = owner {
        return Some(team.clone());
    }

    let node = view.node(node_id)?;
    let team_name = node.properties.get("team")?.as_str()?;
    view.node(&Node::derive_id(&NodeType::Team, team_name)).cloned()
}

/// Every node one `owns` hop away from the team node.
pub(crate) fn get_team_assets(view: &GraphView<'_>, team_id: &str) -> Vec<Node> {
    view.out_edges(team_id)
        .filter(|e| e.edge_type == EdgeType::Owns)
        .filter_map(|e| view.node(&e.target).cloned())
        .collect()
}

/// The node's own `oncall` property, else the owning team's `lead`.
pub(crate) fn get_oncall(view: &GraphView<'_>, node_id: &str) -> Option<String> {
    let node = view.node(node_id)?;
    if let Some(oncall) = node.properties.get("oncall").and_then(|v| v.as_str()) {
        return Some(oncall.to_string());
    }
    get_owner(view, node_id)?
        .properties
        .get("lead")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infragraph_core::{Edge, PropertyMap, PropertyValue};
    use infragraph_store::GraphStore;

    fn store_with_team() -> GraphStore {
        let store = GraphStore::new();
        let mut team_props = PropertyMap::new();
        team_props.insert("lead".to_string(), "dana".into());
        store
            .upsert_node(Node::new(
                NodeType::Team,
                "orders-team".to_string(),
                team_props,
            ))
            .unwrap();
        store
    }

    fn service(store: &GraphStore, name: &str, props: PropertyMap) {
        store
            .upsert_node(Node::new(NodeType::Service, name.to_string(), props))
            .unwrap();
    }

    #[test]
    fn owns_edge_beats_team_property() {
        let store = store_with_team();
        let mut props = PropertyMap::new();
        props.insert(
            "team".to_string(),
            PropertyValue::String("other-team".to_string()),
        );
        service(&store, "api", props);
        store
            .upsert_edge(Edge::new(
                EdgeType::Owns,
                "team:orders-team".to_string(),
                "service:api".to_string(),
                PropertyMap::new(),
            ))
            .unwrap();

        let view = store.view().unwrap();
        let owner = get_owner(&view, "service:api").unwrap();
        assert_eq!(owner.id, "team:orders-team");
    }

    #[test]
    fn team_property_fallback_resolves_to_existing_team_node() {
        let store = store_with_team();
        let mut props = PropertyMap::new();
        props.insert(
            "team".to_string(),
            PropertyValue::String("orders-team".to_string()),
        );
        service(&store, "api", props);

        let view = store.view().unwrap();
        let owner = get_owner(&view, "service:api").unwrap();
        assert_eq!(owner.id, "team:orders-team");
    }

    #[test]
    fn team_property_naming_a_missing_team_is_absent() {
        let store = GraphStore::new();
        let mut props = PropertyMap::new();
        props.insert(
            "team".to_string(),
            PropertyValue::String("ghost-team".to_string()),
        );
        service(&store, "api", props);

        let view = store.view().unwrap();
        assert!(get_owner(&view, "service:api").is_none());
    }

    #[test]
    fn oncall_property_wins_over_team_lead() {
        let store = store_with_team();
        let mut props = PropertyMap::new();
        props.insert("oncall".to_string(), "kim".into());
        service(&store, "api", props);
        store
            .upsert_edge(Edge::new(
                EdgeType::Owns,
                "team:orders-team".to_string(),
                "service:api".to_string(),
                PropertyMap::new(),
            ))
            .unwrap();

        let view = store.view().unwrap();
        assert_eq!(get_oncall(&view, "service:api").as_deref(), Some("kim"));
    }

    #[test]
    fn oncall_falls_back_to_owner_lead() {
        let store = store_with_team();
        service(&store, "api", PropertyMap::new());
        store
            .upsert_edge(Edge::new(
                EdgeType::Owns,
                "team:orders-team".to_string(),
                "service:api".to_string(),
                PropertyMap::new(),
            ))
            .unwrap();

        let view = store.view().unwrap();
        assert_eq!(get_oncall(&view, "service:api").as_deref(), Some("dana"));
    }

    #[test]
    fn team_assets_are_one_hop_only() {
        let store = store_with_team();
        service(&store, "api", PropertyMap::new());
        service(&store, "worker", PropertyMap::new());
        for target in ["service:api", "service:worker"] {
            store
                .upsert_edge(Edge::new(
                    EdgeType::Owns,
                    "team:orders-team".to_string(),
                    target.to_string(),
                    PropertyMap::new(),
                ))
                .unwrap();
        }
        // A non-owns edge from the team must not count as an asset.
        service(&store, "dashboard", PropertyMap::new());
        store
            .upsert_edge(Edge::new(
                EdgeType::Calls,
                "team:orders-team".to_string(),
                "service:dashboard".to_string(),
                PropertyMap::new(),
            ))
            .unwrap();

        let view = store.view().unwrap();
        let assets = get_team_assets(&view, "team:orders-team");
        let mut ids: Vec<&str> = assets.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["service:api", "service:worker"]);
    }
}
