//! In-memory node/edge collections with upsert-merge semantics and
//! adjacency indices.
//!
//! Nodes and edges are keyed by id in ordered maps, so every iteration
//! order exposed to the query engine is deterministic. Forward and reverse
//! adjacency indices (node id → incident edge ids) are maintained
//! incrementally on every write.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use infragraph_core::{merge_properties, Edge, Node, NodeType, PropertyMap};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage cannot serve the operation. Fatal to the
    /// current operation, not to the process.
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Default)]
struct GraphInner {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Edge>,
    /// source node id → ids of outgoing edges.
    outgoing: HashMap<String, Vec<String>>,
    /// target node id → ids of incoming edges.
    incoming: HashMap<String, Vec<String>>,
}

impl GraphInner {
    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
    }

    fn upsert_node(&mut self, node: Node) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => {
                // name/type always refresh to the incoming values; properties
                // merge additively so connectors contribute disjoint metadata.
                existing.name = node.name;
                existing.node_type = node.node_type;
                merge_properties(&mut existing.properties, &node.properties);
            }
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    /// Returns false when the edge was dropped because an endpoint is
    /// missing. There is no deferred resolution: upserting the missing
    /// endpoint later does not retroactively materialize the edge.
    fn upsert_edge(&mut self, edge: Edge) -> bool {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            tracing::debug!(
                edge_id = %edge.id,
                source = %edge.source,
                target = %edge.target,
                "Dropping edge with missing endpoint"
            );
            return false;
        }

        match self.edges.get_mut(&edge.id) {
            Some(existing) => {
                merge_properties(&mut existing.properties, &edge.properties);
            }
            None => {
                self.outgoing
                    .entry(edge.source.clone())
                    .or_default()
                    .push(edge.id.clone());
                self.incoming
                    .entry(edge.target.clone())
                    .or_default()
                    .push(edge.id.clone());
                self.edges.insert(edge.id.clone(), edge);
            }
        }
        true
    }

    fn delete_node(&mut self, node_id: &str) -> bool {
        if self.nodes.remove(node_id).is_none() {
            return false;
        }

        let mut incident: Vec<String> = self.outgoing.remove(node_id).unwrap_or_default();
        incident.extend(self.incoming.remove(node_id).unwrap_or_default());

        for edge_id in incident {
            if let Some(edge) = self.edges.remove(&edge_id) {
                if let Some(out) = self.outgoing.get_mut(&edge.source) {
                    out.retain(|id| *id != edge_id);
                }
                if let Some(inc) = self.incoming.get_mut(&edge.target) {
                    inc.retain(|id| *id != edge_id);
                }
            }
        }
        true
    }

    fn counts(&self) -> (usize, usize) {
        (self.nodes.len(), self.edges.len())
    }
}

/// Thread-safe in-memory graph store.
///
/// A single logical writer (the ingestion pipeline) holds the exclusive
/// lock for a full run via [`GraphStore::begin_ingest`]; any number of
/// readers hold shared locks per query operation via [`GraphStore::view`].
#[derive(Debug, Default)]
pub struct GraphStore {
    inner: RwLock<GraphInner>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive write lock for a full ingestion run.
    pub fn begin_ingest(&self) -> Result<IngestTxn<'_>> {
        let guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".to_string()))?;
        Ok(IngestTxn { guard })
    }

    /// Acquire a shared, snapshot-consistent read view for one operation.
    pub fn view(&self) -> Result<GraphView<'_>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("read lock poisoned".to_string()))?;
        Ok(GraphView { guard })
    }

    // ── Per-call convenience operations ──────────────────────────

    pub fn upsert_node(&self, node: Node) -> Result<()> {
        self.begin_ingest().map(|mut txn| txn.upsert_node(node))
    }

    /// Upsert an edge; returns whether it was persisted. Silently a no-op
    /// (false) when either endpoint is absent at call time.
    pub fn upsert_edge(&self, edge: Edge) -> Result<bool> {
        self.begin_ingest().map(|mut txn| txn.upsert_edge(edge))
    }

    pub fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        Ok(self.view()?.node(node_id).cloned())
    }

    /// List nodes matching an optional type filter and property equality
    /// filters (all must match).
    pub fn list_nodes(
        &self,
        type_filter: Option<&NodeType>,
        property_filters: &PropertyMap,
    ) -> Result<Vec<Node>> {
        let view = self.view()?;
        Ok(view
            .nodes()
            .filter(|n| type_filter.map_or(true, |t| n.node_type == *t))
            .filter(|n| {
                property_filters
                    .iter()
                    .all(|(k, v)| n.properties.get(k) == Some(v))
            })
            .cloned()
            .collect())
    }

    /// Delete a node and every edge incident to it.
    pub fn delete_node(&self, node_id: &str) -> Result<bool> {
        self.begin_ingest().map(|mut txn| txn.delete_node(node_id))
    }

    pub fn clear(&self) -> Result<()> {
        self.begin_ingest().map(|mut txn| txn.clear())
    }

    /// Current (node, edge) counts.
    pub fn counts(&self) -> Result<(usize, usize)> {
        Ok(self.view()?.counts())
    }
}

/// Exclusive write transaction covering a full ingestion run.
pub struct IngestTxn<'a> {
    guard: RwLockWriteGuard<'a, GraphInner>,
}

impl IngestTxn<'_> {
    /// Remove every node and edge. The recovery mechanism for an
    /// interrupted previous run.
    pub fn clear(&mut self) {
        self.guard.clear();
    }

    pub fn upsert_node(&mut self, node: Node) {
        self.guard.upsert_node(node);
    }

    /// Upsert an edge; returns whether it was persisted (false when an
    /// endpoint is missing — a documented no-op, not an error).
    pub fn upsert_edge(&mut self, edge: Edge) -> bool {
        self.guard.upsert_edge(edge)
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.guard.delete_node(node_id)
    }

    pub fn counts(&self) -> (usize, usize) {
        self.guard.counts()
    }
}

/// Shared read view held for the duration of one query operation.
pub struct GraphView<'a> {
    guard: RwLockReadGuard<'a, GraphInner>,
}

impl GraphView<'_> {
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.guard.nodes.get(node_id)
    }

    /// All nodes in deterministic id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.guard.nodes.values()
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.guard.edges.get(edge_id)
    }

    /// All edges in deterministic id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.guard.edges.values()
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn out_edges<'s>(&'s self, node_id: &str) -> impl Iterator<Item = &'s Edge> {
        self.adjacent(&self.guard.outgoing, node_id)
    }

    /// Incoming edges of a node, in insertion order.
    pub fn in_edges<'s>(&'s self, node_id: &str) -> impl Iterator<Item = &'s Edge> {
        self.adjacent(&self.guard.incoming, node_id)
    }

    pub fn counts(&self) -> (usize, usize) {
        self.guard.counts()
    }

    fn adjacent<'s>(
        &'s self,
        index: &'s HashMap<String, Vec<String>>,
        node_id: &str,
    ) -> impl Iterator<Item = &'s Edge> {
        index
            .get(node_id)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.guard.edges.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infragraph_core::{EdgeType, PropertyValue};

    fn node(node_type: NodeType, name: &str) -> Node {
        Node::new(node_type, name, PropertyMap::new())
    }

    fn edge(edge_type: EdgeType, source: &str, target: &str) -> Edge {
        Edge::new(edge_type, source, target, PropertyMap::new())
    }

    #[test]
    fn upsert_node_is_idempotent() {
        let store = GraphStore::new();
        let n = node(NodeType::Service, "api");
        store.upsert_node(n.clone()).unwrap();
        store.upsert_node(n.clone()).unwrap();

        assert_eq!(store.counts().unwrap(), (1, 0));
        assert_eq!(store.get_node("service:api").unwrap(), Some(n));
    }

    #[test]
    fn upsert_node_merges_properties_additively() {
        let store = GraphStore::new();

        let mut first = node(NodeType::Service, "api");
        first.properties.insert("a".to_string(), 1i64.into());
        first.properties.insert("b".to_string(), 2i64.into());
        store.upsert_node(first).unwrap();

        let mut second = node(NodeType::Service, "api");
        second.properties.insert("b".to_string(), 3i64.into());
        second.properties.insert("c".to_string(), 4i64.into());
        store.upsert_node(second).unwrap();

        let merged = store.get_node("service:api").unwrap().unwrap();
        let get = |k: &str| merged.properties.get(k).and_then(PropertyValue::as_i64);
        assert_eq!(get("a"), Some(1));
        assert_eq!(get("b"), Some(3));
        assert_eq!(get("c"), Some(4));
    }

    #[test]
    fn edge_with_missing_endpoint_is_dropped() {
        let store = GraphStore::new();
        store.upsert_node(node(NodeType::Service, "api")).unwrap();

        let persisted = store
            .upsert_edge(edge(EdgeType::Uses, "service:api", "database:missing"))
            .unwrap();
        assert!(!persisted);
        assert_eq!(store.counts().unwrap(), (1, 0));
    }

    #[test]
    fn dropped_edge_is_not_resurrected_by_late_endpoint() {
        let store = GraphStore::new();
        store.upsert_node(node(NodeType::Service, "api")).unwrap();
        store
            .upsert_edge(edge(EdgeType::Uses, "service:api", "database:orders-db"))
            .unwrap();

        // Target arrives after the edge was dropped: no retroactive edge.
        store
            .upsert_node(node(NodeType::Database, "orders-db"))
            .unwrap();
        assert_eq!(store.counts().unwrap(), (2, 0));
    }

    #[test]
    fn edge_upsert_is_idempotent_and_merges_properties() {
        let store = GraphStore::new();
        store.upsert_node(node(NodeType::Service, "api")).unwrap();
        store.upsert_node(node(NodeType::Database, "db")).unwrap();

        let mut e = edge(EdgeType::Uses, "service:api", "database:db");
        e.properties
            .insert("connection_type".to_string(), "database".into());
        assert!(store.upsert_edge(e.clone()).unwrap());

        e.properties.insert("pooled".to_string(), true.into());
        assert!(store.upsert_edge(e.clone()).unwrap());

        assert_eq!(store.counts().unwrap(), (2, 1));
        let view = store.view().unwrap();
        let stored = view.edge(&e.id).unwrap();
        assert_eq!(
            stored.properties.get("connection_type"),
            Some(&PropertyValue::from("database"))
        );
        assert_eq!(
            stored.properties.get("pooled"),
            Some(&PropertyValue::from(true))
        );
    }

    #[test]
    fn delete_node_cascades_incident_edges() {
        let store = GraphStore::new();
        store.upsert_node(node(NodeType::Service, "a")).unwrap();
        store.upsert_node(node(NodeType::Service, "b")).unwrap();
        store.upsert_node(node(NodeType::Service, "c")).unwrap();
        store
            .upsert_edge(edge(EdgeType::Calls, "service:a", "service:b"))
            .unwrap();
        store
            .upsert_edge(edge(EdgeType::Calls, "service:b", "service:c"))
            .unwrap();

        assert!(store.delete_node("service:b").unwrap());
        assert_eq!(store.counts().unwrap(), (2, 0));

        let view = store.view().unwrap();
        assert_eq!(view.out_edges("service:a").count(), 0);
        assert_eq!(view.in_edges("service:c").count(), 0);
    }

    #[test]
    fn delete_missing_node_returns_false() {
        let store = GraphStore::new();
        assert!(!store.delete_node("service:ghost").unwrap());
    }

    #[test]
    fn list_nodes_applies_all_filters() {
        let store = GraphStore::new();
        let mut svc = node(NodeType::Service, "api");
        svc.properties
            .insert("team".to_string(), "orders-team".into());
        store.upsert_node(svc).unwrap();
        store.upsert_node(node(NodeType::Service, "web")).unwrap();
        store.upsert_node(node(NodeType::Database, "db")).unwrap();

        let services = store
            .list_nodes(Some(&NodeType::Service), &PropertyMap::new())
            .unwrap();
        assert_eq!(services.len(), 2);

        let mut filters = PropertyMap::new();
        filters.insert("team".to_string(), "orders-team".into());
        let owned = store.list_nodes(None, &filters).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, "service:api");

        filters.insert("team".to_string(), "other-team".into());
        assert!(store.list_nodes(None, &filters).unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let store = GraphStore::new();
        store.upsert_node(node(NodeType::Service, "a")).unwrap();
        store.upsert_node(node(NodeType::Service, "b")).unwrap();
        store
            .upsert_edge(edge(EdgeType::Calls, "service:a", "service:b"))
            .unwrap();

        store.clear().unwrap();
        assert_eq!(store.counts().unwrap(), (0, 0));
    }

    #[test]
    fn adjacency_preserves_insertion_order() {
        let store = GraphStore::new();
        let mut txn = store.begin_ingest().unwrap();
        txn.upsert_node(node(NodeType::Service, "root"));
        for name in ["one", "two", "three"] {
            txn.upsert_node(node(NodeType::Service, name));
            txn.upsert_edge(edge(
                EdgeType::DependsOn,
                "service:root",
                &format!("service:{name}"),
            ));
        }
        drop(txn);

        let view = store.view().unwrap();
        let targets: Vec<&str> = view
            .out_edges("service:root")
            .map(|e| e.target.as_str())
            .collect();
        assert_eq!(targets, vec!["service:one", "service:two", "service:three"]);
    }
}
