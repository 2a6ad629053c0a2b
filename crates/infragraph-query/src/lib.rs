//! infragraph-query: Read-only traversal queries over the Infragraph
//! knowledge graph.
//!
//! All operations share one primitive, a bounded breadth-first closure,
//! and all take a snapshot-consistent read view per call: a traversal
//! never observes a store mutated mid-walk by a concurrent ingestion run.
//! Unknown ids yield empty or absent results, never errors; only
//! malformed caller input (a zero traversal depth) raises.

pub mod error;
pub mod types;

mod ownership;
mod path;
mod traverse;

pub use error::QueryError;
pub use types::{BlastRadius, Direction, GraphStats, PathResult};

use std::collections::BTreeSet;
use std::sync::Arc;

use infragraph_core::{EdgeType, Node, NodeType, PropertyMap};
use infragraph_store::GraphStore;

use crate::error::Result;

/// Default hop bound for every traversal.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Cap on `search_nodes` results.
const SEARCH_LIMIT: usize = 20;

/// The query engine: a thin, read-only facade over a shared graph store.
pub struct QueryEngine {
    store: Arc<GraphStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    /// Everything `node_id` transitively depends on.
    pub fn downstream(
        &self,
        node_id: &str,
        edge_types: Option<&[EdgeType]>,
        max_depth: usize,
    ) -> Result<Vec<Node>> {
        check_depth(max_depth)?;
        let view = self.store.view()?;
        Ok(traverse::closure(
            &view,
            node_id,
            Direction::Forward,
            edge_types,
            max_depth,
        ))
    }

    /// Everything that transitively depends on `node_id`.
    pub fn upstream(
        &self,
        node_id: &str,
        edge_types: Option<&[EdgeType]>,
        max_depth: usize,
    ) -> Result<Vec<Node>> {
        check_depth(max_depth)?;
        let view = self.store.view()?;
        Ok(traverse::closure(
            &view,
            node_id,
            Direction::Reverse,
            edge_types,
            max_depth,
        ))
    }

    /// Failure-impact summary: the node, both closures, and the distinct
    /// teams touching the node or anything upstream of it.
    pub fn blast_radius(&self, node_id: &str) -> Result<BlastRadius> {
        let view = self.store.view()?;
        let node = view.node(node_id).cloned();
        let upstream = traverse::closure(
            &view,
            node_id,
            Direction::Reverse,
            None,
            DEFAULT_MAX_DEPTH,
        );
        let downstream = traverse::closure(
            &view,
            node_id,
            Direction::Forward,
            None,
            DEFAULT_MAX_DEPTH,
        );

        let mut teams = BTreeSet::new();
        let mut collect = |id: &str, props: &PropertyMap| {
            if let Some(owner) = ownership::get_owner(&view, id) {
                teams.insert(owner.name.clone());
            }
            if let Some(team) = props.get("team").and_then(|v| v.as_str()) {
                teams.insert(team.to_string());
            }
        };
        if let Some(n) = &node {
            collect(&n.id, &n.properties);
        }
        for n in &upstream {
            collect(&n.id, &n.properties);
        }

        let total_impact = upstream.len() + downstream.len();
        Ok(BlastRadius {
            node,
            upstream,
            downstream,
            affected_teams: teams.into_iter().collect(),
            total_impact,
        })
    }

    /// One shortest directed path by hop count, or an empty result.
    pub fn path(&self, from_id: &str, to_id: &str, max_depth: usize) -> Result<PathResult> {
        check_depth(max_depth)?;
        let view = self.store.view()?;
        Ok(path::shortest_path(&view, from_id, to_id, max_depth))
    }

    /// The team owning `node_id`, via `owns` edge or `team` property.
    pub fn get_owner(&self, node_id: &str) -> Result<Option<Node>> {
        let view = self.store.view()?;
        Ok(ownership::get_owner(&view, node_id))
    }

    /// Every asset one `owns` hop from the team node.
    pub fn get_team_assets(&self, team_id: &str) -> Result<Vec<Node>> {
        let view = self.store.view()?;
        Ok(ownership::get_team_assets(&view, team_id))
    }

    /// The on-call contact for `node_id`, if resolvable.
    pub fn get_oncall(&self, node_id: &str) -> Result<Option<String>> {
        let view = self.store.view()?;
        Ok(ownership::get_oncall(&view, node_id))
    }

    /// Distinct nodes one dependency edge away from the given resource.
    pub fn services_using(&self, resource_id: &str) -> Result<Vec<Node>> {
        let view = self.store.view()?;
        let mut seen = BTreeSet::new();
        Ok(view
            .in_edges(resource_id)
            .filter(|e| {
                matches!(
                    e.edge_type,
                    EdgeType::Uses | EdgeType::DependsOn | EdgeType::Calls
                )
            })
            .filter(|e| seen.insert(e.source.clone()))
            .filter_map(|e| view.node(&e.source).cloned())
            .collect())
    }

    /// Case-insensitive substring match against node id or name.
    pub fn search_nodes(&self, text: &str) -> Result<Vec<Node>> {
        let needle = text.to_lowercase();
        let view = self.store.view()?;
        Ok(view
            .nodes()
            .filter(|n| {
                n.id.to_lowercase().contains(&needle) || n.name.to_lowercase().contains(&needle)
            })
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    pub fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        let view = self.store.view()?;
        Ok(view.node(node_id).cloned())
    }

    /// List nodes, optionally filtered by type and exact property values.
    pub fn list_nodes(
        &self,
        type_filter: Option<&NodeType>,
        property_filters: &PropertyMap,
    ) -> Result<Vec<Node>> {
        Ok(self.store.list_nodes(type_filter, property_filters)?)
    }

    pub fn stats(&self) -> Result<GraphStats> {
        let (node_count, edge_count) = self.store.counts()?;
        Ok(GraphStats {
            node_count,
            edge_count,
        })
    }
}

fn check_depth(max_depth: usize) -> Result<()> {
    if max_depth == 0 {
        return Err(QueryError::InvalidDepth { depth: max_depth });
    }
    Ok(())
}
