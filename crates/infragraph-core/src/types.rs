//! Core domain types for the Infragraph knowledge graph.
//!
//! These types represent nodes and edges in the infrastructure topology
//! graph, shared across connectors, the store, and the query engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::props::PropertyMap;

// ── Node Types ────────────────────────────────────────────────────

/// Classification of a graph node.
///
/// The wire form is a plain lowercase string (`"service"`, `"database"`,
/// ...); unknown strings round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Service,
    Database,
    Cache,
    Team,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Service => "service",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Team => "team",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "service" => Self::Service,
            "database" => Self::Database,
            "cache" => Self::Cache,
            "team" => Self::Team,
            _ => Self::Other(s),
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the knowledge graph.
///
/// `id` is derived deterministically from type and name as
/// `"<type>:<name>"`. Two nodes with the same id are the same logical
/// entity and are merged by the store, never duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Node {
    /// Create a node with its id derived from type and name.
    pub fn new(node_type: NodeType, name: impl Into<String>, properties: PropertyMap) -> Self {
        let name = name.into();
        Self {
            id: Self::derive_id(&node_type, &name),
            node_type,
            name,
            properties,
        }
    }

    /// Canonical node id: `"<type>:<name>"`.
    pub fn derive_id(node_type: &NodeType, name: &str) -> String {
        format!("{}:{name}", node_type.as_str())
    }
}

// ── Edge Types ────────────────────────────────────────────────────

/// Classification of a directed relationship between two nodes.
///
/// The direction encodes "source depends on / calls / uses / owns target".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    DependsOn,
    Calls,
    Uses,
    Owns,
    Other(String),
}

impl EdgeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DependsOn => "depends_on",
            Self::Calls => "calls",
            Self::Uses => "uses",
            Self::Owns => "owns",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "depends_on" => Self::DependsOn,
            "calls" => Self::Calls,
            "uses" => Self::Uses,
            "owns" => Self::Owns,
            _ => Self::Other(s),
        }
    }
}

impl From<EdgeType> for String {
    fn from(t: EdgeType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed relationship between two nodes.
///
/// `source` and `target` are node ids and may reference nodes that no
/// connector has produced yet; the store only persists an edge when both
/// endpoints exist at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Edge {
    /// Create an edge with its id derived from (source, type, target).
    pub fn new(
        edge_type: EdgeType,
        source: impl Into<String>,
        target: impl Into<String>,
        properties: PropertyMap,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::derive_id(&source, &edge_type, &target),
            edge_type,
            source,
            target,
            properties,
        }
    }

    /// Canonical edge id: `"edge:<source>-<type>-<target>"`.
    pub fn derive_id(source: &str, edge_type: &EdgeType, target: &str) -> String {
        format!("edge:{source}-{}-{target}", edge_type.as_str())
    }
}

// ── Connector Output ──────────────────────────────────────────────

/// An immutable batch of nodes and edges produced by one parse pass over
/// one source file. Consumed exactly once by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorResult {
    /// Name of the connector that produced this batch.
    pub connector: String,
    /// The source file that was parsed.
    pub source_path: PathBuf,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}
