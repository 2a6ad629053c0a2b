//! Result types returned by the query engine.

use serde::Serialize;

use infragraph_core::{Edge, Node};

/// Which way a closure walks the adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges source to target: "what this depends on".
    Forward,
    /// Follow edges target to source: "what breaks if this fails".
    Reverse,
}

/// Failure-impact summary for one node.
#[derive(Debug, Clone, Serialize)]
pub struct BlastRadius {
    /// The node itself, absent if the id is unknown.
    pub node: Option<Node>,
    pub upstream: Vec<Node>,
    pub downstream: Vec<Node>,
    /// Distinct team names touching the node or anything upstream of it.
    pub affected_teams: Vec<String>,
    /// `|upstream| + |downstream|`.
    pub total_impact: usize,
}

/// A shortest directed path by hop count. An empty node list means no
/// path was found within the depth bound.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub length: usize,
}

impl PathResult {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            length: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Current store counts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}
