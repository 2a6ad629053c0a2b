//! infragraph-core: Shared types and error handling for the Infragraph platform.
//!
//! This crate provides the foundational types used across all Infragraph
//! components:
//! - Node and edge types for the infrastructure knowledge graph
//! - Tagged property values with well-defined merge semantics
//! - Connector result batches produced by source parsers
//! - Common error types

pub mod error;
pub mod props;
pub mod types;

pub use error::InfragraphError;
pub use props::{merge_properties, PropertyMap, PropertyValue};
pub use types::{ConnectorResult, Edge, EdgeType, Node, NodeType};
