//! infragraph-connect: Source connectors for the Infragraph knowledge graph.
//!
//! Each connector turns one configuration file format (compose files, team
//! rosters, Kubernetes manifests) into a batch of nodes and edges. The
//! ingestion pipeline runs the registered connectors in a fixed precedence
//! order and merges their output into the graph store.

pub mod compose;
pub mod config;
pub mod connector;
pub mod error;
pub mod infer;
pub mod kubernetes;
pub mod pipeline;
pub mod teams;

pub use connector::{Connector, ConnectorRegistry};
pub use error::ConnectError;
pub use pipeline::{IngestReport, IngestionPipeline, SourceOutcome, SourceStatus};
