//! Infragraph Store — the authoritative graph collections.
//!
//! This crate is the single mutation point for the knowledge graph. All
//! writes flow through an [`IngestTxn`] (exclusive for a full ingestion
//! run) and all reads through a [`GraphView`] (shared, snapshot-consistent
//! for one query operation), so no traversal ever observes a store mutated
//! mid-flight.

pub mod store;

pub use store::{GraphStore, GraphView, IngestTxn, StoreError};
