//! The ingestion pipeline: clear, parse, merge, report.
//!
//! Parses run concurrently (each connector is a pure function over its own
//! file), but the upsert phase applies results under one exclusive ingest
//! transaction, in configured source order, nodes before edges per
//! connector. Order matters twice over: it decides which connector's type
//! guess becomes the canonical node id, and whose properties win on key
//! collisions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use infragraph_core::ConnectorResult;
use infragraph_store::GraphStore;

use crate::config::IngestConfig;
use crate::connector::ConnectorRegistry;
use crate::error::Result;

/// Orchestrates one full-refresh ingestion run.
pub struct IngestionPipeline {
    registry: ConnectorRegistry,
    store: Arc<GraphStore>,
    config: IngestConfig,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceOutcome>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// What happened to one configured source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub connector: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub nodes: usize,
    pub edges: usize,
    /// Edges dropped because an endpoint was missing at write time.
    pub edges_dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Parsed,
    /// A missing optional source file is not an error.
    SkippedMissing,
    /// The connector aborted; other sources in the run still apply.
    Failed { reason: String },
}

enum ParseTask {
    Running(JoinHandle<Result<ConnectorResult>>),
    Skipped,
    Unknown,
}

impl IngestionPipeline {
    pub fn new(store: Arc<GraphStore>, config: IngestConfig) -> Self {
        Self {
            registry: ConnectorRegistry::with_defaults(),
            store,
            config,
        }
    }

    /// Replace the default connector table.
    pub fn with_registry(mut self, registry: ConnectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Run a full-refresh ingestion: wipe the store, parse every
    /// configured source, merge the results in precedence order.
    pub async fn run(&self) -> Result<IngestReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, sources = self.config.sources.len(), "Starting ingestion run");

        // Parse phase: connectors are independent, run them concurrently.
        let mut tasks = Vec::with_capacity(self.config.sources.len());
        for spec in &self.config.sources {
            let path = PathBuf::from(&spec.path);
            if !path.is_file() {
                tracing::info!(connector = %spec.connector, path = %path.display(), "Source missing, skipping");
                tasks.push(ParseTask::Skipped);
                continue;
            }
            match self.registry.create(&spec.connector) {
                Some(connector) => {
                    let task_path = path.clone();
                    tasks.push(ParseTask::Running(tokio::task::spawn_blocking(move || {
                        connector.parse(&task_path)
                    })));
                }
                None => {
                    tracing::warn!(connector = %spec.connector, "Unknown connector in config");
                    tasks.push(ParseTask::Unknown);
                }
            }
        }

        // Merge phase: one exclusive transaction for the whole run.
        let mut txn = self.store.begin_ingest()?;
        txn.clear();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (spec, task) in self.config.sources.iter().zip(tasks) {
            let path = PathBuf::from(&spec.path);
            let outcome = match task {
                ParseTask::Skipped => outcome(spec, path, SourceStatus::SkippedMissing, 0, 0, 0),
                ParseTask::Unknown => outcome(
                    spec,
                    path,
                    SourceStatus::Failed {
                        reason: format!("unknown connector: {}", spec.connector),
                    },
                    0,
                    0,
                    0,
                ),
                ParseTask::Running(handle) => match handle.await {
                    Ok(Ok(result)) => {
                        let nodes = result.nodes.len();
                        let mut persisted = 0;
                        let mut dropped = 0;

                        // Nodes before edges, always, so a connector's own
                        // edges find their endpoints.
                        for node in result.nodes {
                            txn.upsert_node(node);
                        }
                        for edge in result.edges {
                            if txn.upsert_edge(edge) {
                                persisted += 1;
                            } else {
                                dropped += 1;
                            }
                        }

                        tracing::info!(
                            connector = %spec.connector,
                            nodes,
                            edges = persisted,
                            edges_dropped = dropped,
                            "Merged source"
                        );
                        outcome(spec, path, SourceStatus::Parsed, nodes, persisted, dropped)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(connector = %spec.connector, error = %e, "Connector failed");
                        outcome(
                            spec,
                            path,
                            SourceStatus::Failed {
                                reason: e.to_string(),
                            },
                            0,
                            0,
                            0,
                        )
                    }
                    Err(join_err) => outcome(
                        spec,
                        path,
                        SourceStatus::Failed {
                            reason: format!("parse task panicked: {join_err}"),
                        },
                        0,
                        0,
                        0,
                    ),
                },
            };
            outcomes.push(outcome);
        }

        let (node_count, edge_count) = txn.counts();
        drop(txn);

        let report = IngestReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            sources: outcomes,
            node_count,
            edge_count,
        };
        tracing::info!(%run_id, node_count, edge_count, "Ingestion run complete");
        Ok(report)
    }
}

fn outcome(
    spec: &crate::config::SourceSpec,
    path: PathBuf,
    status: SourceStatus,
    nodes: usize,
    edges: usize,
    edges_dropped: usize,
) -> SourceOutcome {
    SourceOutcome {
        connector: spec.connector.clone(),
        path,
        status,
        nodes,
        edges,
        edges_dropped,
    }
}

/// Resolve configured source paths relative to a base directory.
pub fn resolve_paths(config: &mut IngestConfig, base: &Path) {
    for spec in &mut config.sources {
        let path = Path::new(&spec.path);
        if path.is_relative() {
            spec.path = base.join(path).to_string_lossy().into_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSpec;

    #[tokio::test]
    async fn all_sources_missing_yields_empty_graph() {
        let store = Arc::new(GraphStore::new());
        let mut config = IngestConfig::default();
        resolve_paths(&mut config, Path::new("/nonexistent"));

        let pipeline = IngestionPipeline::new(Arc::clone(&store), config);
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.node_count, 0);
        assert_eq!(report.edge_count, 0);
        assert!(report
            .sources
            .iter()
            .all(|s| matches!(s.status, SourceStatus::SkippedMissing)));
    }

    #[tokio::test]
    async fn unknown_connector_is_a_per_source_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("things.yaml");
        std::fs::write(&path, "services: {}\n").unwrap();

        let store = Arc::new(GraphStore::new());
        let config = IngestConfig {
            sources: vec![SourceSpec {
                connector: "terraform".to_string(),
                path: path.to_string_lossy().into_owned(),
            }],
        };

        let report = IngestionPipeline::new(store, config).run().await.unwrap();
        assert!(matches!(
            report.sources[0].status,
            SourceStatus::Failed { .. }
        ));
    }
}
