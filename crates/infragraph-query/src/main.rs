//! CLI entry point for infragraph-query.
//!
//! Ingests the configured sources into a fresh in-memory graph, runs one
//! query, and writes the JSON result to stdout. Logs go to stderr so the
//! output stays parseable by callers.

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use infragraph_connect::config::IngestConfig;
use infragraph_connect::pipeline::resolve_paths;
use infragraph_connect::IngestionPipeline;
use infragraph_core::{EdgeType, NodeType, PropertyMap};
use infragraph_query::{QueryEngine, DEFAULT_MAX_DEPTH};
use infragraph_store::GraphStore;

#[derive(Parser)]
#[command(name = "infragraph-query")]
#[command(about = "Traversal and ownership queries over the Infragraph knowledge graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory containing the source files (default: current directory).
    #[arg(short, long, default_value = ".", global = true)]
    data_dir: String,

    /// Config file prefix (default: infragraph).
    #[arg(short, long, default_value = "infragraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a single node by id.
    Node { id: String },
    /// List nodes, optionally filtered by type.
    List {
        #[arg(long = "type")]
        node_type: Option<String>,
    },
    /// Transitive dependencies of a node.
    Downstream {
        id: String,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        /// Restrict traversal to these edge types.
        #[arg(long = "edge-type")]
        edge_types: Vec<String>,
    },
    /// Transitive dependents of a node.
    Upstream {
        id: String,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        #[arg(long = "edge-type")]
        edge_types: Vec<String>,
    },
    /// Failure-impact summary for a node.
    BlastRadius { id: String },
    /// Shortest directed path between two nodes.
    Path {
        from: String,
        to: String,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Resolve the owning team of a node.
    Owner { id: String },
    /// Resolve the on-call contact for a node.
    Oncall { id: String },
    /// Assets owned by a team.
    TeamAssets { team_id: String },
    /// Services with a direct uses edge to a resource.
    ServicesUsing { resource_id: String },
    /// Substring search over node ids and names.
    Search { text: String },
    /// Node and edge counts.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = IngestConfig::load(&cli.config)?;
    resolve_paths(&mut config, Path::new(&cli.data_dir));

    let store = Arc::new(GraphStore::new());
    let report = IngestionPipeline::new(Arc::clone(&store), config)
        .run()
        .await?;
    tracing::info!(
        run_id = %report.run_id,
        nodes = report.node_count,
        edges = report.edge_count,
        "Ingestion complete"
    );

    let engine = QueryEngine::new(store);
    let output = match cli.command {
        Command::Node { id } => serde_json::to_value(engine.get_node(&id)?)?,
        Command::List { node_type } => {
            let type_filter = node_type.map(NodeType::from);
            serde_json::to_value(engine.list_nodes(type_filter.as_ref(), &PropertyMap::new())?)?
        }
        Command::Downstream {
            id,
            max_depth,
            edge_types,
        } => {
            let filter = edge_type_filter(edge_types);
            serde_json::to_value(engine.downstream(&id, filter.as_deref(), max_depth)?)?
        }
        Command::Upstream {
            id,
            max_depth,
            edge_types,
        } => {
            let filter = edge_type_filter(edge_types);
            serde_json::to_value(engine.upstream(&id, filter.as_deref(), max_depth)?)?
        }
        Command::BlastRadius { id } => serde_json::to_value(engine.blast_radius(&id)?)?,
        Command::Path {
            from,
            to,
            max_depth,
        } => serde_json::to_value(engine.path(&from, &to, max_depth)?)?,
        Command::Owner { id } => serde_json::to_value(engine.get_owner(&id)?)?,
        Command::Oncall { id } => serde_json::to_value(engine.get_oncall(&id)?)?,
        Command::TeamAssets { team_id } => serde_json::to_value(engine.get_team_assets(&team_id)?)?,
        Command::ServicesUsing { resource_id } => {
            serde_json::to_value(engine.services_using(&resource_id)?)?
        }
        Command::Search { text } => serde_json::to_value(engine.search_nodes(&text)?)?,
        Command::Stats => serde_json::to_value(engine.stats()?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn edge_type_filter(raw: Vec<String>) -> Option<Vec<EdgeType>> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.into_iter().map(EdgeType::from).collect())
    }
}
