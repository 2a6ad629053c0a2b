//! CLI entry point for the infragraph-connect ingestion runner.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use infragraph_store::GraphStore;

use infragraph_connect::config::IngestConfig;
use infragraph_connect::pipeline::resolve_paths;
use infragraph_connect::IngestionPipeline;

#[derive(Parser)]
#[command(name = "infragraph-connect")]
#[command(about = "Ingestion runner for the infragraph topology graph")]
struct Cli {
    /// Directory containing the source files (default: current directory).
    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// Config file prefix (default: infragraph).
    #[arg(short, long, default_value = "infragraph")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut config = IngestConfig::load(&cli.config)?;
    resolve_paths(&mut config, Path::new(&cli.data_dir));

    let store = Arc::new(GraphStore::new());
    let pipeline = IngestionPipeline::new(store, config);
    let report = pipeline.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
