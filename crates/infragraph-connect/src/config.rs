//! Configuration for the ingestion pipeline.

use serde::Deserialize;

/// Top-level ingestion configuration.
///
/// Loaded from the `[ingest]` section of `infragraph.toml` or
/// `INFRAGRAPH__INGEST__`-prefixed environment variables. Source order is
/// precedence order: it decides which connector's type guess becomes the
/// canonical node id and whose properties win on key collisions (later
/// wins).
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Sources to ingest, in precedence order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,
}

/// One configured source file and the connector that parses it.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub connector: String,
    pub path: String,
}

impl SourceSpec {
    fn new(connector: &str, path: &str) -> Self {
        Self {
            connector: connector.to_string(),
            path: path.to_string(),
        }
    }
}

fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("compose", "docker-compose.yml"),
        SourceSpec::new("teams", "teams.yaml"),
        SourceSpec::new("kubernetes", "k8s-deployments.yaml"),
    ]
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

impl IngestConfig {
    /// Load from `<file_prefix>.toml` and the environment, falling back to
    /// the default source list.
    pub fn load(file_prefix: &str) -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("INFRAGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match cfg.get::<IngestConfig>("ingest") {
            Ok(c) => Ok(c),
            // An absent section means defaults; a present but malformed
            // one is a real error and must not be silently ignored.
            Err(config::ConfigError::NotFound(_)) => Ok(IngestConfig::default()),
            Err(e) => Err(e.into()),
        }
    }
}
