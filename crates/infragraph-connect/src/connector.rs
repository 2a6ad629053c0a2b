//! The connector capability interface and the explicit registration table.
//!
//! Connectors are stateless and independent: each one parses exactly one
//! file format and knows nothing about the others. New formats are added
//! by registering a factory under a name; the pipeline selects connectors
//! by configuration and never names a concrete type.

use std::collections::BTreeMap;
use std::path::Path;

use infragraph_core::ConnectorResult;

use crate::compose::ComposeConnector;
use crate::error::{ConnectError, Result};
use crate::kubernetes::KubernetesConnector;
use crate::teams::TeamsConnector;

/// A format-specific parser producing nodes and edges from one source file.
///
/// `parse` is pure: it must not mutate shared state and must produce the
/// same result for the same file content.
pub trait Connector: Send + Sync {
    /// Stable connector identifier.
    fn name(&self) -> &'static str;

    /// Parse a configuration file into a batch of nodes and edges.
    ///
    /// Fails with [`ConnectError::NotFound`] when the path is missing and
    /// [`ConnectError::InvalidFormat`] when the file does not parse as the
    /// expected structure.
    fn parse(&self, path: &Path) -> Result<ConnectorResult>;
}

pub type ConnectorFactory = fn() -> Box<dyn Connector>;

/// Mapping from connector name to factory.
///
/// Populated by explicit registration at process start; registration is
/// idempotent per name (last registration wins).
#[derive(Default)]
pub struct ConnectorRegistry {
    factories: BTreeMap<String, ConnectorFactory>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the three standard connectors registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("compose", || Box::new(ComposeConnector));
        registry.register("teams", || Box::new(TeamsConnector));
        registry.register("kubernetes", || Box::new(KubernetesConnector));
        registry
    }

    pub fn register(&mut self, name: &str, factory: ConnectorFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn get(&self, name: &str) -> Option<&ConnectorFactory> {
        self.factories.get(name)
    }

    /// Registered connector names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate a connector by name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Connector>> {
        self.factories.get(name).map(|factory| factory())
    }
}

/// Read a source file, mapping a missing path to [`ConnectError::NotFound`].
pub(crate) fn read_source(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ConnectError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}
