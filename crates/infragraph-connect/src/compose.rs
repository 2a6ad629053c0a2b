//! Connector for compose-style service definition files.
//!
//! Extracts service/database/cache nodes from the top-level `services`
//! mapping, `depends_on` edges from declared dependencies, and `calls`/
//! `uses` edges from URL-shaped environment values that name another
//! service in the same file as their host.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use infragraph_core::{ConnectorResult, Edge, EdgeType, Node, NodeType, PropertyMap};

use crate::connector::{read_source, Connector};
use crate::error::{ConnectError, Result};
use crate::infer::{guess_type_from_name, infer_node_type, url_host};

pub struct ComposeConnector;

impl Connector for ComposeConnector {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn parse(&self, path: &Path) -> Result<ConnectorResult> {
        let content = read_source(path)?;
        let file: ComposeFile = serde_yaml::from_str(&content)
            .map_err(|e| ConnectError::invalid(path, e.to_string()))?;

        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for (service_name, service) in &file.services {
            let service = match service {
                Some(s) => s,
                None => continue,
            };

            let node_type = determine_type(service_name, service);
            let node_id = Node::derive_id(&node_type, service_name);

            nodes.push(Node::new(
                node_type,
                service_name.clone(),
                service.properties(),
            ));

            for dep in service.dependency_names() {
                let target_type = match file.services.get(&dep) {
                    Some(Some(dep_service)) => determine_type(&dep, dep_service),
                    _ => guess_type_from_name(&dep),
                };
                edges.push(Edge::new(
                    EdgeType::DependsOn,
                    node_id.clone(),
                    Node::derive_id(&target_type, &dep),
                    PropertyMap::new(),
                ));
            }

            edges.extend(environment_edges(&node_id, service, &file.services));
        }

        Ok(ConnectorResult {
            connector: self.name().to_string(),
            source_path: path.to_path_buf(),
            nodes,
            edges,
        })
    }
}

/// Edges implied by a service's environment variables.
///
/// A host that does not resolve to a service declared in the same file
/// produces no edge.
fn environment_edges(
    source_id: &str,
    service: &ComposeService,
    all_services: &BTreeMap<String, Option<ComposeService>>,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    for (key, value) in service.environment_map() {
        let host = match url_host(&value) {
            Some(h) if all_services.contains_key(h) => h.to_string(),
            _ => continue,
        };

        if key == "DATABASE_URL" {
            let mut props = PropertyMap::new();
            props.insert("connection_type".to_string(), "database".into());
            edges.push(Edge::new(
                EdgeType::Uses,
                source_id,
                Node::derive_id(&NodeType::Database, &host),
                props,
            ));
        } else if key.contains("REDIS") || key == "CACHE_URL" {
            let mut props = PropertyMap::new();
            props.insert("connection_type".to_string(), "cache".into());
            edges.push(Edge::new(
                EdgeType::Uses,
                source_id,
                Node::derive_id(&NodeType::Cache, &host),
                props,
            ));
        } else if key.ends_with("_URL") {
            let target_type = match all_services.get(&host) {
                Some(Some(target)) => determine_type(&host, target),
                _ => guess_type_from_name(&host),
            };
            let mut props = PropertyMap::new();
            props.insert("via".to_string(), key.clone().into());
            edges.push(Edge::new(
                EdgeType::Calls,
                source_id,
                Node::derive_id(&target_type, &host),
                props,
            ));
        }
    }

    edges
}

fn determine_type(name: &str, service: &ComposeService) -> NodeType {
    let labels = service.label_map();
    infer_node_type(name, labels.get("type").map(String::as_str), service.image.as_deref())
}

// ── File shape ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ComposeFile {
    services: BTreeMap<String, Option<ComposeService>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComposeService {
    image: Option<String>,
    labels: Option<KeyValues>,
    ports: Vec<PortSpec>,
    environment: Option<KeyValues>,
    depends_on: Option<DependsOn>,
    build: Option<BuildSpec>,
}

impl ComposeService {
    fn label_map(&self) -> BTreeMap<String, String> {
        self.labels.as_ref().map(KeyValues::to_map).unwrap_or_default()
    }

    fn environment_map(&self) -> BTreeMap<String, String> {
        self.environment
            .as_ref()
            .map(KeyValues::to_map)
            .unwrap_or_default()
    }

    fn dependency_names(&self) -> Vec<String> {
        match &self.depends_on {
            Some(DependsOn::List(names)) => names.clone(),
            Some(DependsOn::Map(conditions)) => conditions.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();

        if let Some(port) = self.ports.first().and_then(PortSpec::host_port) {
            props.insert("port".to_string(), port.into());
        }

        let labels = self.label_map();
        if let Some(team) = labels.get("team") {
            props.insert("team".to_string(), team.clone().into());
        }
        if let Some(oncall) = labels.get("oncall") {
            props.insert("oncall".to_string(), oncall.clone().into());
        }
        if let Some(pci) = labels.get("pci_compliant") {
            props.insert("pci_compliant".to_string(), (pci == "true").into());
        }
        if let Some(encrypted) = labels.get("encrypted") {
            props.insert("encrypted".to_string(), (encrypted == "true").into());
        }

        if let Some(image) = &self.image {
            props.insert("image".to_string(), image.clone().into());
        }
        if let Some(context) = self.build.as_ref().and_then(BuildSpec::context) {
            props.insert("build_path".to_string(), context.to_string().into());
        }

        props
    }
}

/// Labels and environment appear either as a mapping or as a
/// `KEY=VALUE` list; both collapse to the same map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyValues {
    Map(BTreeMap<String, serde_yaml::Value>),
    List(Vec<String>),
}

impl KeyValues {
    fn to_map(&self) -> BTreeMap<String, String> {
        match self {
            Self::Map(map) => map
                .iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
                .collect(),
            Self::List(items) => items
                .iter()
                .filter_map(|item| item.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DependsOn {
    List(Vec<String>),
    Map(BTreeMap<String, serde_yaml::Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortSpec {
    Num(i64),
    Str(String),
}

impl PortSpec {
    /// The host-side port of a mapping like `"8080:80"`, or the plain port.
    fn host_port(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.split(':').next()?.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BuildSpec {
    Path(String),
    Spec { context: Option<String> },
}

impl BuildSpec {
    fn context(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::Spec { context } => context.as_deref(),
        }
    }
}
