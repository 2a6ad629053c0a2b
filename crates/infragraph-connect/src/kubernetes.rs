//! Connector for Kubernetes manifest streams.
//!
//! Walks a multi-document YAML stream. `Deployment` documents become
//! `service` nodes carrying orchestration metadata; their container
//! environment yields `calls` edges after stripping cluster-DNS suffixes.
//! `Service` documents are accepted but produce no nodes here. Runs last
//! in the default precedence order, supplementing nodes from the other
//! connectors with manifest-managed metadata.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use infragraph_core::{
    ConnectorResult, Edge, EdgeType, Node, NodeType, PropertyMap, PropertyValue,
};

use crate::connector::{read_source, Connector};
use crate::error::{ConnectError, Result};
use crate::infer::url_host;

pub struct KubernetesConnector;

impl Connector for KubernetesConnector {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn parse(&self, path: &Path) -> Result<ConnectorResult> {
        let content = read_source(path)?;

        let mut documents = Vec::new();
        for deserializer in serde_yaml::Deserializer::from_str(&content) {
            match serde_yaml::Value::deserialize(deserializer) {
                Ok(serde_yaml::Value::Null) => {}
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unparseable manifest document");
                }
            }
        }

        if documents.is_empty() {
            return Err(ConnectError::invalid(path, "no parseable manifest documents"));
        }

        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for doc in documents {
            let kind = doc
                .get("kind")
                .and_then(serde_yaml::Value::as_str)
                .unwrap_or_default()
                .to_lowercase();

            match kind.as_str() {
                "deployment" => match serde_yaml::from_value::<Deployment>(doc) {
                    Ok(deployment) => {
                        if let Some((node, mut deployment_edges)) = parse_deployment(&deployment) {
                            nodes.push(node);
                            edges.append(&mut deployment_edges);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping malformed Deployment");
                    }
                },
                // Service documents carry networking info only; they do
                // not produce graph nodes in this core.
                "service" => {}
                _ => {}
            }
        }

        Ok(ConnectorResult {
            connector: self.name().to_string(),
            source_path: path.to_path_buf(),
            nodes,
            edges,
        })
    }
}

fn parse_deployment(deployment: &Deployment) -> Option<(Node, Vec<Edge>)> {
    let name = deployment.metadata.name.as_deref()?;
    let node_id = Node::derive_id(&NodeType::Service, name);

    let node = Node::new(
        NodeType::Service,
        name,
        deployment_properties(deployment),
    );
    let edges = environment_edges(name, &node_id, deployment);

    Some((node, edges))
}

fn deployment_properties(deployment: &Deployment) -> PropertyMap {
    let mut props = PropertyMap::new();
    let metadata = &deployment.metadata;
    let spec = &deployment.spec;

    if let Some(namespace) = &metadata.namespace {
        props.insert("namespace".to_string(), namespace.clone().into());
    }
    if let Some(team) = metadata.labels.get("team") {
        props.insert("team".to_string(), team.clone().into());
    }
    if let Some(app) = metadata.labels.get("app") {
        props.insert("app_label".to_string(), app.clone().into());
    }
    if let Some(replicas) = spec.replicas {
        props.insert("replicas".to_string(), replicas.into());
    }

    if let Some(container) = deployment.primary_container() {
        if let Some(image) = &container.image {
            props.insert("image".to_string(), image.clone().into());
        }
        if let Some(port) = container.ports.first().and_then(|p| p.container_port) {
            props.insert("container_port".to_string(), port.into());
        }
        if let Some(resources) = &container.resources {
            if let Some(limits) = resource_map(&resources.limits) {
                props.insert("resource_limits".to_string(), limits);
            }
            if let Some(requests) = resource_map(&resources.requests) {
                props.insert("resource_requests".to_string(), requests);
            }
        }
    }

    // Marks the node as manifest-managed when merged over compose output.
    props.insert("k8s_managed".to_string(), true.into());
    props
}

fn resource_map(raw: &BTreeMap<String, serde_yaml::Value>) -> Option<PropertyValue> {
    if raw.is_empty() {
        return None;
    }
    let map: BTreeMap<String, PropertyValue> = raw
        .iter()
        .filter_map(|(k, v)| scalar_property(v).map(|v| (k.clone(), v)))
        .collect();
    Some(PropertyValue::Map(map))
}

fn scalar_property(value: &serde_yaml::Value) -> Option<PropertyValue> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone().into()),
        serde_yaml::Value::Bool(b) => Some((*b).into()),
        serde_yaml::Value::Number(n) => n
            .as_i64()
            .map(PropertyValue::Int)
            .or_else(|| n.as_f64().map(PropertyValue::Float)),
        _ => None,
    }
}

/// `calls` edges from container environment variables.
///
/// Secret-sourced entries (`valueFrom`) are skipped; hostnames are
/// resolved by stripping any cluster-DNS suffix
/// (`payment-service.ecommerce.svc.cluster.local` → `payment-service`).
fn environment_edges(service_name: &str, node_id: &str, deployment: &Deployment) -> Vec<Edge> {
    let mut edges = Vec::new();

    let container = match deployment.primary_container() {
        Some(c) => c,
        None => return edges,
    };

    for env in &container.env {
        if env.value_from.is_some() {
            continue;
        }
        let value = match env.value.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };
        if !env.name.ends_with("_URL") || env.name == "DATABASE_URL" {
            continue;
        }

        let host = match url_host(value) {
            Some(h) => h.split('.').next().unwrap_or(h),
            None => continue,
        };
        if host.is_empty() || host == service_name {
            continue;
        }

        let mut props = PropertyMap::new();
        props.insert("via".to_string(), env.name.clone().into());
        props.insert("source".to_string(), "k8s".into());
        edges.push(Edge::new(
            EdgeType::Calls,
            node_id,
            Node::derive_id(&NodeType::Service, host),
            props,
        ));
    }

    edges
}

// ── Manifest shape ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Deployment {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: DeploymentSpec,
}

impl Deployment {
    fn primary_container(&self) -> Option<&Container> {
        self.spec
            .template
            .as_ref()?
            .spec
            .as_ref()?
            .containers
            .first()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    name: Option<String>,
    namespace: Option<String>,
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeploymentSpec {
    replicas: Option<i64>,
    template: Option<PodTemplate>,
}

#[derive(Debug, Deserialize)]
struct PodTemplate {
    spec: Option<PodSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodSpec {
    containers: Vec<Container>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Container {
    image: Option<String>,
    ports: Vec<ContainerPort>,
    env: Vec<EnvVar>,
    resources: Option<Resources>,
}

#[derive(Debug, Deserialize)]
struct ContainerPort {
    #[serde(rename = "containerPort")]
    container_port: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EnvVar {
    name: String,
    value: Option<String>,
    #[serde(rename = "valueFrom")]
    value_from: Option<serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resources {
    limits: BTreeMap<String, serde_yaml::Value>,
    requests: BTreeMap<String, serde_yaml::Value>,
}
