//! Connector for team ownership rosters.
//!
//! Produces one `team` node per entry and one `owns` edge per owned asset.
//! The owned asset's type is guessed from its name; the pipeline's fixed
//! precedence order reconciles the guess against other connectors' output.

use std::path::Path;

use serde::Deserialize;

use infragraph_core::{ConnectorResult, Edge, EdgeType, Node, NodeType, PropertyMap};

use crate::connector::{read_source, Connector};
use crate::error::{ConnectError, Result};
use crate::infer::guess_type_from_name;

pub struct TeamsConnector;

impl Connector for TeamsConnector {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn parse(&self, path: &Path) -> Result<ConnectorResult> {
        let content = read_source(path)?;
        let file: TeamsFile = serde_yaml::from_str(&content)
            .map_err(|e| ConnectError::invalid(path, e.to_string()))?;

        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for entry in &file.teams {
            // A malformed or nameless entry is skipped, not a file failure.
            let team: TeamEntry = match serde_yaml::from_value(entry.clone()) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed team entry");
                    continue;
                }
            };
            let name = match &team.name {
                Some(n) if !n.is_empty() => n.clone(),
                _ => {
                    tracing::warn!(path = %path.display(), "Skipping team entry without name");
                    continue;
                }
            };

            let node_id = Node::derive_id(&NodeType::Team, &name);
            nodes.push(Node::new(NodeType::Team, name, team.properties()));

            for owned in &team.owns {
                let target_type = guess_type_from_name(owned);
                edges.push(Edge::new(
                    EdgeType::Owns,
                    node_id.clone(),
                    Node::derive_id(&target_type, owned),
                    PropertyMap::new(),
                ));
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

#[derive(Debug, Deserialize)]
struct TeamsFile {
    teams: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    name: Option<String>,
    lead: Option<String>,
    slack_channel: Option<String>,
    pagerduty_schedule: Option<String>,
    #[serde(default)]
    owns: Vec<String>,
}

impl TeamEntry {
    fn properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        if let Some(lead) = &self.lead {
            props.insert("lead".to_string(), lead.clone().into());
        }
        if let Some(channel) = &self.slack_channel {
            props.insert("slack_channel".to_string(), channel.clone().into());
        }
        if let Some(schedule) = &self.pagerduty_schedule {
            props.insert("pagerduty_schedule".to_string(), schedule.clone().into());
        }
        props.insert("owned_count".to_string(), (self.owns.len() as i64).into());
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infragraph_core::PropertyValue;
    use std::io::Write;

    fn parse_str(yaml: &str) -> ConnectorResult {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        TeamsConnector.parse(file.path()).unwrap()
    }

    #[test]
    fn team_nodes_and_ownership_edges() {
        let result = parse_str(
            r##"
teams:
  - name: orders-team
    lead: "@dave"
    slack_channel: "#orders"
    pagerduty_schedule: orders-primary
    owns:
      - order-service
      - orders-db
      - redis-main
"##,
        );

        assert_eq!(result.nodes.len(), 1);
        let team = &result.nodes[0];
        assert_eq!(team.id, "team:orders-team");
        assert_eq!(
            team.properties.get("lead").and_then(PropertyValue::as_str),
            Some("@dave")
        );
        assert_eq!(
            team.properties
                .get("slack_channel")
                .and_then(PropertyValue::as_str),
            Some("#orders")
        );
        assert_eq!(
            team.properties
                .get("owned_count")
                .and_then(PropertyValue::as_i64),
            Some(3)
        );

        let targets: Vec<&str> = result.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["service:order-service", "database:orders-db", "cache:redis-main"]
        );
        assert!(result
            .edges
            .iter()
            .all(|e| e.edge_type == EdgeType::Owns && e.source == "team:orders-team"));
    }

    #[test]
    fn nameless_entries_are_skipped_not_fatal() {
        let result = parse_str(
            r#"
teams:
  - lead: "@nobody"
  - name: billing-team
    owns:
      - billing-service
"#,
        );

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].id, "team:billing-team");
        assert_eq!(result.edges.len(), 1);
    }

    #[test]
    fn team_without_owns_produces_no_edges() {
        let result = parse_str("teams:\n  - name: platform-team\n");
        assert_eq!(result.nodes.len(), 1);
        assert!(result.edges.is_empty());
        assert_eq!(
            result.nodes[0]
                .properties
                .get("owned_count")
                .and_then(PropertyValue::as_i64),
            Some(0)
        );
    }

    #[test]
    fn missing_teams_key_is_invalid_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"squads: []\n").unwrap();
        let err = TeamsConnector.parse(file.path()).unwrap_err();
        assert!(matches!(err, ConnectError::InvalidFormat { .. }));
    }
}
