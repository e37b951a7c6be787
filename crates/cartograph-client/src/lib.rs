use async_trait::async_trait;
use cartograph_core::{InstanceId, LinkId, TypeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod http;
mod memory;

pub use http::HttpGraphSource;
pub use memory::StaticGraphSource;

/// One instance as it appears on the wire. Nodes whose `type` is not in the
/// session's registry are dropped during ingestion, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: InstanceId,
    #[serde(rename = "type")]
    pub type_id: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One directed link between two instances, endpoints given as ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEdge {
    pub id: LinkId,
    pub source: InstanceId,
    pub target: InstanceId,
}

/// Neighborhood payload for one root instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl RawGraph {
    /// Parses a payload from its JSON text, as stored in fixture files.
    pub fn from_json(raw: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed graph payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no graph available for root {0}")]
    UnknownRoot(InstanceId),
}

/// Supplier of raw neighborhoods, one fetch per root instance.
#[async_trait]
pub trait GraphSource: Send + Sync {
    async fn fetch_graph(&self, root: &InstanceId) -> Result<RawGraph, SourceError>;
}

#[async_trait]
impl<S: GraphSource + ?Sized> GraphSource for std::sync::Arc<S> {
    async fn fetch_graph(&self, root: &InstanceId) -> Result<RawGraph, SourceError> {
        (**self).fetch_graph(root).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserializes_wire_shape() {
        let graph = RawGraph::from_json(
            r#"{
                "nodes": [
                    {"id": "n1", "type": "person", "name": "Ada"},
                    {"id": "n2", "type": "person"}
                ],
                "edges": [
                    {"id": "e1", "source": "n1", "target": "n2"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].type_id.as_str(), "person");
        assert_eq!(graph.nodes[0].name.as_deref(), Some("Ada"));
        assert!(graph.nodes[1].name.is_none());
        assert_eq!(graph.edges[0].source.as_str(), "n1");
    }

    #[test]
    fn test_payload_tolerates_missing_sections() {
        let graph = RawGraph::from_json(r#"{"nodes": []}"#).unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_type_field_round_trips_as_type() {
        let node = RawNode {
            id: InstanceId::new("n1"),
            type_id: TypeId::new("dataset"),
            name: None,
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"id":"n1","type":"dataset"}"#);
    }
}
