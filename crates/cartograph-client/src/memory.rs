use crate::{GraphSource, RawGraph, SourceError};
use async_trait::async_trait;
use cartograph_core::InstanceId;
use std::collections::HashMap;

/// In-memory source backed by a map of root id to payload. Used by tests and
/// by the CLI's fixture mode; roots absent from the map fail the fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticGraphSource {
    graphs: HashMap<InstanceId, RawGraph>,
}

impl StaticGraphSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(mut self, root: impl Into<InstanceId>, graph: RawGraph) -> Self {
        self.insert(root, graph);
        self
    }

    pub fn insert(&mut self, root: impl Into<InstanceId>, graph: RawGraph) {
        self.graphs.insert(root.into(), graph);
    }
}

#[async_trait]
impl GraphSource for StaticGraphSource {
    async fn fetch_graph(&self, root: &InstanceId) -> Result<RawGraph, SourceError> {
        self.graphs
            .get(root)
            .cloned()
            .ok_or_else(|| SourceError::UnknownRoot(root.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawEdge, RawNode};
    use cartograph_core::{LinkId, TypeId};

    fn sample_graph() -> RawGraph {
        RawGraph {
            nodes: vec![RawNode {
                id: InstanceId::new("n1"),
                type_id: TypeId::new("person"),
                name: Some("Ada".to_string()),
            }],
            edges: vec![RawEdge {
                id: LinkId::new("e1"),
                source: InstanceId::new("n1"),
                target: InstanceId::new("n1"),
            }],
        }
    }

    #[tokio::test]
    async fn test_returns_registered_graph() {
        let source = StaticGraphSource::new().with_graph("n1", sample_graph());
        let graph = source.fetch_graph(&InstanceId::new("n1")).await.unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_root_fails() {
        let source = StaticGraphSource::new();
        let err = source.fetch_graph(&InstanceId::new("n9")).await.unwrap_err();
        assert!(matches!(err, SourceError::UnknownRoot(id) if id.as_str() == "n9"));
    }
}
