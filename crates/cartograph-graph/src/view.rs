use crate::visibility::{TypeVisibility, VisibilityState};
use crate::working::WorkingGraph;
use cartograph_core::{Color, LinkId, NodeKey, TypeId, TypeRegistry};
use serde::Serialize;

/// One renderable node of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    pub key: NodeKey,
    pub label: String,
    pub type_id: TypeId,
    pub color: Color,
    pub is_root: bool,
    /// `Some` for group nodes, with the number of members they stand for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
}

impl ViewNode {
    pub fn is_group(&self) -> bool {
        self.member_count.is_some()
    }
}

/// One renderable edge of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEdge {
    pub id: LinkId,
    pub source: NodeKey,
    pub target: NodeKey,
    pub synthetic: bool,
}

/// The filtered graph handed to the renderer. Rebuilt on demand from the
/// working graph and the current visibility; never mutated in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewGraph {
    pub revision: u64,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

impl ViewGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.nodes.iter().any(|node| node.key == *key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&ViewNode> {
        self.nodes.iter().find(|node| node.key == *key)
    }

    pub fn edge_between(&self, source: &NodeKey, target: &NodeKey) -> Option<&ViewEdge> {
        self.edges
            .iter()
            .find(|edge| edge.source == *source && edge.target == *target)
    }
}

/// Projects the working graph through the visibility state.
///
/// Each type contributes either its real nodes, its group node or nothing.
/// Edges survive only when both endpoints do, so the output can never hold a
/// dangling reference.
pub fn derive_view(
    graph: &WorkingGraph,
    visibility: &VisibilityState,
    registry: &TypeRegistry,
    revision: u64,
) -> ViewGraph {
    let mut keep = vec![false; graph.node_count()];
    let mut nodes = Vec::new();
    for index in graph.node_indices() {
        let node = &graph[index];
        let Some(info) = registry.get(&node.type_id) else {
            continue;
        };
        let kept = match visibility.visibility(&node.type_id) {
            TypeVisibility::Show { .. } => !node.is_group(),
            TypeVisibility::Grouped { .. } => node.is_group(),
            TypeVisibility::None | TypeVisibility::Hide { .. } => false,
        };
        if !kept {
            continue;
        }
        keep[index.0] = true;
        nodes.push(ViewNode {
            key: node.key.clone(),
            label: node.display_name.clone(),
            type_id: node.type_id.clone(),
            color: info.color,
            is_root: node.is_main,
            member_count: node.group.as_ref().map(|group| group.member_count()),
        });
    }

    let mut edges = Vec::new();
    for index in graph.edge_indices() {
        let edge = &graph[index];
        if !keep[edge.source.0] || !keep[edge.target.0] {
            continue;
        }
        edges.push(ViewEdge {
            id: edge.id.clone(),
            source: graph[edge.source].key.clone(),
            target: graph[edge.target].key.clone(),
            synthetic: edge.synthetic,
        });
    }

    ViewGraph {
        revision,
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{GroupBuilder, IngestOutput};
    use cartograph_client::RawGraph;
    use cartograph_core::{InstanceId, TypeSpec, TypeState, palette_color};

    fn registry() -> TypeRegistry {
        TypeRegistry::from_specs(vec![
            TypeSpec::new("person", "Person"),
            TypeSpec::new("dataset", "Dataset"),
        ])
        .unwrap()
    }

    fn fixture(registry: &TypeRegistry) -> IngestOutput {
        let raw = RawGraph::from_json(
            r#"{
                "nodes": [
                    {"id": "n1", "type": "person", "name": "Ada"},
                    {"id": "n2", "type": "person", "name": "Grace"},
                    {"id": "n3", "type": "dataset", "name": "Census"}
                ],
                "edges": [
                    {"id": "e1", "source": "n1", "target": "n3"}
                ]
            }"#,
        )
        .unwrap();
        GroupBuilder::new(registry).ingest(&raw, &InstanceId::new("n3"))
    }

    #[test]
    fn test_grouped_type_contributes_only_its_group() {
        let registry = registry();
        let out = fixture(&registry);
        let view = derive_view(&out.graph, &out.visibility, &registry, 1);

        assert_eq!(view.node_count(), 2);
        assert!(view.contains_node(&NodeKey::Group(TypeId::new("person"))));
        assert!(view.contains_node(&NodeKey::Instance(InstanceId::new("n3"))));
        assert!(!view.contains_node(&NodeKey::Instance(InstanceId::new("n1"))));

        assert_eq!(view.edge_count(), 1);
        let edge = &view.edges[0];
        assert!(edge.synthetic);
        assert_eq!(edge.source, NodeKey::Group(TypeId::new("person")));
        assert_eq!(edge.target, NodeKey::Instance(InstanceId::new("n3")));
    }

    #[test]
    fn test_show_state_reveals_members_and_drops_group() {
        let registry = registry();
        let mut out = fixture(&registry);
        assert!(out.visibility.set_state(&TypeId::new("person"), TypeState::Show));
        let view = derive_view(&out.graph, &out.visibility, &registry, 2);

        assert_eq!(view.node_count(), 3);
        assert!(!view.contains_node(&NodeKey::Group(TypeId::new("person"))));
        assert_eq!(view.edge_count(), 1);
        let edge = &view.edges[0];
        assert_eq!(edge.id, LinkId::new("e1"));
        assert!(!edge.synthetic);
    }

    #[test]
    fn test_hidden_type_contributes_nothing() {
        let registry = registry();
        let mut out = fixture(&registry);
        assert!(out.visibility.set_state(&TypeId::new("person"), TypeState::Hide));
        let view = derive_view(&out.graph, &out.visibility, &registry, 3);

        assert_eq!(view.node_count(), 1);
        assert!(view.contains_node(&NodeKey::Instance(InstanceId::new("n3"))));
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn test_view_nodes_carry_presentation_fields() {
        let registry = registry();
        let out = fixture(&registry);
        let view = derive_view(&out.graph, &out.visibility, &registry, 7);

        assert_eq!(view.revision, 7);
        let group = view
            .node(&NodeKey::Group(TypeId::new("person")))
            .unwrap();
        assert_eq!(group.label, "Person (2)");
        assert_eq!(group.member_count, Some(2));
        assert_eq!(group.color, palette_color(0));
        assert!(!group.is_root);

        let root = view
            .node(&NodeKey::Instance(InstanceId::new("n3")))
            .unwrap();
        assert!(root.is_root);
        assert_eq!(root.member_count, None);
        assert_eq!(root.color, palette_color(1));
    }
}
