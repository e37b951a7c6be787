use cartograph_client::{RawEdge, RawGraph, RawNode};
use cartograph_core::{InstanceId, LinkId, TypeId, TypeRegistry, TypeSpec};

pub fn synthetic_registry(type_count: usize) -> TypeRegistry {
    let specs = (0..type_count)
        .map(|i| TypeSpec::new(format!("type_{i}"), format!("Type {i}")))
        .collect();
    TypeRegistry::from_specs(specs).expect("synthetic catalog has no duplicates")
}

/// Raw graph with `node_count` nodes spread evenly over `type_count` types
/// and `edge_count` edges on a fixed pseudo-random stride.
pub fn synthetic_graph(node_count: usize, type_count: usize, edge_count: usize) -> RawGraph {
    let nodes = (0..node_count)
        .map(|i| RawNode {
            id: InstanceId::new(format!("node_{i}")),
            type_id: TypeId::new(format!("type_{}", i % type_count)),
            name: Some(format!("Node {i}")),
        })
        .collect();
    let edges = (0..edge_count)
        .map(|i| RawEdge {
            id: LinkId::new(format!("edge_{i}")),
            source: InstanceId::new(format!("node_{}", i % node_count)),
            target: InstanceId::new(format!("node_{}", (i * 7 + 1) % node_count)),
        })
        .collect();
    RawGraph { nodes, edges }
}
