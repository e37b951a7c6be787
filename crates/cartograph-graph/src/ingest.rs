//! Graph Ingestion
//!
//! Turns a raw fetched graph into a [`WorkingGraph`] plus its initial
//! [`VisibilityState`]. Runs exactly once per fetch; visibility changes
//! afterwards never re-enter this module.

use crate::visibility::{TypeVisibility, VisibilityState};
use crate::working::{NodeIndex, WorkingGraph};
use cartograph_client::{RawEdge, RawGraph};
use cartograph_core::{InstanceId, TypeId, TypeRegistry};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Counters describing what one ingestion pass kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub recognized_nodes: usize,
    pub dropped_nodes: usize,
    pub resolved_edges: usize,
    pub dropped_edges: usize,
    pub group_nodes: usize,
    pub synthetic_edges: usize,
}

/// Everything one fetch produces.
#[derive(Debug, Default)]
pub struct IngestOutput {
    pub graph: WorkingGraph,
    pub visibility: VisibilityState,
    pub stats: IngestStats,
}

/// Builds the working graph for a fetched root, synthesizing one group node
/// per type with two or more members and mirroring edges onto the groups.
pub struct GroupBuilder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> GroupBuilder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn ingest(&self, raw: &RawGraph, root: &InstanceId) -> IngestOutput {
        let mut graph = WorkingGraph::new();
        let mut visibility = VisibilityState::new();
        let mut stats = IngestStats::default();

        for node in &raw.nodes {
            if !self.registry.contains(&node.type_id) {
                warn!(
                    "Dropping node {} because type {} is not registered",
                    node.id, node.type_id
                );
                stats.dropped_nodes += 1;
                continue;
            }
            let display_name = node
                .name
                .clone()
                .unwrap_or_else(|| node.id.as_str().to_string());
            match graph.add_instance(node.id.clone(), node.type_id.clone(), display_name) {
                Some(_) => stats.recognized_nodes += 1,
                None => {
                    debug!("Ignoring duplicate node id {}", node.id);
                    stats.dropped_nodes += 1;
                }
            }
        }

        // One edge per resolved (source, target) pair is the rule for mirrors
        // below; originals are kept verbatim and seed the set.
        let mut seen_pairs: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        let mut originals: Vec<(NodeIndex, NodeIndex, RawEdge)> = Vec::new();
        for edge in &raw.edges {
            let Some(source) = graph.resolve(&edge.source) else {
                warn!(
                    "Dropping edge {} because source node {} is not in the working graph",
                    edge.id, edge.source
                );
                stats.dropped_edges += 1;
                continue;
            };
            let Some(target) = graph.resolve(&edge.target) else {
                warn!(
                    "Dropping edge {} because target node {} is not in the working graph",
                    edge.id, edge.target
                );
                stats.dropped_edges += 1;
                continue;
            };
            graph.add_edge(source, target, edge.id.clone(), false);
            stats.resolved_edges += 1;
            seen_pairs.insert((source, target));
            originals.push((source, target, edge.clone()));
        }

        if !graph.set_root(root) {
            debug!("Root {} is not present in the fetched graph", root);
        }

        let mut members_by_type: HashMap<TypeId, Vec<NodeIndex>> = HashMap::new();
        for index in graph.node_indices() {
            let node = &graph[index];
            members_by_type
                .entry(node.type_id.clone())
                .or_default()
                .push(index);
        }

        // Registry order keeps group node indices reproducible across runs.
        for info in self.registry.iter() {
            let members = members_by_type.get(&info.id).cloned().unwrap_or_default();
            let entry = match members.len() {
                0 => TypeVisibility::None,
                1 => TypeVisibility::Show { group: None },
                count => {
                    let label = format!("{} ({})", info.label, count);
                    let group = graph.add_group(info.id.clone(), label, members);
                    stats.group_nodes += 1;
                    TypeVisibility::Grouped { group }
                }
            };
            visibility.insert(info.id.clone(), entry);
        }

        for (source, target, link) in &originals {
            let source_group = graph.group_of(&graph[*source].type_id);
            let target_group = graph.group_of(&graph[*target].type_id);
            let mut mirrors: Vec<(NodeIndex, NodeIndex)> = Vec::new();
            if let Some(group) = source_group {
                mirrors.push((group, *target));
            }
            if let Some(group) = target_group {
                mirrors.push((*source, group));
            }
            if let (Some(source_group), Some(target_group)) = (source_group, target_group) {
                mirrors.push((source_group, target_group));
            }
            for (mirror_source, mirror_target) in mirrors {
                if seen_pairs.insert((mirror_source, mirror_target)) {
                    graph.add_edge(mirror_source, mirror_target, link.id.clone(), true);
                    stats.synthetic_edges += 1;
                }
            }
        }

        debug!(
            "Ingested {} nodes and {} edges for root {} ({} groups, {} synthetic edges)",
            graph.node_count(),
            graph.edge_count(),
            root,
            stats.group_nodes,
            stats.synthetic_edges
        );

        IngestOutput {
            graph,
            visibility,
            stats,
        }
    }
}
