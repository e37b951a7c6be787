use crate::visibility::{TypeVisibility, VisibilityState};
use crate::working::{EdgeIndex, NodeIndex, WorkingGraph};
use std::collections::HashSet;

/// At most one focused node, plus the sets of nodes and edges connected to
/// it over the full working graph.
///
/// Connectivity is computed on the post-ingestion edge list, not the filtered
/// view, and the sets are rebuilt after every visibility change while a focus
/// is active because the redirect target of the requested node can change.
#[derive(Debug, Clone, Default)]
pub struct Highlight {
    requested: Option<NodeIndex>,
    focus: Option<NodeIndex>,
    neighbors: HashSet<NodeIndex>,
    edges: HashSet<EdgeIndex>,
}

impl Highlight {
    pub fn set(
        &mut self,
        graph: &WorkingGraph,
        visibility: &VisibilityState,
        node: Option<NodeIndex>,
    ) {
        if self.requested == node {
            return;
        }
        self.requested = node;
        self.recompute(graph, visibility);
    }

    pub fn clear(&mut self) {
        self.requested = None;
        self.focus = None;
        self.neighbors.clear();
        self.edges.clear();
    }

    /// Re-resolves the focus and rebuilds both connectivity sets.
    pub(crate) fn recompute(&mut self, graph: &WorkingGraph, visibility: &VisibilityState) {
        self.focus = None;
        self.neighbors.clear();
        self.edges.clear();
        let Some(requested) = self.requested else {
            return;
        };

        // Members of a grouped type are not rendered; the group node stands
        // in for them, so the focus moves there.
        let node = &graph[requested];
        let focus = match visibility.visibility(&node.type_id) {
            TypeVisibility::Grouped { group } if !node.is_group() => group,
            _ => requested,
        };
        self.focus = Some(focus);

        for index in graph.edge_indices() {
            let Some((source, target)) = graph.edge_endpoints(index) else {
                continue;
            };
            if source == focus {
                self.edges.insert(index);
                self.neighbors.insert(target);
            } else if target == focus {
                self.edges.insert(index);
                self.neighbors.insert(source);
            }
        }
    }

    pub fn focus(&self) -> Option<NodeIndex> {
        self.focus
    }

    pub fn has_focus(&self) -> bool {
        self.focus.is_some()
    }

    pub fn is_node_highlighted(&self, index: NodeIndex) -> bool {
        self.focus == Some(index) || self.neighbors.contains(&index)
    }

    pub fn is_edge_highlighted(&self, index: EdgeIndex) -> bool {
        self.edges.contains(&index)
    }

    pub fn neighbors(&self) -> &HashSet<NodeIndex> {
        &self.neighbors
    }

    pub fn connected_edges(&self) -> &HashSet<EdgeIndex> {
        &self.edges
    }
}
