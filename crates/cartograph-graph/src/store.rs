//! Graph Store
//!
//! Owns everything derived from the last fetch: the working graph, per-type
//! visibility, the highlight and the ingestion counters. All mutations go
//! through the store, and every observable change bumps the revision that
//! stamps the derived views.
//!
//! Fetch results are arbitrated by generation. `begin_fetch` hands out a
//! ticket and only the newest ticket may apply or fail its result, so a slow
//! response for an old root can never overwrite a newer one.

use crate::highlight::Highlight;
use crate::ingest::{GroupBuilder, IngestStats};
use crate::view::{ViewEdge, ViewGraph, derive_view};
use crate::visibility::VisibilityState;
use crate::working::{WorkingGraph, WorkingNode};
use cartograph_client::RawGraph;
use cartograph_core::{Color, InstanceId, NodeKey, TypeId, TypeRegistry, TypeState};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Where the store stands with respect to its root instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    NotFetched,
    Fetching { root: InstanceId },
    Fetched { root: InstanceId },
    Failed { root: InstanceId, reason: String },
}

impl FetchState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, FetchState::Fetching { .. })
    }

    pub fn root(&self) -> Option<&InstanceId> {
        match self {
            FetchState::NotFetched => None,
            FetchState::Fetching { root }
            | FetchState::Fetched { root }
            | FetchState::Failed { root, .. } => Some(root),
        }
    }
}

/// Ties an in-flight fetch to the store generation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// What the store did with a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Superseded,
}

/// One row of the settings panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub type_id: TypeId,
    pub label: String,
    pub color: Color,
    pub state: TypeState,
    pub has_group: bool,
    pub pinned: bool,
    pub expanded: bool,
    pub member_count: usize,
}

#[derive(Debug)]
pub struct GraphStore {
    registry: TypeRegistry,
    fetch: FetchState,
    generation: u64,
    graph: WorkingGraph,
    visibility: VisibilityState,
    highlight: Highlight,
    stats: IngestStats,
    revision: u64,
}

impl GraphStore {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            fetch: FetchState::NotFetched,
            generation: 0,
            graph: WorkingGraph::new(),
            visibility: VisibilityState::new(),
            highlight: Highlight::default(),
            stats: IngestStats::default(),
            revision: 0,
        }
    }

    /// Marks a fetch for `root` as in flight and returns the ticket its
    /// result must present. The previous graph stays visible until the
    /// result lands; the highlight is cleared right away.
    pub fn begin_fetch(&mut self, root: InstanceId) -> FetchTicket {
        self.generation += 1;
        debug!("Fetch {} started for root {}", self.generation, root);
        self.fetch = FetchState::Fetching { root };
        self.highlight.clear();
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Ingests a fetched graph, unless a newer fetch has started since the
    /// ticket was issued.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        root: &InstanceId,
        raw: &RawGraph,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                "Discarding fetch result for {} because fetch {} is already active",
                root, self.generation
            );
            return FetchOutcome::Superseded;
        }
        let output = GroupBuilder::new(&self.registry).ingest(raw, root);
        self.graph = output.graph;
        self.visibility = output.visibility;
        self.stats = output.stats;
        self.highlight.clear();
        self.fetch = FetchState::Fetched { root: root.clone() };
        self.revision += 1;
        FetchOutcome::Applied
    }

    /// Records a failed fetch, unless a newer fetch has started since. The
    /// store empties out; recovery is a new fetch, not a retry of this one.
    pub fn fail_fetch(
        &mut self,
        ticket: FetchTicket,
        root: &InstanceId,
        reason: impl Into<String>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                "Discarding fetch failure for {} because fetch {} is already active",
                root, self.generation
            );
            return FetchOutcome::Superseded;
        }
        let reason = reason.into();
        warn!("Fetch for root {} failed: {}", root, reason);
        self.graph = WorkingGraph::new();
        self.visibility = VisibilityState::new();
        self.stats = IngestStats::default();
        self.highlight.clear();
        self.fetch = FetchState::Failed {
            root: root.clone(),
            reason,
        };
        self.revision += 1;
        FetchOutcome::Applied
    }

    /// Applies a visibility change and reports whether anything changed.
    /// An active highlight is recomputed because its redirect target may
    /// have moved.
    pub fn set_type_state(&mut self, type_id: &TypeId, state: TypeState) -> bool {
        if !self.visibility.set_state(type_id, state) {
            return false;
        }
        self.revision += 1;
        self.highlight.recompute(&self.graph, &self.visibility);
        true
    }

    /// Flips a type's panel expansion. `None` for types outside the catalog.
    pub fn toggle_expanded(&mut self, type_id: &TypeId) -> Option<bool> {
        if !self.registry.contains(type_id) {
            debug!("Ignoring expansion toggle for unknown type {}", type_id);
            return None;
        }
        let expanded = self.visibility.toggle_expanded(type_id);
        self.revision += 1;
        Some(expanded)
    }

    /// A click on a group node dissolves it back into its members.
    pub fn explode_node(&mut self, key: &NodeKey) -> bool {
        match key {
            NodeKey::Group(type_id) => self.set_type_state(type_id, TypeState::Show),
            NodeKey::Instance(_) => false,
        }
    }

    /// Moves the highlight to `key`, redirecting members of grouped types to
    /// their group node. Keys that resolve to nothing clear the highlight.
    pub fn set_highlight(&mut self, key: Option<&NodeKey>) {
        let target = key.and_then(|key| self.graph.resolve_key(key));
        if key.is_some() && target.is_none() {
            debug!("Clearing highlight: {:?} is not in the working graph", key);
        }
        self.highlight.set(&self.graph, &self.visibility, target);
    }

    /// Derives the renderable view for the current visibility.
    pub fn view(&self) -> ViewGraph {
        derive_view(&self.graph, &self.visibility, &self.registry, self.revision)
    }

    /// Settings panel rows, one per catalog type in catalog order.
    pub fn type_summaries(&self) -> Vec<TypeSummary> {
        let mut counts: HashMap<&TypeId, usize> = HashMap::new();
        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            if !node.is_group() {
                *counts.entry(&node.type_id).or_default() += 1;
            }
        }
        self.registry
            .iter()
            .map(|info| {
                let visibility = self.visibility.visibility(&info.id);
                let member_count = counts.get(&info.id).copied().unwrap_or(0);
                TypeSummary {
                    type_id: info.id.clone(),
                    label: info.label.clone(),
                    color: info.color,
                    state: visibility.state(),
                    has_group: visibility.group().is_some(),
                    pinned: member_count < 2,
                    expanded: self.visibility.is_expanded(&info.id),
                    member_count,
                }
            })
            .collect()
    }

    /// Real nodes of a type, ordered by display name for the panel listing.
    pub fn members_of(&self, type_id: &TypeId) -> Vec<&WorkingNode> {
        let mut members: Vec<&WorkingNode> = self
            .graph
            .node_indices()
            .map(|index| &self.graph[index])
            .filter(|node| !node.is_group() && node.type_id == *type_id)
            .collect();
        members.sort_by(|a, b| {
            a.display_name.cmp(&b.display_name).then_with(|| {
                a.instance_id()
                    .map(InstanceId::as_str)
                    .cmp(&b.instance_id().map(InstanceId::as_str))
            })
        });
        members
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn root_id(&self) -> Option<&InstanceId> {
        self.graph
            .root()
            .and_then(|index| self.graph[index].instance_id())
    }

    /// Key of the focused node, after any group redirection.
    pub fn focus_key(&self) -> Option<&NodeKey> {
        self.highlight.focus().map(|index| &self.graph[index].key)
    }

    pub fn is_highlighted(&self, key: &NodeKey) -> bool {
        self.graph
            .resolve_key(key)
            .is_some_and(|index| self.highlight.is_node_highlighted(index))
    }

    pub fn is_edge_highlighted(&self, edge: &ViewEdge) -> bool {
        match self.focus_key() {
            Some(focus) => edge.source == *focus || edge.target == *focus,
            None => false,
        }
    }
}
