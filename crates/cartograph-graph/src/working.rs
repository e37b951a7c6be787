use cartograph_core::{InstanceId, LinkId, NodeKey, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membership data carried by a synthetic group node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub members: Vec<NodeIndex>,
}

impl GroupInfo {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A node in the working graph: either a real instance or the group node
/// standing in for all instances of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingNode {
    pub key: NodeKey,
    pub type_id: TypeId,
    pub display_name: String,
    /// True only for the node whose id equals the fetched root instance.
    pub is_main: bool,
    pub group: Option<GroupInfo>,
}

impl WorkingNode {
    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn instance_id(&self) -> Option<&InstanceId> {
        match &self.key {
            NodeKey::Instance(id) => Some(id),
            NodeKey::Group(_) => None,
        }
    }
}

/// Edge between two working nodes. Endpoints are arena indices, so an edge
/// can only exist between nodes that are present in the node set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingEdge {
    pub id: LinkId,
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// True for mirrors created when an endpoint was rewritten to a group.
    pub synthetic: bool,
}

/// Arena of nodes and edges for one fetched neighborhood, with id lookup
/// maps. Rebuilt wholesale on every fetch.
#[derive(Debug, Default)]
pub struct WorkingGraph {
    nodes: Vec<WorkingNode>,
    edges: Vec<WorkingEdge>,
    node_map: HashMap<InstanceId, NodeIndex>,
    group_map: HashMap<TypeId, NodeIndex>,
    root: Option<NodeIndex>,
}

impl WorkingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a real instance node. Returns `None` when the id is already
    /// present; the first occurrence wins.
    pub fn add_instance(
        &mut self,
        id: InstanceId,
        type_id: TypeId,
        display_name: String,
    ) -> Option<NodeIndex> {
        if self.node_map.contains_key(&id) {
            return None;
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(WorkingNode {
            key: NodeKey::Instance(id.clone()),
            type_id,
            display_name,
            is_main: false,
            group: None,
        });
        self.node_map.insert(id, idx);
        Some(idx)
    }

    /// Adds the group node for a type. At most one group exists per type.
    pub fn add_group(
        &mut self,
        type_id: TypeId,
        display_name: String,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(WorkingNode {
            key: NodeKey::Group(type_id.clone()),
            type_id: type_id.clone(),
            display_name,
            is_main: false,
            group: Some(GroupInfo { members }),
        });
        self.group_map.insert(type_id, idx);
        idx
    }

    pub fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        id: LinkId,
        synthetic: bool,
    ) -> EdgeIndex {
        let idx = EdgeIndex(self.edges.len());
        self.edges.push(WorkingEdge {
            id,
            source,
            target,
            synthetic,
        });
        idx
    }

    /// Marks the node carrying `root` as the main node. Returns whether the
    /// root is present in the graph.
    pub fn set_root(&mut self, root: &InstanceId) -> bool {
        match self.node_map.get(root).copied() {
            Some(idx) => {
                self.nodes[idx.0].is_main = true;
                self.root = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn resolve(&self, id: &InstanceId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn group_of(&self, type_id: &TypeId) -> Option<NodeIndex> {
        self.group_map.get(type_id).copied()
    }

    /// Resolves a renderer-facing key to its arena index.
    pub fn resolve_key(&self, key: &NodeKey) -> Option<NodeIndex> {
        match key {
            NodeKey::Instance(id) => self.resolve(id),
            NodeKey::Group(type_id) => self.group_of(type_id),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edges.len()).map(EdgeIndex)
    }

    pub fn edge_endpoints(&self, index: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.edges.get(index.0).map(|e| (e.source, e.target))
    }

    pub fn node_weight(&self, index: NodeIndex) -> Option<&WorkingNode> {
        self.nodes.get(index.0)
    }

    pub fn edge_weight(&self, index: EdgeIndex) -> Option<&WorkingEdge> {
        self.edges.get(index.0)
    }
}

impl Index<NodeIndex> for WorkingGraph {
    type Output = WorkingNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<NodeIndex> for WorkingGraph {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for WorkingGraph {
    type Output = WorkingEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}

impl IndexMut<EdgeIndex> for WorkingGraph {
    fn index_mut(&mut self, index: EdgeIndex) -> &mut Self::Output {
        &mut self.edges[index.0]
    }
}
