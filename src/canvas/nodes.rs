//! The canvas item store: the authoritative set of placed nodes.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{ComponentKind, GroupId, NodeId, Position, RunStatus};

/// A placed canvas item.
///
/// `group_id` is a weak back-reference: it mirrors group membership for O(1)
/// lookup but does not keep the group alive. The
/// [`Workspace`](crate::canvas::Workspace) keeps it bidirectionally
/// consistent with [`Group::members`](crate::canvas::Group).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: NodeId,
    pub label: String,
    pub kind: ComponentKind,
    pub position: Position,
    pub run_status: RunStatus,
    pub group_id: Option<GroupId>,
}

impl CanvasNode {
    /// Create an idle, ungrouped node.
    pub fn new(
        id: NodeId,
        label: impl Into<String>,
        kind: ComponentKind,
        position: Position,
    ) -> Self {
        CanvasNode {
            id,
            label: label.into(),
            kind,
            position,
            run_status: RunStatus::Idle,
            group_id: None,
        }
    }
}

/// Owns every placed node, keyed by id.
///
/// This store is a plain collection; cross-store rules (cascading deletes,
/// group back-references) are enforced by the workspace facade.
#[derive(Clone, Debug, Default)]
pub struct NodeStore {
    nodes: FxHashMap<NodeId, CanvasNode>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: CanvasNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut CanvasNode> {
        self.nodes.get_mut(id)
    }

    /// Remove a node, returning it if it was present.
    pub fn remove(&mut self, id: &NodeId) -> Option<CanvasNode> {
        self.nodes.remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.values()
    }

    /// Owned snapshot of every node. Iteration order is unspecified;
    /// callers must not assume stability across mutations.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanvasNode> {
        self.nodes.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
