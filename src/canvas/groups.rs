//! The group store: named clusters of canvas items.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::types::{GroupId, NodeId, Position};

/// A named cluster of at least two canvas items.
///
/// `anchor` is the centroid of the members at creation time; it is not
/// recomputed as members move (the dashboard renders the collapsed pill
/// there). A group below two members is never observable: the workspace
/// dissolves it as part of the same mutation that shrank it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: FxHashSet<NodeId>,
    pub is_expanded: bool,
    pub anchor: Position,
}

impl Group {
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        members: FxHashSet<NodeId>,
        anchor: Position,
    ) -> Self {
        Group {
            id,
            name: name.into(),
            members,
            is_expanded: true,
            anchor,
        }
    }

    #[must_use]
    pub fn contains(&self, node: &NodeId) -> bool {
        self.members.contains(node)
    }
}

/// Owns every group, keyed by id.
///
/// Membership rules (the ≥2 invariant, back-reference consistency,
/// dissolution) live in the workspace facade so the node-delete and
/// member-removal paths share one code path.
#[derive(Clone, Debug, Default)]
pub struct GroupStore {
    groups: FxHashMap<GroupId, Group>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    #[must_use]
    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn get_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    /// Remove a group, returning it if it was present.
    pub fn remove(&mut self, id: &GroupId) -> Option<Group> {
        self.groups.remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &GroupId) -> bool {
        self.groups.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Owned snapshot of every group. Iteration order is unspecified.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Group> {
        self.groups.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
