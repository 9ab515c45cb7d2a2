//! The workspace facade: the single mutation surface over the three stores.
//!
//! Every cross-store rule lives here: endpoint liveness for connections,
//! the cascading delete (incident edges, group membership, dissolution),
//! and the bidirectional consistency between a node's `group_id` and its
//! group's member set. Callers (in practice the interaction controller and
//! the execution simulator) never touch the individual stores directly, so
//! no external read can observe a half-applied cascade.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::catalog::TemplateCatalog;
use crate::types::{EdgeKind, GroupId, NodeId, Position, RunStatus};

use super::edges::{Edge, EdgeStore};
use super::errors::{CanvasError, Result};
use super::groups::{Group, GroupStore};
use super::nodes::{CanvasNode, NodeStore};

/// The single mutex guarding all three stores.
///
/// The engine is logically single-actor; the only concurrent toucher is the
/// simulator's timer callback, which locks the same mutex, so every cascade
/// is atomic from any observer's perspective.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// What a cascading node removal touched, reported so callers observe the
/// whole cascade as one unit.
#[derive(Clone, Debug, Default)]
pub struct RemovalReport {
    /// The removed node, or `None` when the id was already gone (removal of
    /// an absent node is a silent no-op).
    pub node: Option<CanvasNode>,
    /// Every edge that had the removed node as source or target.
    pub removed_edges: Vec<Edge>,
    /// The node's group, when removing it dropped membership below two.
    pub dissolved_group: Option<Group>,
}

/// Owns the template catalog handle and the three canvas stores.
#[derive(Clone, Debug)]
pub struct Workspace {
    catalog: TemplateCatalog,
    nodes: NodeStore,
    edges: EdgeStore,
    groups: GroupStore,
}

impl Workspace {
    /// An empty workspace over the given catalog.
    pub fn new(catalog: TemplateCatalog) -> Self {
        Workspace {
            catalog,
            nodes: NodeStore::new(),
            edges: EdgeStore::new(),
            groups: GroupStore::new(),
        }
    }

    /// Wrap a workspace in the shared mutex used across the engine.
    pub fn into_shared(self) -> SharedWorkspace {
        Arc::new(Mutex::new(self))
    }

    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // Node operations
    // ------------------------------------------------------------------

    /// Instantiate a template at `position`, returning the fresh node id.
    pub fn place(&mut self, template_key: &str, position: Position) -> Result<NodeId> {
        let template = self
            .catalog
            .lookup(template_key)
            .ok_or_else(|| CanvasError::UnknownTemplate(template_key.to_string()))?;
        let id = NodeId::fresh();
        let node = CanvasNode::new(id.clone(), template.name.clone(), template.kind.clone(), position);
        info!(node = %id, template = template_key, %position, "placed canvas item");
        self.nodes.insert(node);
        Ok(id)
    }

    /// Overwrite a node's position.
    ///
    /// Positions are never clamped; the canvas extent is unbounded. This is
    /// the hot path under drag-move events and does nothing but the
    /// overwrite.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;
        node.position = position;
        Ok(())
    }

    /// Remove a node with the full cascade: incident edges go, and its
    /// group (if any) loses the membership, dissolving below two members.
    ///
    /// Removing an absent id is a silent no-op reported as an empty
    /// [`RemovalReport`].
    pub fn remove_node(&mut self, id: &NodeId) -> RemovalReport {
        let Some(node) = self.nodes.remove(id) else {
            return RemovalReport::default();
        };
        let removed_edges = self.edges.disconnect_involving(id);
        let dissolved_group = match &node.group_id {
            Some(group_id) => self.drop_membership(&group_id.clone(), id),
            None => None,
        };
        info!(
            node = %id,
            edges = removed_edges.len(),
            dissolved = dissolved_group.is_some(),
            "removed canvas item",
        );
        RemovalReport {
            node: Some(node),
            removed_edges,
            dissolved_group,
        }
    }

    /// Set a node's run status.
    pub fn set_run_status(&mut self, id: &NodeId, status: RunStatus) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;
        debug!(node = %id, from = %node.run_status, to = %status, "run status change");
        node.run_status = status;
        Ok(())
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Snapshot of every placed node.
    #[must_use]
    pub fn nodes(&self) -> Vec<CanvasNode> {
        self.nodes.snapshot()
    }

    // ------------------------------------------------------------------
    // Edge operations
    // ------------------------------------------------------------------

    /// Insert or overwrite the directed `(source, target)` connection.
    ///
    /// Returns the previously stored kind when overwriting. Fails with
    /// [`CanvasError::SelfLoop`] or [`CanvasError::DanglingEndpoint`]
    /// without touching the store.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        kind: EdgeKind,
    ) -> Result<Option<EdgeKind>> {
        if source == target {
            return Err(CanvasError::SelfLoop(source.clone()));
        }
        for endpoint in [source, target] {
            if !self.nodes.contains(endpoint) {
                return Err(CanvasError::DanglingEndpoint(endpoint.clone()));
            }
        }
        let replaced = self.edges.connect(source.clone(), target.clone(), kind)?;
        info!(%source, %target, %kind, replaced = replaced.is_some(), "connected");
        Ok(replaced)
    }

    /// Look up the kind stored for a `(source, target)` pair.
    #[must_use]
    pub fn edge(&self, source: &NodeId, target: &NodeId) -> Option<EdgeKind> {
        self.edges.get(source, target)
    }

    /// Snapshot of every connection.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.edges.snapshot()
    }

    // ------------------------------------------------------------------
    // Group operations
    // ------------------------------------------------------------------

    /// Create a named group over `members`, setting each member's
    /// back-reference. The anchor is the member centroid at creation time.
    ///
    /// Fails with [`CanvasError::InsufficientMembers`] (fewer than two
    /// distinct members), [`CanvasError::MemberNotFound`] (dead id), or
    /// [`CanvasError::MemberGrouped`] (a member already belongs to a group;
    /// membership is exclusive). Validation happens before any mutation, so
    /// a failed call leaves every store untouched.
    pub fn create_group(&mut self, name: &str, members: &[NodeId]) -> Result<GroupId> {
        let distinct: FxHashSet<NodeId> = members.iter().cloned().collect();
        if distinct.len() < 2 {
            return Err(CanvasError::InsufficientMembers(distinct.len()));
        }
        for member in &distinct {
            match self.nodes.get(member) {
                None => return Err(CanvasError::MemberNotFound(member.clone())),
                Some(node) => {
                    if let Some(group) = &node.group_id {
                        return Err(CanvasError::MemberGrouped {
                            node: member.clone(),
                            group: group.clone(),
                        });
                    }
                }
            }
        }

        let id = GroupId::fresh();
        let positions: Vec<Position> = distinct
            .iter()
            .filter_map(|m| self.nodes.get(m).map(|n| n.position))
            .collect();
        let anchor = Position::centroid(&positions);
        for member in &distinct {
            if let Some(node) = self.nodes.get_mut(member) {
                node.group_id = Some(id.clone());
            }
        }
        info!(group = %id, name, members = distinct.len(), "created group");
        self.groups.insert(Group::new(id.clone(), name, distinct, anchor));
        Ok(id)
    }

    /// Flip a group's expand/collapse flag.
    pub fn toggle_expanded(&mut self, id: &GroupId) -> Result<()> {
        let group = self
            .groups
            .get_mut(id)
            .ok_or_else(|| CanvasError::GroupNotFound(id.clone()))?;
        group.is_expanded = !group.is_expanded;
        Ok(())
    }

    /// Remove one member from a group, clearing its back-reference.
    ///
    /// When membership would drop below two the group is dissolved and the
    /// survivor's back-reference is cleared too. Removing a node that is
    /// not a member is a no-op. This is the same code path the node-delete
    /// cascade goes through.
    pub fn remove_member(&mut self, group_id: &GroupId, node_id: &NodeId) -> Result<()> {
        if !self.groups.contains(group_id) {
            return Err(CanvasError::GroupNotFound(group_id.clone()));
        }
        if let Some(node) = self.nodes.get_mut(node_id) {
            if node.group_id.as_ref() == Some(group_id) {
                node.group_id = None;
            }
        }
        self.drop_membership(group_id, node_id);
        Ok(())
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Snapshot of every group.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.groups.snapshot()
    }

    /// Shrink a group after `node_id` leaves it, dissolving the group when
    /// membership drops below two. Returns the dissolved group, if any.
    /// The departing node's own back-reference is cleared by the caller
    /// (or gone with the node); survivors are cleared here on dissolution.
    fn drop_membership(&mut self, group_id: &GroupId, node_id: &NodeId) -> Option<Group> {
        let group = self.groups.get_mut(group_id)?;
        if !group.members.remove(node_id) {
            return None;
        }
        if group.members.len() >= 2 {
            return None;
        }
        let group = self.groups.remove(group_id)?;
        for survivor in &group.members {
            if let Some(node) = self.nodes.get_mut(survivor) {
                node.group_id = None;
            }
        }
        info!(group = %group_id, "group dissolved below two members");
        Some(group)
    }

    // ------------------------------------------------------------------
    // Rehydration support
    // ------------------------------------------------------------------

    /// Rebuild a workspace from already-validated parts. Used by the
    /// persistence layer after its consistency checks; back-references are
    /// recomputed from group membership, which is the source of truth.
    pub(crate) fn from_parts(
        catalog: TemplateCatalog,
        nodes: Vec<CanvasNode>,
        edges: Vec<Edge>,
        groups: Vec<Group>,
    ) -> Self {
        let mut ws = Workspace::new(catalog);
        for mut node in nodes {
            node.group_id = None;
            ws.nodes.insert(node);
        }
        for edge in edges {
            // Validated upstream; a self-loop here would be a persistence bug.
            let _ = ws.edges.connect(edge.source, edge.target, edge.kind);
        }
        for group in groups {
            for member in &group.members {
                if let Some(node) = ws.nodes.get_mut(member) {
                    node.group_id = Some(group.id.clone());
                }
            }
            ws.groups.insert(group);
        }
        ws
    }
}
