/*!
Persistence primitives for serializing/deserializing a workspace snapshot
(used by the JSON file store and any future persistent backends).

Design goals:
- Explicit serde-friendly structs decoupled from the in-memory stores.
- Conversion logic localized (From / TryFrom impls) so the storage
  backends stay lean and declarative.
- Forward compatibility: enum fields persist via their `encode()` string
  forms, and unknown encodings round-trip through the documented
  fallbacks (`ComponentKind::Custom`, `RunStatus::Idle`, `EdgeKind::Data`).

Rehydration validates referential integrity before building a workspace:
edge endpoints must be live, groups must have at least two live members,
and `group_id` back-references are rebuilt from group membership (the
membership sets are the source of truth). A `Running` status never
survives a snapshot; no timer comes back with it.

This module performs no I/O itself beyond the store implementations at
the bottom; the shapes and conversions are pure data glue.
*/

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{CanvasNode, Edge, Group, Workspace};
use crate::catalog::TemplateCatalog;
use crate::types::{ComponentKind, EdgeKind, GroupId, NodeId, Position, RunStatus};
use crate::utils::json_ext::JsonSerializable;

/// Blanket implementation of JsonSerializable for all suitable types using
/// PersistenceError.
impl<T> JsonSerializable<PersistenceError> for T
where
    T: serde::Serialize + for<'de> serde::de::DeserializeOwned,
{
    fn to_json_string(&self) -> std::result::Result<String, PersistenceError> {
        serde_json::to_string(self).map_err(|e| PersistenceError::Serde { source: e })
    }

    fn from_json_str(s: &str) -> std::result::Result<Self, PersistenceError> {
        serde_json::from_str(s).map_err(|e| PersistenceError::Serde { source: e })
    }
}

/// Persisted shape of a placed canvas item.
///
/// `group_id` is intentionally absent: back-references are derived from
/// group membership on load, so a snapshot cannot carry an inconsistent
/// pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedNode {
    pub id: String,
    pub label: String,
    /// `ComponentKind::encode()` form.
    pub kind: String,
    pub x: f64,
    pub y: f64,
    /// `RunStatus::encode()` form.
    #[serde(default)]
    pub run_status: Option<String>,
}

/// Persisted shape of a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedEdge {
    pub source: String,
    pub target: String,
    /// `EdgeKind::encode()` form.
    pub kind: String,
}

/// Persisted shape of a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedGroup {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
    pub is_expanded: bool,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Complete persisted shape of a workspace: the three stores as plain data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedWorkspace {
    #[serde(default)]
    pub nodes: Vec<PersistedNode>,
    #[serde(default)]
    pub edges: Vec<PersistedEdge>,
    #[serde(default)]
    pub groups: Vec<PersistedGroup>,
}

/// Conversion, validation, and I/O errors for workspace snapshots.
#[derive(Debug, Error, Diagnostic)]
pub enum PersistenceError {
    #[error("JSON serialization/deserialization failed: {source}")]
    #[diagnostic(
        code(workboard::persistence::serde),
        help("Ensure the JSON structure matches the Persisted* types.")
    )]
    Serde {
        #[source]
        source: serde_json::Error,
    },

    /// An edge or group in the snapshot referenced a node that is not in it.
    #[error("snapshot references missing node {node} from {referrer}")]
    #[diagnostic(
        code(workboard::persistence::dangling_reference),
        help("The snapshot was not produced through the documented contracts; repair or discard it.")
    )]
    DanglingReference { referrer: String, node: String },

    /// A persisted group had fewer than two members.
    #[error("persisted group {group} has {count} member(s), need at least 2")]
    #[diagnostic(code(workboard::persistence::undersized_group))]
    UndersizedGroup { group: String, count: usize },

    /// Two persisted groups claimed the same member.
    #[error("node {node} appears in more than one persisted group")]
    #[diagnostic(code(workboard::persistence::overlapping_groups))]
    OverlappingGroups { node: String },

    /// A persisted edge was a self-loop.
    #[error("persisted edge from {0} to itself")]
    #[diagnostic(code(workboard::persistence::self_loop))]
    SelfLoop(String),

    #[error("snapshot I/O failed: {source}")]
    #[diagnostic(code(workboard::persistence::io))]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/* ---------- in-memory <-> persisted conversions ---------- */

impl From<&CanvasNode> for PersistedNode {
    fn from(node: &CanvasNode) -> Self {
        PersistedNode {
            id: node.id.to_string(),
            label: node.label.clone(),
            kind: node.kind.encode(),
            x: node.position.x,
            y: node.position.y,
            run_status: Some(node.run_status.encode().to_string()),
        }
    }
}

impl From<&Edge> for PersistedEdge {
    fn from(edge: &Edge) -> Self {
        PersistedEdge {
            source: edge.source.to_string(),
            target: edge.target.to_string(),
            kind: edge.kind.encode().to_string(),
        }
    }
}

impl From<&Group> for PersistedGroup {
    fn from(group: &Group) -> Self {
        let mut members: Vec<String> = group.members.iter().map(ToString::to_string).collect();
        members.sort();
        PersistedGroup {
            id: group.id.to_string(),
            name: group.name.clone(),
            members,
            is_expanded: group.is_expanded,
            anchor_x: group.anchor.x,
            anchor_y: group.anchor.y,
        }
    }
}

impl From<&Workspace> for PersistedWorkspace {
    fn from(ws: &Workspace) -> Self {
        let mut nodes: Vec<PersistedNode> = ws.nodes().iter().map(PersistedNode::from).collect();
        let mut edges: Vec<PersistedEdge> = ws.edges().iter().map(PersistedEdge::from).collect();
        let mut groups: Vec<PersistedGroup> = ws.groups().iter().map(PersistedGroup::from).collect();
        // Deterministic snapshots regardless of hash iteration order.
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        PersistedWorkspace {
            nodes,
            edges,
            groups,
        }
    }
}

impl PersistedWorkspace {
    /// Validate the snapshot and rebuild a live workspace over `catalog`.
    ///
    /// Group back-references are restored from the membership sets; a
    /// `Running` status comes back as `Idle`.
    pub fn into_workspace(self, catalog: TemplateCatalog) -> Result<Workspace> {
        let node_ids: FxHashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();

        for edge in &self.edges {
            if edge.source == edge.target {
                return Err(PersistenceError::SelfLoop(edge.source.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(PersistenceError::DanglingReference {
                        referrer: format!("edge {} -> {}", edge.source, edge.target),
                        node: endpoint.clone(),
                    });
                }
            }
        }

        let mut claimed: FxHashSet<&str> = FxHashSet::default();
        for group in &self.groups {
            let distinct: FxHashSet<&str> = group.members.iter().map(String::as_str).collect();
            if distinct.len() < 2 {
                return Err(PersistenceError::UndersizedGroup {
                    group: group.id.clone(),
                    count: distinct.len(),
                });
            }
            for member in &distinct {
                if !node_ids.contains(member) {
                    return Err(PersistenceError::DanglingReference {
                        referrer: format!("group {}", group.id),
                        node: (*member).to_string(),
                    });
                }
                if !claimed.insert(member) {
                    return Err(PersistenceError::OverlappingGroups {
                        node: (*member).to_string(),
                    });
                }
            }
        }

        let nodes: Vec<CanvasNode> = self
            .nodes
            .iter()
            .map(|n| CanvasNode {
                id: NodeId::from(n.id.as_str()),
                label: n.label.clone(),
                kind: ComponentKind::decode(&n.kind),
                position: Position::new(n.x, n.y),
                run_status: n
                    .run_status
                    .as_deref()
                    .map(RunStatus::decode)
                    .unwrap_or_default(),
                group_id: None,
            })
            .collect();
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .map(|e| Edge {
                source: NodeId::from(e.source.as_str()),
                target: NodeId::from(e.target.as_str()),
                kind: EdgeKind::decode(&e.kind),
            })
            .collect();
        let groups: Vec<Group> = self
            .groups
            .iter()
            .map(|g| {
                let members: FxHashSet<NodeId> =
                    g.members.iter().map(|m| NodeId::from(m.as_str())).collect();
                let mut group = Group::new(
                    GroupId::from(g.id.as_str()),
                    g.name.clone(),
                    members,
                    Position::new(g.anchor_x, g.anchor_y),
                );
                group.is_expanded = g.is_expanded;
                group
            })
            .collect();

        Ok(Workspace::from_parts(catalog, nodes, edges, groups))
    }
}

/* ---------- storage backends ---------- */

/// Boundary to the workspace persistence service: plain-data snapshots in,
/// plain-data snapshots out.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one.
    async fn save(&self, snapshot: &PersistedWorkspace) -> Result<()>;
    /// Load the last saved snapshot, or `None` if none exists.
    async fn load(&self) -> Result<Option<PersistedWorkspace>>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    slot: std::sync::Mutex<Option<PersistedWorkspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn save(&self, snapshot: &PersistedWorkspace) -> Result<()> {
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedWorkspace>> {
        Ok(self.slot.lock().unwrap().clone())
    }
}

/// Pretty-printed JSON snapshot on disk.
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl WorkspaceStore for JsonFileStore {
    async fn save(&self, snapshot: &PersistedWorkspace) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PersistenceError::Serde { source: e })?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedWorkspace>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(Some(PersistedWorkspace::from_json_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
