//! The edge store: directed, typed connections between canvas items.
//!
//! An edge has no independent id; its identity is the `(source, target)`
//! pair. Connecting an already-connected pair overwrites the stored kind
//! rather than erroring, so a repeated connect gesture reads as "connection
//! updated" in the dashboard.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{EdgeKind, NodeId};

use super::errors::{CanvasError, Result};

/// A directed, typed connection between two canvas items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// Owns every connection, keyed by the `(source, target)` pair.
///
/// Endpoint liveness is validated by the workspace facade before insertion;
/// this store only enforces the self-loop rule it can check locally.
#[derive(Clone, Debug, Default)]
pub struct EdgeStore {
    edges: FxHashMap<(NodeId, NodeId), EdgeKind>,
}

impl EdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the `(source, target)` edge.
    ///
    /// Returns the previously stored kind when an existing pair was
    /// overwritten. Fails with [`CanvasError::SelfLoop`] when `source ==
    /// target`, leaving the store unchanged.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
    ) -> Result<Option<EdgeKind>> {
        if source == target {
            return Err(CanvasError::SelfLoop(source));
        }
        Ok(self.edges.insert((source, target), kind))
    }

    /// Remove and return every edge where `node` is source or target.
    /// Idempotent: a second call for the same node returns an empty vec.
    pub fn disconnect_involving(&mut self, node: &NodeId) -> Vec<Edge> {
        let doomed: Vec<(NodeId, NodeId)> = self
            .edges
            .keys()
            .filter(|(s, t)| s == node || t == node)
            .cloned()
            .collect();
        doomed
            .into_iter()
            .map(|key| {
                let kind = self.edges.remove(&key).unwrap_or_default();
                Edge {
                    source: key.0,
                    target: key.1,
                    kind,
                }
            })
            .collect()
    }

    /// Look up the kind stored for a `(source, target)` pair.
    #[must_use]
    pub fn get(&self, source: &NodeId, target: &NodeId) -> Option<EdgeKind> {
        self.edges.get(&(source.clone(), target.clone())).copied()
    }

    /// Owned snapshot of every edge. Iteration order is unspecified.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|((source, target), kind)| Edge {
                source: source.clone(),
                target: target.clone(),
                kind: *kind,
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
