//! Core types for the Workboard canvas engine.
//!
//! This module defines the fundamental types used throughout the system for
//! identifying and classifying canvas items. These are the domain concepts
//! that define what a workspace canvas *is*.
//!
//! # Key Types
//!
//! - [`NodeId`] / [`GroupId`]: opaque unique identifiers for placed items and groups
//! - [`Position`]: real-valued canvas coordinates
//! - [`ComponentKind`]: classifies what kind of tool a canvas item represents
//! - [`RunStatus`]: the execution lifecycle state of a canvas item
//! - [`EdgeKind`]: classifies the relationship a connection expresses
//!
//! # Examples
//!
//! ```rust
//! use workboard::types::{ComponentKind, EdgeKind, Position};
//!
//! let kind = ComponentKind::Custom("gpu-profiler".to_string());
//! assert_eq!(kind.encode(), "Custom:gpu-profiler");
//! assert_eq!(ComponentKind::decode(&kind.encode()), kind);
//!
//! let a = Position::new(10.0, 10.0);
//! let b = Position::new(50.0, 10.0);
//! assert_eq!(a.midpoint(b), Position::new(30.0, 10.0));
//!
//! println!("edge kind: {}", EdgeKind::Control);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique identifier for a placed canvas item.
///
/// Allocated from a v4 UUID when a template is instantiated; treated as an
/// opaque string everywhere else so persisted workspaces can carry ids from
/// any origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Allocate a fresh, unique id.
    pub fn fresh() -> Self {
        NodeId(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Developer experience: allow using string literals where a NodeId is expected.
impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// Opaque unique identifier for a group of canvas items.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Allocate a fresh, unique id.
    pub fn fresh() -> Self {
        GroupId(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        GroupId(s)
    }
}

/// A point in canvas coordinates.
///
/// The canvas extent is unbounded; positions are never clamped by the
/// engine. The dashboard viewport is responsible for panning and zoom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Component-wise subtraction, used for grab-offset math during drags.
    #[must_use]
    pub fn minus(self, other: Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise addition.
    #[must_use]
    pub fn plus(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }

    /// Midpoint between two positions, used as the anchor of a two-member
    /// group proposal.
    #[must_use]
    pub fn midpoint(self, other: Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Centroid of a non-empty slice of positions. Returns the origin for an
    /// empty slice.
    #[must_use]
    pub fn centroid(points: &[Position]) -> Position {
        if points.is_empty() {
            return Position::ORIGIN;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Position::new(sx / n, sy / n)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Classifies what kind of tool a placed canvas item represents.
///
/// The stock kinds mirror the template catalog's built-in entries; arbitrary
/// application-specific tools use the `Custom` variant.
///
/// # Persistence
///
/// `ComponentKind` supports serialization through both serde and the
/// [`encode`](Self::encode)/[`decode`](Self::decode) string forms used by
/// workspace snapshots.
///
/// # Examples
///
/// ```rust
/// use workboard::types::ComponentKind;
///
/// let kind = ComponentKind::ModelDeploy;
/// assert_eq!(kind.encode(), "ModelDeploy");
/// assert_eq!(ComponentKind::decode("ModelDeploy"), kind);
///
/// // Forward compatibility: unknown encodings round-trip as Custom.
/// assert_eq!(
///     ComponentKind::decode("Telescope"),
///     ComponentKind::Custom("Telescope".to_string()),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Interactive shell attached to a workspace machine.
    Terminal,
    /// Hosted notebook environment.
    Notebook,
    /// Model-deployment endpoint.
    ModelDeploy,
    /// Live metrics/observability panel.
    MetricsPanel,
    /// Browser-based code editor.
    CodeEditor,
    /// Application-defined tool identified by a user-supplied string.
    Custom(String),
}

impl ComponentKind {
    /// Encode into the persisted string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            ComponentKind::Terminal => "Terminal".to_string(),
            ComponentKind::Notebook => "Notebook".to_string(),
            ComponentKind::ModelDeploy => "ModelDeploy".to_string(),
            ComponentKind::MetricsPanel => "MetricsPanel".to_string(),
            ComponentKind::CodeEditor => "CodeEditor".to_string(),
            ComponentKind::Custom(s) => format!("Custom:{s}"),
        }
    }

    /// Decode a persisted string form.
    ///
    /// Unknown encodings fall back to `Custom(s)` so snapshots written by a
    /// newer catalog still load.
    pub fn decode(s: &str) -> Self {
        match s {
            "Terminal" => ComponentKind::Terminal,
            "Notebook" => ComponentKind::Notebook,
            "ModelDeploy" => ComponentKind::ModelDeploy,
            "MetricsPanel" => ComponentKind::MetricsPanel,
            "CodeEditor" => ComponentKind::CodeEditor,
            other => match other.strip_prefix("Custom:") {
                Some(rest) => ComponentKind::Custom(rest.to_string()),
                None => ComponentKind::Custom(other.to_string()),
            },
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal => write!(f, "terminal"),
            Self::Notebook => write!(f, "notebook"),
            Self::ModelDeploy => write!(f, "model-deploy"),
            Self::MetricsPanel => write!(f, "metrics-panel"),
            Self::CodeEditor => write!(f, "code-editor"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Execution lifecycle state of a canvas item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Not executing. The state every item starts in and returns to.
    #[default]
    Idle,
    /// A simulated run is in flight.
    Running,
    /// The last run ended in failure.
    Error,
}

impl RunStatus {
    /// Encode into the persisted string form.
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            RunStatus::Idle => "Idle",
            RunStatus::Running => "Running",
            RunStatus::Error => "Error",
        }
    }

    /// Decode a persisted string form.
    ///
    /// A `Running` status cannot survive a snapshot (no timer comes back
    /// with it), so it decodes to `Idle`; unknown encodings do the same.
    pub fn decode(s: &str) -> Self {
        match s {
            "Error" => RunStatus::Error,
            _ => RunStatus::Idle,
        }
    }

    /// Returns `true` if a run is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Classifies the relationship a directed connection expresses.
///
/// Edges are typed so the dashboard can render distinct arrow styles and so
/// a scheduler can interpret `Control` edges as execution ordering (see
/// [`FlowPolicy`](crate::simulator::FlowPolicy)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Data flows from source to target.
    #[default]
    Data,
    /// The target's execution is ordered after the source's.
    Control,
    /// Failures of the source are routed to the target.
    Error,
}

impl EdgeKind {
    /// Encode into the persisted string form.
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            EdgeKind::Data => "Data",
            EdgeKind::Control => "Control",
            EdgeKind::Error => "Error",
        }
    }

    /// Decode a persisted string form; unknown encodings fall back to `Data`.
    pub fn decode(s: &str) -> Self {
        match s {
            "Control" => EdgeKind::Control,
            "Error" => EdgeKind::Error,
            _ => EdgeKind::Data,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Control => write!(f, "control"),
            Self::Error => write!(f, "error"),
        }
    }
}
