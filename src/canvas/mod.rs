//! The canvas data model: nodes, edges, groups, and the workspace facade.
//!
//! The three stores ([`NodeStore`], [`EdgeStore`], [`GroupStore`]) are plain
//! collections; [`Workspace`] is the only mutation surface and owns every
//! cross-store rule. See [`workspace`] for the consistency guarantees.

pub mod edges;
pub mod errors;
pub mod groups;
pub mod nodes;
pub mod workspace;


pub use edges::{Edge, EdgeStore};
pub use errors::CanvasError;
pub use groups::{Group, GroupStore};
pub use nodes::{CanvasNode, NodeStore};
pub use workspace::{RemovalReport, SharedWorkspace, Workspace};
