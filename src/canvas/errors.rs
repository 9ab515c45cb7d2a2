//! Typed errors for canvas store operations.
//!
//! Every mutation on the workspace returns one of these as a typed result;
//! nothing in the canvas core panics or aborts. The interaction layer maps
//! each variant to a user-facing notice, so the worst outcome of any error
//! here is a rejected gesture.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::{GroupId, NodeId};

/// Errors produced by workspace mutations.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CanvasError {
    /// A template key was not present in the catalog.
    #[error("unknown template: {0:?}")]
    #[diagnostic(
        code(workboard::canvas::unknown_template),
        help("Check the template key against TemplateCatalog::keys().")
    )]
    UnknownTemplate(String),

    /// A node id did not refer to a live canvas item.
    #[error("node not found: {0}")]
    #[diagnostic(
        code(workboard::canvas::node_not_found),
        help("The item may have been deleted; refresh the selection.")
    )]
    NodeNotFound(NodeId),

    /// A group id did not refer to a live group.
    #[error("group not found: {0}")]
    #[diagnostic(code(workboard::canvas::group_not_found))]
    GroupNotFound(GroupId),

    /// A connection's source and target were the same node.
    #[error("cannot connect node {0} to itself")]
    #[diagnostic(
        code(workboard::canvas::self_loop),
        help("Pick a different target node to complete the connection.")
    )]
    SelfLoop(NodeId),

    /// A connection endpoint did not refer to a live canvas item.
    #[error("connection endpoint is not on the canvas: {0}")]
    #[diagnostic(code(workboard::canvas::dangling_endpoint))]
    DanglingEndpoint(NodeId),

    /// A group was proposed with fewer than two members.
    #[error("a group needs at least 2 members, got {0}")]
    #[diagnostic(
        code(workboard::canvas::insufficient_members),
        help("Drop one item onto another to propose a two-member group.")
    )]
    InsufficientMembers(usize),

    /// A proposed group member did not refer to a live canvas item.
    #[error("group member not found: {0}")]
    #[diagnostic(code(workboard::canvas::member_not_found))]
    MemberNotFound(NodeId),

    /// A proposed group member already belongs to another group.
    #[error("node {node} already belongs to group {group}")]
    #[diagnostic(
        code(workboard::canvas::member_grouped),
        help("Remove the item from its current group first.")
    )]
    MemberGrouped { node: NodeId, group: GroupId },

    /// A run was requested for a node that is already running.
    #[error("node {0} is already running")]
    #[diagnostic(code(workboard::canvas::already_running))]
    AlreadyRunning(NodeId),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
