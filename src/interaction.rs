//! The gesture state machine: the sole mutation dispatcher for the canvas.
//!
//! The dashboard resolves different intents out of the same pointer
//! primitive: repositioning an item, proposing a connection, or building a
//! cluster. This controller is the single place that disambiguation lives. Views never call the stores
//! directly; they feed pointer/keyboard events here and render whatever the
//! stores say afterwards.
//!
//! Every store error is mapped to a notice on the event bus plus a
//! transition back to (or retention of) the appropriate state. Nothing in
//! this module panics; the worst outcome of any input is a rejected
//! gesture.
//!
//! # Example
//!
//! ```rust
//! use workboard::canvas::Workspace;
//! use workboard::catalog::TemplateCatalog;
//! use workboard::event_bus::Notifier;
//! use workboard::interaction::{InteractionController, InteractionState};
//! use workboard::types::Position;
//!
//! let workspace = Workspace::new(TemplateCatalog::builtin()).into_shared();
//! let mut controller = InteractionController::new(workspace, Notifier::disconnected());
//!
//! let id = controller.place("terminal", Position::new(10.0, 10.0)).unwrap();
//! controller.pointer_down(&id, Position::new(12.0, 14.0));
//! controller.pointer_move(Position::new(30.0, 30.0));
//! controller.pointer_up();
//! assert!(matches!(controller.state(), InteractionState::Idle));
//! assert_eq!(controller.selected(), Some(&id));
//! ```

use tracing::debug;

use crate::canvas::{CanvasError, SharedWorkspace};
use crate::event_bus::Notifier;
use crate::types::{EdgeKind, GroupId, NodeId, Position};

const SCOPE: &str = "interaction";

/// Where the controller currently is in a gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionState {
    /// No gesture in flight.
    Idle,
    /// A position drag: `grab_offset` is pointer minus item origin at
    /// pointer-down, so the grab point stays fixed under the cursor.
    Dragging {
        node: NodeId,
        grab_offset: Position,
    },
    /// Connect mode: the next item selection completes an edge from
    /// `source`.
    Connecting { source: NodeId },
    /// A cross-item drop proposed a group; holding the candidate members
    /// until the user supplies a name.
    AwaitingGroupName {
        members: Vec<NodeId>,
        anchor: Position,
    },
}

/// Mediates pointer/drag events, selection, and connect mode, dispatching
/// mutations to the workspace.
pub struct InteractionController {
    workspace: SharedWorkspace,
    notifier: Notifier,
    state: InteractionState,
    selected: Option<NodeId>,
}

impl InteractionController {
    pub fn new(workspace: SharedWorkspace, notifier: Notifier) -> Self {
        Self {
            workspace,
            notifier,
            state: InteractionState::Idle,
            selected: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Mark an item as the current selection. No-op with an error notice
    /// when the id is stale.
    pub fn select(&mut self, node: &NodeId) {
        if self.workspace.lock().unwrap().contains_node(node) {
            self.selected = Some(node.clone());
        } else {
            self.surface(&CanvasError::NodeNotFound(node.clone()));
        }
    }

    /// Instantiate a template at `position`. Only valid while idle; the new
    /// item becomes the selection.
    pub fn place(&mut self, template_key: &str, position: Position) -> Option<NodeId> {
        if self.state != InteractionState::Idle {
            self.notifier
                .error(SCOPE, "finish the current gesture before placing an item");
            return None;
        }
        let placed = self.workspace.lock().unwrap().place(template_key, position);
        match placed {
            Ok(id) => {
                self.selected = Some(id.clone());
                self.notifier
                    .success(SCOPE, format!("placed {template_key} at {position}"));
                Some(id)
            }
            Err(err) => {
                self.surface(&err);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Position drag
    // ------------------------------------------------------------------

    /// `Idle → Dragging`: record the offset between pointer and item origin.
    pub fn pointer_down(&mut self, node: &NodeId, pointer: Position) {
        if self.state != InteractionState::Idle {
            return;
        }
        let origin = {
            let ws = self.workspace.lock().unwrap();
            ws.node(node).map(|n| n.position)
        };
        match origin {
            Some(origin) => {
                self.state = InteractionState::Dragging {
                    node: node.clone(),
                    grab_offset: pointer.minus(origin),
                };
            }
            None => self.surface(&CanvasError::NodeNotFound(node.clone())),
        }
    }

    /// `Dragging → Dragging`: move the item so the grab point follows the
    /// pointer. Ignored outside a drag.
    ///
    /// The underlying store write is O(1) and side-effect free, so the
    /// controller does not throttle; callers may coalesce to one event per
    /// animation frame to bound write volume.
    pub fn pointer_move(&mut self, pointer: Position) {
        let InteractionState::Dragging { node, grab_offset } = &self.state else {
            return;
        };
        let target = pointer.minus(*grab_offset);
        let moved = self.workspace.lock().unwrap().move_node(&node.clone(), target);
        if let Err(err) = moved {
            // The item was deleted mid-drag; the gesture dies with it.
            debug!(%err, "drag target vanished, aborting drag");
            self.state = InteractionState::Idle;
            self.surface(&err);
        }
    }

    /// `Dragging → Idle`: end of gesture; the dragged item becomes the
    /// selection.
    pub fn pointer_up(&mut self) {
        if let InteractionState::Dragging { node, .. } = &self.state {
            self.selected = Some(node.clone());
            self.state = InteractionState::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Group proposal (cross-item drag-and-drop)
    // ------------------------------------------------------------------

    /// `Idle → AwaitingGroupName`: a cross-item drop proposes a two-member
    /// group. The candidate is held until the user names or cancels it.
    pub fn drop_onto(&mut self, source: &NodeId, target: &NodeId) {
        if self.state != InteractionState::Idle {
            return;
        }
        if source == target {
            self.notifier
                .info(SCOPE, "drop an item onto a different item to group them");
            return;
        }
        let positions = {
            let ws = self.workspace.lock().unwrap();
            ws.node(source)
                .map(|n| n.position)
                .zip(ws.node(target).map(|n| n.position))
        };
        let Some((a, b)) = positions else {
            self.surface(&CanvasError::NodeNotFound(
                if self.workspace.lock().unwrap().contains_node(source) {
                    target.clone()
                } else {
                    source.clone()
                },
            ));
            return;
        };
        self.state = InteractionState::AwaitingGroupName {
            members: vec![source.clone(), target.clone()],
            anchor: a.midpoint(b),
        };
    }

    /// `AwaitingGroupName → Idle`: create the pending group. On any store
    /// error the transition aborts with zero mutation and the error is
    /// surfaced.
    pub fn confirm_group(&mut self, name: &str) -> Option<GroupId> {
        let InteractionState::AwaitingGroupName { members, .. } = &self.state else {
            return None;
        };
        let members = members.clone();
        self.state = InteractionState::Idle;
        let created = self.workspace.lock().unwrap().create_group(name, &members);
        match created {
            Ok(id) => {
                self.notifier
                    .success(SCOPE, format!("created group {name:?}"));
                Some(id)
            }
            Err(err) => {
                self.surface(&err);
                None
            }
        }
    }

    /// `AwaitingGroupName → Idle`: discard the pending group, no mutation.
    pub fn cancel_group(&mut self) {
        if matches!(self.state, InteractionState::AwaitingGroupName { .. }) {
            self.state = InteractionState::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Connect mode
    // ------------------------------------------------------------------

    /// `Idle → Connecting`: entered only when the user invokes "connect" on
    /// the currently selected item.
    pub fn select_for_connect(&mut self, node: &NodeId) {
        if self.state != InteractionState::Idle {
            return;
        }
        if self.selected.as_ref() != Some(node) {
            self.notifier
                .info(SCOPE, "select an item before starting a connection");
            return;
        }
        self.state = InteractionState::Connecting {
            source: node.clone(),
        };
    }

    /// `Connecting → Idle` on success. Selecting the source itself is
    /// rejected and connect mode is retained so the user can pick again.
    pub fn select_target(&mut self, target: &NodeId) {
        let InteractionState::Connecting { source } = &self.state else {
            return;
        };
        let source = source.clone();
        if &source == target {
            self.surface(&CanvasError::SelfLoop(source));
            return; // stay in Connecting
        }
        let connected = self
            .workspace
            .lock()
            .unwrap()
            .connect(&source, target, EdgeKind::Data);
        self.state = InteractionState::Idle;
        match connected {
            Ok(replaced) => {
                let verb = if replaced.is_some() { "updated" } else { "created" };
                self.notifier.success(SCOPE, format!("connection {verb}"));
            }
            Err(err) => self.surface(&err),
        }
    }

    // ------------------------------------------------------------------
    // Deletion and universal abort
    // ------------------------------------------------------------------

    /// Remove an item with its full cascade and report the fallout as a
    /// notice. Any in-flight gesture referring to the item is aborted.
    pub fn delete(&mut self, node: &NodeId) {
        let report = self.workspace.lock().unwrap().remove_node(node);
        if report.node.is_none() {
            return;
        }
        if self.selected.as_ref() == Some(node) {
            self.selected = None;
        }
        let gesture_target = match &self.state {
            InteractionState::Dragging { node: n, .. } => Some(n),
            InteractionState::Connecting { source } => Some(source),
            InteractionState::AwaitingGroupName { members, .. } => {
                members.iter().find(|m| *m == node)
            }
            InteractionState::Idle => None,
        };
        if gesture_target == Some(node) {
            self.state = InteractionState::Idle;
        }
        let mut summary = format!("deleted item ({} connection(s) removed", report.removed_edges.len());
        if let Some(group) = &report.dissolved_group {
            summary.push_str(&format!(", group {:?} dissolved", group.name));
        }
        summary.push(')');
        self.notifier.success(SCOPE, summary);
    }

    /// Delete the current selection, if any.
    pub fn delete_selected(&mut self) {
        if let Some(node) = self.selected.clone() {
            self.delete(&node);
        }
    }

    /// Universal abort (Escape): any state returns to `Idle`, discarding
    /// in-flight drag/connect/group data with zero store effect.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Map a store error to an error notice.
    fn surface(&self, err: &CanvasError) {
        self.notifier.error(SCOPE, err.to_string());
    }
}
