//! # Workboard: workspace canvas engine
//!
//! Workboard is the in-process engine behind a cloud workspace dashboard's
//! visual canvas: users place application components (terminals, notebooks,
//! model-deployment endpoints), drag them around, connect them with typed
//! directed edges, cluster them into named groups, and run them through a
//! simulated execution lifecycle.
//!
//! ## Core Concepts
//!
//! - **Templates**: immutable catalog entries instantiated into canvas items
//! - **Nodes / Edges / Groups**: the three authoritative stores, mutated
//!   only through the [`canvas::Workspace`] facade
//! - **Interaction**: a gesture state machine that resolves drag vs.
//!   connect vs. group intents and dispatches every mutation
//! - **Simulator**: a cancellable, timer-driven stand-in for a job runner
//! - **Event bus**: notice fan-out to the dashboard's toast surface
//!
//! ## Quick Start
//!
//! ```rust
//! use workboard::canvas::Workspace;
//! use workboard::catalog::TemplateCatalog;
//! use workboard::types::{EdgeKind, Position};
//!
//! let mut ws = Workspace::new(TemplateCatalog::builtin());
//! let term = ws.place("terminal", Position::new(10.0, 10.0)).unwrap();
//! let nb = ws.place("jupyter", Position::new(50.0, 10.0)).unwrap();
//!
//! ws.connect(&term, &nb, EdgeKind::Data).unwrap();
//! ws.move_node(&term, Position::new(20.0, 20.0)).unwrap();
//!
//! // Deleting a node cascades to every edge incident to it.
//! let report = ws.remove_node(&term);
//! assert_eq!(report.removed_edges.len(), 1);
//! assert!(ws.edges().is_empty());
//! ```
//!
//! Gestures go through the controller rather than the workspace directly:
//!
//! ```rust
//! use workboard::canvas::Workspace;
//! use workboard::catalog::TemplateCatalog;
//! use workboard::event_bus::Notifier;
//! use workboard::interaction::InteractionController;
//! use workboard::types::Position;
//!
//! let workspace = Workspace::new(TemplateCatalog::builtin()).into_shared();
//! let mut controller = InteractionController::new(workspace, Notifier::disconnected());
//!
//! let a = controller.place("terminal", Position::new(0.0, 0.0)).unwrap();
//! let b = controller.place("jupyter", Position::new(40.0, 0.0)).unwrap();
//!
//! // Connect mode: explicit two-endpoint protocol.
//! controller.select(&a);
//! controller.select_for_connect(&a);
//! controller.select_target(&b);
//! ```
//!
//! ## Error Handling
//!
//! Store mutations return typed [`canvas::CanvasError`] results; the
//! interaction layer maps every error to a notice on the event bus and a
//! state transition, so no user gesture can crash the canvas.
//!
//! ## Module Guide
//!
//! - [`types`] - identifiers, positions, and the component/status/edge enums
//! - [`catalog`] - the immutable template registry
//! - [`canvas`] - the three stores and the workspace facade
//! - [`interaction`] - the gesture state machine
//! - [`simulator`] - the timed execution lifecycle
//! - [`event_bus`] - notice fan-out and sinks
//! - [`persistence`] - snapshot shapes and storage backends
//! - [`telemetry`] - tracing setup and sink formatting
//! - [`app`] - the wiring facade a dashboard embeds

pub mod app;
pub mod canvas;
pub mod catalog;
pub mod event_bus;
pub mod interaction;
pub mod persistence;
pub mod simulator;
pub mod telemetry;
pub mod types;
pub mod utils;
