//! The top-level facade a dashboard embeds.
//!
//! [`CanvasApp`] wires the shared workspace, the interaction controller,
//! the execution simulator, and the event bus together, and moves
//! snapshots across the persistence boundary.
//!
//! # Example
//!
//! ```no_run
//! use workboard::app::CanvasApp;
//! use workboard::catalog::TemplateCatalog;
//! use workboard::types::Position;
//!
//! # #[tokio::main] async fn main() {
//! let mut app = CanvasApp::new(TemplateCatalog::builtin());
//! app.event_bus().listen_for_events();
//!
//! let id = app
//!     .controller_mut()
//!     .place("jupyter", Position::new(120.0, 80.0))
//!     .expect("builtin template");
//! app.simulator().run(&id).expect("fresh item is idle");
//! # }
//! ```

use crate::canvas::{SharedWorkspace, Workspace};
use crate::catalog::TemplateCatalog;
use crate::event_bus::{EventBus, Notifier};
use crate::interaction::InteractionController;
use crate::persistence::{PersistedWorkspace, Result as PersistenceResult, WorkspaceStore};
use crate::simulator::Simulator;

/// Owns one canvas session: stores, controller, simulator, event bus.
pub struct CanvasApp {
    workspace: SharedWorkspace,
    controller: InteractionController,
    simulator: Simulator,
    event_bus: EventBus,
}

impl CanvasApp {
    /// A fresh, empty session over the given catalog.
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self::with_workspace(Workspace::new(catalog))
    }

    fn with_workspace(workspace: Workspace) -> Self {
        let workspace = workspace.into_shared();
        let event_bus = EventBus::default();
        let notifier = Notifier::new(event_bus.get_sender());
        let controller = InteractionController::new(workspace.clone(), notifier.clone());
        let simulator = Simulator::new(workspace.clone(), notifier);
        Self {
            workspace,
            controller,
            simulator,
            event_bus,
        }
    }

    #[must_use]
    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }

    #[must_use]
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Snapshot the three stores and hand them to the persistence service.
    pub async fn save_to(&self, store: &dyn WorkspaceStore) -> PersistenceResult<()> {
        let snapshot = {
            let ws = self.workspace.lock().unwrap();
            PersistedWorkspace::from(&*ws)
        };
        store.save(&snapshot).await
    }

    /// Rebuild a session from the service's last snapshot, or an empty one
    /// when nothing was saved yet. The catalog is supplied by the caller;
    /// snapshots carry no presentation data.
    pub async fn load_from(
        store: &dyn WorkspaceStore,
        catalog: TemplateCatalog,
    ) -> PersistenceResult<Self> {
        let workspace = match store.load().await? {
            Some(snapshot) => snapshot.into_workspace(catalog)?,
            None => Workspace::new(catalog),
        };
        Ok(Self::with_workspace(workspace))
    }
}
