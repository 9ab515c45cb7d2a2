//! Execution simulator: a timed stand-in for a real job runner.
//!
//! `run` drives a canvas item through `Idle → Running → Idle`, with the
//! return transition on a tokio timer keyed by node id. The timer callback
//! re-checks that the node still exists before touching it, so an item
//! deleted mid-run is a silent cancellation, never a resurrection. Tests
//! drive the timers with tokio's paused clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::canvas::errors::{CanvasError, Result};
use crate::canvas::SharedWorkspace;
use crate::event_bus::Notifier;
use crate::types::{EdgeKind, NodeId, RunStatus};

const SCOPE: &str = "simulator";

/// How `execute_flow` treats edges when starting runs.
///
/// The dashboard's observed behavior runs every item independently with
/// fixed stagger offsets regardless of connections; ordering by `Control`
/// edges is available behind this flag rather than assumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowPolicy {
    /// Start every item with a fixed stagger offset; edges are ignored.
    #[default]
    Independent,
    /// Layer items by `Control` edges (Kahn waves) and stagger wave by
    /// wave, so a control target starts after its sources. Items on a
    /// control cycle join the final wave.
    ControlOrdered,
}

/// A scheduled timer task for one item, tagged with the generation it was
/// registered under. A superseded task must not touch an entry it no
/// longer owns.
struct PendingRun {
    generation: u64,
    handle: JoinHandle<()>,
}

type Inflight = Arc<Mutex<FxHashMap<NodeId, PendingRun>>>;

/// Drives the run-status lifecycle of canvas items.
pub struct Simulator {
    workspace: SharedWorkspace,
    notifier: Notifier,
    run_delay: Duration,
    stagger: Duration,
    policy: FlowPolicy,
    inflight: Inflight,
    generations: AtomicU64,
}

impl Simulator {
    /// Default simulated run time.
    pub const DEFAULT_RUN_DELAY: Duration = Duration::from_secs(3);
    /// Default offset between staggered starts in `execute_flow`.
    pub const DEFAULT_STAGGER: Duration = Duration::from_millis(400);

    pub fn new(workspace: SharedWorkspace, notifier: Notifier) -> Self {
        Self {
            workspace,
            notifier,
            run_delay: Self::DEFAULT_RUN_DELAY,
            stagger: Self::DEFAULT_STAGGER,
            policy: FlowPolicy::default(),
            inflight: Arc::new(Mutex::new(FxHashMap::default())),
            generations: AtomicU64::new(0),
        }
    }

    /// Override the simulated run time (tests use short delays with a
    /// paused clock).
    #[must_use]
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    /// Override the stagger offset between `execute_flow` starts.
    #[must_use]
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Choose how `execute_flow` treats control edges.
    #[must_use]
    pub fn with_policy(mut self, policy: FlowPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> FlowPolicy {
        self.policy
    }

    /// Start a simulated run for one item.
    ///
    /// Sets `Running` immediately and schedules the return to `Idle` after
    /// the configured delay. Fails with [`CanvasError::NodeNotFound`] or
    /// [`CanvasError::AlreadyRunning`] without scheduling anything.
    pub fn run(&self, id: &NodeId) -> Result<()> {
        {
            let mut ws = self.workspace.lock().unwrap();
            let node = ws
                .node(id)
                .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;
            if node.run_status.is_running() {
                return Err(CanvasError::AlreadyRunning(id.clone()));
            }
            ws.set_run_status(id, RunStatus::Running)?;
        }
        info!(node = %id, delay = ?self.run_delay, "run started");
        self.notifier.info(SCOPE, format!("run started for {id}"));
        self.schedule_completion(id.clone());
        Ok(())
    }

    /// Abort the pending timer for an item, if any. The item's status is
    /// left as-is; callers pair this with a status write when they need
    /// one.
    pub fn cancel(&self, id: &NodeId) {
        if let Some(pending) = self.inflight.lock().unwrap().remove(id) {
            pending.handle.abort();
            debug!(node = %id, "pending run timer cancelled");
        }
    }

    /// Whether a completion timer is pending for this item.
    #[must_use]
    pub fn is_pending(&self, id: &NodeId) -> bool {
        self.inflight.lock().unwrap().contains_key(id)
    }

    /// Run every current item with staggered start offsets, for the
    /// dashboard's "run all" demonstration.
    ///
    /// Under [`FlowPolicy::Independent`] the offsets follow snapshot order;
    /// under [`FlowPolicy::ControlOrdered`] items are layered by `Control`
    /// edges and each wave starts one stagger step after the previous one.
    /// Items that are already running are skipped.
    pub fn execute_flow(&self) {
        let waves = match self.policy {
            FlowPolicy::Independent => {
                let ws = self.workspace.lock().unwrap();
                ws.nodes().into_iter().map(|n| vec![n.id]).collect()
            }
            FlowPolicy::ControlOrdered => self.control_waves(),
        };
        let mut offset = Duration::ZERO;
        let mut started = 0usize;
        for wave in waves {
            for id in wave {
                if self.start_delayed(id, offset) {
                    started += 1;
                }
            }
            offset += self.stagger;
        }
        self.notifier
            .info(SCOPE, format!("flow execution started for {started} item(s)"));
    }

    /// Begin a run after `start_offset`: status flips to `Running` when the
    /// offset elapses, then back to `Idle` after the run delay. Returns
    /// false for items already running.
    fn start_delayed(&self, id: NodeId, start_offset: Duration) -> bool {
        {
            let ws = self.workspace.lock().unwrap();
            match ws.node(&id) {
                Some(node) if !node.run_status.is_running() => {}
                _ => return false,
            }
        }
        if start_offset.is_zero() {
            // Immediate wave: mirror `run` and mark Running synchronously.
            let mut ws = self.workspace.lock().unwrap();
            if ws.set_run_status(&id, RunStatus::Running).is_err() {
                return false;
            }
            drop(ws);
            self.schedule_completion(id);
            return true;
        }
        let workspace = self.workspace.clone();
        let inflight = self.inflight.clone();
        let notifier = self.notifier.clone();
        let run_delay = self.run_delay;
        let generation = self.next_generation();
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(start_offset).await;
            // A manual `run` during the offset supersedes this start; only
            // the current owner of the inflight entry may touch the item.
            if !Self::owns(&inflight, &task_id, generation) {
                return;
            }
            {
                let mut ws = workspace.lock().unwrap();
                // Deleted or started elsewhere while we waited: silently skip.
                match ws.node(&task_id) {
                    Some(node) if !node.run_status.is_running() => {
                        let _ = ws.set_run_status(&task_id, RunStatus::Running);
                    }
                    _ => {
                        Self::release(&inflight, &task_id, generation);
                        return;
                    }
                }
            }
            tokio::time::sleep(run_delay).await;
            Self::complete(&workspace, &notifier, &inflight, &task_id, generation);
        });
        self.claim(id, generation, handle);
        true
    }

    /// Schedule the `Running → Idle` transition for an already-running item.
    fn schedule_completion(&self, id: NodeId) {
        let workspace = self.workspace.clone();
        let inflight = self.inflight.clone();
        let notifier = self.notifier.clone();
        let delay = self.run_delay;
        let generation = self.next_generation();
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::complete(&workspace, &notifier, &inflight, &task_id, generation);
        });
        self.claim(id, generation, handle);
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a timer task under `id`, aborting any task it supersedes.
    fn claim(&self, id: NodeId, generation: u64, handle: JoinHandle<()>) {
        let replaced = self
            .inflight
            .lock()
            .unwrap()
            .insert(id, PendingRun { generation, handle });
        if let Some(old) = replaced {
            old.handle.abort();
        }
    }

    /// Whether the entry for `id` still belongs to `generation`.
    fn owns(inflight: &Inflight, id: &NodeId, generation: u64) -> bool {
        inflight
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|p| p.generation == generation)
    }

    /// Drop the entry for `id`, but only when `generation` still owns it.
    /// Returns whether the entry was removed.
    fn release(inflight: &Inflight, id: &NodeId, generation: u64) -> bool {
        let mut guard = inflight.lock().unwrap();
        if guard.get(id).is_some_and(|p| p.generation == generation) {
            guard.remove(id);
            true
        } else {
            false
        }
    }

    /// Timer callback: flip the item back to `Idle` if it still exists.
    /// A deleted item is a silent cancellation, not an error; a superseded
    /// timer does nothing at all.
    fn complete(
        workspace: &SharedWorkspace,
        notifier: &Notifier,
        inflight: &Inflight,
        id: &NodeId,
        generation: u64,
    ) {
        if !Self::release(inflight, id, generation) {
            return;
        }
        let mut ws = workspace.lock().unwrap();
        if !ws.contains_node(id) {
            debug!(node = %id, "item deleted mid-run; completion dropped");
            return;
        }
        let _ = ws.set_run_status(id, RunStatus::Idle);
        drop(ws);
        info!(node = %id, "run completed");
        notifier.success(SCOPE, format!("run completed for {id}"));
    }

    /// Layer the current items by `Control` edges with Kahn's algorithm.
    /// Nodes left over after the waves (control cycles) form a final wave.
    fn control_waves(&self) -> Vec<Vec<NodeId>> {
        let (nodes, edges) = {
            let ws = self.workspace.lock().unwrap();
            (ws.nodes(), ws.edges())
        };
        let mut indegree: FxHashMap<NodeId, usize> =
            nodes.iter().map(|n| (n.id.clone(), 0)).collect();
        let mut outgoing: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
        for edge in edges.iter().filter(|e| e.kind == EdgeKind::Control) {
            outgoing
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
            if let Some(d) = indegree.get_mut(&edge.target) {
                *d += 1;
            }
        }

        let mut waves: Vec<Vec<NodeId>> = Vec::new();
        let mut current: Vec<NodeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| id.clone())
            .collect();
        current.sort();
        let mut remaining = indegree.len();
        while !current.is_empty() {
            remaining -= current.len();
            let mut next: Vec<NodeId> = Vec::new();
            for id in &current {
                indegree.remove(id);
                for target in outgoing.get(id).into_iter().flatten() {
                    if let Some(d) = indegree.get_mut(target) {
                        *d -= 1;
                        if *d == 0 {
                            next.push(target.clone());
                        }
                    }
                }
            }
            waves.push(std::mem::take(&mut current));
            next.sort();
            current = next;
        }
        if remaining > 0 {
            // Control cycle: whatever is left runs in one final wave.
            let mut cycle: Vec<NodeId> = indegree.into_keys().collect();
            cycle.sort();
            waves.push(cycle);
        }
        waves
    }
}
