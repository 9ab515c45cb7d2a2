//! Simulator lifecycle tests driven by tokio's paused clock.

use std::time::Duration;

use workboard::canvas::{CanvasError, SharedWorkspace, Workspace};
use workboard::catalog::TemplateCatalog;
use workboard::event_bus::Notifier;
use workboard::simulator::{FlowPolicy, Simulator};
use workboard::types::{EdgeKind, NodeId, Position, RunStatus};

const RUN_DELAY: Duration = Duration::from_millis(1_000);
const STAGGER: Duration = Duration::from_millis(100);

fn harness() -> (Simulator, SharedWorkspace) {
    let workspace = Workspace::new(TemplateCatalog::builtin()).into_shared();
    let simulator = Simulator::new(workspace.clone(), Notifier::disconnected())
        .with_run_delay(RUN_DELAY)
        .with_stagger(STAGGER);
    (simulator, workspace)
}

fn status(ws: &SharedWorkspace, id: &NodeId) -> RunStatus {
    ws.lock().unwrap().node(id).unwrap().run_status
}

fn running_count(ws: &SharedWorkspace) -> usize {
    ws.lock()
        .unwrap()
        .nodes()
        .iter()
        .filter(|n| n.run_status.is_running())
        .count()
}

#[tokio::test(start_paused = true)]
async fn run_transitions_through_the_lifecycle() {
    let (sim, ws) = harness();
    let id = ws
        .lock()
        .unwrap()
        .place("terminal", Position::ORIGIN)
        .unwrap();

    sim.run(&id).unwrap();
    assert_eq!(status(&ws, &id), RunStatus::Running);
    assert!(sim.is_pending(&id));

    // A second run while running is refused.
    assert_eq!(sim.run(&id).unwrap_err(), CanvasError::AlreadyRunning(id.clone()));

    tokio::time::sleep(RUN_DELAY + Duration::from_millis(10)).await;
    assert_eq!(status(&ws, &id), RunStatus::Idle);
    assert!(!sim.is_pending(&id));

    // Idle again: a new run is accepted.
    sim.run(&id).unwrap();
    assert_eq!(status(&ws, &id), RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn run_unknown_node_is_refused() {
    let (sim, _ws) = harness();
    let ghost = NodeId::from("ghost");
    assert_eq!(sim.run(&ghost).unwrap_err(), CanvasError::NodeNotFound(ghost));
}

#[tokio::test(start_paused = true)]
async fn deletion_mid_run_is_a_silent_cancellation() {
    let (sim, ws) = harness();
    let id = ws
        .lock()
        .unwrap()
        .place("jupyter", Position::ORIGIN)
        .unwrap();
    sim.run(&id).unwrap();

    ws.lock().unwrap().remove_node(&id);
    // The timer fires into a workspace without the node; nothing blows up
    // and nothing is resurrected.
    tokio::time::sleep(RUN_DELAY + Duration::from_millis(10)).await;
    assert!(ws.lock().unwrap().node(&id).is_none());
    assert!(!sim.is_pending(&id));
}

#[tokio::test(start_paused = true)]
async fn cancel_by_key_aborts_the_pending_timer() {
    let (sim, ws) = harness();
    let id = ws
        .lock()
        .unwrap()
        .place("terminal", Position::ORIGIN)
        .unwrap();
    sim.run(&id).unwrap();
    sim.cancel(&id);
    assert!(!sim.is_pending(&id));

    tokio::time::sleep(RUN_DELAY * 2).await;
    // The completion never fired; the item is stuck Running until a caller
    // writes a status, which is the documented contract for cancel.
    assert_eq!(status(&ws, &id), RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn execute_flow_staggers_independent_starts() {
    let (sim, ws) = harness();
    {
        let mut ws = ws.lock().unwrap();
        for key in ["terminal", "jupyter", "model-deploy"] {
            ws.place(key, Position::ORIGIN).unwrap();
        }
    }

    sim.execute_flow();
    // Wave zero starts synchronously; the rest are still pending.
    assert_eq!(running_count(&ws), 1);

    tokio::time::sleep(STAGGER + Duration::from_millis(10)).await;
    assert_eq!(running_count(&ws), 2);

    tokio::time::sleep(STAGGER).await;
    assert_eq!(running_count(&ws), 3);

    // Long after every start offset and run delay, everything is idle.
    tokio::time::sleep(RUN_DELAY + 3 * STAGGER).await;
    assert_eq!(running_count(&ws), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_run_during_flow_keeps_its_pending_timer() {
    let (sim, ws) = harness();
    {
        let mut ws = ws.lock().unwrap();
        ws.place("terminal", Position::ORIGIN).unwrap();
        ws.place("jupyter", Position::ORIGIN).unwrap();
    }

    sim.execute_flow();
    // One item started in wave zero; the other has a delayed start pending.
    let idle = ws
        .lock()
        .unwrap()
        .nodes()
        .iter()
        .find(|n| !n.run_status.is_running())
        .map(|n| n.id.clone())
        .unwrap();

    // Starting it by hand before its stagger offset supersedes the
    // delayed start; the manual run's timer stays tracked under the key.
    sim.run(&idle).unwrap();
    assert!(sim.is_pending(&idle));

    tokio::time::sleep(STAGGER + Duration::from_millis(10)).await;
    assert!(sim.is_pending(&idle));
    assert_eq!(status(&ws, &idle), RunStatus::Running);

    // Cancel still reaches the live timer.
    sim.cancel(&idle);
    assert!(!sim.is_pending(&idle));
    tokio::time::sleep(RUN_DELAY * 2).await;
    assert_eq!(status(&ws, &idle), RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn execute_flow_skips_items_already_running() {
    let (sim, ws) = harness();
    let id = ws
        .lock()
        .unwrap()
        .place("terminal", Position::ORIGIN)
        .unwrap();
    sim.run(&id).unwrap();

    sim.execute_flow();
    assert_eq!(running_count(&ws), 1);
    tokio::time::sleep(RUN_DELAY + Duration::from_millis(10)).await;
    assert_eq!(running_count(&ws), 0);
}

#[tokio::test(start_paused = true)]
async fn control_ordered_flow_runs_targets_after_sources() {
    let (sim, ws) = harness();
    let sim = sim.with_policy(FlowPolicy::ControlOrdered);
    let (a, b) = {
        let mut ws = ws.lock().unwrap();
        let a = ws.place("terminal", Position::ORIGIN).unwrap();
        let b = ws.place("jupyter", Position::ORIGIN).unwrap();
        ws.connect(&a, &b, EdgeKind::Control).unwrap();
        (a, b)
    };

    sim.execute_flow();
    assert_eq!(status(&ws, &a), RunStatus::Running);
    assert_eq!(status(&ws, &b), RunStatus::Idle);

    tokio::time::sleep(STAGGER + Duration::from_millis(10)).await;
    assert_eq!(status(&ws, &b), RunStatus::Running);

    // The source finishes first (it started one stagger step earlier).
    tokio::time::sleep(RUN_DELAY - STAGGER).await;
    assert_eq!(status(&ws, &a), RunStatus::Idle);
    assert_eq!(status(&ws, &b), RunStatus::Running);

    tokio::time::sleep(STAGGER + Duration::from_millis(10)).await;
    assert_eq!(status(&ws, &b), RunStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn control_cycle_still_runs_everything() {
    let (sim, ws) = harness();
    let sim = sim.with_policy(FlowPolicy::ControlOrdered);
    {
        let mut ws = ws.lock().unwrap();
        let a = ws.place("terminal", Position::ORIGIN).unwrap();
        let b = ws.place("jupyter", Position::ORIGIN).unwrap();
        ws.connect(&a, &b, EdgeKind::Control).unwrap();
        ws.connect(&b, &a, EdgeKind::Control).unwrap();
    }

    sim.execute_flow();
    // Both items are on the cycle; they run in the final (first) wave.
    tokio::time::sleep(STAGGER + Duration::from_millis(10)).await;
    assert_eq!(running_count(&ws), 2);
    tokio::time::sleep(RUN_DELAY + Duration::from_millis(10)).await;
    assert_eq!(running_count(&ws), 0);
}

#[tokio::test(start_paused = true)]
async fn data_edges_do_not_order_the_flow() {
    let (sim, ws) = harness();
    let sim = sim.with_policy(FlowPolicy::ControlOrdered);
    {
        let mut ws = ws.lock().unwrap();
        let a = ws.place("terminal", Position::ORIGIN).unwrap();
        let b = ws.place("jupyter", Position::ORIGIN).unwrap();
        ws.connect(&a, &b, EdgeKind::Data).unwrap();
    }

    sim.execute_flow();
    // No control edges: both are in-degree zero and start in wave zero.
    assert_eq!(running_count(&ws), 2);
}
