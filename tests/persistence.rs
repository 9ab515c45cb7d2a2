//! Snapshot round-trips, rehydration validation, and storage backends.

use workboard::canvas::Workspace;
use workboard::catalog::TemplateCatalog;
use workboard::persistence::{
    JsonFileStore, MemoryStore, PersistedEdge, PersistedGroup, PersistedNode, PersistedWorkspace,
    PersistenceError, WorkspaceStore,
};
use workboard::types::{EdgeKind, Position, RunStatus};
use workboard::utils::json_ext::JsonSerializable;

fn populated_workspace() -> Workspace {
    let mut ws = Workspace::new(TemplateCatalog::builtin());
    let a = ws.place("terminal", Position::new(10.0, 10.0)).unwrap();
    let b = ws.place("jupyter", Position::new(50.0, 10.0)).unwrap();
    let c = ws.place("model-deploy", Position::new(90.0, 40.0)).unwrap();
    ws.connect(&a, &b, EdgeKind::Data).unwrap();
    ws.connect(&b, &c, EdgeKind::Control).unwrap();
    ws.create_group("pipeline", &[a, b]).unwrap();
    ws
}

fn persisted_node(id: &str) -> PersistedNode {
    PersistedNode {
        id: id.to_string(),
        label: id.to_string(),
        kind: "Terminal".to_string(),
        x: 0.0,
        y: 0.0,
        run_status: None,
    }
}

#[test]
fn snapshot_round_trip_restores_back_references() {
    let ws = populated_workspace();
    let snapshot = PersistedWorkspace::from(&ws);

    let restored = snapshot
        .clone()
        .into_workspace(TemplateCatalog::builtin())
        .unwrap();

    assert_eq!(restored.nodes().len(), 3);
    assert_eq!(restored.edges().len(), 2);
    assert_eq!(restored.groups().len(), 1);

    let group = restored.groups().pop().unwrap();
    for member in &group.members {
        assert_eq!(
            restored.node(member).unwrap().group_id.as_ref(),
            Some(&group.id),
            "back-reference missing for member {member}",
        );
    }
    let grouped = restored
        .nodes()
        .iter()
        .filter(|n| n.group_id.is_some())
        .count();
    assert_eq!(grouped, group.members.len());

    // A second snapshot of the restored workspace is identical.
    assert_eq!(PersistedWorkspace::from(&restored), snapshot);
}

#[test]
fn running_status_rehydrates_to_idle() {
    let mut ws = Workspace::new(TemplateCatalog::builtin());
    let id = ws.place("terminal", Position::ORIGIN).unwrap();
    ws.set_run_status(&id, RunStatus::Running).unwrap();

    let restored = PersistedWorkspace::from(&ws)
        .into_workspace(TemplateCatalog::builtin())
        .unwrap();
    assert_eq!(restored.node(&id).unwrap().run_status, RunStatus::Idle);
}

#[test]
fn error_status_survives_the_round_trip() {
    let mut ws = Workspace::new(TemplateCatalog::builtin());
    let id = ws.place("terminal", Position::ORIGIN).unwrap();
    ws.set_run_status(&id, RunStatus::Error).unwrap();

    let restored = PersistedWorkspace::from(&ws)
        .into_workspace(TemplateCatalog::builtin())
        .unwrap();
    assert_eq!(restored.node(&id).unwrap().run_status, RunStatus::Error);
}

#[test]
fn dangling_edge_endpoint_is_rejected() {
    let snapshot = PersistedWorkspace {
        nodes: vec![persisted_node("a")],
        edges: vec![PersistedEdge {
            source: "a".into(),
            target: "ghost".into(),
            kind: "Data".into(),
        }],
        groups: vec![],
    };
    assert!(matches!(
        snapshot.into_workspace(TemplateCatalog::builtin()),
        Err(PersistenceError::DanglingReference { .. }),
    ));
}

#[test]
fn dangling_group_member_is_rejected() {
    let snapshot = PersistedWorkspace {
        nodes: vec![persisted_node("a"), persisted_node("b")],
        edges: vec![],
        groups: vec![PersistedGroup {
            id: "g".into(),
            name: "G".into(),
            members: vec!["a".into(), "ghost".into()],
            is_expanded: true,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }],
    };
    assert!(matches!(
        snapshot.into_workspace(TemplateCatalog::builtin()),
        Err(PersistenceError::DanglingReference { .. }),
    ));
}

#[test]
fn undersized_and_overlapping_groups_are_rejected() {
    let undersized = PersistedWorkspace {
        nodes: vec![persisted_node("a")],
        edges: vec![],
        groups: vec![PersistedGroup {
            id: "g".into(),
            name: "G".into(),
            members: vec!["a".into()],
            is_expanded: true,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }],
    };
    assert!(matches!(
        undersized.into_workspace(TemplateCatalog::builtin()),
        Err(PersistenceError::UndersizedGroup { count: 1, .. }),
    ));

    let overlapping = PersistedWorkspace {
        nodes: vec![persisted_node("a"), persisted_node("b"), persisted_node("c")],
        edges: vec![],
        groups: vec![
            PersistedGroup {
                id: "g1".into(),
                name: "G1".into(),
                members: vec!["a".into(), "b".into()],
                is_expanded: true,
                anchor_x: 0.0,
                anchor_y: 0.0,
            },
            PersistedGroup {
                id: "g2".into(),
                name: "G2".into(),
                members: vec!["b".into(), "c".into()],
                is_expanded: false,
                anchor_x: 0.0,
                anchor_y: 0.0,
            },
        ],
    };
    assert!(matches!(
        overlapping.into_workspace(TemplateCatalog::builtin()),
        Err(PersistenceError::OverlappingGroups { node }) if node == "b",
    ));
}

#[test]
fn persisted_self_loop_is_rejected() {
    let snapshot = PersistedWorkspace {
        nodes: vec![persisted_node("a")],
        edges: vec![PersistedEdge {
            source: "a".into(),
            target: "a".into(),
            kind: "Data".into(),
        }],
        groups: vec![],
    };
    assert!(matches!(
        snapshot.into_workspace(TemplateCatalog::builtin()),
        Err(PersistenceError::SelfLoop(_)),
    ));
}

#[test]
fn unknown_encodings_fall_back_forward_compatibly() {
    let snapshot = PersistedWorkspace {
        nodes: vec![PersistedNode {
            id: "a".into(),
            label: "Telescope".into(),
            kind: "Telescope".into(),
            x: 1.0,
            y: 2.0,
            run_status: Some("Warp".into()),
        }],
        edges: vec![],
        groups: vec![],
    };
    let restored = snapshot.into_workspace(TemplateCatalog::builtin()).unwrap();
    let node = restored.node(&"a".into()).unwrap();
    assert_eq!(
        node.kind,
        workboard::types::ComponentKind::Custom("Telescope".into()),
    );
    assert_eq!(node.run_status, RunStatus::Idle);
}

#[test]
fn json_string_round_trip() {
    let snapshot = PersistedWorkspace::from(&populated_workspace());
    let json = snapshot.to_json_string().unwrap();
    let back = PersistedWorkspace::from_json_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[tokio::test]
async fn memory_store_round_trip() {
    let store = MemoryStore::new();
    assert!(store.load().await.unwrap().is_none());

    let snapshot = PersistedWorkspace::from(&populated_workspace());
    store.save(&snapshot).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(snapshot));
}

#[tokio::test]
async fn json_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("workspace.json"));
    assert!(store.load().await.unwrap().is_none());

    let snapshot = PersistedWorkspace::from(&populated_workspace());
    store.save(&snapshot).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(snapshot.clone()));

    // Saving again replaces the previous snapshot.
    let empty = PersistedWorkspace::default();
    store.save(&empty).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(empty));
}
