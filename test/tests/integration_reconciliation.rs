/// Reconciliation of incoming commits against a replica's history chain:
/// fast-forward, rollback, splice and rebase.

use ecs_history::{
    ChangeSet, Commit, CommitId, CommitMessage, HistoryConfig, HistoryError, Reconciliation,
    StableEntity,
};
use ecs_history_test::{assert_chain, init_logger, Position, TestReplica};

const A: CommitId = CommitId::new(1, 1);
const B: CommitId = CommitId::new(2, 2);
const C: CommitId = CommitId::new(3, 3);
const X: CommitId = CommitId::new(4, 4);

fn entity(id: u64) -> StableEntity {
    StableEntity::from_u64(id)
}

fn spawn_commit(entities: &[(StableEntity, Position)]) -> Commit {
    let mut change_set = ChangeSet::new();
    let mut builder = Commit::builder();
    for (entity, position) in entities {
        change_set = change_set.construct(*entity, position.clone());
        builder = builder.version(*entity, 0).created(*entity);
    }
    builder.change_set(change_set).build()
}

fn move_commit(entity: StableEntity, version: u16, old: Position, new: Position) -> Commit {
    Commit::builder()
        .version(entity, version)
        .change_set(ChangeSet::new().update(entity, old, new))
        .build()
}

fn message(base_id: CommitId, id: CommitId, commit: Commit) -> CommitMessage {
    CommitMessage::new(base_id, id, commit)
}

#[test]
fn rebase_drops_commit_whose_precondition_moved() {
    init_logger();
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    replica
        .push(
            B,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(1.0, 0.0)),
        )
        .unwrap();
    assert_eq!(replica.component::<Position>(e1), Some(Position::new(1.0, 0.0)));
    assert_eq!(replica.version(e1), 2);

    let result = replica
        .receive(message(
            A,
            C,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(5.0, 5.0)),
        ))
        .unwrap();

    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![],
            dropped: vec![B],
        }
    );
    assert_eq!(replica.component::<Position>(e1), Some(Position::new(5.0, 5.0)));
    assert_eq!(replica.version(e1), 2);
    assert_chain!(replica, [A, C]);
}

#[test]
fn first_failing_commit_and_everything_after_are_dropped() {
    let mut replica = TestReplica::new(0);
    let (e1, e2) = (entity(1), entity(2));
    let origin = Position::new(0.0, 0.0);

    replica
        .push(A, spawn_commit(&[(e1, origin.clone()), (e2, origin.clone())]))
        .unwrap();
    // B depends on e2, C only on e1
    replica
        .push(B, move_commit(e2, 1, origin.clone(), Position::new(2.0, 0.0)))
        .unwrap();
    replica
        .push(C, move_commit(e1, 1, origin.clone(), Position::new(3.0, 0.0)))
        .unwrap();

    let result = replica
        .receive(message(
            A,
            X,
            move_commit(e2, 1, origin.clone(), Position::new(9.0, 9.0)),
        ))
        .unwrap();

    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 2,
            rebased: vec![],
            dropped: vec![B, C],
        }
    );
    assert_chain!(replica, [A, X]);
    assert_eq!(replica.component::<Position>(e1), Some(origin));
    assert_eq!(replica.component::<Position>(e2), Some(Position::new(9.0, 9.0)));
    assert_eq!(replica.version(e1), 1);
    assert_eq!(replica.version(e2), 2);
}

#[test]
fn independent_commits_are_rebased_onto_the_incoming_one() {
    let mut replica = TestReplica::new(0);
    let (e1, e2) = (entity(1), entity(2));
    let origin = Position::new(0.0, 0.0);

    replica
        .push(A, spawn_commit(&[(e1, origin.clone()), (e2, origin.clone())]))
        .unwrap();
    replica
        .push(B, move_commit(e1, 1, origin.clone(), Position::new(1.0, 0.0)))
        .unwrap();
    replica
        .push(
            C,
            move_commit(e1, 2, Position::new(1.0, 0.0), Position::new(2.0, 0.0)),
        )
        .unwrap();

    let result = replica
        .receive(message(
            A,
            X,
            move_commit(e2, 1, origin.clone(), Position::new(0.0, 7.0)),
        ))
        .unwrap();

    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 2,
            rebased: vec![B, C],
            dropped: vec![],
        }
    );
    assert_chain!(replica, [A, X, B, C]);

    let entries = replica.history.entries();
    assert_eq!(entries[1].base_id(), A);
    assert_eq!(entries[2].base_id(), X);
    assert_eq!(entries[3].base_id(), B);

    assert_eq!(replica.component::<Position>(e1), Some(Position::new(2.0, 0.0)));
    assert_eq!(replica.component::<Position>(e2), Some(Position::new(0.0, 7.0)));
    assert_eq!(replica.version(e1), 3);
    assert_eq!(replica.version(e2), 2);
}

#[test]
fn commit_on_tip_fast_forwards() {
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    let result = replica
        .receive(message(
            CommitId::ROOT,
            A,
            spawn_commit(&[(e1, Position::new(0.0, 0.0))]),
        ))
        .unwrap();
    assert_eq!(result, Reconciliation::FastForward);

    let result = replica
        .receive(message(
            A,
            B,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(4.0, 0.0)),
        ))
        .unwrap();
    assert_eq!(result, Reconciliation::FastForward);

    assert_chain!(replica, [A, B]);
    assert_eq!(replica.history.entries()[1].base_id(), A);
    assert_eq!(replica.component::<Position>(e1), Some(Position::new(4.0, 0.0)));
}

#[test]
fn conflict_on_tip_changes_nothing() {
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    let state = replica.state();

    let error = replica
        .receive(message(
            A,
            B,
            move_commit(e1, 5, Position::new(0.0, 0.0), Position::new(1.0, 1.0)),
        ))
        .unwrap_err();

    assert_eq!(error, HistoryError::Conflict { id: B });
    assert!(error.is_recoverable());
    assert_eq!(replica.state(), state);
    assert_eq!(replica.version(e1), 1);
    assert_chain!(replica, [A]);
}

#[test]
fn conflict_after_rollback_restores_chain_and_world() {
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    replica
        .push(
            B,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(1.0, 0.0)),
        )
        .unwrap();
    let state = replica.state();
    let versions = replica.version_table();

    // expects e1 as it was before A
    let error = replica
        .receive(message(
            A,
            C,
            move_commit(e1, 0, Position::new(0.0, 0.0), Position::new(5.0, 5.0)),
        ))
        .unwrap_err();

    assert_eq!(error, HistoryError::Conflict { id: C });
    assert_eq!(replica.state(), state);
    assert_eq!(replica.version_table(), versions);
    assert_chain!(replica, [A, B]);
    assert_eq!(replica.history.entries()[1].base_id(), A);
}

#[test]
fn unknown_base_changes_nothing() {
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    let state = replica.state();

    let unknown = CommitId::new(77, 77);
    let error = replica
        .receive(message(
            unknown,
            B,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(1.0, 1.0)),
        ))
        .unwrap_err();

    assert_eq!(error, HistoryError::UnknownBase { base_id: unknown });
    assert!(error.is_recoverable());
    assert_eq!(replica.state(), state);
    assert_chain!(replica, [A]);
}

#[test]
fn root_base_rolls_back_whole_chain() {
    let mut replica = TestReplica::new(0);
    let (e1, e2) = (entity(1), entity(2));

    replica
        .push(A, spawn_commit(&[(e1, Position::new(1.0, 1.0))]))
        .unwrap();

    let result = replica
        .receive(message(
            CommitId::ROOT,
            B,
            spawn_commit(&[(e2, Position::new(2.0, 2.0))]),
        ))
        .unwrap();

    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![A],
            dropped: vec![],
        }
    );
    assert_chain!(replica, [B, A]);
    assert_eq!(replica.component::<Position>(e1), Some(Position::new(1.0, 1.0)));
    assert_eq!(replica.component::<Position>(e2), Some(Position::new(2.0, 2.0)));
    assert_eq!(replica.world.entity_count(), 2);
}

#[test]
fn trimmed_commits_are_no_longer_known_bases() {
    let mut replica = TestReplica::with_config(0, HistoryConfig::bounded(2));
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    replica
        .push(
            B,
            move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(1.0, 0.0)),
        )
        .unwrap();
    replica
        .push(
            C,
            move_commit(e1, 2, Position::new(1.0, 0.0), Position::new(2.0, 0.0)),
        )
        .unwrap();
    assert_chain!(replica, [B, C]);
    assert!(!replica.history.is_known_commit(&A));

    let late = move_commit(e1, 1, Position::new(0.0, 0.0), Position::new(8.0, 8.0));
    assert_eq!(
        replica.receive(message(A, X, late.copy())).unwrap_err(),
        HistoryError::UnknownBase { base_id: A }
    );
    assert_eq!(
        replica.receive(message(CommitId::ROOT, X, late)).unwrap_err(),
        HistoryError::UnknownBase {
            base_id: CommitId::ROOT
        }
    );

    let on_tip = move_commit(e1, 3, Position::new(2.0, 0.0), Position::new(3.0, 0.0));
    assert_eq!(
        replica.receive(message(C, X, on_tip)).unwrap(),
        Reconciliation::FastForward
    );
    assert_chain!(replica, [C, X]);
}

#[test]
fn push_commit_does_not_check_preconditions() {
    let mut replica = TestReplica::new(0);
    let e1 = entity(1);

    replica
        .push(A, spawn_commit(&[(e1, Position::new(0.0, 0.0))]))
        .unwrap();
    let base_id = replica
        .push(
            B,
            move_commit(e1, 40, Position::new(0.0, 0.0), Position::new(1.0, 0.0)),
        )
        .unwrap();

    assert_eq!(base_id, A);
    assert_eq!(replica.version(e1), 41);
    assert_eq!(replica.component::<Position>(e1), Some(Position::new(1.0, 0.0)));
}

#[test]
fn conflict_keeps_entity_emptied_by_a_local_commit() {
    let mut replica = TestReplica::new(1);
    let e1 = replica.spawn();
    replica.insert(e1, Position::new(0.0, 0.0));
    let first = replica.commit_local().unwrap();

    replica.remove::<Position>(e1);
    let second = replica.commit_local().unwrap();
    // losing its last component despawns it, as on every other replica
    assert!(!replica.entities.contains(e1));
    assert_eq!(replica.world.entity_count(), 0);

    let state = replica.state();
    let versions = replica.version_table();

    let error = replica
        .receive(message(
            first.id,
            X,
            move_commit(e1, 0, Position::new(0.0, 0.0), Position::new(5.0, 5.0)),
        ))
        .unwrap_err();

    assert_eq!(error, HistoryError::Conflict { id: X });
    assert_eq!(replica.state(), state);
    assert_eq!(replica.version_table(), versions);
    assert!(!replica.entities.contains(e1));
    assert_eq!(replica.world.entity_count(), 0);
    assert_chain!(replica, [first.id, second.id]);
}

#[test]
fn conflict_keeps_component_less_entity_bound() {
    let mut replica = TestReplica::new(1);
    let e1 = replica.spawn();
    replica.insert(e1, Position::new(0.0, 0.0));
    let first = replica.commit_local().unwrap();

    let empty = replica.spawn();
    replica.insert(e1, Position::new(1.0, 0.0));
    let second = replica.commit_local().unwrap();
    assert_eq!(replica.entities.ref_count(empty), Some(0));

    let state = replica.state();
    let versions = replica.version_table();

    let error = replica
        .receive(message(
            first.id,
            X,
            move_commit(e1, 0, Position::new(0.0, 0.0), Position::new(5.0, 5.0)),
        ))
        .unwrap_err();

    assert_eq!(error, HistoryError::Conflict { id: X });
    assert_eq!(replica.state(), state);
    assert_eq!(replica.version_table(), versions);
    assert_eq!(replica.entities.ref_count(empty), Some(0));
    assert_eq!(replica.world.entity_count(), 2);
    assert_chain!(replica, [first.id, second.id]);

    // still editable afterwards
    replica.insert(empty, Position::new(2.0, 2.0));
    replica.commit_local().unwrap();
    assert_eq!(replica.entities.ref_count(empty), Some(1));
}

#[test]
fn rebase_replays_removal_of_last_component() {
    let mut replica = TestReplica::new(1);
    let e1 = replica.spawn();
    replica.insert(e1, Position::new(0.0, 0.0));
    let first = replica.commit_local().unwrap();

    replica.remove::<Position>(e1);
    let second = replica.commit_local().unwrap();

    let remote = entity(999);
    let result = replica
        .receive(message(
            first.id,
            X,
            spawn_commit(&[(remote, Position::new(7.0, 7.0))]),
        ))
        .unwrap();

    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![second.id],
            dropped: vec![],
        }
    );
    assert_chain!(replica, [first.id, X, second.id]);
    assert!(!replica.entities.contains(e1));
    assert_eq!(replica.version(e1), 2);
    assert_eq!(replica.world.entity_count(), 1);
    assert_eq!(replica.component::<Position>(remote), Some(Position::new(7.0, 7.0)));
    assert!(!replica.gather.has_pending());
}
