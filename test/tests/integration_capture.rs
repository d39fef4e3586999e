/// Local change capture through the gather strategy, and replication of the
/// resulting commits to other replicas.

use ecs_history::{
    Change, EntityError, GatherStrategy, HistoryConfig, HistoryError, Reconciliation, WireMode,
};
use ecs_history_test::{
    assert_chain, assert_converged, init_logger, Label, Position, TestReplica, Velocity,
};

#[test]
fn local_changes_become_one_commit() {
    init_logger();
    let mut local = TestReplica::new(1);

    let entity = local.spawn();
    local.insert(entity, Position::new(1.0, 2.0));
    local.insert(entity, Position::new(3.0, 4.0));
    local.insert(entity, Velocity::new(0.5, 0.0));
    assert!(local.gather.has_pending());

    let message = local.commit_local().unwrap();
    let commit = &message.commit;

    assert!(message.base_id.is_root());
    assert_eq!(commit.created_entities(), &[entity]);
    assert!(commit.destroyed_entities().is_empty());
    assert_eq!(commit.entity_versions().get(&entity), Some(&0));
    assert_eq!(local.version(entity), 1);

    let positions = commit.change_set::<Position>().unwrap().changes();
    assert_eq!(
        positions,
        &[
            Change::Construct {
                entity,
                value: Position::new(1.0, 2.0),
            },
            Change::Update {
                entity,
                old: Position::new(1.0, 2.0),
                new: Position::new(3.0, 4.0),
            },
        ]
    );
    assert_eq!(commit.change_set::<Velocity>().unwrap().len(), 1);
    // nothing was recorded for Label
    assert!(commit.change_set::<Label>().is_none());

    assert!(!local.gather.has_pending());
    assert_chain!(local, [message.id]);
}

#[test]
fn second_local_commit_builds_on_the_first() {
    let mut local = TestReplica::new(1);

    let entity = local.spawn();
    local.insert(entity, Position::new(0.0, 0.0));
    let first = local.commit_local().unwrap();

    local.insert(entity, Position::new(1.0, 0.0));
    let second = local.commit_local().unwrap();

    assert_eq!(second.base_id, first.id);
    assert!(second.commit.created_entities().is_empty());
    assert_eq!(second.commit.entity_versions().get(&entity), Some(&1));
    assert_eq!(local.version(entity), 2);
}

#[test]
fn applying_a_commit_is_not_captured() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Label::new("crate"));
    let message = local.commit_local().unwrap();

    remote.receive(message).unwrap();

    assert!(remote.gather.is_enabled());
    assert!(!remote.gather.has_pending());
    assert_eq!(remote.component::<Label>(entity), Some(Label::new("crate")));
}

#[test]
fn capture_resumes_after_apply() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Position::new(0.0, 0.0));
    let message = local.commit_local().unwrap();
    remote.receive(message).unwrap();

    remote.insert(entity, Position::new(6.0, 6.0));
    assert!(remote.gather.has_pending());
    let edit = remote.commit_local().unwrap();

    assert_eq!(edit.commit.entity_versions().get(&entity), Some(&1));
    assert_eq!(local.receive(edit).unwrap(), Reconciliation::FastForward);
    assert_converged!(local, remote);
}

#[test]
fn disabled_gather_records_nothing() {
    let mut local = TestReplica::new(1);
    let entity = local.spawn();
    local.gather.clear();

    local.gather.disable();
    local.insert(entity, Position::new(1.0, 1.0));
    assert!(!local.gather.has_pending());

    local.gather.enable();
    local.insert(entity, Position::new(2.0, 2.0));
    assert!(local.gather.has_pending());
}

#[test]
fn two_components_hold_two_references() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Position::new(0.0, 0.0));
    local.insert(entity, Velocity::new(1.0, 0.0));
    remote.receive(local.commit_local().unwrap()).unwrap();
    assert_eq!(local.entities.ref_count(entity), Some(2));
    assert_eq!(remote.entities.ref_count(entity), Some(2));

    local.remove::<Position>(entity);
    remote.receive(local.commit_local().unwrap()).unwrap();
    assert_eq!(remote.entities.ref_count(entity), Some(1));
    assert!(remote.entities.contains(entity));
    assert_eq!(remote.world.entity_count(), 1);

    local.remove::<Velocity>(entity);
    remote.receive(local.commit_local().unwrap()).unwrap();
    assert!(!remote.entities.contains(entity));
    assert_eq!(remote.world.entity_count(), 0);

    // the capturing side drops the emptied entity too
    assert!(!local.entities.contains(entity));
    assert_eq!(local.world.entity_count(), 0);
    assert!(!local.gather.has_pending());
    assert_converged!(local, remote);
}

#[test]
fn removing_and_reinserting_last_component_keeps_entity() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Position::new(0.0, 0.0));
    remote.receive(local.commit_local().unwrap()).unwrap();

    local.remove::<Position>(entity);
    local.insert(entity, Position::new(4.0, 0.0));
    remote.receive(local.commit_local().unwrap()).unwrap();

    assert_eq!(local.entities.ref_count(entity), Some(1));
    assert_eq!(remote.entities.ref_count(entity), Some(1));
    assert_eq!(remote.component::<Position>(entity), Some(Position::new(4.0, 0.0)));
    assert_converged!(local, remote);
}

#[test]
fn entity_spawned_while_capture_was_disabled_is_unregistered() {
    let mut local = TestReplica::new(1);

    local.gather.disable();
    let entity = local.spawn();
    local.gather.enable();
    local.insert(entity, Position::new(1.0, 1.0));

    let error = local.commit_local().unwrap_err();
    assert_eq!(
        error,
        HistoryError::Entity(EntityError::UnregisteredEntity { entity })
    );
    assert!(local.history.is_empty());
}

#[test]
fn despawn_replicates_as_destruct_then_destroy() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Position::new(0.0, 0.0));
    local.insert(entity, Label::new("doomed"));
    remote.receive(local.commit_local().unwrap()).unwrap();

    local.despawn(entity);
    let message = local.commit_local().unwrap();
    assert_eq!(message.commit.destroyed_entities(), &[entity]);
    assert_eq!(message.commit.change_sets().len(), 2);
    assert!(!local.entities.contains(entity));

    remote.receive(message).unwrap();
    assert!(!remote.entities.contains(entity));
    assert_eq!(remote.world.entity_count(), 0);
    assert_eq!(remote.version(entity), 2);
    assert_converged!(local, remote);
}

#[test]
fn component_less_entity_is_replicated() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    let message = local.commit_local().unwrap();
    assert_eq!(message.commit.created_entities(), &[entity]);

    remote.receive(message).unwrap();
    assert!(remote.entities.contains(entity));
    assert_eq!(remote.entities.ref_count(entity), Some(0));
    assert_eq!(remote.world.component_count(&remote.live(entity)), 0);
}

#[test]
fn replicas_converge_over_the_wire() {
    let mut local = TestReplica::new(1);
    let mut remote = TestReplica::new(2);

    let player = local.spawn();
    let rock = local.spawn();
    local.insert(player, Position::new(0.0, 0.0));
    local.insert(player, Label::new("player"));
    local.insert(rock, Position::new(10.0, 0.0));

    for step in 0..3 {
        let message = local.commit_local().unwrap();
        let bytes = local.encode(&message, WireMode::Full);
        remote.receive(remote.decode(&bytes).unwrap()).unwrap();

        local.insert(player, Position::new(step as f32, 1.0));
    }
    local.despawn(rock);
    let message = local.commit_local().unwrap();
    let bytes = local.encode(&message, WireMode::Full);
    remote.receive(remote.decode(&bytes).unwrap()).unwrap();

    assert_converged!(local, remote);
    assert_eq!(local.chain(), remote.chain());
}

#[test]
fn concurrent_edits_converge() {
    let mut left = TestReplica::new(1);
    let mut right = TestReplica::new(2);

    let a = left.spawn();
    let b = left.spawn();
    left.insert(a, Position::new(0.0, 0.0));
    left.insert(b, Position::new(0.0, 0.0));
    let shared = left.commit_local().unwrap();
    right.receive(shared.clone()).unwrap();

    // both edit concurrently on top of the shared commit
    left.insert(a, Position::new(1.0, 0.0));
    let left_edit = left.commit_local().unwrap();
    right.insert(b, Position::new(0.0, 1.0));
    let right_edit = right.commit_local().unwrap();
    assert_eq!(left_edit.base_id, shared.id);
    assert_eq!(right_edit.base_id, shared.id);

    let left_id = left_edit.id;
    let right_id = right_edit.id;
    let left_bytes = left.encode(&left_edit, WireMode::Full);
    let right_bytes = right.encode(&right_edit, WireMode::Full);

    let on_right = right.receive(right.decode(&left_bytes).unwrap()).unwrap();
    assert_eq!(
        on_right,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![right_id],
            dropped: vec![],
        }
    );
    let on_left = left.receive(left.decode(&right_bytes).unwrap()).unwrap();
    assert_eq!(
        on_left,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![left_id],
            dropped: vec![],
        }
    );

    assert_converged!(left, right);
    assert_eq!(left.component::<Position>(a), Some(Position::new(1.0, 0.0)));
    assert_eq!(left.component::<Position>(b), Some(Position::new(0.0, 1.0)));
}

#[test]
fn concurrent_edits_of_one_entity_drop_the_local_one() {
    let mut left = TestReplica::new(1);
    let mut right = TestReplica::new(2);

    let a = left.spawn();
    left.insert(a, Position::new(0.0, 0.0));
    let shared = left.commit_local().unwrap();
    let shared_bytes = left.encode(&shared, WireMode::Full);
    right.receive(right.decode(&shared_bytes).unwrap()).unwrap();

    left.insert(a, Position::new(1.0, 0.0));
    let left_edit = left.commit_local().unwrap();
    right.insert(a, Position::new(2.0, 0.0));
    let right_edit = right.commit_local().unwrap();
    let right_id = right_edit.id;

    let result = right.receive(left_edit).unwrap();
    assert_eq!(
        result,
        Reconciliation::Rebased {
            rolled_back: 1,
            rebased: vec![],
            dropped: vec![right_id],
        }
    );
    assert_converged!(left, right);
    assert_eq!(right.component::<Position>(a), Some(Position::new(1.0, 0.0)));
    assert_eq!(left.chain(), right.chain());
}

#[test]
fn compact_wire_mode_still_replicates_forward() {
    let config = HistoryConfig {
        wire_mode: WireMode::Compact,
        ..HistoryConfig::default()
    };
    let mut local = TestReplica::with_config(1, config);
    let mut remote = TestReplica::new(2);

    let entity = local.spawn();
    local.insert(entity, Position::new(1.0, 1.0));
    local.insert(entity, Label::new("compact"));
    let first = local.commit_local().unwrap();
    remote.receive(remote.decode(&local.send(&first)).unwrap()).unwrap();

    local.insert(entity, Position::new(2.0, 2.0));
    local.remove::<Label>(entity);
    let second = local.commit_local().unwrap();
    let bytes = local.send(&second);
    assert!(bytes.len() < local.encode(&second, WireMode::Full).len());
    let received = remote.decode(&bytes).unwrap();
    assert_eq!(received.commit.wire_mode(), WireMode::Compact);
    remote.receive(received).unwrap();

    assert_converged!(local, remote);
    assert_eq!(
        remote.history.entries()[1].commit().wire_mode(),
        WireMode::Compact
    );
    // constructs carry no old value, so the first commit stays exact
    assert_eq!(
        remote.history.entries()[0].commit().wire_mode(),
        WireMode::Full
    );
}
