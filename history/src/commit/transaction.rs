use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    hash::Hash,
};

use log::debug;

use crate::{
    ChangeApplier, Commit, EntityError, EntityVersions, GatherPause, HistoryError, WorldContext,
    WorldMutType,
};

/// Packages everything the gather strategy captured into a commit.
///
/// Newly created entities are registered at version 0. Every touched entity
/// then has its version incremented, the value before the increment becoming
/// the commit's precondition for it.
///
/// An entity left without components by this commit is despawned and
/// unbound, the same as applying the commit elsewhere would do.
pub fn create_commit<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
    ctx: &mut WorldContext<'_, E, W>,
) -> Result<Commit, HistoryError> {
    let change_sets = ctx.gather.get_change_sets(&mut *ctx.entities)?;
    let created_entities = ctx.gather.get_created_entities(&*ctx.entities)?;
    let destroyed_entities = ctx.gather.get_destroyed_entities(&mut *ctx.entities)?;

    for entity in &created_entities {
        ctx.versions.add(*entity, 0);
    }

    let commit = Commit::new(
        BTreeMap::new(),
        created_entities,
        change_sets,
        destroyed_entities,
        false,
    );

    let touched = commit.touched_entities();
    if let Some(entity) = touched.iter().find(|entity| !ctx.versions.contains(**entity)) {
        return Err(EntityError::UnregisteredEntity { entity: *entity }.into());
    }

    let mut entity_versions = BTreeMap::new();
    for entity in touched {
        entity_versions.insert(entity, ctx.versions.increment(entity)?);
    }
    let commit = commit.with_entity_versions(entity_versions);

    despawn_emptied(ctx, &commit);

    debug!(
        "Created commit touching {} entities with {} change sets",
        commit.entity_versions().len(),
        commit.change_sets().len()
    );
    Ok(commit)
}

// Entities a change set released down to zero references. Capture only
// releases, so they are still bound here.
fn despawn_emptied<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
    ctx: &mut WorldContext<'_, E, W>,
    commit: &Commit,
) {
    let mut emptied = BTreeSet::new();
    for change_set in commit.change_sets() {
        change_set.for_each_entity(&mut |entity| {
            if ctx.entities.ref_count(entity) == Some(0) {
                emptied.insert(entity);
            }
        });
    }
    if emptied.is_empty() {
        return;
    }

    let _pause = GatherPause::new(&mut *ctx.gather);
    for entity in emptied {
        if let Some(live) = ctx.entities.unbind(entity) {
            debug!("Despawning {:?}, its last component was removed", entity);
            ctx.world.despawn_entity(&live);
        }
    }
}

/// Whether every entity the commit touches is currently at exactly the
/// version the commit expects
pub fn can_apply(commit: &Commit, versions: &EntityVersions) -> bool {
    commit
        .entity_versions()
        .iter()
        .all(|(entity, expected)| versions.get(*entity) == *expected)
}

/// Applies a commit to the world with capture paused.
///
/// Entities are created first, then every change set is applied in order,
/// then destroyed entities are despawned. Each touched entity finally moves
/// one version past (or, for an undo, before) the commit's precondition.
pub fn apply_commit<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
    ctx: &mut WorldContext<'_, E, W>,
    commit: &Commit,
) -> Result<(), HistoryError> {
    let _pause = GatherPause::new(&mut *ctx.gather);

    for entity in commit.created_entities() {
        ctx.entities.bind(*entity, &mut *ctx.world);
    }

    let mut applier = ChangeApplier::new(&mut *ctx.world, &mut *ctx.entities);
    for change_set in commit.change_sets() {
        change_set.supply(&mut applier)?;
    }

    for entity in commit.destroyed_entities() {
        // an entity whose last component was destructed is already gone
        if let Some(live) = ctx.entities.unbind(*entity) {
            ctx.world.despawn_entity(&live);
        }
    }

    for (entity, version) in commit.entity_versions() {
        let version = if commit.is_undo() {
            version.wrapping_sub(1)
        } else {
            version.wrapping_add(1)
        };
        ctx.versions.set(*entity, version);
    }

    Ok(())
}
