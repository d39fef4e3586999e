use std::collections::{BTreeMap, BTreeSet};

use crate::{ChangeSet, ChangeSetDyn, Component, EntityVersion, StableEntity, WireMode};

/// An atomic, invertible state transition.
///
/// `entity_versions` holds, for every entity the commit touches, the version
/// that entity must be at for the commit to apply.
#[derive(Clone, Debug, Default)]
pub struct Commit {
    undo: bool,
    entity_versions: BTreeMap<StableEntity, EntityVersion>,
    created_entities: Vec<StableEntity>,
    change_sets: Vec<Box<dyn ChangeSetDyn>>,
    destroyed_entities: Vec<StableEntity>,
    wire_mode: WireMode,
}

impl Commit {
    pub fn new(
        entity_versions: BTreeMap<StableEntity, EntityVersion>,
        created_entities: Vec<StableEntity>,
        change_sets: Vec<Box<dyn ChangeSetDyn>>,
        destroyed_entities: Vec<StableEntity>,
        undo: bool,
    ) -> Self {
        Self {
            undo,
            entity_versions,
            created_entities,
            change_sets,
            destroyed_entities,
            wire_mode: WireMode::Full,
        }
    }

    pub(crate) fn with_entity_versions(
        mut self,
        entity_versions: BTreeMap<StableEntity, EntityVersion>,
    ) -> Self {
        self.entity_versions = entity_versions;
        self
    }

    pub(crate) fn with_wire_mode(mut self, wire_mode: WireMode) -> Self {
        self.wire_mode = wire_mode;
        self
    }

    pub fn builder() -> CommitBuilder {
        CommitBuilder::new()
    }

    pub fn is_undo(&self) -> bool {
        self.undo
    }

    /// `Compact` when the commit was decoded without old values. Inverting
    /// such a commit writes `Default` values back.
    pub fn wire_mode(&self) -> WireMode {
        self.wire_mode
    }

    pub fn entity_versions(&self) -> &BTreeMap<StableEntity, EntityVersion> {
        &self.entity_versions
    }

    pub fn created_entities(&self) -> &[StableEntity] {
        &self.created_entities
    }

    pub fn destroyed_entities(&self) -> &[StableEntity] {
        &self.destroyed_entities
    }

    pub fn change_sets(&self) -> &[Box<dyn ChangeSetDyn>] {
        &self.change_sets
    }

    pub fn change_set<C: Component>(&self) -> Option<&ChangeSet<C>> {
        self.change_sets
            .iter()
            .find_map(|change_set| change_set.downcast_ref::<C>())
    }

    pub fn is_empty(&self) -> bool {
        self.entity_versions.is_empty()
            && self.created_entities.is_empty()
            && self.destroyed_entities.is_empty()
            && self.change_sets.iter().all(|change_set| change_set.is_empty())
    }

    /// The commit that undoes this one.
    ///
    /// Preconditions move one version forward for a forward commit, since the
    /// inverse runs on the state this commit produced, and one back when
    /// inverting an inverse.
    pub fn invert(&self) -> Commit {
        let entity_versions = self
            .entity_versions
            .iter()
            .map(|(entity, version)| {
                let version = if self.undo {
                    version.wrapping_sub(1)
                } else {
                    version.wrapping_add(1)
                };
                (*entity, version)
            })
            .collect();

        Commit {
            undo: !self.undo,
            entity_versions,
            created_entities: self.destroyed_entities.clone(),
            change_sets: self
                .change_sets
                .iter()
                .rev()
                .map(|change_set| change_set.invert())
                .collect(),
            destroyed_entities: self.created_entities.clone(),
            wire_mode: self.wire_mode,
        }
    }

    /// Every entity referenced by a change set or a lifecycle list
    pub fn touched_entities(&self) -> BTreeSet<StableEntity> {
        let mut entities = BTreeSet::new();
        for change_set in &self.change_sets {
            change_set.for_each_entity(&mut |entity| {
                entities.insert(entity);
            });
        }
        entities.extend(self.created_entities.iter().copied());
        entities.extend(self.destroyed_entities.iter().copied());
        entities
    }

    /// Size of the commit body on the wire in full mode
    pub fn byte_size(&self) -> usize {
        // entity_version_count:u32, (entity:u64, version:u16)*
        let versions = 4 + self.entity_versions.len() * 10;
        // change_set_count:u16
        let change_sets = 2 + self
            .change_sets
            .iter()
            .map(|change_set| change_set.byte_size())
            .sum::<usize>();
        // created and destroyed: count:u32, entity:u64*, then undo:u8
        let lifecycle = 4 + self.created_entities.len() * 8 + 4 + self.destroyed_entities.len() * 8 + 1;
        versions + change_sets + lifecycle
    }

    /// Deep copy, sharing nothing with `self`
    pub fn copy(&self) -> Commit {
        self.clone()
    }
}

// CommitBuilder
/// Assembles a commit by hand, for commits not produced by a gather strategy
pub struct CommitBuilder {
    commit: Commit,
}

impl CommitBuilder {
    fn new() -> Self {
        Self {
            commit: Commit::default(),
        }
    }

    pub fn version(mut self, entity: StableEntity, version: EntityVersion) -> Self {
        self.commit.entity_versions.insert(entity, version);
        self
    }

    pub fn created(mut self, entity: StableEntity) -> Self {
        self.commit.created_entities.push(entity);
        self
    }

    pub fn destroyed(mut self, entity: StableEntity) -> Self {
        self.commit.destroyed_entities.push(entity);
        self
    }

    pub fn change_set<C: Component>(self, change_set: ChangeSet<C>) -> Self {
        self.boxed_change_set(Box::new(change_set))
    }

    pub fn boxed_change_set(mut self, change_set: Box<dyn ChangeSetDyn>) -> Self {
        self.commit.change_sets.push(change_set);
        self
    }

    pub fn undo(mut self, undo: bool) -> Self {
        self.commit.undo = undo;
        self
    }

    pub fn build(self) -> Commit {
        self.commit
    }
}
