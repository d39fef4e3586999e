use std::collections::BTreeMap;

use crate::{EntityError, StableEntity};

/// Per-entity revision counter, compared as an optimistic-concurrency token.
/// Arithmetic wraps at the wire width.
pub type EntityVersion = u16;

/// Current version of every entity this replica has seen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityVersions {
    versions: BTreeMap<StableEntity, EntityVersion>,
}

impl EntityVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version, 0 for entities that were never registered
    pub fn get(&self, entity: StableEntity) -> EntityVersion {
        self.versions.get(&entity).copied().unwrap_or(0)
    }

    pub fn set(&mut self, entity: StableEntity, version: EntityVersion) {
        self.versions.insert(entity, version);
    }

    /// Advances the version of `entity` by one and returns the value it held
    /// before, which is what a commit records as its precondition.
    pub fn increment(&mut self, entity: StableEntity) -> Result<EntityVersion, EntityError> {
        let version = self
            .versions
            .get_mut(&entity)
            .ok_or(EntityError::UnknownEntity { entity })?;
        let previous = *version;
        *version = previous.wrapping_add(1);
        Ok(previous)
    }

    /// Registers `entity` at `version`. Returns false, leaving the table
    /// untouched, if it was already registered.
    pub fn add(&mut self, entity: StableEntity, version: EntityVersion) -> bool {
        if self.versions.contains_key(&entity) {
            return false;
        }
        self.versions.insert(entity, version);
        true
    }

    pub fn remove(&mut self, entity: StableEntity) -> Option<EntityVersion> {
        self.versions.remove(&entity)
    }

    pub fn contains(&self, entity: StableEntity) -> bool {
        self.versions.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Entries ordered by entity id
    pub fn iter(&self) -> impl Iterator<Item = (StableEntity, EntityVersion)> + '_ {
        self.versions.iter().map(|(entity, version)| (*entity, *version))
    }
}
