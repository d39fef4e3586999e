use std::{collections::HashMap, fmt::Debug, hash::Hash};

use log::warn;
use rand::Rng;

use crate::{EntityError, StableEntity, WorldMutType};

// New ids are drawn upward from a random base in this range, so that two
// replicas allocating concurrently are unlikely to hand out the same id.
const STABLE_ID_RANGE: std::ops::Range<u64> = (1 << 32)..(1 << 63);

struct EntityRecord<E> {
    entity: E,
    ref_count: u32,
}

/// Binds stable entity ids to live world entities, counting how many
/// components currently keep each live entity alive.
pub struct StableEntityMap<E> {
    next_id: u64,
    stable_to_live: HashMap<StableEntity, EntityRecord<E>>,
    live_to_stable: HashMap<E, StableEntity>,
}

impl<E: Copy + Eq + Hash + Debug> StableEntityMap<E> {
    pub fn new() -> Self {
        let base = rand::thread_rng().gen_range(STABLE_ID_RANGE);
        Self::with_base(base)
    }

    /// Allocates ids upward from `base`, for deterministic setups
    pub fn with_base(base: u64) -> Self {
        Self {
            next_id: base,
            stable_to_live: HashMap::new(),
            live_to_stable: HashMap::new(),
        }
    }

    /// Spawns a new live entity and binds it to a freshly allocated id.
    /// The entity starts with a ref count of 0, components are attached next.
    pub fn create<W: WorldMutType<E>>(&mut self, world: &mut W) -> StableEntity {
        let id = self.allocate();
        let entity = world.spawn_entity();
        self.insert_record(id, entity, 0);
        id
    }

    /// Returns the live entity bound to `id`, incrementing its ref count.
    /// Spawns and binds one with a ref count of 1 if `id` is not live.
    pub fn create_or_increment<W: WorldMutType<E>>(&mut self, id: StableEntity, world: &mut W) -> E {
        if let Some(record) = self.stable_to_live.get_mut(&id) {
            record.ref_count += 1;
            return record.entity;
        }

        let entity = world.spawn_entity();
        self.insert_record(id, entity, 1);
        entity
    }

    /// Returns the live entity bound to `id`, spawning and binding one with
    /// a ref count of 0 if there is none.
    pub fn bind<W: WorldMutType<E>>(&mut self, id: StableEntity, world: &mut W) -> E {
        if let Some(record) = self.stable_to_live.get(&id) {
            return record.entity;
        }

        let entity = world.spawn_entity();
        self.insert_record(id, entity, 0);
        entity
    }

    /// Binds an already spawned live entity to `id`
    pub fn bind_existing(&mut self, id: StableEntity, entity: E) -> Result<(), EntityError> {
        if self.stable_to_live.contains_key(&id) {
            return Err(EntityError::EntityAlreadyBound { entity: id });
        }
        self.insert_record(id, entity, 0);
        Ok(())
    }

    /// Increments the ref count of the stable id bound to `entity`
    pub fn increment(&mut self, entity: &E) -> Result<StableEntity, EntityError> {
        let id = self.get_stable(entity)?;
        let record = self
            .stable_to_live
            .get_mut(&id)
            .ok_or(EntityError::UnknownEntity { entity: id })?;
        record.ref_count += 1;
        Ok(id)
    }

    /// Decrements the ref count of `id`. At zero the live entity is
    /// despawned and the binding removed. Returns the live entity either way.
    pub fn decrement<W: WorldMutType<E>>(
        &mut self,
        id: StableEntity,
        world: &mut W,
    ) -> Result<E, EntityError> {
        let record = self
            .stable_to_live
            .get_mut(&id)
            .ok_or(EntityError::UnknownEntity { entity: id })?;

        if record.ref_count == 0 {
            warn!("Ref count underflow on entity {:?}", id);
        } else {
            record.ref_count -= 1;
        }

        let entity = record.entity;
        if record.ref_count == 0 {
            self.stable_to_live.remove(&id);
            self.live_to_stable.remove(&entity);
            world.despawn_entity(&entity);
        }
        Ok(entity)
    }

    /// Drops one reference without touching the world. Used when the world
    /// itself already removed the component that held it; a binding left at
    /// zero is despawned once the commit is built.
    pub fn release(&mut self, id: StableEntity) -> Result<u32, EntityError> {
        let record = self
            .stable_to_live
            .get_mut(&id)
            .ok_or(EntityError::UnknownEntity { entity: id })?;

        if record.ref_count == 0 {
            warn!("Ref count underflow on entity {:?}", id);
        } else {
            record.ref_count -= 1;
        }
        Ok(record.ref_count)
    }

    /// Forgets the binding of `id` without touching the world
    pub fn unbind(&mut self, id: StableEntity) -> Option<E> {
        let record = self.stable_to_live.remove(&id)?;
        self.live_to_stable.remove(&record.entity);
        Some(record.entity)
    }

    pub fn get_stable(&self, entity: &E) -> Result<StableEntity, EntityError> {
        self.live_to_stable
            .get(entity)
            .copied()
            .ok_or(EntityError::UnknownWorldEntity)
    }

    pub fn get_live(&self, id: StableEntity) -> Result<E, EntityError> {
        self.stable_to_live
            .get(&id)
            .map(|record| record.entity)
            .ok_or(EntityError::UnknownEntity { entity: id })
    }

    pub fn ref_count(&self, id: StableEntity) -> Option<u32> {
        self.stable_to_live.get(&id).map(|record| record.ref_count)
    }

    pub fn contains(&self, id: StableEntity) -> bool {
        self.stable_to_live.contains_key(&id)
    }

    pub fn contains_live(&self, entity: &E) -> bool {
        self.live_to_stable.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.stable_to_live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stable_to_live.is_empty()
    }

    /// All bindings, ordered by stable id
    pub fn iter(&self) -> impl Iterator<Item = (StableEntity, E)> + '_ {
        let mut ids: Vec<StableEntity> = self.stable_to_live.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(move |id| self.stable_to_live.get(&id).map(|record| (id, record.entity)))
    }

    fn allocate(&mut self) -> StableEntity {
        loop {
            let id = StableEntity::from_u64(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.stable_to_live.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert_record(&mut self, id: StableEntity, entity: E, ref_count: u32) {
        self.stable_to_live
            .insert(id, EntityRecord { entity, ref_count });
        self.live_to_stable.insert(entity, id);
    }
}

impl<E: Copy + Eq + Hash + Debug> Default for StableEntityMap<E> {
    fn default() -> Self {
        Self::new()
    }
}
