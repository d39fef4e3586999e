use std::{fmt::Debug, hash::Hash};

use crate::{AnyChangeVisitor, DynComponent, HistoryError, StableEntity, StableEntityMap, WorldMutType};

/// Writes changes into the world, resolving stable ids through the entity
/// map and keeping its ref counts in step with the components attached.
pub struct ChangeApplier<'a, E, W> {
    world: &'a mut W,
    entities: &'a mut StableEntityMap<E>,
}

impl<'a, E, W> ChangeApplier<'a, E, W> {
    pub fn new(world: &'a mut W, entities: &'a mut StableEntityMap<E>) -> Self {
        Self { world, entities }
    }
}

impl<'a, E: Copy + Eq + Hash + Debug, W: WorldMutType<E>> AnyChangeVisitor for ChangeApplier<'a, E, W> {
    fn construct(&mut self, entity: StableEntity, value: &dyn DynComponent) -> Result<(), HistoryError> {
        let live = self.entities.create_or_increment(entity, &mut *self.world);
        self.world.insert_boxed_component(&live, value.copy_to_box());
        Ok(())
    }

    fn update(
        &mut self,
        entity: StableEntity,
        _old: &dyn DynComponent,
        new: &dyn DynComponent,
    ) -> Result<(), HistoryError> {
        let live = self.entities.get_live(entity)?;
        self.world.insert_boxed_component(&live, new.copy_to_box());
        Ok(())
    }

    fn destruct(&mut self, entity: StableEntity, old: &dyn DynComponent) -> Result<(), HistoryError> {
        let live = self.entities.get_live(entity)?;
        self.world.remove_component_of_kind(&live, &old.kind());
        self.entities.decrement(entity, &mut *self.world)?;
        Ok(())
    }
}
