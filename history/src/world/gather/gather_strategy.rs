use crate::{ChangeSetDyn, EntityError, StableEntity, StableEntityMap};

/// Source of the changes that make up the next local commit.
///
/// Live events carry world handles, so every drain takes the entity map to
/// translate them into stable ids.
pub trait GatherStrategy<E> {
    /// Drains every captured change, one set per component type
    fn get_change_sets(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<Box<dyn ChangeSetDyn>>, EntityError>;

    /// Drains the entities spawned since the last drain
    fn get_created_entities(
        &mut self,
        entities: &StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError>;

    /// Drains the entities despawned since the last drain, unbinding them.
    /// Must run after `get_change_sets`, which still needs those bindings.
    fn get_destroyed_entities(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError>;

    fn enable(&mut self);
    fn disable(&mut self);
    fn is_enabled(&self) -> bool;
}

// GatherPause
/// Disables capture for as long as it lives, restoring the previous state
/// on drop even when unwinding.
pub struct GatherPause<'g, E> {
    gather: &'g mut dyn GatherStrategy<E>,
    was_enabled: bool,
}

impl<'g, E> GatherPause<'g, E> {
    pub fn new(gather: &'g mut dyn GatherStrategy<E>) -> Self {
        let was_enabled = gather.is_enabled();
        gather.disable();
        Self {
            gather,
            was_enabled,
        }
    }
}

impl<'g, E> Drop for GatherPause<'g, E> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.gather.enable();
        }
    }
}
