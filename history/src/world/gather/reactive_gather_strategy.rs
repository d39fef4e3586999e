use std::{fmt::Debug, hash::Hash};

use log::{debug, warn};

use crate::{
    ChangeChannel, ChangeReceiver, ChangeSender, ChangeSetDyn, Component, ComponentKind,
    ComponentMonitor, EntityError, GatherStrategy, StableEntity, StableEntityMap, WorldMutType,
};

/// Gathers changes from events the world publishes as it is mutated.
/// Only component types registered with `monitor` are recorded.
pub struct ReactiveGatherStrategy<E> {
    receiver: ChangeReceiver<E>,
}

impl<E: Copy + Eq + Hash + Debug + 'static> ReactiveGatherStrategy<E> {
    pub fn new() -> Self {
        let (_, receiver) = ChangeChannel::new_channel();
        Self { receiver }
    }

    /// Starts recording changes of component type `C`
    pub fn monitor<C: Component>(&mut self) -> &mut Self {
        let added = self
            .receiver
            .buffer_mut()
            .add_monitor(Box::new(ComponentMonitor::<E, C>::new()));
        if !added {
            warn!("Component '{}' is already monitored", C::NAME);
        }
        self
    }

    pub fn is_monitored(&self, kind: &ComponentKind) -> bool {
        self.receiver.buffer_mut().is_monitored(kind)
    }

    pub fn sender(&self) -> ChangeSender<E> {
        self.receiver.new_sender()
    }

    /// Hands the world a sender so its mutations reach this strategy
    pub fn subscribe_to<W: WorldMutType<E>>(&self, world: &mut W) {
        world.subscribe(self.sender());
    }

    pub fn has_pending(&self) -> bool {
        !self.receiver.buffer_mut().is_empty()
    }

    /// Discards everything captured so far
    pub fn clear(&mut self) {
        self.receiver.buffer_mut().clear();
    }
}

impl<E: Copy + Eq + Hash + Debug + 'static> Default for ReactiveGatherStrategy<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash + Debug + 'static> GatherStrategy<E> for ReactiveGatherStrategy<E> {
    fn get_change_sets(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<Box<dyn ChangeSetDyn>>, EntityError> {
        let change_sets = self.receiver.buffer_mut().drain_change_sets(entities)?;
        debug!("Gathered {} change sets", change_sets.len());
        Ok(change_sets)
    }

    fn get_created_entities(
        &mut self,
        entities: &StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError> {
        self.receiver.buffer_mut().drain_spawned(entities)
    }

    fn get_destroyed_entities(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError> {
        self.receiver.buffer_mut().drain_despawned(entities)
    }

    fn enable(&mut self) {
        self.receiver.buffer_mut().set_enabled(true);
    }

    fn disable(&mut self) {
        self.receiver.buffer_mut().set_enabled(false);
    }

    fn is_enabled(&self) -> bool {
        self.receiver.is_enabled()
    }
}
