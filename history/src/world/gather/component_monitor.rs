use std::{fmt::Debug, hash::Hash};

use log::warn;

use crate::{
    Change, ChangeSet, ChangeSetDyn, Component, ComponentKind, DynComponent, EntityError,
    StableEntityMap,
};

/// Records the changes of one component type as the world reports them,
/// keyed by live entity until drained.
pub trait ComponentMonitorDyn<E> {
    fn kind(&self) -> ComponentKind;
    fn on_construct(&mut self, entity: E, value: &dyn DynComponent);
    fn on_update(&mut self, entity: E, old: &dyn DynComponent, new: &dyn DynComponent);
    fn on_destruct(&mut self, entity: E, old: &dyn DynComponent);
    fn is_empty(&self) -> bool;
    fn clear(&mut self);

    /// Translates captured changes into a `ChangeSet` keyed by stable id.
    /// Returns `None` if nothing was captured.
    fn drain(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Option<Box<dyn ChangeSetDyn>>, EntityError>;
}

enum CapturedChange<E, C> {
    Construct(E, C),
    Update(E, C, C),
    Destruct(E, C),
}

pub struct ComponentMonitor<E, C: Component> {
    captured: Vec<CapturedChange<E, C>>,
}

impl<E, C: Component> ComponentMonitor<E, C> {
    pub fn new() -> Self {
        Self {
            captured: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    fn downcast(value: &dyn DynComponent) -> Option<C> {
        let value = value.downcast_ref::<C>().cloned();
        if value.is_none() {
            warn!("Monitor for '{}' received a value of another type", C::NAME);
        }
        value
    }
}

impl<E, C: Component> Default for ComponentMonitor<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash + Debug, C: Component> ComponentMonitorDyn<E> for ComponentMonitor<E, C> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<C>()
    }

    fn on_construct(&mut self, entity: E, value: &dyn DynComponent) {
        if let Some(value) = Self::downcast(value) {
            self.captured.push(CapturedChange::Construct(entity, value));
        }
    }

    fn on_update(&mut self, entity: E, old: &dyn DynComponent, new: &dyn DynComponent) {
        if let (Some(old), Some(new)) = (Self::downcast(old), Self::downcast(new)) {
            self.captured.push(CapturedChange::Update(entity, old, new));
        }
    }

    fn on_destruct(&mut self, entity: E, old: &dyn DynComponent) {
        if let Some(old) = Self::downcast(old) {
            self.captured.push(CapturedChange::Destruct(entity, old));
        }
    }

    fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    fn clear(&mut self) {
        self.captured.clear();
    }

    fn drain(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Option<Box<dyn ChangeSetDyn>>, EntityError> {
        if self.captured.is_empty() {
            return Ok(None);
        }

        let mut change_set = ChangeSet::<C>::new();
        for captured in std::mem::take(&mut self.captured) {
            let change = match captured {
                CapturedChange::Construct(entity, value) => Change::Construct {
                    entity: entities.increment(&entity)?,
                    value,
                },
                CapturedChange::Update(entity, old, new) => Change::Update {
                    entity: entities.get_stable(&entity)?,
                    old,
                    new,
                },
                CapturedChange::Destruct(entity, old) => {
                    let id = entities.get_stable(&entity)?;
                    entities.release(id)?;
                    Change::Destruct { entity: id, old }
                }
            };
            change_set.push(change);
        }

        Ok(Some(Box::new(change_set)))
    }
}
