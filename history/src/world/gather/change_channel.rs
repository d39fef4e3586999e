use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Arc, RwLock, RwLockWriteGuard},
};

use crate::{
    ChangeSetDyn, ComponentKind, ComponentMonitorDyn, DynComponent, EntityError, StableEntity,
    StableEntityMap,
};

// ChangeBuffer
/// Events captured since the last drain
pub struct ChangeBuffer<E> {
    enabled: bool,
    spawned: Vec<E>,
    despawned: Vec<E>,
    monitors: Vec<Box<dyn ComponentMonitorDyn<E>>>,
    monitor_index: HashMap<ComponentKind, usize>,
}

impl<E: Copy + Eq + Hash + Debug> ChangeBuffer<E> {
    fn new() -> Self {
        Self {
            enabled: true,
            spawned: Vec::new(),
            despawned: Vec::new(),
            monitors: Vec::new(),
            monitor_index: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns false if a monitor for the same kind already exists
    pub fn add_monitor(&mut self, monitor: Box<dyn ComponentMonitorDyn<E>>) -> bool {
        let kind = monitor.kind();
        if self.monitor_index.contains_key(&kind) {
            return false;
        }
        self.monitor_index.insert(kind, self.monitors.len());
        self.monitors.push(monitor);
        true
    }

    pub fn is_monitored(&self, kind: &ComponentKind) -> bool {
        self.monitor_index.contains_key(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
            && self.despawned.is_empty()
            && self.monitors.iter().all(|monitor| monitor.is_empty())
    }

    pub fn clear(&mut self) {
        self.spawned.clear();
        self.despawned.clear();
        for monitor in &mut self.monitors {
            monitor.clear();
        }
    }

    /// One set per monitored kind with captured changes, in monitor
    /// registration order
    pub fn drain_change_sets(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<Box<dyn ChangeSetDyn>>, EntityError> {
        let mut change_sets = Vec::new();
        for monitor in &mut self.monitors {
            if let Some(change_set) = monitor.drain(entities)? {
                change_sets.push(change_set);
            }
        }
        Ok(change_sets)
    }

    pub fn drain_spawned(
        &mut self,
        entities: &StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError> {
        std::mem::take(&mut self.spawned)
            .iter()
            .map(|entity| entities.get_stable(entity))
            .collect()
    }

    /// Translates despawned entities and forgets their bindings
    pub fn drain_despawned(
        &mut self,
        entities: &mut StableEntityMap<E>,
    ) -> Result<Vec<StableEntity>, EntityError> {
        let mut output = Vec::new();
        for entity in std::mem::take(&mut self.despawned) {
            let id = entities.get_stable(&entity)?;
            entities.unbind(id);
            output.push(id);
        }
        Ok(output)
    }

    fn monitor_mut(&mut self, kind: &ComponentKind) -> Option<&mut Box<dyn ComponentMonitorDyn<E>>> {
        if !self.enabled {
            return None;
        }
        let index = *self.monitor_index.get(kind)?;
        self.monitors.get_mut(index)
    }
}

// ChangeChannel
pub struct ChangeChannel;

impl ChangeChannel {
    pub fn new_channel<E: Copy + Eq + Hash + Debug>() -> (ChangeSender<E>, ChangeReceiver<E>) {
        let buffer = Arc::new(RwLock::new(ChangeBuffer::new()));
        let sender = ChangeSender {
            buffer: buffer.clone(),
        };
        let receiver = ChangeReceiver { buffer };
        (sender, receiver)
    }
}

// ChangeSender
/// Held by the world, which reports every mutation through it
#[derive(Clone)]
pub struct ChangeSender<E> {
    buffer: Arc<RwLock<ChangeBuffer<E>>>,
}

impl<E: Copy + Eq + Hash + Debug> ChangeSender<E> {
    pub fn spawned(&self, entity: E) {
        let mut buffer = self.buffer_mut();
        if buffer.enabled {
            buffer.spawned.push(entity);
        }
    }

    pub fn despawned(&self, entity: E) {
        let mut buffer = self.buffer_mut();
        if buffer.enabled {
            buffer.despawned.push(entity);
        }
    }

    pub fn constructed(&self, entity: E, value: &dyn DynComponent) {
        let mut buffer = self.buffer_mut();
        if let Some(monitor) = buffer.monitor_mut(&value.kind()) {
            monitor.on_construct(entity, value);
        }
    }

    pub fn updated(&self, entity: E, old: &dyn DynComponent, new: &dyn DynComponent) {
        let mut buffer = self.buffer_mut();
        if let Some(monitor) = buffer.monitor_mut(&new.kind()) {
            monitor.on_update(entity, old, new);
        }
    }

    pub fn destructed(&self, entity: E, old: &dyn DynComponent) {
        let mut buffer = self.buffer_mut();
        if let Some(monitor) = buffer.monitor_mut(&old.kind()) {
            monitor.on_destruct(entity, old);
        }
    }

    fn buffer_mut(&self) -> RwLockWriteGuard<'_, ChangeBuffer<E>> {
        let Ok(buffer) = self.buffer.as_ref().write() else {
            panic!("Change buffer held on current thread");
        };
        buffer
    }
}

// ChangeReceiver
/// Owned by the gather strategy, which drains the buffer
pub struct ChangeReceiver<E> {
    buffer: Arc<RwLock<ChangeBuffer<E>>>,
}

impl<E: Copy + Eq + Hash + Debug> ChangeReceiver<E> {
    pub fn new_sender(&self) -> ChangeSender<E> {
        ChangeSender {
            buffer: self.buffer.clone(),
        }
    }

    pub fn buffer_mut(&self) -> RwLockWriteGuard<'_, ChangeBuffer<E>> {
        let Ok(buffer) = self.buffer.as_ref().write() else {
            panic!("Change buffer held on current thread");
        };
        buffer
    }

    pub fn is_enabled(&self) -> bool {
        let Ok(buffer) = self.buffer.as_ref().read() else {
            panic!("Change buffer held on current thread");
        };
        buffer.enabled
    }
}
