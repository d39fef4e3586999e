use std::{
    any::Any,
    fmt::{Debug, Formatter},
};

use ecs_history_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{
    AnyChangeAdapter, AnyChangeVisitor, Change, Component, ComponentKind, HistoryError,
    StableEntity, WireMode,
};

// ChangeSet
/// Ordered changes of a single component type within one commit
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeSet<C: Component> {
    changes: Vec<Change<C>>,
}

impl<C: Component> ChangeSet<C> {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn from_changes(changes: Vec<Change<C>>) -> Self {
        Self { changes }
    }

    pub fn construct(mut self, entity: StableEntity, value: C) -> Self {
        self.push(Change::Construct { entity, value });
        self
    }

    pub fn update(mut self, entity: StableEntity, old: C, new: C) -> Self {
        self.push(Change::Update { entity, old, new });
        self
    }

    pub fn destruct(mut self, entity: StableEntity, old: C) -> Self {
        self.push(Change::Destruct { entity, old });
        self
    }

    pub fn push(&mut self, change: Change<C>) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change<C>] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Inverts every change and reverses their order, so that replaying the
    /// result undoes this set newest change first.
    pub fn invert(&self) -> Self {
        Self {
            changes: self.changes.iter().rev().map(Change::invert).collect(),
        }
    }

    /// Reads `change_count:u32` followed by that many changes
    pub fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self::read_with_mode(reader)?.0)
    }

    /// Like `read`, also reporting `Compact` if any change arrived without
    /// its old value
    pub fn read_with_mode(reader: &mut ByteReader) -> Result<(Self, WireMode), SerdeErr> {
        let count = u32::de(reader)? as usize;
        let mut changes = Vec::with_capacity(count.min(reader.remaining()));
        let mut mode = WireMode::Full;
        for _ in 0..count {
            let (change, kind) = Change::read_tagged(reader)?;
            if kind.wire_mode() == WireMode::Compact {
                mode = WireMode::Compact;
            }
            changes.push(change);
        }
        Ok((Self { changes }, mode))
    }
}

impl<C: Component> Default for ChangeSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ChangeSetDyn
/// Type-erased `ChangeSet`, lets commits hold sets of many component types
pub trait ChangeSetDyn: Send + Sync {
    fn kind(&self) -> ComponentKind;
    fn name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    /// Size of the set on the wire in full mode, kind and count included
    fn byte_size(&self) -> usize;
    fn invert(&self) -> Box<dyn ChangeSetDyn>;
    fn for_each_entity(&self, callback: &mut dyn FnMut(StableEntity));
    fn supply(&self, visitor: &mut dyn AnyChangeVisitor) -> Result<(), HistoryError>;
    /// Writes `change_count:u32` followed by every change
    fn write(&self, writer: &mut dyn ByteWrite, mode: WireMode);
    fn copy_to_box(&self) -> Box<dyn ChangeSetDyn>;
    fn as_any(&self) -> &dyn Any;
}

impl<C: Component> ChangeSetDyn for ChangeSet<C> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<C>()
    }

    fn name(&self) -> &'static str {
        C::NAME
    }

    fn len(&self) -> usize {
        self.changes.len()
    }

    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn byte_size(&self) -> usize {
        // kind:u64 + change_count:u32
        12 + self.changes.iter().map(Change::byte_size).sum::<usize>()
    }

    fn invert(&self) -> Box<dyn ChangeSetDyn> {
        Box::new(ChangeSet::invert(self))
    }

    fn for_each_entity(&self, callback: &mut dyn FnMut(StableEntity)) {
        for change in &self.changes {
            callback(change.entity());
        }
    }

    fn supply(&self, visitor: &mut dyn AnyChangeVisitor) -> Result<(), HistoryError> {
        let mut adapter = AnyChangeAdapter::new(visitor);
        for change in &self.changes {
            change.apply(&mut adapter)?;
        }
        Ok(())
    }

    fn write(&self, writer: &mut dyn ByteWrite, mode: WireMode) {
        (self.changes.len() as u32).ser(writer);
        for change in &self.changes {
            change.write(writer, mode);
        }
    }

    fn copy_to_box(&self) -> Box<dyn ChangeSetDyn> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn ChangeSetDyn {
    pub fn downcast_ref<C: Component>(&self) -> Option<&ChangeSet<C>> {
        self.as_any().downcast_ref::<ChangeSet<C>>()
    }

    pub fn entities(&self) -> Vec<StableEntity> {
        let mut entities = Vec::new();
        self.for_each_entity(&mut |entity| entities.push(entity));
        entities
    }
}

impl Debug for dyn ChangeSetDyn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSet")
            .field("component", &self.name())
            .field("changes", &self.len())
            .finish()
    }
}

impl Clone for Box<dyn ChangeSetDyn> {
    fn clone(&self) -> Self {
        self.copy_to_box()
    }
}
