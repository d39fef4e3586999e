use std::convert::Infallible;

use ecs_history_serde::{ByteWrite, Serde};

use crate::{ChangeKind, ChangeVisitor, Component, StableEntity, WireMode};

/// Writes each visited change as `entity:u64, kind:u8, values`
pub struct ChangeSerializer<'w> {
    writer: &'w mut dyn ByteWrite,
    mode: WireMode,
}

impl<'w> ChangeSerializer<'w> {
    pub fn new(writer: &'w mut dyn ByteWrite, mode: WireMode) -> Self {
        Self { writer, mode }
    }

    fn write_header(&mut self, entity: StableEntity, kind: ChangeKind) {
        entity.ser(self.writer);
        kind.ser(self.writer);
    }
}

impl<'w, C: Component> ChangeVisitor<C> for ChangeSerializer<'w> {
    type Error = Infallible;

    fn construct(&mut self, entity: StableEntity, value: &C) -> Result<(), Self::Error> {
        self.write_header(entity, ChangeKind::Construct);
        value.ser(self.writer);
        Ok(())
    }

    fn update(&mut self, entity: StableEntity, old: &C, new: &C) -> Result<(), Self::Error> {
        match self.mode {
            WireMode::Full => {
                self.write_header(entity, ChangeKind::UpdateFull);
                old.ser(self.writer);
            }
            WireMode::Compact => self.write_header(entity, ChangeKind::UpdateNewOnly),
        }
        new.ser(self.writer);
        Ok(())
    }

    fn destruct(&mut self, entity: StableEntity, old: &C) -> Result<(), Self::Error> {
        match self.mode {
            WireMode::Full => {
                self.write_header(entity, ChangeKind::DestructFull);
                old.ser(self.writer);
            }
            WireMode::Compact => self.write_header(entity, ChangeKind::DestructNewOnly),
        }
        Ok(())
    }
}
