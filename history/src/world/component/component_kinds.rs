use std::{collections::HashMap, marker::PhantomData};

use log::{info, warn};

use ecs_history_serde::{ByteReader, ByteWrite, SerdeErr};

use crate::{
    ChangeSet, ChangeSetDyn, Component, ComponentError, ComponentKind, DynComponent, WireMode,
};

/// Per-type codec, looked up by `ComponentKind` when the concrete type is
/// only known from the wire.
pub trait ComponentHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn read_change_set(
        &self,
        reader: &mut ByteReader,
    ) -> Result<(Box<dyn ChangeSetDyn>, WireMode), SerdeErr>;
    fn read_component(&self, reader: &mut ByteReader) -> Result<Box<dyn DynComponent>, SerdeErr>;
    fn write_component(
        &self,
        component: &dyn DynComponent,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), ComponentError>;
}

pub struct DefaultComponentHandler<C: Component> {
    phantom: PhantomData<C>,
}

impl<C: Component> DefaultComponentHandler<C> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<C: Component> Default for DefaultComponentHandler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> ComponentHandler for DefaultComponentHandler<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn read_change_set(
        &self,
        reader: &mut ByteReader,
    ) -> Result<(Box<dyn ChangeSetDyn>, WireMode), SerdeErr> {
        let (change_set, mode) = ChangeSet::<C>::read_with_mode(reader)?;
        Ok((Box::new(change_set), mode))
    }

    fn read_component(&self, reader: &mut ByteReader) -> Result<Box<dyn DynComponent>, SerdeErr> {
        Ok(Box::new(C::de(reader)?))
    }

    fn write_component(
        &self,
        component: &dyn DynComponent,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), ComponentError> {
        let Some(component) = component.downcast_ref::<C>() else {
            return Err(ComponentError::ComponentTypeMismatch { expected: C::NAME });
        };
        component.ser(writer);
        Ok(())
    }
}

// ComponentKinds
/// Registry of the component types a replica can read and write
#[derive(Default)]
pub struct ComponentKinds {
    handlers: HashMap<ComponentKind, Box<dyn ComponentHandler>>,
}

impl ComponentKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C`. Registering the same type twice is ignored with a warning.
    pub fn add_component<C: Component>(&mut self) -> &mut Self {
        if let Err(error) = self.try_add_component::<C>() {
            warn!("{}", error);
        }
        self
    }

    pub fn try_add_component<C: Component>(&mut self) -> Result<ComponentKind, ComponentError> {
        self.try_add_handler(
            ComponentKind::of::<C>(),
            Box::new(DefaultComponentHandler::<C>::new()),
        )
    }

    /// Registers a custom codec under `kind`
    pub fn try_add_handler(
        &mut self,
        kind: ComponentKind,
        handler: Box<dyn ComponentHandler>,
    ) -> Result<ComponentKind, ComponentError> {
        if let Some(existing) = self.handlers.get(&kind) {
            return Err(ComponentError::ComponentAlreadyRegistered {
                name: existing.name(),
            });
        }
        info!("Registered component '{}' as {:?}", handler.name(), kind);
        self.handlers.insert(kind, handler);
        Ok(kind)
    }

    pub fn is_registered(&self, kind: &ComponentKind) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn kind_to_name(&self, kind: &ComponentKind) -> Result<&'static str, ComponentError> {
        Ok(self.handler(kind)?.name())
    }

    /// Registered kinds in ascending order
    pub fn kinds(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<ComponentKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn deserialize_change_set(
        &self,
        kind: &ComponentKind,
        reader: &mut ByteReader,
    ) -> Result<(Box<dyn ChangeSetDyn>, WireMode), crate::HistoryError> {
        let handler = self.handler(kind)?;
        Ok(handler.read_change_set(reader)?)
    }

    pub fn read_component(
        &self,
        kind: &ComponentKind,
        reader: &mut ByteReader,
    ) -> Result<Box<dyn DynComponent>, crate::HistoryError> {
        let handler = self.handler(kind)?;
        Ok(handler.read_component(reader)?)
    }

    /// Writes the raw value of a component, without any framing
    pub fn serialize_raw(
        &self,
        component: &dyn DynComponent,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), ComponentError> {
        self.handler(&component.kind())?
            .write_component(component, writer)
    }

    fn handler(&self, kind: &ComponentKind) -> Result<&dyn ComponentHandler, ComponentError> {
        self.handlers
            .get(kind)
            .map(|handler| handler.as_ref())
            .ok_or(ComponentError::UnknownComponentType { kind: *kind })
    }
}
