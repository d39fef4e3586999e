use crate::{ChangeSender, Component, ComponentKind, DynComponent};

/// Read access to the entity/component store being tracked
pub trait WorldRefType<E> {
    fn has_entity(&self, entity: &E) -> bool;
    fn entities(&self) -> Vec<E>;
    fn component_kinds(&self, entity: &E) -> Vec<ComponentKind>;
    fn component_of_kind(&self, entity: &E, component_kind: &ComponentKind) -> Option<&dyn DynComponent>;

    fn has_component_of_kind(&self, entity: &E, component_kind: &ComponentKind) -> bool {
        self.component_of_kind(entity, component_kind).is_some()
    }

    fn has_component<C: Component>(&self, entity: &E) -> bool {
        self.has_component_of_kind(entity, &ComponentKind::of::<C>())
    }

    fn component<C: Component>(&self, entity: &E) -> Option<&C> {
        self.component_of_kind(entity, &ComponentKind::of::<C>())?
            .downcast_ref::<C>()
    }
}

/// Write access to the store. Implementations report every mutation to
/// their subscribers: spawns, despawns, and construct/update/destruct of
/// each component. Despawning an entity reports a destruct for each of its
/// components before the despawn itself.
pub trait WorldMutType<E>: WorldRefType<E> {
    fn spawn_entity(&mut self) -> E;
    fn despawn_entity(&mut self, entity: &E);

    /// Attaches the component, replacing (and reporting an update of) any
    /// component of the same kind
    fn insert_boxed_component(&mut self, entity: &E, component: Box<dyn DynComponent>);

    fn remove_component_of_kind(
        &mut self,
        entity: &E,
        component_kind: &ComponentKind,
    ) -> Option<Box<dyn DynComponent>>;

    fn subscribe(&mut self, sender: ChangeSender<E>);

    fn insert_component<C: Component>(&mut self, entity: &E, component: C) {
        self.insert_boxed_component(entity, Box::new(component));
    }

    fn remove_component<C: Component>(&mut self, entity: &E) -> Option<C> {
        let boxed = self.remove_component_of_kind(entity, &ComponentKind::of::<C>())?;
        boxed.downcast_ref::<C>().cloned()
    }
}
