use crate::{EntityVersions, GatherStrategy, StableEntityMap};

/// Everything one replica mutates when commits are applied.
/// Several independent replicas can coexist, each with its own context.
pub struct WorldContext<'a, E, W> {
    pub world: &'a mut W,
    pub entities: &'a mut StableEntityMap<E>,
    pub versions: &'a mut EntityVersions,
    pub gather: &'a mut dyn GatherStrategy<E>,
}

impl<'a, E, W> WorldContext<'a, E, W> {
    pub fn new(
        world: &'a mut W,
        entities: &'a mut StableEntityMap<E>,
        versions: &'a mut EntityVersions,
        gather: &'a mut dyn GatherStrategy<E>,
    ) -> Self {
        Self {
            world,
            entities,
            versions,
            gather,
        }
    }
}
