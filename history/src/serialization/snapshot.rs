use std::{fmt::Debug, hash::Hash};

use log::info;

use ecs_history_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::{
    ChangeKind, ComponentKind, ComponentKinds, DynComponent, EntityVersions, GatherPause,
    HistoryError, StableEntity, StableEntityMap, WorldContext, WorldMutType, WorldRefType,
};

/// Writes the full replicated state of a world: the version table followed by
/// every registered component storage.
///
/// Layout: `version_count:u32, (entity:u64, version:u16)*`, then
/// `storage_count:u16` and per storage `kind:u64, count:u32,
/// (entity:u64, kind_tag:u8 = Construct, value)*`.
pub struct SnapshotWriter<'k> {
    component_kinds: &'k ComponentKinds,
}

impl<'k> SnapshotWriter<'k> {
    pub fn new(component_kinds: &'k ComponentKinds) -> Self {
        Self { component_kinds }
    }

    pub fn write<E: Copy + Eq + Hash + Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entities: &StableEntityMap<E>,
        versions: &EntityVersions,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), HistoryError> {
        (versions.len() as u32).ser(writer);
        for (entity, version) in versions.iter() {
            entity.ser(writer);
            version.ser(writer);
        }

        let kinds = self.component_kinds.kinds();
        (kinds.len() as u16).ser(writer);
        for kind in kinds {
            let storage: Vec<(StableEntity, &dyn DynComponent)> = entities
                .iter()
                .filter_map(|(id, entity)| {
                    world
                        .component_of_kind(&entity, &kind)
                        .map(|component| (id, component))
                })
                .collect();

            kind.ser(writer);
            (storage.len() as u32).ser(writer);
            for (id, component) in storage {
                id.ser(writer);
                ChangeKind::Construct.ser(writer);
                self.component_kinds.serialize_raw(component, writer)?;
            }
        }

        Ok(())
    }

    pub fn to_bytes<E: Copy + Eq + Hash + Debug, W: WorldRefType<E>>(
        &self,
        world: &W,
        entities: &StableEntityMap<E>,
        versions: &EntityVersions,
    ) -> Result<Vec<u8>, HistoryError> {
        let mut writer = ByteWriter::new();
        self.write(world, entities, versions, &mut writer)?;
        Ok(writer.to_bytes())
    }
}

/// Hydrates a world from what `SnapshotWriter` wrote, with capture paused
pub struct SnapshotReader<'k> {
    component_kinds: &'k ComponentKinds,
}

impl<'k> SnapshotReader<'k> {
    pub fn new(component_kinds: &'k ComponentKinds) -> Self {
        Self { component_kinds }
    }

    pub fn read<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &self,
        ctx: &mut WorldContext<'_, E, W>,
        reader: &mut ByteReader,
    ) -> Result<(), HistoryError> {
        let _pause = GatherPause::new(&mut *ctx.gather);

        let version_count = u32::de(reader)?;
        for _ in 0..version_count {
            let entity = StableEntity::de(reader)?;
            let version = u16::de(reader)?;
            ctx.versions.add(entity, version);
        }

        let storage_count = u16::de(reader)?;
        let mut component_count = 0;
        for _ in 0..storage_count {
            let kind = ComponentKind::de(reader)?;
            let count = u32::de(reader)?;
            for _ in 0..count {
                let entity = StableEntity::de(reader)?;
                let tag = ChangeKind::de(reader)?;
                if tag != ChangeKind::Construct {
                    return Err(SerdeErr::InvalidChangeKind { tag: tag.to_u8() }.into());
                }
                let component = self.component_kinds.read_component(&kind, reader)?;
                let live = ctx.entities.create_or_increment(entity, &mut *ctx.world);
                ctx.world.insert_boxed_component(&live, component);
                component_count += 1;
            }
        }

        info!(
            "Hydrated {} entities with {} components from snapshot",
            ctx.entities.len(),
            component_count
        );
        Ok(())
    }

    /// Hydrates from a whole buffer holding exactly one snapshot
    pub fn from_bytes<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &self,
        ctx: &mut WorldContext<'_, E, W>,
        bytes: &[u8],
    ) -> Result<(), HistoryError> {
        let mut reader = ByteReader::new(bytes);
        self.read(ctx, &mut reader)?;
        reader.finish()?;
        Ok(())
    }
}
