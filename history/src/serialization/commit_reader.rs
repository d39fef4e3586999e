use std::collections::BTreeMap;

use ecs_history_serde::{ByteReader, Serde};

use crate::{
    Commit, CommitId, CommitMessage, ComponentKind, ComponentKinds, EntityVersion, HistoryError,
    StableEntity, WireMode,
};

/// Decodes what `CommitWriter` encodes. A change set of a kind that is not
/// registered cannot be skipped and fails the whole read.
pub struct CommitReader<'k> {
    component_kinds: &'k ComponentKinds,
}

impl<'k> CommitReader<'k> {
    pub fn new(component_kinds: &'k ComponentKinds) -> Self {
        Self { component_kinds }
    }

    pub fn read_commit(&self, reader: &mut ByteReader) -> Result<Commit, HistoryError> {
        let version_count = u32::de(reader)?;
        let mut entity_versions = BTreeMap::new();
        for _ in 0..version_count {
            let entity = StableEntity::de(reader)?;
            let version = EntityVersion::de(reader)?;
            entity_versions.insert(entity, version);
        }

        let change_set_count = u16::de(reader)?;
        let mut change_sets = Vec::with_capacity(change_set_count as usize);
        let mut wire_mode = WireMode::Full;
        for _ in 0..change_set_count {
            let kind = ComponentKind::de(reader)?;
            let (change_set, mode) = self.component_kinds.deserialize_change_set(&kind, reader)?;
            if mode == WireMode::Compact {
                wire_mode = WireMode::Compact;
            }
            change_sets.push(change_set);
        }

        let created_entities = Vec::<StableEntity>::de(reader)?;
        let destroyed_entities = Vec::<StableEntity>::de(reader)?;
        let undo = bool::de(reader)?;

        Ok(Commit::new(
            entity_versions,
            created_entities,
            change_sets,
            destroyed_entities,
            undo,
        )
        .with_wire_mode(wire_mode))
    }

    pub fn read_message(&self, reader: &mut ByteReader) -> Result<CommitMessage, HistoryError> {
        let base_id = CommitId::de(reader)?;
        let id = CommitId::de(reader)?;
        let commit = self.read_commit(reader)?;
        Ok(CommitMessage {
            base_id,
            id,
            commit,
        })
    }

    /// Reads a whole buffer holding exactly one commit
    pub fn commit_from_bytes(&self, bytes: &[u8]) -> Result<Commit, HistoryError> {
        let mut reader = ByteReader::new(bytes);
        let commit = self.read_commit(&mut reader)?;
        reader.finish()?;
        Ok(commit)
    }

    /// Reads a whole buffer holding exactly one message
    pub fn message_from_bytes(&self, bytes: &[u8]) -> Result<CommitMessage, HistoryError> {
        let mut reader = ByteReader::new(bytes);
        let message = self.read_message(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}
