use ecs_history_serde::{ByteWrite, ByteWriter, Serde};

use crate::{
    Commit, CommitMessage, ComponentError, ComponentKinds, HistoryConfig, HistoryError, WireMode,
};

/// Encodes commits for the wire.
///
/// Body layout, all integers little-endian:
/// `entity_version_count:u32, (entity:u64, version:u16)*`,
/// `change_set_count:u16, (kind:u64, change_count:u32, change*)*`,
/// `created_count:u32, entity:u64*, destroyed_count:u32, entity:u64*, undo:u8`
pub struct CommitWriter<'k> {
    component_kinds: &'k ComponentKinds,
    mode: WireMode,
}

impl<'k> CommitWriter<'k> {
    pub fn new(component_kinds: &'k ComponentKinds, mode: WireMode) -> Self {
        Self {
            component_kinds,
            mode,
        }
    }

    /// Writer in the wire mode `config` selects for outgoing commits
    pub fn with_config(component_kinds: &'k ComponentKinds, config: &HistoryConfig) -> Self {
        Self::new(component_kinds, config.wire_mode)
    }

    pub fn write_commit(&self, commit: &Commit, writer: &mut dyn ByteWrite) -> Result<(), HistoryError> {
        // every kind must be readable on the other end
        for change_set in commit.change_sets() {
            let kind = change_set.kind();
            if !self.component_kinds.is_registered(&kind) {
                return Err(ComponentError::UnknownComponentType { kind }.into());
            }
        }

        (commit.entity_versions().len() as u32).ser(writer);
        for (entity, version) in commit.entity_versions() {
            entity.ser(writer);
            version.ser(writer);
        }

        (commit.change_sets().len() as u16).ser(writer);
        for change_set in commit.change_sets() {
            change_set.kind().ser(writer);
            change_set.write(writer, self.mode);
        }

        commit.created_entities().to_vec().ser(writer);
        commit.destroyed_entities().to_vec().ser(writer);
        commit.is_undo().ser(writer);

        Ok(())
    }

    pub fn write_message(
        &self,
        message: &CommitMessage,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), HistoryError> {
        message.base_id.ser(writer);
        message.id.ser(writer);
        self.write_commit(&message.commit, writer)
    }

    pub fn commit_to_bytes(&self, commit: &Commit) -> Result<Vec<u8>, HistoryError> {
        let mut writer = ByteWriter::with_capacity(commit.byte_size());
        self.write_commit(commit, &mut writer)?;
        Ok(writer.to_bytes())
    }

    pub fn message_to_bytes(&self, message: &CommitMessage) -> Result<Vec<u8>, HistoryError> {
        let mut writer = ByteWriter::with_capacity(message.commit.byte_size() + 32);
        self.write_message(message, &mut writer)?;
        Ok(writer.to_bytes())
    }
}
