use std::{fmt::Debug, hash::Hash};

use log::{debug, info, warn};

use crate::{
    can_apply, Commit, CommitId, HistoryConfig, HistoryError, WireMode, WorldContext,
    WorldMutType,
};

// HistoryEntry
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    base_id: CommitId,
    id: CommitId,
    commit: Commit,
}

impl HistoryEntry {
    pub fn new(base_id: CommitId, id: CommitId, commit: Commit) -> Self {
        Self {
            base_id,
            id,
            commit,
        }
    }

    pub fn base_id(&self) -> CommitId {
        self.base_id
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }
}

/// Outcome of a successful `History::apply_commit`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The commit was based on the tip and applied directly
    FastForward,
    /// Newer local entries were rolled back, the commit spliced in after its
    /// base, and the rolled-back entries replayed until the first one whose
    /// preconditions no longer held
    Rebased {
        rolled_back: usize,
        rebased: Vec<CommitId>,
        dropped: Vec<CommitId>,
    },
}

// History
/// Linear chain of applied commits, oldest first
pub struct History {
    entries: Vec<HistoryEntry>,
    config: HistoryConfig,
    trimmed: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
            trimmed: false,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn tip_id(&self) -> Option<CommitId> {
        self.entries.last().map(|entry| entry.id)
    }

    pub fn get(&self, id: &CommitId) -> Option<&HistoryEntry> {
        self.entries.iter().rev().find(|entry| entry.id == *id)
    }

    pub fn is_known_commit(&self, id: &CommitId) -> bool {
        self.get(id).is_some()
    }

    /// Applies a commit on top of the tip and appends it.
    /// Returns the base id it was recorded with.
    pub fn push_commit<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &mut self,
        ctx: &mut WorldContext<'_, E, W>,
        id: CommitId,
        commit: Commit,
    ) -> Result<CommitId, HistoryError> {
        let base_id = self.next_base_id();
        crate::apply_commit(ctx, &commit)?;
        debug!("Pushed commit {:?} on {:?}", id, base_id);
        self.append(HistoryEntry::new(base_id, id, commit));
        Ok(base_id)
    }

    /// Appends a commit the world already reflects, such as one just
    /// gathered from local changes. Returns the base id it was recorded with.
    pub fn record_commit(&mut self, id: CommitId, commit: Commit) -> CommitId {
        let base_id = self.next_base_id();
        debug!("Recorded commit {:?} on {:?}", id, base_id);
        self.append(HistoryEntry::new(base_id, id, commit));
        base_id
    }

    /// Appends an entry verbatim, without applying it
    pub fn insert_entry(&mut self, base_id: CommitId, id: CommitId, commit: Commit) {
        self.append(HistoryEntry::new(base_id, id, commit));
    }

    /// Reconciles a commit that was made on top of `base_id`.
    ///
    /// If `base_id` is the tip the commit is applied directly. Otherwise every
    /// entry after `base_id` is rolled back, newest first, the commit applied
    /// and spliced in after `base_id`, and the rolled-back entries are
    /// replayed in order until one no longer applies. That entry and all
    /// after it are dropped.
    ///
    /// `Conflict` and `UnknownBase` leave the world, the versions and the
    /// chain exactly as they were.
    pub fn apply_commit<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &mut self,
        ctx: &mut WorldContext<'_, E, W>,
        base_id: CommitId,
        id: CommitId,
        commit: Commit,
    ) -> Result<Reconciliation, HistoryError> {
        let on_tip = match self.tip_id() {
            Some(tip_id) => tip_id == base_id,
            None => base_id.is_root() && !self.trimmed,
        };

        if on_tip {
            if !can_apply(&commit, ctx.versions) {
                warn!("Commit {:?} conflicts at the tip, rejected", id);
                return Err(HistoryError::Conflict { id });
            }
            crate::apply_commit(ctx, &commit)?;
            debug!("Fast-forwarded to commit {:?}", id);
            self.append(HistoryEntry::new(base_id, id, commit));
            return Ok(Reconciliation::FastForward);
        }

        let Some(split) = self.split_point(&base_id) else {
            warn!("Commit {:?} is based on unknown commit {:?}", id, base_id);
            return Err(HistoryError::UnknownBase { base_id });
        };

        let rolled_back = self.entries.split_off(split);
        if let Err(error) = Self::roll_back(ctx, &rolled_back) {
            self.entries.extend(rolled_back);
            return Err(error);
        }
        debug!("Rolled back {} commits to reach {:?}", rolled_back.len(), base_id);

        if !can_apply(&commit, ctx.versions) {
            warn!("Commit {:?} conflicts on {:?}, restoring", id, base_id);
            let replayed = Self::replay(ctx, &rolled_back);
            self.entries.extend(rolled_back);
            replayed?;
            return Err(HistoryError::Conflict { id });
        }

        if let Err(error) = crate::apply_commit(ctx, &commit) {
            self.entries.extend(rolled_back);
            return Err(error);
        }
        self.entries.push(HistoryEntry::new(base_id, id, commit));

        let rolled_back_count = rolled_back.len();
        let mut rebased = Vec::new();
        let mut dropped = Vec::new();
        let mut previous_id = id;
        let mut remaining = rolled_back.into_iter();

        while let Some(mut entry) = remaining.next() {
            if !can_apply(&entry.commit, ctx.versions) {
                dropped.push(entry.id);
                dropped.extend(remaining.by_ref().map(|entry| entry.id));
                break;
            }
            crate::apply_commit(ctx, &entry.commit)?;
            entry.base_id = previous_id;
            previous_id = entry.id;
            rebased.push(entry.id);
            self.entries.push(entry);
        }

        debug!(
            "Spliced commit {:?} after {:?}: {} rebased, {} dropped",
            id,
            base_id,
            rebased.len(),
            dropped.len()
        );
        self.trim();

        Ok(Reconciliation::Rebased {
            rolled_back: rolled_back_count,
            rebased,
            dropped,
        })
    }

    /// Drops the oldest entries so at most `len` remain
    pub fn trim_to(&mut self, len: usize) {
        if self.entries.len() <= len {
            return;
        }
        let excess = self.entries.len() - len;
        self.entries.drain(..excess);
        self.trimmed = true;
        info!("Trimmed {} commits from history", excess);
    }

    fn next_base_id(&self) -> CommitId {
        self.tip_id().unwrap_or(CommitId::ROOT)
    }

    fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        if let Some(max_commits) = self.config.max_commits {
            self.trim_to(max_commits);
        }
    }

    /// Index of the first entry newer than `base_id`
    fn split_point(&self, base_id: &CommitId) -> Option<usize> {
        if let Some(index) = self.entries.iter().rposition(|entry| entry.id == *base_id) {
            return Some(index + 1);
        }
        if base_id.is_root() && !self.trimmed {
            return Some(0);
        }
        None
    }

    fn roll_back<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        ctx: &mut WorldContext<'_, E, W>,
        entries: &[HistoryEntry],
    ) -> Result<(), HistoryError> {
        for entry in entries.iter().rev() {
            if entry.commit.wire_mode() == WireMode::Compact {
                warn!(
                    "Rolling back {:?}, received without old values, restores defaults",
                    entry.id
                );
            }
            crate::apply_commit(ctx, &entry.commit.invert())?;
        }
        Ok(())
    }

    fn replay<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        ctx: &mut WorldContext<'_, E, W>,
        entries: &[HistoryEntry],
    ) -> Result<(), HistoryError> {
        for entry in entries {
            crate::apply_commit(ctx, &entry.commit)?;
        }
        Ok(())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
