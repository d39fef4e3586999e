use crate::{Commit, CommitId};

/// A commit as sent between replicas: the id it was recorded under and the
/// commit it was based on
#[derive(Clone, Debug)]
pub struct CommitMessage {
    pub base_id: CommitId,
    pub id: CommitId,
    pub commit: Commit,
}

impl CommitMessage {
    pub fn new(base_id: CommitId, id: CommitId, commit: Commit) -> Self {
        Self {
            base_id,
            id,
            commit,
        }
    }
}
