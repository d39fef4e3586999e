use thiserror::Error;

use ecs_history_serde::SerdeErr;

use crate::{CommitId, ComponentError, EntityError};

/// Errors returned by commit creation, reconciliation and the wire codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The commit's preconditions do not hold. Nothing was changed.
    #[error("Commit {id:?} conflicts with the current entity versions")]
    Conflict { id: CommitId },

    /// The commit is based on a commit this history does not contain.
    /// Nothing was changed, a full resync is needed.
    #[error("Base commit {base_id:?} is not part of this history")]
    UnknownBase { base_id: CommitId },

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error("Malformed wire data: {0}")]
    MalformedWire(#[from] SerdeErr),
}

impl HistoryError {
    /// Whether the error left the replica untouched, so the caller can carry
    /// on (retry with a fresher base, request a resync)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HistoryError::Conflict { .. } | HistoryError::UnknownBase { .. }
        )
    }
}
