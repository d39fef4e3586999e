use thiserror::Error;

use crate::StableEntity;

/// Errors raised by the entity registry and the version table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// No live entity is bound to this stable id
    #[error("Unknown stable entity {entity:?}")]
    UnknownEntity { entity: StableEntity },

    /// A live entity handle has no stable id bound to it
    #[error("Live entity is not bound to a stable id")]
    UnknownWorldEntity,

    /// A commit touches an entity the version table has never seen
    #[error("Entity {entity:?} has no entry in the version table")]
    UnregisteredEntity { entity: StableEntity },

    /// A stable id was bound to a second live entity
    #[error("Stable entity {entity:?} is already bound to a live entity")]
    EntityAlreadyBound { entity: StableEntity },
}
