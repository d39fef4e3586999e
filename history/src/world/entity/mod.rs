mod entity_versions;
mod error;
mod stable_entity;
mod stable_entity_map;

pub use entity_versions::{EntityVersion, EntityVersions};
pub use error::EntityError;
pub use stable_entity::StableEntity;
pub use stable_entity_map::StableEntityMap;
