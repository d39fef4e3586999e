pub mod component;
pub mod entity;
pub mod gather;
pub mod world_type;
