mod change;
mod change_set;
mod component;
mod component_kinds;
mod error;

pub use change::{AnyChangeAdapter, AnyChangeVisitor, Change, ChangeKind, ChangeVisitor};
pub use change_set::{ChangeSet, ChangeSetDyn};
pub use component::{Component, ComponentKind, DynComponent};
pub use component_kinds::{ComponentHandler, ComponentKinds, DefaultComponentHandler};
pub use error::ComponentError;
