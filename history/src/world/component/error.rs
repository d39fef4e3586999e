use thiserror::Error;

use crate::ComponentKind;

/// Errors that can occur during component registration and lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// No codec is registered for this component kind
    #[error("Component kind {kind:?} not registered. Must call `add_component()` on ComponentKinds before reading or writing it")]
    UnknownComponentType { kind: ComponentKind },

    /// A component type was registered twice
    #[error("Component '{name}' is already registered")]
    ComponentAlreadyRegistered { name: &'static str },

    /// A type-erased component did not have the concrete type its kind promised
    #[error("Component value is not of the expected type '{expected}'")]
    ComponentTypeMismatch { expected: &'static str },
}
