//! Build errors for machine definitions.

use thiserror::Error;

/// A single problem found while validating a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Initial state '{name}' is not defined")]
    UnknownInitialState { name: String },

    #[error("State '{name}' is defined more than once")]
    DuplicateState { name: String },

    #[error("Transition '{trigger}' from '{state}' targets undefined state '{target}'")]
    UnknownTarget {
        state: String,
        trigger: String,
        target: String,
    },
}

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No states defined. Add at least one state before .build()")]
    NoStates,

    #[error(
        "Invalid machine definition: {}",
        .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    )]
    InvalidDefinition { errors: Vec<DefinitionError> },
}
