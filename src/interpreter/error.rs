//! Errors raised while applying events.

use crate::core::ReducerFailure;
use thiserror::Error;

/// Errors that can occur while a service applies an event.
///
/// Unmatched events and events sent to a finished service are not errors;
/// they are ignored.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Reducer for '{event}' in state '{state}' failed: {source}")]
    ReducerFailed {
        state: String,
        event: String,
        #[source]
        source: ReducerFailure,
    },

    #[error("Automatic transitions from '{state}' did not settle within {limit} steps")]
    CascadeLimit { state: String, limit: usize },
}
