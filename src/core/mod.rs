//! Core machine definition types.
//!
//! This module holds the declarative half of the crate:
//! - Context data via the `Context` trait
//! - Events, guards and reducers
//! - Transition descriptors and state nodes
//! - Immutable machine definitions
//!
//! Nothing here runs a machine; see [`crate::interpreter`] for that.

mod context;
mod event;
mod guard;
mod machine;
mod reducer;
mod transition;

pub use context::Context;
pub use event::Event;
pub use guard::Guard;
pub use machine::{ContextInit, Machine, StateNode};
pub use reducer::{Reducer, ReducerFailure};
pub use transition::{Transition, Trigger};
