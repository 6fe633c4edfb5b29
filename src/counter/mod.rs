//! A bounded counter driven by a machine.
//!
//! The counter is inactive until activated; while active it counts between
//! configured bounds; stopping it deactivates and resets it.

mod config;
mod machine;

pub use config::{Bounds, CounterConfig, LiveBounds};
pub use machine::{
    activate, decrement, deactivate, events, increment, initialize_machine, reset, states,
    CounterContext,
};
