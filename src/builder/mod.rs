//! Builder API for machine definitions.
//!
//! A definition is an explicit table: state name to an ordered list of
//! transitions, plus an optional child machine and a context seeding
//! function. Definitions are validated when built.
//!
//! # Example
//!
//! ```rust
//! use fsm_controller::builder::MachineBuilder;
//! use fsm_controller::core::Transition;
//!
//! #[derive(Clone, Debug, Default)]
//! struct Door {
//!     opened: u32,
//! }
//!
//! let machine = MachineBuilder::new()
//!     .state("closed", [Transition::on("open", "open")
//!         .reduce(|d: &Door| Door { opened: d.opened + 1 })])
//!     .state("open", [Transition::on("close", "closed")])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(machine.initial(), "closed");
//! ```

pub mod error;
pub mod machine;
mod validate;

pub use error::{BuildError, DefinitionError};
pub use machine::MachineBuilder;
