//! fsm-controller: drive a host component's visible state through an explicit
//! finite-state machine.
//!
//! Machines are declared as data: named states, each with an ordered list of
//! guarded transitions whose reducers produce the next context. A running
//! [`Service`] publishes immutable [`Snapshot`]s; a [`Manager`] relays them to
//! a host through the reactive-controller protocol so the host re-renders
//! from the latest context.
//!
//! # Core Concepts
//!
//! - **Machine**: immutable definition built with [`MachineBuilder`]
//! - **Service**: a running machine with its current state and context
//! - **Behavior**: single-slot observable carrying the latest snapshot
//! - **Manager**: controller adapter between a service and a host
//!
//! # Example
//!
//! ```rust
//! use fsm_controller::counter::{initialize_machine, Bounds};
//! use fsm_controller::{Controllers, Manager, ReactiveController, ReactiveControllerHost};
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Host {
//!     controllers: Controllers,
//! }
//!
//! impl ReactiveControllerHost for Host {
//!     fn add_controller(&self, controller: Rc<dyn ReactiveController>) {
//!         self.controllers.add(controller);
//!     }
//!
//!     fn request_update(&self) {}
//! }
//!
//! let host = Rc::new(Host::default());
//! let machine = Rc::new(initialize_machine(Bounds::new(0, 3)).unwrap());
//! let manager = Manager::new(&host, machine, None).unwrap();
//! host.controllers.host_connected();
//!
//! manager.next("activate").unwrap();
//! manager.next("incr").unwrap();
//!
//! assert_eq!(manager.current(), "loop");
//! assert_eq!(manager.context().count, 1);
//! ```

pub mod builder;
pub mod controller;
pub mod core;
pub mod counter;
pub mod interpreter;
pub mod reactive;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use controller::{Controllers, Manager, ReactiveController, ReactiveControllerHost};
pub use core::{Context, Event, Machine, Transition};
pub use interpreter::{interpret, SendError, Service, Snapshot};
pub use reactive::{Behavior, Subscription};
