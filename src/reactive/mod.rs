//! Reactive value cells.
//!
//! [`Behavior`] is the single-slot observable that carries the latest service
//! snapshot from an interpreter to whoever renders it. It is single-threaded
//! (`Rc<RefCell<..>>`), synchronous, and has no global event bus.

mod behavior;

pub use behavior::{Behavior, Subscription};
