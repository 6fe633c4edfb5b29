//! Running machine definitions.
//!
//! The interpreter turns an immutable [`Machine`](crate::core::Machine) into a
//! live [`Service`]. Sending an event evaluates guards in declaration order,
//! applies the first matching transition's reducer, follows any automatic
//! transitions, and publishes one [`Snapshot`] per step.
//!
//! # Policies
//!
//! - An event with no matching transition is ignored: no state change, no
//!   publish, no error.
//! - An event sent to a finished or stopped service is ignored.
//! - A failing reducer aborts its transition and the error propagates to the
//!   caller; the service stays where it was before that transition.

mod error;
mod service;
mod snapshot;

pub use error::SendError;
pub use service::{OnChange, Service, CASCADE_LIMIT};
pub use snapshot::Snapshot;

use crate::core::{Context, Machine};
use std::rc::Rc;

/// Start a service and route every published snapshot to `on_change`.
///
/// # Example
///
/// ```rust
/// use fsm_controller::core::{Machine, Transition};
/// use fsm_controller::interpreter::interpret;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let machine = Rc::new(
///     Machine::<()>::builder()
///         .state("off", [Transition::on("toggle", "on")])
///         .state("on", [Transition::on("toggle", "off")])
///         .build()
///         .unwrap(),
/// );
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let mut service = interpret(
///     machine,
///     move |snapshot| sink.borrow_mut().push(snapshot.state().to_string()),
///     None,
/// )
/// .unwrap();
///
/// service.send("toggle").unwrap();
/// service.send("missing").unwrap();
/// service.send("toggle").unwrap();
///
/// assert_eq!(*seen.borrow(), ["on", "off"]);
/// ```
pub fn interpret<C, F>(
    machine: Rc<Machine<C>>,
    on_change: F,
    initial: Option<C>,
) -> Result<Service<C>, SendError>
where
    C: Context,
    F: FnMut(&Snapshot<C>) + 'static,
{
    let mut service = Service::start(machine, initial)?;
    service.set_on_change(on_change);
    Ok(service)
}
