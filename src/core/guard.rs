//! Guard predicates for controlling transitions.
//!
//! Guards are pure boolean functions over the current context (and the
//! triggering event) that decide whether a transition may fire. Configuration
//! reaches a guard through its closure, so bound changes take effect on the
//! next evaluation without rebuilding the machine.

use super::context::Context;
use super::event::Event;
use std::fmt;

/// Pure predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use fsm_controller::core::{Event, Guard};
///
/// #[derive(Clone, Debug, Default)]
/// struct Counter {
///     count: i64,
/// }
///
/// let max = 3;
/// let below_max = Guard::new(move |ctx: &Counter| ctx.count < max);
///
/// let incr = Event::new("incr");
/// assert!(below_max.check(&Counter { count: 2 }, &incr));
/// assert!(!below_max.check(&Counter { count: 3 }, &incr));
/// ```
pub struct Guard<C: Context> {
    predicate: Box<dyn Fn(&C, &Event) -> bool>,
}

impl<C: Context> Guard<C> {
    /// Create a guard from a predicate over the context alone.
    ///
    /// The predicate must be pure: deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(move |ctx, _| predicate(ctx)),
        }
    }

    /// Create a guard that also inspects the triggering event.
    ///
    /// ```rust
    /// use fsm_controller::core::{Event, Guard};
    ///
    /// let positive_step = Guard::with_event(|_: &(), event: &Event| {
    ///     event
    ///         .payload()
    ///         .and_then(|p| p.as_i64())
    ///         .is_some_and(|step| step > 0)
    /// });
    ///
    /// assert!(positive_step.check(&(), &Event::with_payload("incr", 2.into())));
    /// assert!(!positive_step.check(&(), &Event::new("incr")));
    /// ```
    pub fn with_event<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard against a context and event.
    pub fn check(&self, context: &C, event: &Event) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C: Context> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
