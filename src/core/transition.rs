//! Transition descriptors.

use super::context::Context;
use super::event::Event;
use super::guard::Guard;
use super::reducer::{Reducer, ReducerFailure};

/// What causes a transition to be considered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Fires when an event with this name is sent.
    Event(String),
    /// Fires on entry to the source state, before any further event.
    Immediate,
}

/// A transition from the owning state to `target`.
///
/// A transition without a guard always matches its trigger; a transition
/// without a reducer leaves the context unchanged.
///
/// # Example
///
/// ```rust
/// use fsm_controller::core::{Event, Transition};
///
/// #[derive(Clone, Debug, Default)]
/// struct Switch {
///     on: bool,
/// }
///
/// let flip = Transition::on("toggle", "on")
///     .when(|s: &Switch| !s.on)
///     .reduce(|_| Switch { on: true });
///
/// assert!(flip.matches(&Switch::default(), &Event::new("toggle")));
/// assert!(!flip.matches(&Switch { on: true }, &Event::new("toggle")));
/// assert!(!flip.matches(&Switch::default(), &Event::new("other")));
/// ```
#[derive(Debug)]
pub struct Transition<C: Context> {
    pub(crate) trigger: Trigger,
    pub(crate) target: String,
    pub(crate) guard: Option<Guard<C>>,
    pub(crate) reducer: Option<Reducer<C>>,
}

impl<C: Context> Transition<C> {
    /// Transition taken when `event` is sent.
    pub fn on(event: impl Into<String>, target: impl Into<String>) -> Self {
        Self::with_trigger(Trigger::Event(event.into()), target)
    }

    /// Transition taken automatically on entry to the source state.
    pub fn immediate(target: impl Into<String>) -> Self {
        Self::with_trigger(Trigger::Immediate, target)
    }

    fn with_trigger(trigger: Trigger, target: impl Into<String>) -> Self {
        Self {
            trigger,
            target: target.into(),
            guard: None,
            reducer: None,
        }
    }

    /// Add a guard predicate over the context.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Add a pre-built guard.
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add an infallible reducer over the context.
    pub fn reduce<F>(self, reduce: F) -> Self
    where
        F: Fn(&C) -> C + 'static,
    {
        self.reducer(Reducer::new(reduce))
    }

    /// Add a reducer that may fail.
    pub fn try_reduce<F>(self, reduce: F) -> Self
    where
        F: Fn(&C, &Event) -> Result<C, ReducerFailure> + 'static,
    {
        self.reducer(Reducer::try_new(reduce))
    }

    /// Add a pre-built reducer.
    pub fn reducer(mut self, reducer: Reducer<C>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_immediate(&self) -> bool {
        self.trigger == Trigger::Immediate
    }

    /// Check whether this transition fires for `event` from `context`.
    ///
    /// Immediate transitions match any event; the event only feeds the guard.
    pub fn matches(&self, context: &C, event: &Event) -> bool {
        let triggered = match &self.trigger {
            Trigger::Event(name) => name == event.name(),
            Trigger::Immediate => true,
        };

        triggered && self.guard.as_ref().is_none_or(|g| g.check(context, event))
    }

    /// Compute the context after taking this transition.
    pub fn next_context(&self, context: &C, event: &Event) -> Result<Option<C>, ReducerFailure> {
        self.reducer
            .as_ref()
            .map(|r| r.apply(context, event))
            .transpose()
    }
}
