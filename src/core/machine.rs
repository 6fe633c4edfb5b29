//! Machine definitions: states, their transitions, and context seeding.

use super::context::Context;
use super::event::Event;
use super::transition::Transition;
use crate::builder::MachineBuilder;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Function that seeds a service's context from caller-supplied data.
pub type ContextInit<C> = Box<dyn Fn(Option<&C>) -> C>;

/// One state of a machine.
pub struct StateNode<C: Context> {
    pub(crate) transitions: Vec<Transition<C>>,
    pub(crate) invoke: Option<Rc<Machine<C>>>,
}

impl<C: Context> StateNode<C> {
    /// All transitions in declaration order, event-triggered and immediate.
    pub fn transitions(&self) -> &[Transition<C>] {
        &self.transitions
    }

    /// Child machine started on entry to this state, if any.
    pub fn invoke(&self) -> Option<&Rc<Machine<C>>> {
        self.invoke.as_ref()
    }

    /// A terminal state has no legal outgoing move.
    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty() && self.invoke.is_none()
    }

    /// First event-triggered transition that fires for `event`.
    pub fn select(&self, context: &C, event: &Event) -> Option<&Transition<C>> {
        self.transitions
            .iter()
            .filter(|t| !t.is_immediate())
            .find(|t| t.matches(context, event))
    }

    /// First immediate transition whose guard holds.
    ///
    /// `event` is the event that led into this state; it only feeds guards
    /// and reducers.
    pub fn select_immediate(&self, context: &C, event: &Event) -> Option<&Transition<C>> {
        self.transitions
            .iter()
            .filter(|t| t.is_immediate())
            .find(|t| t.matches(context, event))
    }

    pub fn has_immediate(&self) -> bool {
        self.transitions.iter().any(Transition::is_immediate)
    }
}

impl<C: Context> fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("transitions", &self.transitions)
            .field("invoke", &self.invoke.is_some())
            .finish()
    }
}

/// An immutable machine definition.
///
/// Built with [`Machine::builder`]; once built it is closed over its
/// configuration and can drive any number of services.
pub struct Machine<C: Context> {
    pub(crate) initial: String,
    pub(crate) states: IndexMap<String, StateNode<C>>,
    pub(crate) init: ContextInit<C>,
}

impl<C: Context> Machine<C> {
    pub fn builder() -> MachineBuilder<C> {
        MachineBuilder::new()
    }

    /// Name of the state a new service starts in.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    pub fn state(&self, name: &str) -> Option<&StateNode<C>> {
        self.states.get(name)
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.state(name).is_some_and(StateNode::is_terminal)
    }

    /// Seed a context for a new service.
    pub fn init_context(&self, data: Option<&C>) -> C {
        (self.init)(data)
    }
}

impl<C: Context> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("initial", &self.initial)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}
