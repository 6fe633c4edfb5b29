//! Builder for constructing machine definitions.

use crate::builder::error::BuildError;
use crate::builder::validate::validate_definition;
use crate::core::{Context, ContextInit, Machine, StateNode, Transition};
use indexmap::IndexMap;
use std::rc::Rc;
use stillwater::validation::Validation;

/// Builder for machine definitions.
///
/// States keep their declaration order. Unless [`initial`](Self::initial) is
/// called, the first declared state is the initial one.
pub struct MachineBuilder<C: Context> {
    initial: Option<String>,
    states: IndexMap<String, StateNode<C>>,
    duplicates: Vec<String>,
    init: Option<ContextInit<C>>,
}

impl<C: Context> MachineBuilder<C> {
    pub fn new() -> Self {
        Self {
            initial: None,
            states: IndexMap::new(),
            duplicates: Vec::new(),
            init: None,
        }
    }

    /// Override the initial state.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Declare a state with its transitions, in evaluation order.
    ///
    /// A state declared with no transitions is terminal.
    pub fn state<I>(self, name: impl Into<String>, transitions: I) -> Self
    where
        I: IntoIterator<Item = Transition<C>>,
    {
        self.insert(
            name.into(),
            StateNode {
                transitions: transitions.into_iter().collect(),
                invoke: None,
            },
        )
    }

    /// Declare a state that runs `child` while active.
    ///
    /// When the child reaches a terminal state, its context becomes this
    /// machine's context and the state's `"done"` transitions are evaluated.
    pub fn invoke<I>(self, name: impl Into<String>, child: Rc<Machine<C>>, transitions: I) -> Self
    where
        I: IntoIterator<Item = Transition<C>>,
    {
        self.insert(
            name.into(),
            StateNode {
                transitions: transitions.into_iter().collect(),
                invoke: Some(child),
            },
        )
    }

    /// Set the function that seeds a service's context from caller data.
    ///
    /// Defaults to copying the supplied data, or `C::default()` when none is
    /// given.
    pub fn context<F>(mut self, init: F) -> Self
    where
        F: Fn(Option<&C>) -> C + 'static,
    {
        let init: ContextInit<C> = Box::new(init);
        self.init = Some(init);
        self
    }

    fn insert(mut self, name: String, node: StateNode<C>) -> Self {
        if self.states.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.states.insert(name, node);
        }
        self
    }

    /// Build the machine.
    ///
    /// Returns every structural problem at once if the definition is invalid.
    pub fn build(self) -> Result<Machine<C>, BuildError> {
        let initial = match self.initial {
            Some(initial) => initial,
            None => self
                .states
                .keys()
                .next()
                .cloned()
                .ok_or(BuildError::NoStates)?,
        };

        if let Validation::Failure(errors) =
            validate_definition(&initial, &self.states, &self.duplicates)
        {
            return Err(BuildError::InvalidDefinition {
                errors: errors.iter().cloned().collect(),
            });
        }

        let init: ContextInit<C> = match self.init {
            Some(init) => init,
            None => Box::new(|data: Option<&C>| data.cloned().unwrap_or_default()),
        };

        Ok(Machine {
            initial,
            states: self.states,
            init,
        })
    }
}

impl<C: Context> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
