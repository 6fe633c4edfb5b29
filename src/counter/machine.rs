//! The counter machine: `init -> loop -> halt -> (immediate) -> init`.

use super::config::CounterConfig;
use crate::builder::BuildError;
use crate::core::{Machine, Transition};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// State names.
pub mod states {
    pub const INIT: &str = "init";
    pub const LOOP: &str = "loop";
    pub const HALT: &str = "halt";
}

/// Event names.
pub mod events {
    pub const ACTIVATE: &str = "activate";
    pub const INCR: &str = "incr";
    pub const DECR: &str = "decr";
    pub const STOP: &str = "stop";
}

/// Data managed by the counter machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterContext {
    pub count: i64,
    pub active: bool,
}

/// Build the counter machine over `config`.
///
/// - `init`: `activate`, unless already active, sets `active` and enters `loop`.
/// - `loop`: `incr` while `count < max`, `decr` while `count > min`, and
///   `stop` while active, which clears `active` and enters `halt`.
/// - `halt`: immediately returns to `init`, resetting `count` to zero.
///
/// ```rust
/// use fsm_controller::counter::{initialize_machine, Bounds, CounterContext};
/// use fsm_controller::interpreter::Service;
/// use std::rc::Rc;
///
/// let machine = Rc::new(initialize_machine(Bounds::new(0, 1)).unwrap());
/// let mut service = Service::start(machine, None).unwrap();
///
/// service.send("activate").unwrap();
/// service.send("incr").unwrap();
/// service.send("incr").unwrap();
///
/// assert_eq!(service.context(), &CounterContext { count: 1, active: true });
/// ```
pub fn initialize_machine<K>(config: K) -> Result<Machine<CounterContext>, BuildError>
where
    K: CounterConfig + 'static,
{
    let config = Rc::new(config);
    let upper = Rc::clone(&config);
    let lower = Rc::clone(&config);

    Machine::builder()
        .state(
            states::INIT,
            [Transition::on(events::ACTIVATE, states::LOOP)
                .when(|ctx: &CounterContext| !ctx.active)
                .reduce(activate)],
        )
        .state(
            states::LOOP,
            [
                Transition::on(events::INCR, states::LOOP)
                    .when(move |ctx: &CounterContext| ctx.count < upper.max())
                    .reduce(increment),
                Transition::on(events::DECR, states::LOOP)
                    .when(move |ctx: &CounterContext| ctx.count > lower.min())
                    .reduce(decrement),
                Transition::on(events::STOP, states::HALT)
                    .when(|ctx: &CounterContext| ctx.active)
                    .reduce(deactivate),
            ],
        )
        .state(
            states::HALT,
            [Transition::immediate(states::INIT).reduce(reset)],
        )
        .context(|data: Option<&CounterContext>| data.copied().unwrap_or_default())
        .build()
}

// Reducers are named functions so they can be tested on their own.

pub fn activate(ctx: &CounterContext) -> CounterContext {
    CounterContext {
        active: true,
        ..*ctx
    }
}

pub fn increment(ctx: &CounterContext) -> CounterContext {
    CounterContext {
        count: ctx.count + 1,
        ..*ctx
    }
}

pub fn decrement(ctx: &CounterContext) -> CounterContext {
    CounterContext {
        count: ctx.count - 1,
        ..*ctx
    }
}

pub fn deactivate(ctx: &CounterContext) -> CounterContext {
    CounterContext {
        active: false,
        ..*ctx
    }
}

pub fn reset(ctx: &CounterContext) -> CounterContext {
    CounterContext { count: 0, ..*ctx }
}
