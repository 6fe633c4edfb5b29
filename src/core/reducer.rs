//! Reducers computing the next context from the current one.

use super::context::Context;
use super::event::Event;
use std::error::Error as StdError;
use std::fmt;

/// Error raised by a fallible reducer.
pub type ReducerFailure = Box<dyn StdError + Send + Sync>;

/// Pure function producing the next context.
///
/// A reducer never mutates the context it receives; it returns a new value.
/// Fallible reducers report failure through [`ReducerFailure`], which aborts
/// the transition and leaves the service where it was.
///
/// # Example
///
/// ```rust
/// use fsm_controller::core::{Event, Reducer};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Counter {
///     count: i64,
/// }
///
/// let increment = Reducer::new(|ctx: &Counter| Counter { count: ctx.count + 1 });
///
/// let before = Counter { count: 1 };
/// let after = increment.apply(&before, &Event::new("incr")).unwrap();
///
/// assert_eq!(after.count, 2);
/// assert_eq!(before.count, 1);
/// ```
pub struct Reducer<C: Context> {
    reduce: Box<dyn Fn(&C, &Event) -> Result<C, ReducerFailure>>,
}

impl<C: Context> Reducer<C> {
    /// Create an infallible reducer over the context alone.
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(&C) -> C + 'static,
    {
        Reducer {
            reduce: Box::new(move |ctx, _| Ok(reduce(ctx))),
        }
    }

    /// Create an infallible reducer that also reads the triggering event.
    pub fn with_event<F>(reduce: F) -> Self
    where
        F: Fn(&C, &Event) -> C + 'static,
    {
        Reducer {
            reduce: Box::new(move |ctx, event| Ok(reduce(ctx, event))),
        }
    }

    /// Create a reducer that may fail.
    ///
    /// ```rust
    /// use fsm_controller::core::{Event, Reducer};
    ///
    /// let parse = Reducer::try_new(|_: &i64, event: &Event| {
    ///     let raw = event.payload().and_then(|p| p.as_str()).unwrap_or_default();
    ///     Ok(raw.parse::<i64>()?)
    /// });
    ///
    /// assert_eq!(parse.apply(&0, &Event::with_payload("set", "7".into())).unwrap(), 7);
    /// assert!(parse.apply(&0, &Event::with_payload("set", "x".into())).is_err());
    /// ```
    pub fn try_new<F>(reduce: F) -> Self
    where
        F: Fn(&C, &Event) -> Result<C, ReducerFailure> + 'static,
    {
        Reducer {
            reduce: Box::new(reduce),
        }
    }

    /// Compute the next context.
    pub fn apply(&self, context: &C, event: &Event) -> Result<C, ReducerFailure> {
        (self.reduce)(context, event)
    }
}

impl<C: Context> fmt::Debug for Reducer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reducer(..)")
    }
}
