//! The `Context` trait for data carried by a machine between transitions.
//!
//! A context is never mutated in place. Reducers receive a shared reference
//! and return a fresh value, and every published snapshot holds its context
//! behind an `Rc` so readers can never observe a half-updated value.

use std::fmt::Debug;

/// Trait for machine context data.
///
/// # Required Traits
///
/// - `Clone`: child machines are seeded with a copy of the parent's context
/// - `Debug`: contexts appear in diagnostics and logs
/// - `Default`: used when a service starts without caller-supplied data
///
/// The trait is implemented automatically for every type that satisfies
/// these bounds.
///
/// # Example
///
/// ```rust
/// use fsm_controller::core::Context;
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Form {
///     submitted: bool,
///     attempts: u32,
/// }
///
/// fn seed<C: Context>() -> C {
///     C::default()
/// }
///
/// assert_eq!(seed::<Form>(), Form::default());
/// ```
pub trait Context: Clone + Debug + Default + 'static {}

impl<T> Context for T where T: Clone + Debug + Default + 'static {}
