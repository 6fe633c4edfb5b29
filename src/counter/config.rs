//! Read-only configuration for the counter machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounds the counter machine's guards consult.
///
/// Guards call these on every evaluation, so an implementation that reads
/// live values lets bound changes apply without rebuilding the machine.
pub trait CounterConfig {
    fn max(&self) -> i64;

    fn min(&self) -> i64;
}

/// Fixed bounds, loadable with serde.
///
/// ```rust
/// use fsm_controller::counter::{Bounds, CounterConfig};
///
/// let bounds: Bounds = serde_json::from_str(r#"{"max": 3, "min": 0}"#).unwrap();
/// assert_eq!(bounds.max(), 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub max: i64,
    pub min: i64,
}

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        Self { max, min }
    }
}

impl CounterConfig for Bounds {
    fn max(&self) -> i64 {
        self.max
    }

    fn min(&self) -> i64 {
        self.min
    }
}

/// Bounds read through accessor functions at guard-evaluation time.
///
/// Typically the accessors read properties owned by the host component.
pub struct LiveBounds {
    max: Box<dyn Fn() -> i64>,
    min: Box<dyn Fn() -> i64>,
}

impl LiveBounds {
    pub fn new(max: impl Fn() -> i64 + 'static, min: impl Fn() -> i64 + 'static) -> Self {
        Self {
            max: Box::new(max),
            min: Box::new(min),
        }
    }
}

impl CounterConfig for LiveBounds {
    fn max(&self) -> i64 {
        (self.max)()
    }

    fn min(&self) -> i64 {
        (self.min)()
    }
}

impl fmt::Debug for LiveBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveBounds")
            .field("max", &self.max())
            .field("min", &self.min())
            .finish()
    }
}
