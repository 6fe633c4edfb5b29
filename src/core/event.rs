//! Events that drive transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An event sent into a running service.
///
/// Events are matched against transitions by name. An optional JSON payload
/// travels with the event and is visible to guards and reducers.
///
/// Events deserialize from either a bare string or an object:
///
/// ```rust
/// use fsm_controller::core::Event;
///
/// let bare: Event = serde_json::from_str(r#""incr""#).unwrap();
/// let full: Event = serde_json::from_str(r#"{"type": "incr", "payload": 2}"#).unwrap();
///
/// assert_eq!(bare.name(), "incr");
/// assert_eq!(full.name(), "incr");
/// assert_eq!(full.payload(), Some(&serde_json::json!(2)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRepr")]
pub struct Event {
    #[serde(rename = "type")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
}

impl Event {
    /// Name of the event a parent receives when its invoked child finishes.
    pub const DONE: &'static str = "done";

    /// Name carried by the synthetic event that seeds a service's entry cascade.
    ///
    /// Namespaced so it never equals an event or state name a machine picks,
    /// such as `"init"`.
    pub const INIT: &'static str = "fsm.init";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    pub fn with_payload(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload),
        }
    }

    pub(crate) fn done() -> Self {
        Self::new(Self::DONE)
    }

    pub(crate) fn init() -> Self {
        Self::new(Self::INIT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&Event> for Event {
    fn from(event: &Event) -> Self {
        event.clone()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventRepr {
    Name(String),
    Full {
        #[serde(rename = "type")]
        name: String,
        #[serde(default)]
        payload: Option<serde_json::Value>,
    },
}

impl From<EventRepr> for Event {
    fn from(repr: EventRepr) -> Self {
        match repr {
            EventRepr::Name(name) => Event::new(name),
            EventRepr::Full { name, payload } => Event { name, payload },
        }
    }
}
