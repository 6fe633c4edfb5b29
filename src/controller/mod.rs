//! Host integration.
//!
//! A host (any component with a render cycle) registers controllers and calls
//! their lifecycle hooks. [`Manager`] is the controller that keeps a host in
//! sync with a running machine:
//!
//! ```text
//! host event -> Manager::next -> Service::send -> guard -> reducer
//!            -> Snapshot published into Behavior -> host.request_update()
//!            -> host reads Manager::context
//! ```
//!
//! The manager's own lifecycle is `unattached -> attached -> torn down`.
//! Connecting subscribes once; disconnecting finishes the snapshot cell and
//! stops the service, after which the manager ignores everything.

mod host;
mod manager;

pub use host::{Controllers, ReactiveController, ReactiveControllerHost};
pub use manager::Manager;
