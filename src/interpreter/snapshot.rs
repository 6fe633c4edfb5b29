//! Immutable views of a running service.

use crate::core::Context;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::rc::Rc;
use uuid::Uuid;

/// The state of a service at one point in time.
///
/// Snapshots are cheap to clone: the context is shared behind an `Rc` and is
/// never mutated after publication.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<C: Context> {
    pub(crate) service: Uuid,
    pub(crate) state: String,
    pub(crate) context: Rc<C>,
    pub(crate) child: Option<Rc<Snapshot<C>>>,
    pub(crate) done: bool,
}

impl<C: Context> Snapshot<C> {
    /// Identifier of the service this snapshot was taken from.
    pub fn service_id(&self) -> Uuid {
        self.service
    }

    /// Label of the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Shared handle to the context, for readers that outlive the snapshot.
    pub fn shared_context(&self) -> Rc<C> {
        Rc::clone(&self.context)
    }

    /// The active child service, if a sub-machine is in progress.
    pub fn child(&self) -> Option<&Snapshot<C>> {
        self.child.as_deref()
    }

    /// The deepest active service in this snapshot.
    pub fn innermost(&self) -> &Snapshot<C> {
        let mut snapshot = self;
        while let Some(child) = snapshot.child() {
            snapshot = child;
        }
        snapshot
    }

    /// Whether the service reached a terminal state.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<C> Serialize for Snapshot<C>
where
    C: Context + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Snapshot", 4)?;
        state.serialize_field("state", &self.state)?;
        state.serialize_field("context", &*self.context)?;
        state.serialize_field("child", &self.child.as_deref())?;
        state.serialize_field("done", &self.done)?;
        state.end()
    }
}
