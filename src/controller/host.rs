//! Host and controller contracts.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An object that hooks into a host's lifecycle.
///
/// The host calls these at fixed points: when it is attached and detached,
/// and before and after each render.
pub trait ReactiveController {
    fn host_connected(&self);

    fn host_disconnected(&self);

    fn host_update(&self);

    fn host_updated(&self);
}

/// A component that owns a render cycle and a list of controllers.
pub trait ReactiveControllerHost {
    /// Register a controller so its lifecycle hooks are called.
    fn add_controller(&self, controller: Rc<dyn ReactiveController>);

    /// Invalidate the host and schedule a re-render.
    fn request_update(&self);
}

/// Ordered controller list for host implementations.
///
/// Hooks are dispatched over a copy of the list, so a controller may register
/// further controllers from inside a hook.
#[derive(Default)]
pub struct Controllers {
    list: RefCell<Vec<Rc<dyn ReactiveController>>>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, controller: Rc<dyn ReactiveController>) {
        self.list.borrow_mut().push(controller);
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    pub fn host_connected(&self) {
        self.each(|c| c.host_connected());
    }

    pub fn host_disconnected(&self) {
        self.each(|c| c.host_disconnected());
    }

    pub fn host_update(&self) {
        self.each(|c| c.host_update());
    }

    pub fn host_updated(&self) {
        self.each(|c| c.host_updated());
    }

    fn each(&self, hook: impl Fn(&dyn ReactiveController)) {
        let list = self.list.borrow().clone();
        for controller in &list {
            hook(controller.as_ref());
        }
    }
}

impl fmt::Debug for Controllers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controllers")
            .field("len", &self.len())
            .finish()
    }
}
