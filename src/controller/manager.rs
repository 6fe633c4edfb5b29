//! The controller adapter binding one service to one host.

use crate::controller::host::{ReactiveController, ReactiveControllerHost};
use crate::core::{Context, Event, Machine};
use crate::interpreter::{SendError, Service, Snapshot};
use crate::reactive::{Behavior, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Drives a host from a finite-state machine.
///
/// The manager owns a running [`Service`] and a [`Behavior`] holding its
/// latest snapshot. While the host is connected, every published snapshot
/// requests a host update; the host paints from [`context`](Self::context).
/// Disconnecting the host tears the manager down for good.
///
/// # Example
///
/// ```rust
/// use fsm_controller::controller::{Controllers, Manager, ReactiveController, ReactiveControllerHost};
/// use fsm_controller::core::{Machine, Transition};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Host {
///     controllers: Controllers,
///     renders: Cell<usize>,
/// }
///
/// impl ReactiveControllerHost for Host {
///     fn add_controller(&self, controller: Rc<dyn ReactiveController>) {
///         self.controllers.add(controller);
///     }
///
///     fn request_update(&self) {
///         self.renders.set(self.renders.get() + 1);
///     }
/// }
///
/// let machine = Rc::new(
///     Machine::<u32>::builder()
///         .state("idle", [Transition::on("press", "idle").reduce(|n: &u32| n + 1)])
///         .build()
///         .unwrap(),
/// );
///
/// let host = Rc::new(Host::default());
/// let manager = Manager::new(&host, machine, Some(0)).unwrap();
/// host.controllers.host_connected();
///
/// manager.next("press").unwrap();
///
/// assert_eq!(*manager.context(), 1);
/// assert_eq!(host.renders.get(), 1);
/// ```
pub struct Manager<C: Context> {
    host: Weak<dyn ReactiveControllerHost>,
    service: RefCell<Option<Service<C>>>,
    snapshots: Rc<Behavior<Snapshot<C>>>,
    subscription: RefCell<Option<Subscription>>,
}

impl<C: Context> Manager<C> {
    /// Start `machine` and register the manager with `host`.
    ///
    /// `machine` must already be closed over its configuration. `initial` is
    /// handed to the machine's context function.
    pub fn new<H>(
        host: &Rc<H>,
        machine: Rc<Machine<C>>,
        initial: Option<C>,
    ) -> Result<Rc<Self>, SendError>
    where
        H: ReactiveControllerHost + 'static,
    {
        let mut service = Service::start(machine, initial)?;
        let snapshots = Behavior::new(service.snapshot());

        let sink = Rc::clone(&snapshots);
        service.set_on_change(move |snapshot| sink.next(snapshot.clone()));

        let host_handle: Rc<dyn ReactiveControllerHost> = host.clone();
        let service_id = service.id();
        let manager = Rc::new(Self {
            host: Rc::downgrade(&host_handle),
            service: RefCell::new(Some(service)),
            snapshots,
            subscription: RefCell::new(None),
        });

        host.add_controller(manager.clone());
        tracing::debug!(service = %service_id, "manager registered with host");
        Ok(manager)
    }

    /// Context of the latest published snapshot.
    pub fn context(&self) -> Rc<C> {
        self.snapshots.with(Snapshot::shared_context)
    }

    /// Label of the current state.
    pub fn current(&self) -> String {
        self.snapshots.with(|snapshot| snapshot.state().to_string())
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot<C> {
        self.snapshots.value()
    }

    /// Whether the manager was torn down or its service reached a terminal
    /// state.
    pub fn is_done(&self) -> bool {
        self.snapshots.is_done() || self.snapshots.with(Snapshot::is_done)
    }

    /// Whether a host-update subscription is active.
    pub fn is_attached(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Follow published snapshots alongside the host.
    pub fn subscribe(&self, observer: impl Fn(&Snapshot<C>) + 'static) -> Subscription {
        self.snapshots.subscribe(observer)
    }

    /// Forward `event` to the live service.
    ///
    /// If a child service is active the event goes to the innermost child.
    /// Events sent after teardown, to a finished service, or from inside a
    /// publish of this manager are ignored. Reducer failures propagate and
    /// leave the service and the published snapshot unchanged.
    pub fn next(&self, event: impl Into<Event>) -> Result<(), SendError> {
        let event = event.into();
        if self.is_done() {
            tracing::trace!(event = %event, "event sent to finished manager ignored");
            return Ok(());
        }

        let Ok(mut slot) = self.service.try_borrow_mut() else {
            tracing::warn!(event = %event, "re-entrant event dropped while publishing");
            return Ok(());
        };
        let Some(service) = slot.as_mut() else {
            return Ok(());
        };

        let result = if service.child().is_some() {
            service.send_to_child(event)
        } else {
            service.send(event)
        };

        // A subscriber may have detached the host mid-publish.
        if self.snapshots.is_done() {
            if let Some(mut service) = slot.take() {
                service.stop();
            }
        }

        result.map(|_| ())
    }

    fn teardown(&self) {
        self.snapshots.finish();
        self.subscription.borrow_mut().take();

        match self.service.try_borrow_mut() {
            Ok(mut slot) => {
                if let Some(mut service) = slot.take() {
                    service.stop();
                }
            }
            // `next` stops the service once its publish unwinds.
            Err(_) => tracing::trace!("teardown deferred until current event completes"),
        }
        tracing::debug!("manager torn down");
    }
}

impl<C: Context> ReactiveController for Manager<C> {
    fn host_connected(&self) {
        if self.is_done() {
            return;
        }
        let mut subscription = self.subscription.borrow_mut();
        if subscription.is_some() {
            tracing::trace!("host connected again, subscription already active");
            return;
        }

        let host = self.host.clone();
        *subscription = Some(self.snapshots.subscribe(move |_| {
            if let Some(host) = host.upgrade() {
                host.request_update();
            }
        }));
        tracing::debug!("manager attached");
    }

    fn host_disconnected(&self) {
        if self.snapshots.is_done() {
            return;
        }
        self.teardown();
    }

    fn host_update(&self) {}

    fn host_updated(&self) {}
}

impl<C: Context> fmt::Debug for Manager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("snapshot", &self.snapshots.value())
            .field("attached", &self.is_attached())
            .field("torn_down", &self.snapshots.is_done())
            .finish()
    }
}
