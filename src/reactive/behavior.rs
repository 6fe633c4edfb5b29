//! Observable single-slot value cell.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    value: T,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
    done: bool,
}

/// A replaceable value with synchronous change notification.
///
/// Publishing with [`next`](Self::next) stores the value, then notifies every
/// subscriber in registration order. The internal borrow is released before
/// any callback runs, so subscribers may read [`value`](Self::value).
///
/// After [`finish`](Self::finish) the cell is done: it keeps its last value,
/// drops all subscribers and ignores further publishes.
///
/// # Example
///
/// ```rust
/// use fsm_controller::reactive::Behavior;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let cell = Behavior::new(1);
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
/// let subscription = cell.subscribe(move |v| sink.set(*v));
///
/// cell.next(5);
/// assert_eq!(seen.get(), 5);
/// assert_eq!(cell.value(), 5);
///
/// subscription.unsubscribe();
/// cell.next(9);
/// assert_eq!(seen.get(), 5);
/// ```
pub struct Behavior<T> {
    slot: RefCell<Slot<T>>,
}

impl<T: Clone + 'static> Behavior<T> {
    pub fn new(value: T) -> Rc<Self> {
        Rc::new(Self {
            slot: RefCell::new(Slot {
                value,
                subscribers: Vec::new(),
                next_id: 0,
                done: false,
            }),
        })
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.slot.borrow().value)
    }

    /// Publish a new value and notify subscribers. Ignored once done.
    pub fn next(&self, value: T) {
        let subscribers: Vec<Callback<T>> = {
            let mut slot = self.slot.borrow_mut();
            if slot.done {
                tracing::trace!("publish on finished behavior ignored");
                return;
            }
            slot.value = value.clone();
            slot.subscribers
                .iter()
                .map(|(_, callback)| Rc::clone(callback))
                .collect()
        };

        for callback in subscribers {
            if self.is_done() {
                break;
            }
            callback(&value);
        }
    }

    /// Register a callback for future publishes.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped, or until the cell finishes. Subscribing to a
    /// finished cell registers nothing.
    pub fn subscribe(self: &Rc<Self>, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut slot = self.slot.borrow_mut();
            if slot.done {
                return Subscription::empty();
            }
            let id = slot.next_id;
            slot.next_id += 1;
            slot.subscribers.push((id, Rc::new(callback)));
            id
        };

        let behavior: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(behavior) = behavior.upgrade() {
                behavior.remove(id);
            }
        })
    }

    pub fn is_done(&self) -> bool {
        self.slot.borrow().done
    }

    /// Stop publishing and release every subscriber.
    pub fn finish(&self) {
        let released = {
            let mut slot = self.slot.borrow_mut();
            if slot.done {
                return;
            }
            slot.done = true;
            std::mem::take(&mut slot.subscribers)
        };
        tracing::trace!(subscribers = released.len(), "behavior finished");
        drop(released);
    }

    pub fn subscriber_count(&self) -> usize {
        self.slot.borrow().subscribers.len()
    }

    fn remove(&self, id: u64) {
        let removed = {
            let mut slot = self.slot.borrow_mut();
            slot.subscribers
                .iter()
                .position(|(sid, _)| *sid == id)
                .map(|index| slot.subscribers.remove(index))
        };
        drop(removed);
    }
}

impl<T: fmt::Debug> fmt::Debug for Behavior<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Behavior")
            .field("value", &slot.value)
            .field("subscribers", &slot.subscribers.len())
            .field("done", &slot.done)
            .finish()
    }
}

/// Disposer returned by [`Behavior::subscribe`].
///
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    fn empty() -> Self {
        Self { dispose: None }
    }

    pub fn unsubscribe(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>(
        behavior: &Rc<Behavior<T>>,
        tag: &'static str,
        log: &Rc<RefCell<Vec<(&'static str, T)>>>,
    ) -> Subscription {
        let log = Rc::clone(log);
        behavior.subscribe(move |v| log.borrow_mut().push((tag, v.clone())))
    }

    #[test]
    fn new_behavior_holds_initial_value() {
        let behavior = Behavior::new("init".to_string());
        assert_eq!(behavior.value(), "init");
        assert!(!behavior.is_done());
    }

    #[test]
    fn subscribers_are_notified_in_registration_order() {
        let behavior = Behavior::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let _a = recorder(&behavior, "a", &log);
        let _b = recorder(&behavior, "b", &log);

        behavior.next(1);
        behavior.next(2);

        assert_eq!(*log.borrow(), [("a", 1), ("b", 1), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn subscriber_can_read_value_during_notification() {
        let behavior = Behavior::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reader = Rc::clone(&behavior);
        let _sub = behavior.subscribe(move |_| sink.borrow_mut().push(reader.value()));

        behavior.next(7);

        assert_eq!(*seen.borrow(), [7]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let behavior = Behavior::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = recorder(&behavior, "a", &log);
        assert_eq!(behavior.subscriber_count(), 1);

        drop(sub);
        behavior.next(1);

        assert_eq!(behavior.subscriber_count(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn finish_releases_subscribers_and_keeps_last_value() {
        let behavior = Behavior::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let _sub = recorder(&behavior, "a", &log);
        behavior.next(3);

        behavior.finish();
        behavior.next(4);

        assert!(behavior.is_done());
        assert_eq!(behavior.value(), 3);
        assert_eq!(behavior.subscriber_count(), 0);
        assert_eq!(*log.borrow(), [("a", 3)]);
    }

    #[test]
    fn subscribing_to_finished_behavior_registers_nothing() {
        let behavior = Behavior::new(0);
        behavior.finish();
        let log = Rc::new(RefCell::new(Vec::new()));

        let _sub = recorder(&behavior, "late", &log);

        assert_eq!(behavior.subscriber_count(), 0);
    }

    #[test]
    fn finish_during_notification_stops_remaining_callbacks() {
        let behavior = Behavior::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let closer = Rc::clone(&behavior);
        let _first = behavior.subscribe(move |_| closer.finish());
        let _second = recorder(&behavior, "second", &log);

        behavior.next(1);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn subscription_outliving_behavior_is_harmless() {
        let behavior = Behavior::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = recorder(&behavior, "a", &log);

        drop(behavior);
        sub.unsubscribe();
    }
}
