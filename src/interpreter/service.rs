//! Running instances of machine definitions.

use crate::core::{Context, Event, Machine, Transition};
use crate::interpreter::error::SendError;
use crate::interpreter::snapshot::Snapshot;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Maximum number of chained automatic transitions before a send fails.
pub const CASCADE_LIMIT: usize = 256;

/// Callback invoked once per externally observable transition.
pub type OnChange<C> = Box<dyn FnMut(&Snapshot<C>)>;

/// A live instance of a machine: current state, current context, and an
/// optional child service for an invoked sub-machine.
///
/// All work happens synchronously inside [`send`](Self::send) and
/// [`send_to_child`](Self::send_to_child). Automatic transitions cascade to a
/// stable state before either returns, and `on_change` observes every step.
pub struct Service<C: Context> {
    id: Uuid,
    machine: Rc<Machine<C>>,
    current: String,
    context: Rc<C>,
    child: Option<Box<Service<C>>>,
    on_change: Option<OnChange<C>>,
    stopped: bool,
}

impl<C: Context> Service<C> {
    /// Start a service in the machine's initial state.
    ///
    /// The context is seeded from `initial` through the machine's context
    /// function, then the initial state's entry cascade runs. Nothing is
    /// published while starting.
    pub fn start(machine: Rc<Machine<C>>, initial: Option<C>) -> Result<Self, SendError> {
        Self::start_with(machine, initial.as_ref())
    }

    fn start_with(machine: Rc<Machine<C>>, initial: Option<&C>) -> Result<Self, SendError> {
        let context = Rc::new(machine.init_context(initial));
        let mut service = Self {
            id: Uuid::new_v4(),
            current: machine.initial().to_string(),
            context,
            child: None,
            on_change: None,
            stopped: false,
            machine,
        };
        tracing::debug!(service = %service.id, state = %service.current, "service started");

        let mut steps = Vec::new();
        service.enter(&Event::init(), &mut steps, 0)?;
        Ok(service)
    }

    /// Register the callback that receives each new snapshot.
    pub fn set_on_change<F>(&mut self, on_change: F)
    where
        F: FnMut(&Snapshot<C>) + 'static,
    {
        self.on_change = Some(Box::new(on_change));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn machine(&self) -> &Rc<Machine<C>> {
        &self.machine
    }

    /// Label of the current state.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// The active child service, if a sub-machine is in progress.
    pub fn child(&self) -> Option<&Service<C>> {
        self.child.as_deref()
    }

    /// Whether the service sits in a terminal state.
    pub fn is_done(&self) -> bool {
        self.child.is_none() && self.machine.is_terminal(&self.current)
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn snapshot(&self) -> Snapshot<C> {
        Snapshot {
            service: self.id,
            state: self.current.clone(),
            context: Rc::clone(&self.context),
            child: self.child.as_ref().map(|child| Rc::new(child.snapshot())),
            done: self.is_done(),
        }
    }

    /// Apply `event` at this service's own level.
    ///
    /// Returns `Ok(true)` if a transition fired. Unmatched events and events
    /// sent to a finished or stopped service are ignored and return
    /// `Ok(false)`.
    ///
    /// A send is all-or-nothing: if any step of the chain fails, including an
    /// automatic transition after the first one, the service is left exactly
    /// as it was and nothing is published.
    pub fn send(&mut self, event: impl Into<Event>) -> Result<bool, SendError> {
        let event = event.into();
        self.transact(&event, Self::apply)
    }

    /// Apply `event` to the innermost active child service.
    ///
    /// Falls back to [`send`](Self::send) when no child is active. Each child
    /// step is published as a snapshot of this service. Failures roll back
    /// the whole tree, as with [`send`](Self::send).
    pub fn send_to_child(&mut self, event: impl Into<Event>) -> Result<bool, SendError> {
        let event = event.into();
        self.transact(&event, Self::apply_to_child)
    }

    /// Terminate the service. Later sends are ignored and nothing more is
    /// published.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.on_change = None;
        if let Some(mut child) = self.child.take() {
            child.stop();
        }
        tracing::debug!(service = %self.id, state = %self.current, "service stopped");
    }

    /// Run `step` on a draft of this service and commit only on success.
    fn transact<F>(&mut self, event: &Event, step: F) -> Result<bool, SendError>
    where
        F: FnOnce(&mut Self, &Event, &mut Vec<Snapshot<C>>) -> Result<bool, SendError>,
    {
        let mut draft = self.fork();
        let mut steps = Vec::new();
        match step(&mut draft, event, &mut steps) {
            Ok(changed) => {
                self.commit(draft);
                self.publish(&steps);
                Ok(changed)
            }
            Err(err) => {
                tracing::debug!(
                    service = %self.id,
                    state = %self.current,
                    event = %event,
                    error = %err,
                    "send rolled back"
                );
                Err(err)
            }
        }
    }

    /// Copy of the mutable state of this service and its children, without
    /// the change callback.
    fn fork(&self) -> Self {
        Self {
            id: self.id,
            machine: Rc::clone(&self.machine),
            current: self.current.clone(),
            context: Rc::clone(&self.context),
            child: self.child.as_ref().map(|child| Box::new(child.fork())),
            on_change: None,
            stopped: self.stopped,
        }
    }

    fn commit(&mut self, draft: Self) {
        let Self {
            current,
            context,
            child,
            ..
        } = draft;
        self.current = current;
        self.context = context;
        self.child = child;
    }

    fn publish(&mut self, steps: &[Snapshot<C>]) {
        if let Some(on_change) = self.on_change.as_mut() {
            for step in steps {
                on_change(step);
            }
        }
    }

    fn apply(&mut self, event: &Event, steps: &mut Vec<Snapshot<C>>) -> Result<bool, SendError> {
        if self.stopped || self.is_done() {
            tracing::trace!(service = %self.id, event = %event, "event sent to finished service");
            return Ok(false);
        }

        let machine = Rc::clone(&self.machine);
        let Some(transition) = machine
            .state(&self.current)
            .and_then(|node| node.select(&self.context, event))
        else {
            tracing::trace!(
                service = %self.id,
                state = %self.current,
                event = %event,
                "no matching transition, event ignored"
            );
            return Ok(false);
        };

        self.take(transition, event, steps, 0)?;
        Ok(true)
    }

    fn apply_to_child(
        &mut self,
        event: &Event,
        steps: &mut Vec<Snapshot<C>>,
    ) -> Result<bool, SendError> {
        if self.stopped {
            return Ok(false);
        }
        let Some(child) = self.child.as_mut() else {
            return self.apply(event, steps);
        };

        let mut child_steps = Vec::new();
        let result = child.apply_to_child(event, &mut child_steps);
        let finished = child.is_done();

        for step in child_steps {
            steps.push(self.wrap(step));
        }
        let changed = result?;

        if finished {
            if let Some(child) = self.child.take() {
                self.complete_child(*child, steps, 0)?;
            }
        }
        Ok(changed)
    }

    /// Take `transition`, then run the entry behaviour of its target.
    ///
    /// The next context is computed before anything is committed, so a
    /// failing reducer leaves state and context untouched.
    fn take(
        &mut self,
        transition: &Transition<C>,
        event: &Event,
        steps: &mut Vec<Snapshot<C>>,
        depth: usize,
    ) -> Result<(), SendError> {
        if depth >= CASCADE_LIMIT {
            return Err(SendError::CascadeLimit {
                state: self.current.clone(),
                limit: CASCADE_LIMIT,
            });
        }

        let next = transition
            .next_context(&self.context, event)
            .map_err(|source| SendError::ReducerFailed {
                state: self.current.clone(),
                event: event.name().to_string(),
                source,
            })?;

        let from = std::mem::replace(&mut self.current, transition.target().to_string());
        if let Some(next) = next {
            self.context = Rc::new(next);
        }
        if let Some(mut child) = self.child.take() {
            child.stop();
        }
        tracing::debug!(
            service = %self.id,
            from = %from,
            to = %self.current,
            event = %event,
            "transition"
        );

        steps.push(self.snapshot());
        self.enter(event, steps, depth + 1)
    }

    /// Entry behaviour: the first matching immediate transition fires; failing
    /// that, an invoked child machine starts.
    fn enter(
        &mut self,
        event: &Event,
        steps: &mut Vec<Snapshot<C>>,
        depth: usize,
    ) -> Result<(), SendError> {
        let machine = Rc::clone(&self.machine);
        let Some(node) = machine.state(&self.current) else {
            return Ok(());
        };

        if let Some(transition) = node.select_immediate(&self.context, event) {
            return self.take(transition, event, steps, depth);
        }

        if let Some(child_machine) = node.invoke() {
            let child = Service::start_with(Rc::clone(child_machine), Some(&*self.context))?;
            tracing::debug!(
                service = %self.id,
                child = %child.id,
                state = %self.current,
                "child service started"
            );
            if child.is_done() {
                return self.complete_child(child, steps, depth);
            }
            self.child = Some(Box::new(child));
            // The entry step was recorded before the child existed.
            if let Some(entered) = steps.last_mut() {
                *entered = self.snapshot();
            }
        }
        Ok(())
    }

    /// Fold a finished child back in: its context replaces ours, then the
    /// `"done"` transitions of the invoking state are evaluated.
    fn complete_child(
        &mut self,
        child: Service<C>,
        steps: &mut Vec<Snapshot<C>>,
        depth: usize,
    ) -> Result<(), SendError> {
        tracing::debug!(
            service = %self.id,
            child = %child.id,
            child_state = %child.current,
            "child service finished"
        );
        self.context = Rc::clone(&child.context);

        let done = Event::done();
        let machine = Rc::clone(&self.machine);
        match machine
            .state(&self.current)
            .and_then(|node| node.select(&self.context, &done))
        {
            Some(transition) => self.take(transition, &done, steps, depth),
            None => {
                steps.push(self.snapshot());
                Ok(())
            }
        }
    }

    fn wrap(&self, child: Snapshot<C>) -> Snapshot<C> {
        Snapshot {
            service: self.id,
            state: self.current.clone(),
            context: Rc::clone(&self.context),
            child: Some(Rc::new(child)),
            done: false,
        }
    }
}

impl<C: Context> fmt::Debug for Service<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("context", &self.context)
            .field("child", &self.child)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Guard, Machine, Transition};
    use std::cell::RefCell;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TestContext {
        count: i64,
        log: Vec<String>,
    }

    fn bump(c: &TestContext) -> TestContext {
        TestContext {
            count: c.count + 1,
            ..c.clone()
        }
    }

    fn flat_machine() -> Rc<Machine<TestContext>> {
        Rc::new(
            Machine::builder()
                .state(
                    "idle",
                    [
                        Transition::on("go", "busy").reduce(bump),
                        Transition::on("finish", "done"),
                    ],
                )
                .state(
                    "busy",
                    [
                        Transition::on("go", "busy")
                            .when(|c: &TestContext| c.count < 2)
                            .reduce(bump),
                        Transition::on("rest", "resting"),
                        Transition::on("fail", "idle")
                            .try_reduce(|_: &TestContext, _: &Event| Err("refused".into())),
                    ],
                )
                .state(
                    "resting",
                    [Transition::immediate("idle").reduce(|c: &TestContext| TestContext {
                        count: 0,
                        ..c.clone()
                    })],
                )
                .state("done", [])
                .build()
                .unwrap(),
        )
    }

    fn recorded(service: &mut Service<TestContext>) -> Rc<RefCell<Vec<String>>> {
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        service.set_on_change(move |s| sink.borrow_mut().push(s.state().to_string()));
        published
    }

    #[test]
    fn service_starts_in_initial_state() {
        let service = Service::start(flat_machine(), None).unwrap();

        assert_eq!(service.current(), "idle");
        assert_eq!(service.context(), &TestContext::default());
        assert!(!service.is_done());
    }

    #[test]
    fn matching_event_transitions_and_publishes() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        let published = recorded(&mut service);

        assert!(service.send("go").unwrap());

        assert_eq!(service.current(), "busy");
        assert_eq!(service.context().count, 1);
        assert_eq!(*published.borrow(), ["busy"]);
    }

    #[test]
    fn unmatched_event_is_ignored_without_publishing() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        let published = recorded(&mut service);

        assert!(!service.send("rest").unwrap());

        assert_eq!(service.current(), "idle");
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn failing_guard_blocks_transition() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        service.send("go").unwrap();
        service.send("go").unwrap();

        assert!(!service.send("go").unwrap());
        assert_eq!(service.context().count, 2);
    }

    #[test]
    fn immediate_cascade_publishes_each_step() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        service.send("go").unwrap();
        let published = recorded(&mut service);

        service.send("rest").unwrap();

        assert_eq!(*published.borrow(), ["resting", "idle"]);
        assert_eq!(service.current(), "idle");
        assert_eq!(service.context().count, 0);
    }

    #[test]
    fn failing_reducer_leaves_service_untouched() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        service.send("go").unwrap();
        let published = recorded(&mut service);

        let err = service.send("fail").unwrap_err();

        assert!(matches!(err, SendError::ReducerFailed { ref state, .. } if state == "busy"));
        assert_eq!(service.current(), "busy");
        assert_eq!(service.context().count, 1);
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn done_service_ignores_events() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        service.send("finish").unwrap();
        assert!(service.is_done());
        let published = recorded(&mut service);

        assert!(!service.send("go").unwrap());
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn stopped_service_ignores_events() {
        let mut service = Service::start(flat_machine(), None).unwrap();
        service.stop();

        assert!(!service.send("go").unwrap());
        assert_eq!(service.current(), "idle");
        assert!(service.is_stopped());
    }

    #[test]
    fn initial_immediate_cascade_runs_on_start() {
        let machine = Rc::new(
            Machine::builder()
                .state("boot", [Transition::immediate("ready").reduce(bump)])
                .state("ready", [Transition::on("go", "boot")])
                .build()
                .unwrap(),
        );

        let service = Service::start(machine, None).unwrap();

        assert_eq!(service.current(), "ready");
        assert_eq!(service.context().count, 1);
    }

    #[test]
    fn start_cascade_sees_namespaced_init_event() {
        let machine = Rc::new(
            Machine::builder()
                .state(
                    "init",
                    [
                        Transition::immediate("clashed").guard(Guard::with_event(
                            |_: &TestContext, e: &Event| e.name() == "init",
                        )),
                        Transition::immediate("ready").guard(Guard::with_event(
                            |_: &TestContext, e: &Event| e.name() == Event::INIT,
                        )),
                    ],
                )
                .state("clashed", [])
                .state("ready", [Transition::on("init", "init")])
                .build()
                .unwrap(),
        );

        let service = Service::start(machine, None).unwrap();

        assert_eq!(service.current(), "ready");
    }

    #[test]
    fn endless_cascade_hits_limit() {
        let machine = Rc::new(
            Machine::<TestContext>::builder()
                .state("ping", [Transition::on("start", "pong")])
                .state("pong", [Transition::immediate("pang")])
                .state("pang", [Transition::immediate("pong")])
                .build()
                .unwrap(),
        );
        let mut service = Service::start(machine, None).unwrap();

        let published = recorded(&mut service);

        let err = service.send("start").unwrap_err();

        assert!(matches!(err, SendError::CascadeLimit { limit, .. } if limit == CASCADE_LIMIT));
        assert_eq!(service.current(), "ping");
        assert!(published.borrow().is_empty());
    }

    fn halting_machine() -> Rc<Machine<TestContext>> {
        Rc::new(
            Machine::builder()
                .state(
                    "loop",
                    [
                        Transition::on("stop", "halt").reduce(bump),
                        Transition::on("incr", "loop").reduce(bump),
                    ],
                )
                .state(
                    "halt",
                    [Transition::immediate("loop").try_reduce(
                        |c: &TestContext, _: &Event| {
                            if c.count == 1 {
                                Err("cannot reset".into())
                            } else {
                                Ok(TestContext::default())
                            }
                        },
                    )],
                )
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn failure_inside_immediate_cascade_rolls_back_whole_send() {
        let mut service = Service::start(halting_machine(), None).unwrap();
        let published = recorded(&mut service);

        let err = service.send("stop").unwrap_err();

        assert!(matches!(err, SendError::ReducerFailed { ref state, .. } if state == "halt"));
        assert_eq!(service.current(), "loop");
        assert_eq!(service.context().count, 0);
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn service_keeps_working_after_rolled_back_send() {
        let mut service = Service::start(halting_machine(), None).unwrap();
        service.send("stop").unwrap_err();
        let published = recorded(&mut service);

        assert!(service.send("incr").unwrap());
        assert!(service.send("incr").unwrap());
        assert!(service.send("stop").unwrap());

        assert_eq!(*published.borrow(), ["loop", "loop", "halt", "loop"]);
        assert_eq!(service.current(), "loop");
        assert_eq!(service.context().count, 0);
    }

    fn nested_machine() -> Rc<Machine<TestContext>> {
        let child = Rc::new(
            Machine::builder()
                .state(
                    "step",
                    [
                        Transition::on("tick", "step")
                            .when(|c: &TestContext| c.count < 3)
                            .reduce(bump),
                        Transition::on("finish", "finished"),
                    ],
                )
                .state("finished", [])
                .build()
                .unwrap(),
        );

        Rc::new(
            Machine::builder()
                .state("idle", [Transition::on("start", "working")])
                .invoke(
                    "working",
                    child,
                    [
                        Transition::on("done", "idle").reduce(|c: &TestContext| {
                            let mut log = c.log.clone();
                            log.push(format!("child finished at {}", c.count));
                            TestContext { log, ..c.clone() }
                        }),
                        Transition::on("cancel", "idle"),
                    ],
                )
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn entering_invoking_state_starts_child() {
        let mut service = Service::start(nested_machine(), None).unwrap();

        service.send("start").unwrap();

        let child = service.child().expect("child should be running");
        assert_eq!(child.current(), "step");
        assert_eq!(service.snapshot().innermost().state(), "step");
    }

    #[test]
    fn entry_snapshot_includes_started_child() {
        let mut service = Service::start(nested_machine(), None).unwrap();
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        service.set_on_change(move |s| sink.borrow_mut().push(s.clone()));

        service.send("start").unwrap();

        let published = published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].state(), "working");
        assert_eq!(published[0].child().map(Snapshot::state), Some("step"));
    }

    #[test]
    fn child_failure_rolls_back_child_and_parent() {
        let child = Rc::new(
            Machine::builder()
                .state(
                    "step",
                    [
                        Transition::on("tick", "step").reduce(bump),
                        Transition::on("explode", "step")
                            .try_reduce(|_: &TestContext, _: &Event| Err("broken".into())),
                    ],
                )
                .build()
                .unwrap(),
        );
        let machine = Rc::new(
            Machine::builder()
                .state("idle", [Transition::on("start", "working")])
                .invoke("working", child, [])
                .build()
                .unwrap(),
        );
        let mut service = Service::start(machine, None).unwrap();
        service.send("start").unwrap();
        service.send_to_child("tick").unwrap();

        assert!(service.send_to_child("explode").is_err());

        assert_eq!(service.current(), "working");
        assert_eq!(service.child().unwrap().context().count, 1);
        assert!(service.send_to_child("tick").unwrap());
        assert_eq!(service.child().unwrap().context().count, 2);
    }

    #[test]
    fn send_to_child_routes_to_innermost_and_wraps_snapshots() {
        let mut service = Service::start(nested_machine(), None).unwrap();
        service.send("start").unwrap();
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        service.set_on_change(move |s| {
            sink.borrow_mut()
                .push((s.state().to_string(), s.innermost().context().count))
        });

        assert!(service.send_to_child("tick").unwrap());

        assert_eq!(service.current(), "working");
        assert_eq!(service.child().unwrap().context().count, 1);
        assert_eq!(*published.borrow(), [("working".to_string(), 1)]);
    }

    #[test]
    fn finished_child_hands_context_back_to_parent() {
        let mut service = Service::start(nested_machine(), None).unwrap();
        service.send("start").unwrap();
        service.send_to_child("tick").unwrap();
        service.send_to_child("tick").unwrap();
        let published = recorded(&mut service);

        service.send_to_child("finish").unwrap();

        assert!(service.child().is_none());
        assert_eq!(service.current(), "idle");
        assert_eq!(service.context().count, 2);
        assert_eq!(service.context().log, ["child finished at 2"]);
        assert_eq!(*published.borrow(), ["working", "idle"]);
    }

    #[test]
    fn leaving_invoking_state_discards_child() {
        let mut service = Service::start(nested_machine(), None).unwrap();
        service.send("start").unwrap();
        service.send_to_child("tick").unwrap();

        assert!(service.send("cancel").unwrap());

        assert!(service.child().is_none());
        assert_eq!(service.current(), "idle");
        assert_eq!(service.context().count, 0);
    }

    #[test]
    fn send_to_child_without_child_sends_directly() {
        let mut service = Service::start(flat_machine(), None).unwrap();

        assert!(service.send_to_child("go").unwrap());
        assert_eq!(service.current(), "busy");
    }
}
