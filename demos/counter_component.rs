//! A text-mode counter component driven by the counter machine.
//!
//! Run with `RUST_LOG=fsm_controller=debug cargo run --example counter_component`
//! to see transitions as they happen.

use fsm_controller::counter::{events, initialize_machine, CounterContext, LiveBounds};
use fsm_controller::{Controllers, Manager, ReactiveController, ReactiveControllerHost};
use std::cell::{Cell, OnceCell};
use std::error::Error;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct CounterComponent {
    max: Rc<Cell<i64>>,
    min: Rc<Cell<i64>>,
    controllers: Controllers,
    manager: OnceCell<Rc<Manager<CounterContext>>>,
}

impl CounterComponent {
    fn new(min: i64, max: i64) -> Result<Rc<Self>, Box<dyn Error>> {
        let component = Rc::new(Self {
            max: Rc::new(Cell::new(max)),
            min: Rc::new(Cell::new(min)),
            controllers: Controllers::new(),
            manager: OnceCell::new(),
        });

        let (max, min) = (Rc::clone(&component.max), Rc::clone(&component.min));
        let machine = initialize_machine(LiveBounds::new(move || max.get(), move || min.get()))?;
        let manager = Manager::new(&component, Rc::new(machine), None)?;
        if component.manager.set(manager).is_err() {
            return Err("manager already installed".into());
        }
        Ok(component)
    }

    fn connect(&self) {
        self.controllers.host_connected();
        self.render();
    }

    fn disconnect(&self) {
        self.controllers.host_disconnected();
    }

    fn click(&self, label: &str, event: &str) -> Result<(), Box<dyn Error>> {
        println!("> click {label}");
        if let Some(manager) = self.manager.get() {
            manager.next(event)?;
        }
        Ok(())
    }

    fn render(&self) {
        let Some(manager) = self.manager.get() else {
            return;
        };
        self.controllers.host_update();

        let context = manager.context();
        let view = if context.active {
            format!("[{}]  (+1)  (-1)  (De-activate)", context.count)
        } else {
            "(Press to activate)".to_string()
        };
        println!(
            "  {view}    Maximum of {}; minimum of {}.   <{}>",
            self.max.get(),
            self.min.get(),
            manager.current()
        );

        self.controllers.host_updated();
    }
}

impl ReactiveControllerHost for CounterComponent {
    fn add_controller(&self, controller: Rc<dyn ReactiveController>) {
        self.controllers.add(controller);
    }

    fn request_update(&self) {
        self.render();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let component = CounterComponent::new(0, 3)?;
    component.connect();

    component.click("Press to activate", events::ACTIVATE)?;
    for _ in 0..4 {
        component.click("+1", events::INCR)?;
    }
    for _ in 0..4 {
        component.click("-1", events::DECR)?;
    }

    println!("> set max = 5");
    component.max.set(5);
    for _ in 0..5 {
        component.click("+1", events::INCR)?;
    }

    component.click("De-activate", events::STOP)?;
    component.click("+1", events::INCR)?;

    component.disconnect();
    component.click("Press to activate", events::ACTIVATE)?;
    let last = component.manager.get().map(|m| m.current()).unwrap_or_default();
    println!("disconnected, last state <{last}>");

    Ok(())
}
