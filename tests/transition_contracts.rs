//! Behavioral contracts of the builder, compiler, and engine, exercised
//! through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use switchyard::callbacks::FaultCause;
use switchyard::core::{BoxError, TransitionRecord};
use switchyard::{
    state_enum, trigger_enum, BuildError, Context, Definition, Error, OperationConfig, Payload,
    Phase, Severity, StateConfig, StateMachine,
};

state_enum! {
    enum Order {
        Created,
        Opened,
        Canceled,
        Closed,
        Published,
        Rejected,
    }
}

trigger_enum! {
    enum Action {
        Open,
        Cancel,
        Close,
        Publish,
        Reopen,
    }
}

type Record = TransitionRecord<Order, Action>;

#[derive(Clone, Debug)]
struct Cart {
    state: Order,
    visits: Vec<&'static str>,
}

impl Cart {
    fn new(state: Order) -> Self {
        Self {
            state,
            visits: Vec::new(),
        }
    }
}

impl Payload<Order> for Cart {
    fn current_state(&self) -> Order {
        self.state
    }
}

fn enter_destination(_: &Context, cart: &mut Cart, tr: &Record) -> Result<(), BoxError> {
    cart.state = *tr.destination();
    Ok(())
}

fn explode(_: &Context, _: &mut Cart, _: &Record) -> Result<(), BoxError> {
    panic!("panics as intended")
}

fn created_machine() -> StateMachine<Order, Action, Cart> {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap()
        .permit(Action::Cancel, Order::Canceled)
        .unwrap();
    definition.configure(Order::Opened).unwrap();
    definition.configure(Order::Canceled).unwrap();
    definition.compile().into_machine()
}

#[test]
fn open_from_created_reports_opened() {
    let machine = created_machine();
    let mut cart = Cart::new(Order::Created);

    let record = machine
        .fire(&Context::background(), &mut cart, Action::Open)
        .unwrap();

    assert_eq!(*record.destination(), Order::Opened);
    assert_eq!(*record.source(), Order::Created);
    assert_eq!(cart.state, Order::Created);
}

#[test]
fn every_declared_pair_can_fire() {
    let machine = created_machine();
    let cart = Cart::new(Order::Created);

    for action in machine.enumerate_active_triggers(&cart).unwrap() {
        assert!(machine
            .can_fire(&Context::background(), &cart, action)
            .is_ok());
        let mut copy = cart.clone();
        assert!(machine
            .fire(&Context::background(), &mut copy, action)
            .is_ok());
    }
}

#[test]
fn unknown_trigger_and_state_from_fire_and_can_fire() {
    let machine = created_machine();
    let ctx = Context::background();

    let mut created = Cart::new(Order::Created);
    let err = machine.fire(&ctx, &mut created, Action::Close).unwrap_err();
    match err.error() {
        Error::Trigger(e) => {
            assert_eq!(e.trigger, Action::Close);
            assert_eq!(e.state, Order::Created);
        }
        other => panic!("expected trigger error, got {other:?}"),
    }
    assert!(machine
        .can_fire(&ctx, &created, Action::Close)
        .unwrap_err()
        .is_trigger());

    let mut stray = Cart::new(Order::Published);
    let err = machine.fire(&ctx, &mut stray, Action::Open).unwrap_err();
    match err.error() {
        Error::State(e) => assert_eq!(e.state, Order::Published),
        other => panic!("expected state error, got {other:?}"),
    }
    assert!(machine
        .can_fire(&ctx, &stray, Action::Open)
        .unwrap_err()
        .is_state());
}

#[test]
fn guard_rejection_wording() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit_if(
            |_, _: &Cart, _| Err("cart is empty".into()),
            Action::Open,
            Order::Opened,
        )
        .unwrap();
    definition.configure(Order::Opened).unwrap();
    let machine = definition.compile().into_machine();
    let mut cart = Cart::new(Order::Created);

    let checked = machine
        .can_fire(&Context::background(), &cart, Action::Open)
        .unwrap_err();
    let fired = machine
        .fire(&Context::background(), &mut cart, Action::Open)
        .unwrap_err();

    assert_eq!(checked.to_string(), "cart is empty");
    assert_ne!(fired.to_string(), checked.to_string());
    assert!(fired.error().is_trigger());
}

#[test]
fn duplicate_declarations_fail_construction() {
    let mut definition: Definition<Order, Action, Cart> = Definition::new();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit_reentry(Action::Reopen)
        .unwrap();

    assert!(matches!(
        definition.configure(Order::Opened).err(),
        Some(BuildError::DuplicateState { .. })
    ));

    let mut definition: Definition<Order, Action, Cart> = Definition::new();
    let err = definition
        .configure(Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap()
        .permit(Action::Close, Order::Canceled)
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Trigger: Close - has already been defined, configuration invalid."
    );
}

#[test]
fn compile_reports_dangling_destination_and_dead_end() {
    let mut definition: Definition<Order, Action, Cart> = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap();
    definition.configure(Order::Opened).unwrap();

    let output = definition.compile();

    let errors: Vec<_> = output.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("'Closed'"));
    assert!(errors[0].message.contains("'Close'"));

    let warnings: Vec<_> = output.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert!(warnings[0].message.contains("'Opened'"));
}

#[test]
fn exit_fault_reports_inferred_function_name() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap()
        .on_exit(|_, cart: &mut Cart, _| {
            cart.visits.push("first");
            Ok(())
        })
        .on_exit(explode);
    definition.configure(Order::Opened).unwrap();
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Created);
    let err = machine
        .fire(&Context::background(), &mut cart, Action::Open)
        .unwrap_err();

    let fault = err.error().as_fault().expect("fault");
    assert_eq!(fault.step(), 1);
    assert_eq!(fault.step_name(), "explode");
    assert!(matches!(fault.cause(), FaultCause::Message(m) if m == "panics as intended"));
    assert!(fault.stack().contains("explode"), "{}", fault.stack());
    assert_eq!(cart.visits, vec!["first"]);
}

#[test]
fn entry_fault_reports_explicit_or_anonymous_name() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap()
        .permit(Action::Cancel, Order::Canceled)
        .unwrap();
    definition.configure(Order::Opened).unwrap().on_entry_with(
        explode,
        OperationConfig::new().name("overridden function name"),
    );
    definition
        .configure(Order::Canceled)
        .unwrap()
        .on_entry(|_, _: &mut Cart, _| panic!("closure panic"));
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Created);
    let err = machine
        .fire(&Context::background(), &mut cart, Action::Open)
        .unwrap_err();
    assert_eq!(err.error().as_fault().unwrap().step_name(), "overridden function name");
    assert!(err.to_string().contains("overridden function name"));

    let err = machine
        .fire(&Context::background(), &mut cart, Action::Cancel)
        .unwrap_err();
    let name = err.error().as_fault().unwrap().step_name().to_string();
    assert!(name.starts_with("anonymous_function:transition_contracts.rs:"), "{name}");
}

#[test]
fn trigger_entries_run_only_for_their_trigger() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit_reentry(Action::Reopen)
        .unwrap()
        .on_trigger_entry(Action::Open, |_, cart: &mut Cart, _| {
            cart.visits.push("first");
            Ok(())
        })
        .on_trigger_entry(Action::Open, |_, cart: &mut Cart, _| {
            cart.visits.push("second");
            Ok(())
        });
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Created);
    machine
        .fire(&Context::background(), &mut cart, Action::Open)
        .unwrap();
    assert_eq!(cart.visits, vec!["first", "second"]);

    let mut cart = Cart::new(Order::Opened);
    machine
        .fire(&Context::background(), &mut cart, Action::Reopen)
        .unwrap();
    assert!(cart.visits.is_empty());
}

#[test]
fn trigger_exits_run_only_for_their_trigger() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap()
        .permit(Action::Cancel, Order::Canceled)
        .unwrap()
        .on_trigger_exit(Action::Close, |_, cart: &mut Cart, _| {
            cart.visits.push("closing");
            Ok(())
        });
    definition.configure(Order::Closed).unwrap();
    definition.configure(Order::Canceled).unwrap();
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Opened);
    machine
        .fire(&Context::background(), &mut cart, Action::Cancel)
        .unwrap();
    assert!(cart.visits.is_empty());
    machine
        .fire(&Context::background(), &mut cart, Action::Close)
        .unwrap();
    assert_eq!(cart.visits, vec!["closing"]);
}

#[test]
fn published_failure_is_redirected_to_rejected() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Publish, Order::Published)
        .unwrap();
    definition
        .configure(Order::Published)
        .unwrap()
        .on_entry(|_, _: &mut Cart, _| Err("not-wizard".into()))
        .on_error(|_, _, tr, _| {
            tr.set_destination(Order::Rejected);
            Ok(())
        });
    definition.configure(Order::Rejected).unwrap();
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Created);
    let err = machine
        .fire(&Context::background(), &mut cart, Action::Publish)
        .unwrap_err();

    assert_eq!(err.to_string(), "not-wizard");
    assert_eq!(
        err.transition().map(|tr| *tr.destination()),
        Some(Order::Rejected)
    );
    assert_eq!(cart.state, Order::Created);
}

#[test]
fn exit_failure_redirect_reaches_between_observers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut definition = Definition::new();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap()
        .on_exit(|_, _: &mut Cart, _| Err("still has items".into()))
        .on_error(|_, _, tr, _| {
            tr.set_destination(Order::Rejected);
            Ok(())
        });
    definition.configure(Order::Closed).unwrap();
    definition.configure(Order::Rejected).unwrap();
    definition.observe(move |_, phase, _, tr, _| {
        sink.lock().unwrap().push((phase, *tr.destination()))
    });
    let machine = definition.compile().into_machine();

    let mut cart = Cart::new(Order::Opened);
    let err = machine
        .fire(&Context::background(), &mut cart, Action::Close)
        .unwrap_err();

    assert_eq!(err.to_string(), "still has items");
    assert_eq!(
        err.transition().map(|tr| *tr.destination()),
        Some(Order::Rejected)
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (Phase::BeforeTransition, Order::Closed),
            (Phase::BetweenStates, Order::Rejected),
        ]
    );
    assert_eq!(cart.state, Order::Opened);
}

#[test]
fn error_handler_can_replace_the_error() {
    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap()
        .on_exit(|_, _: &mut Cart, _| Err("exit refused".into()))
        .on_error(|_, _, _, err| Err(format!("handled: {err}").into()));
    definition.configure(Order::Opened).unwrap();
    let machine = definition.compile().into_machine();

    let err = machine
        .fire(&Context::background(), &mut Cart::new(Order::Created), Action::Open)
        .unwrap_err();

    assert_eq!(err.to_string(), "handled: exit refused");
}

#[test]
fn context_reaches_callbacks() {
    let seen_cancelled = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&seen_cancelled);

    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap();
    definition
        .configure(Order::Opened)
        .unwrap()
        .on_entry(move |ctx, _: &mut Cart, _| {
            if ctx.is_cancelled() {
                probe.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        });
    let machine = definition.compile().into_machine();

    let ctx = Context::background();
    ctx.cancel();
    machine
        .fire(&ctx, &mut Cart::new(Order::Created), Action::Open)
        .unwrap();

    assert_eq!(seen_cancelled.load(Ordering::SeqCst), 1);
}

#[test]
fn rendering_walks_both_definition_and_machine() {
    let mut definition: Definition<Order, Action, Cart> = Definition::new();
    definition
        .configure_with(
            Order::Created,
            StateConfig::new().name("New order").description("not yet opened"),
        )
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap();
    definition.configure(Order::Closed).unwrap();

    let mut before = Vec::new();
    definition.render(&mut EdgeList(&mut before)).unwrap();

    let machine = definition.compile().into_machine();
    let mut after = Vec::new();
    machine.render(&mut EdgeList(&mut after)).unwrap();

    assert_eq!(before, after);
    assert_eq!(
        after,
        vec![
            "node Created 'New order' 'not yet opened'",
            "node Opened 'Opened' ''",
            "node Closed 'Closed' ''",
            "Created -Open-> Opened",
            "Opened -Close-> Closed",
        ]
    );
}

struct EdgeList<'a>(&'a mut Vec<String>);

impl switchyard::graph::Renderer<Order, Action> for EdgeList<'_> {
    type Error = std::convert::Infallible;

    fn render(
        &mut self,
        graph: &dyn switchyard::graph::Graph<Order, Action>,
    ) -> Result<(), Self::Error> {
        use switchyard::core::{State, Trigger};
        graph.for_each_node(&mut |state, name, description| {
            self.0
                .push(format!("node {} '{name}' '{description}'", state.name()));
        });
        graph.for_each_edge(&mut |from, to, trigger| {
            self.0
                .push(format!("{} -{}-> {}", from.name(), trigger.name(), to.name()));
        });
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_firings_share_one_machine() {
    let completed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completed);
    let phases = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&phases);

    let mut definition = Definition::new();
    definition
        .configure(Order::Created)
        .unwrap()
        .permit(Action::Open, Order::Opened)
        .unwrap();
    definition
        .configure(Order::Opened)
        .unwrap()
        .permit(Action::Close, Order::Closed)
        .unwrap()
        .on_entry(enter_destination);
    definition
        .configure(Order::Closed)
        .unwrap()
        .on_entry(move |ctx, cart: &mut Cart, tr| {
            counter.fetch_add(1, Ordering::SeqCst);
            enter_destination(ctx, cart, tr)
        });
    definition.observe(move |_, _, _, _, _| *sink.lock().unwrap() += 1);
    let machine = definition.compile().into_machine();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let machine = machine.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let ctx = Context::background();
            let mut cart = Cart::new(Order::Created);
            machine.fire(&ctx, &mut cart, Action::Open).unwrap();
            machine.fire(&ctx, &mut cart, Action::Close).unwrap();
            cart.state
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Order::Closed);
    }
    assert_eq!(completed.load(Ordering::SeqCst), 32);
    assert_eq!(*phases.lock().unwrap(), 32 * 2 * 3);
}
