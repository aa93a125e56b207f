// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vow::core::Core;
use vow::handler::StateSnapshot;
use vow::promise::Promise;
use vow::scheduler::{ManualQueue, Scheduler};
use vow::value::{MaybeThenable, NotifyFn, RejectFn, ResolveFn, ThenMethod, Value};

fn int(v: &Value) -> i32 {
    *v.downcast_ref::<i32>().expect("expected an i32 payload")
}

fn new_core() -> (Core, Rc<ManualQueue>) {
    let queue = Rc::new(ManualQueue::new());
    let scheduler: Rc<dyn Scheduler> = queue.clone();
    (Core::new(scheduler), queue)
}

fn drain(queue: &Rc<ManualQueue>) {
    ManualQueue::drain(queue);
}

#[test]
fn basic_fulfillment_settles_and_chains() {
    let (core, queue) = new_core();

    let source = core.promise(|resolve, _reject, _notify| {
        resolve(Value::plain(42_i32));
        Ok(())
    });

    // The resolver ran synchronously, so the source promise already
    // reports fulfilled before the scheduler has run at all.
    match source.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 42),
        other => panic!("expected fulfilled, got {other:?}"),
    }

    let chained = source.then(
        Some(Rc::new(|v: Value, _r: Option<&Value>| Ok(Value::plain(int(&v) + 1)))),
        None,
        None,
    );

    // The reaction has not run yet: `then` never dispatches synchronously.
    assert!(matches!(chained.inspect(), StateSnapshot::Pending));

    drain(&queue);

    match chained.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 43),
        other => panic!("expected fulfilled(43), got {other:?}"),
    }
}

#[test]
fn thrown_resolver_error_rejects() {
    let (core, queue) = new_core();
    let promise = core.promise(|_resolve, _reject, _notify| Err(Value::plain("E")));
    drain(&queue);
    match promise.inspect() {
        StateSnapshot::Rejected(reason) => {
            assert_eq!(*reason.downcast_ref::<&str>().unwrap(), "E");
        }
        other => panic!("expected rejected(E), got {other:?}"),
    }
}

#[test]
fn resolving_a_promise_with_itself_rejects_with_a_type_error() {
    let (core, queue) = new_core();
    let (promise, resolve, _reject) = core.with_resolvers();
    resolve(Value::Promise(promise.clone()));
    drain(&queue);
    match promise.inspect() {
        StateSnapshot::Rejected(_) => {}
        other => panic!("expected a rejection from the cycle, got {other:?}"),
    }
}

#[test]
fn resolving_through_a_following_wrapper_back_to_self_rejects_rather_than_hanging() {
    let (core, queue) = new_core();
    let (promise, resolve, _reject) = core.with_resolvers();
    let bound = promise.with(Value::plain("ctx"));
    resolve(Value::Promise(bound));
    drain(&queue);
    match promise.inspect() {
        StateSnapshot::Rejected(_) => {}
        other => panic!("expected a rejection from the cycle, got {other:?}"),
    }
    // A settled state reachable without unbounded recursion is itself
    // proof the cycle was cut; inspecting again must not hang or overflow.
    assert!(matches!(promise.inspect(), StateSnapshot::Rejected(_)));
}

#[test]
fn resolving_a_chain_of_two_deferred_promises_back_to_the_first_rejects() {
    let (core, queue) = new_core();
    let (promise_a, resolve_a, _reject_a) = core.with_resolvers();
    let (promise_b, resolve_b, _reject_b) = core.with_resolvers();

    resolve_b(Value::Promise(promise_a.clone()));
    drain(&queue);
    resolve_a(Value::Promise(promise_b.clone()));
    drain(&queue);

    match promise_a.inspect() {
        StateSnapshot::Rejected(_) => {}
        other => panic!("expected promise_a to reject from the cycle, got {other:?}"),
    }
    match promise_b.inspect() {
        StateSnapshot::Rejected(_) => {}
        other => panic!("expected promise_b to reject too, got {other:?}"),
    }
}

#[derive(Debug)]
struct SyncThenable {
    value: i32,
}

struct SyncThen {
    value: i32,
}

impl fmt::Debug for SyncThen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncThen({})", self.value)
    }
}

impl ThenMethod for SyncThen {
    fn call(&self, _thenable: Value, resolve: ResolveFn, _reject: RejectFn, _notify: NotifyFn) -> Result<(), Value> {
        resolve(Value::plain(self.value));
        Ok(())
    }
}

impl MaybeThenable for SyncThenable {
    fn then(&self) -> Result<Option<Rc<dyn ThenMethod>>, Value> {
        Ok(Some(Rc::new(SyncThen { value: self.value })))
    }
}

#[test]
fn foreign_thenable_is_adopted_asynchronously() {
    let (core, queue) = new_core();
    let resolved = core.resolve(Value::object(Rc::new(SyncThenable { value: 7 })));

    // Even though the foreign `then` resolves synchronously when invoked,
    // invoking it at all is deferred to an AssimilateTask, so adoption has
    // not happened yet.
    assert!(matches!(resolved.inspect(), StateSnapshot::Pending));

    let chained = resolved.then(Some(Rc::new(|v: Value, _r: Option<&Value>| Ok(v))), None, None);
    drain(&queue);

    match chained.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 7),
        other => panic!("expected fulfilled(7), got {other:?}"),
    }
}

#[derive(Debug)]
struct ThrowingThenable;

impl MaybeThenable for ThrowingThenable {
    fn then(&self) -> Result<Option<Rc<dyn ThenMethod>>, Value> {
        Err(Value::plain("then getter threw"))
    }
}

#[test]
fn a_throwing_then_getter_rejects_instead_of_propagating() {
    let (core, queue) = new_core();
    let resolved = core.resolve(Value::object(Rc::new(ThrowingThenable)));
    drain(&queue);
    match resolved.inspect() {
        StateSnapshot::Rejected(r) => {
            assert_eq!(*r.downcast_ref::<&str>().unwrap(), "then getter threw");
        }
        other => panic!("expected rejected, got {other:?}"),
    }
}

#[derive(Debug)]
struct ThrowingThenInvocation;

struct ThrowingThen;

impl fmt::Debug for ThrowingThen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThrowingThen")
    }
}

impl ThenMethod for ThrowingThen {
    fn call(&self, _thenable: Value, _resolve: ResolveFn, _reject: RejectFn, _notify: NotifyFn) -> Result<(), Value> {
        Err(Value::plain("then call threw"))
    }
}

impl MaybeThenable for ThrowingThenInvocation {
    fn then(&self) -> Result<Option<Rc<dyn ThenMethod>>, Value> {
        Ok(Some(Rc::new(ThrowingThen)))
    }
}

#[test]
fn a_throwing_then_invocation_rejects_the_assimilated_promise() {
    let (core, queue) = new_core();
    let resolved = core.resolve(Value::object(Rc::new(ThrowingThenInvocation)));
    drain(&queue);
    match resolved.inspect() {
        StateSnapshot::Rejected(r) => {
            assert_eq!(*r.downcast_ref::<&str>().unwrap(), "then call threw");
        }
        other => panic!("expected rejected, got {other:?}"),
    }
}

#[test]
fn race_fulfills_with_the_first_settlement_in_enqueue_order() {
    let (core, queue) = new_core();
    let pending_forever = Value::Promise(core.empty());
    let a = Value::Promise(core.resolve(Value::plain("a")));
    let b = Value::Promise(core.resolve(Value::plain("b")));

    let raced = core.race(vec![pending_forever, a, b]);
    drain(&queue);

    match raced.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(*v.downcast_ref::<&str>().unwrap(), "a"),
        other => panic!("expected fulfilled(a), got {other:?}"),
    }
}

#[test]
fn race_of_empty_input_is_identically_the_empty_singleton() {
    let (core, _queue) = new_core();
    let raced = core.race(Vec::new());
    assert!(raced.is_identical(&core.empty()));
}

#[test]
fn race_absorbs_settlement_of_losers() {
    let (core, queue) = new_core();
    let (loser, loser_resolve, _loser_reject) = core.with_resolvers();
    let winner = core.resolve(Value::plain(1_i32));

    let raced = core.race(vec![Value::Promise(winner), Value::Promise(loser)]);
    drain(&queue);
    loser_resolve(Value::plain(2_i32));
    drain(&queue);

    match raced.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 1),
        other => panic!("expected fulfilled(1), got {other:?}"),
    }
}

#[test]
fn all_preserves_index_order_regardless_of_settlement_order() {
    let (core, queue) = new_core();

    let one = Value::plain(1_i32);
    let two = Value::Promise(core.resolve(Value::plain(2_i32)));
    let (slow, slow_resolve, _slow_reject) = core.with_resolvers();

    let awaited = core.all(vec![one, two, Value::Promise(slow)]);

    // Settle the slow input only after the other two have had a chance to
    // run through the scheduler, to exercise out-of-order settlement.
    drain(&queue);
    slow_resolve(Value::plain(3_i32));
    drain(&queue);

    match awaited.inspect() {
        StateSnapshot::Fulfilled(v) => {
            let items = v.as_list().expect("expected a list");
            let values: Vec<i32> = items.iter().map(int).collect();
            assert_eq!(values, vec![1, 2, 3]);
        }
        other => panic!("expected fulfilled([1,2,3]), got {other:?}"),
    }
}

#[test]
fn all_of_empty_input_fulfills_with_an_empty_list() {
    let (core, queue) = new_core();
    let awaited = core.all(Vec::new());
    drain(&queue);
    match awaited.inspect() {
        StateSnapshot::Fulfilled(v) => assert!(v.as_list().unwrap().is_empty()),
        other => panic!("expected fulfilled([]), got {other:?}"),
    }
}

#[test]
fn all_rejects_as_soon_as_any_input_rejects() {
    let (core, queue) = new_core();
    let ok = Value::Promise(core.resolve(Value::plain(1_i32)));
    let bad = Value::Promise(core.reject(Value::plain("nope")));
    let awaited = core.all(vec![ok, bad]);
    drain(&queue);
    match awaited.inspect() {
        StateSnapshot::Rejected(r) => assert_eq!(*r.downcast_ref::<&str>().unwrap(), "nope"),
        other => panic!("expected rejected(nope), got {other:?}"),
    }
}

#[test]
fn multiple_reactions_on_one_promise_each_fire_exactly_once_in_attachment_order() {
    let (core, queue) = new_core();
    let order = Rc::new(RefCell::new(Vec::new()));

    let promise = core.resolve(Value::plain(1_i32));
    for id in 0..3 {
        let order = order.clone();
        promise.then(
            Some(Rc::new(move |v: Value, _r: Option<&Value>| {
                order.borrow_mut().push(id);
                Ok(v)
            })),
            None,
            None,
        );
    }

    drain(&queue);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn settlement_is_idempotent_first_settlement_wins() {
    let (core, queue) = new_core();
    let (promise, resolve, reject) = core.with_resolvers();
    resolve(Value::plain(1_i32));
    reject(Value::plain("too late"));
    resolve(Value::plain(2_i32));
    drain(&queue);

    match promise.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 1),
        other => panic!("expected fulfilled(1), got {other:?}"),
    }
}

#[test]
fn rejection_without_a_handler_propagates_through_then() {
    let (core, queue) = new_core();
    let rejected = core.reject(Value::plain("boom"));
    let chained: Promise = rejected.then(
        Some(Rc::new(|v: Value, _r: Option<&Value>| Ok(v))),
        None,
        None,
    );
    drain(&queue);
    match chained.inspect() {
        StateSnapshot::Rejected(r) => assert_eq!(*r.downcast_ref::<&str>().unwrap(), "boom"),
        other => panic!("expected rejected(boom), got {other:?}"),
    }
}

#[test]
fn on_rejected_handler_recovers_the_chain_via_resolve_not_reject() {
    let (core, queue) = new_core();
    let rejected = core.reject(Value::plain("boom"));
    let recovered = rejected.catch(Rc::new(|_reason: Value, _r: Option<&Value>| Ok(Value::plain(9_i32))));
    drain(&queue);
    match recovered.inspect() {
        StateSnapshot::Fulfilled(v) => assert_eq!(int(&v), 9),
        other => panic!("expected fulfilled(9), got {other:?}"),
    }
}

#[test]
fn with_this_rebinds_the_receiver_for_downstream_reactions() {
    let (core, queue) = new_core();
    let receiver_marker = Value::plain("ctx");
    let bound = core.resolve(Value::plain(1_i32)).with(receiver_marker);

    let seen = Rc::new(RefCell::new(false));
    let seen_inner = seen.clone();
    bound.then(
        Some(Rc::new(move |v: Value, receiver: Option<&Value>| {
            *seen_inner.borrow_mut() = receiver.and_then(|r| r.downcast_ref::<&str>()) == Some(&"ctx");
            Ok(v)
        })),
        None,
        None,
    );

    drain(&queue);
    assert!(*seen.borrow());
}

#[test]
fn resolve_of_a_trusted_promise_returns_it_unchanged() {
    let (core, _queue) = new_core();
    let promise = core.resolve(Value::plain(1_i32));
    let resolved_again = core.resolve(Value::Promise(promise.clone()));
    assert!(promise.is_identical(&resolved_again));
}

#[test]
fn progress_notifications_reach_consumers_attached_before_the_notify_call() {
    let (core, queue) = new_core();
    let notifier: Rc<RefCell<Option<NotifyFn>>> = Rc::new(RefCell::new(None));
    let notifier_setup = notifier.clone();

    let promise = core.promise(move |_resolve, _reject, notify| {
        *notifier_setup.borrow_mut() = Some(notify);
        Ok(())
    });

    let seen = Rc::new(RefCell::new(None));
    let seen_inner = seen.clone();
    let chained = promise.then(
        None,
        None,
        Some(Rc::new(move |v: Value, _r: Option<&Value>| {
            *seen_inner.borrow_mut() = Some(int(&v));
            Ok(v)
        })),
    );
    let _ = chained;

    let notify = notifier.borrow_mut().take().expect("resolver ran synchronously");
    notify(Value::plain(5_i32));
    drain(&queue);

    assert_eq!(*seen.borrow(), Some(5));
}
