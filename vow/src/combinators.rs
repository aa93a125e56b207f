// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thin combinators built entirely on top of the core contract: none of
//! them need a new handler or task variant, they only compose `resolve`,
//! `reject`, and `then`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::classify::classify;
use crate::handler::Handler;
use crate::promise::Promise;
use crate::reaction::Callback;
use crate::scheduler::Scheduler;
use crate::value::{RejectFn, ResolveFn, Value};

/// If `x` is already a trusted promise, returns it unchanged (`resolve(X)
/// === X`); otherwise wraps the classified value in a fresh promise.
pub fn resolve(scheduler: &Rc<dyn Scheduler>, x: Value) -> Promise {
    if let Value::Promise(p) = &x {
        return p.clone();
    }
    Promise::new(classify(scheduler, x, None), scheduler.clone())
}

/// A promise wrapping an already-rejected handler.
pub fn reject(scheduler: &Rc<dyn Scheduler>, reason: Value) -> Promise {
    Promise::new(Handler::rejected(reason), scheduler.clone())
}

/// Fulfills with an array of results once every input has fulfilled,
/// preserving index order regardless of settlement order. Rejects as
/// soon as any input rejects (first one wins; later ones are absorbed
/// by deferred idempotence). An empty input fulfills immediately with
/// an empty list.
pub fn all(scheduler: &Rc<dyn Scheduler>, xs: Vec<Value>) -> Promise {
    let to = Handler::new_deferred();
    let promise = Promise::new(to.clone(), scheduler.clone());

    if xs.is_empty() {
        to.resolve(scheduler, Value::list(Vec::new()));
        return promise;
    }

    let results = Rc::new(RefCell::new(vec![Value::Undefined; xs.len()]));
    let remaining = Rc::new(Cell::new(xs.len()));

    for (index, x) in xs.into_iter().enumerate() {
        let item = resolve(scheduler, x);

        let results_ok = results.clone();
        let remaining_ok = remaining.clone();
        let to_ok = to.clone();
        let scheduler_ok = scheduler.clone();
        let on_fulfilled: Callback = Rc::new(move |value, _receiver| {
            results_ok.borrow_mut()[index] = value.clone();
            let left = remaining_ok.get() - 1;
            remaining_ok.set(left);
            if left == 0 {
                let list = Value::list(results_ok.borrow().clone());
                to_ok.resolve(&scheduler_ok, list);
            }
            Ok(value)
        });

        let to_err = to.clone();
        let scheduler_err = scheduler.clone();
        let on_rejected: Callback = Rc::new(move |reason, _receiver| {
            to_err.reject(&scheduler_err, reason.clone());
            Err(reason)
        });

        item.then(Some(on_fulfilled), Some(on_rejected), None);
    }

    promise
}

/// Settles with whichever input settles first. An empty input returns
/// `empty` unchanged (the same singleton identity `Core::empty` hands
/// out), matching the documented identity property of `race([])`.
pub fn race(scheduler: &Rc<dyn Scheduler>, xs: Vec<Value>, empty: &Promise) -> Promise {
    if xs.is_empty() {
        return empty.clone();
    }

    let to = Handler::new_deferred();
    let promise = Promise::new(to.clone(), scheduler.clone());

    for x in xs {
        let item = resolve(scheduler, x);

        let to_ok = to.clone();
        let scheduler_ok = scheduler.clone();
        let on_fulfilled: Callback = Rc::new(move |value, _receiver| {
            to_ok.resolve(&scheduler_ok, value.clone());
            Ok(value)
        });

        let to_err = to.clone();
        let scheduler_err = scheduler.clone();
        let on_rejected: Callback = Rc::new(move |reason, _receiver| {
            to_err.reject(&scheduler_err, reason.clone());
            Err(reason)
        });

        item.then(Some(on_fulfilled), Some(on_rejected), None);
    }

    promise
}

/// Calls `f` synchronously and funnels its outcome through the same
/// resolve/reject path `resolve`/`reject` would use. Supplemented from
/// the teacher's `Promise.try`.
pub fn try_fn(scheduler: &Rc<dyn Scheduler>, f: impl FnOnce() -> Result<Value, Value>) -> Promise {
    match f() {
        Ok(value) => resolve(scheduler, value),
        Err(reason) => reject(scheduler, reason),
    }
}

/// Returns a `(promise, resolve, reject)` triple without requiring the
/// caller to write an executor closure. Supplemented from the teacher's
/// `Promise.withResolvers`.
pub fn with_resolvers(scheduler: &Rc<dyn Scheduler>) -> (Promise, ResolveFn, RejectFn) {
    let to = Handler::new_deferred();
    let promise = Promise::new(to.clone(), scheduler.clone());

    let to_resolve = to.clone();
    let scheduler_resolve = scheduler.clone();
    let resolve_fn: ResolveFn = Rc::new(move |value| to_resolve.resolve(&scheduler_resolve, value));

    let to_reject = to;
    let scheduler_reject = scheduler.clone();
    let reject_fn: RejectFn = Rc::new(move |reason| to_reject.reject(&scheduler_reject, reason));

    (promise, resolve_fn, reject_fn)
}
