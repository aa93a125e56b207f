// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The factory contract of §6: an explicit, owned context object threaded
//! through the API rather than ambient global state, analogous to the
//! teacher's `Agent`/`Options` construction story.
//!
//! A [`Core`] bundles the one thing the algorithmic core actually
//! depends on (a [`Scheduler`]) with the small amount of bookkeeping that
//! does not belong on every individual promise: the lazily-built `empty()`
//! singleton, and the fatal-error sink for conditions that have nowhere
//! sensible to settle.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::combinators;
use crate::handler::Handler;
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::tasks::FatalErrorTask;
use crate::value::{NotifyFn, RejectFn, ResolveFn, Value};

/// A resolver passed to [`Core::promise`], invoked synchronously with
/// resolve/reject/notify callbacks bound to the new promise's deferred.
/// Mirrors `resolver(resolve, reject, notify)` from §6: a thrown
/// exception (here, an `Err` return) becomes a rejection rather than
/// escaping the constructor.
pub type Resolver = dyn FnOnce(ResolveFn, RejectFn, NotifyFn) -> Result<(), Value>;

/// The environment configuration of §6's factory contract: a required
/// scheduler plus an optional decoration hook.
pub struct Core {
    scheduler: Rc<dyn Scheduler>,
    empty: OnceCell<Promise>,
    on_fatal: Rc<dyn Fn(Value)>,
}

impl Core {
    /// Builds a `Core` from the required `scheduler` capability, using the
    /// default fatal-error sink (a panic, since there is no host runtime
    /// here to hand an uncaught error to).
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Core {
            scheduler,
            empty: OnceCell::new(),
            on_fatal: Rc::new(|err| panic!("unhandled fatal error in vow core: {err:?}")),
        }
    }

    /// Builds a `Core`, then applies `decorate` to it. The closest
    /// faithful rendering of "`decorate` is invoked on the constructed
    /// Promise type; its return value replaces it" in a language with no
    /// shared, mutable class object to patch — here the transform runs
    /// over the fully-constructed `Core` value itself.
    pub fn with_decoration(scheduler: Rc<dyn Scheduler>, decorate: impl FnOnce(Core) -> Core) -> Self {
        decorate(Core::new(scheduler))
    }

    /// Overrides the sink the fatal-error path hands uncaught errors to.
    /// Primarily for embedders that want to surface a fatal error as
    /// something other than a panic (logging it and aborting, for
    /// instance).
    pub fn with_fatal_handler(mut self, on_fatal: impl Fn(Value) + 'static) -> Self {
        self.on_fatal = Rc::new(on_fatal);
        self
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// Constructs a new promise by running `resolver` synchronously. Any
    /// `Err` the resolver returns (the Rust analogue of a thrown
    /// exception) rejects the new promise instead of propagating.
    pub fn promise(&self, resolver: impl FnOnce(ResolveFn, RejectFn, NotifyFn) -> Result<(), Value>) -> Promise {
        let to = Handler::new_deferred();
        let promise = Promise::new(to.clone(), self.scheduler.clone());

        let resolve_fn: ResolveFn = {
            let to = to.clone();
            let scheduler = self.scheduler.clone();
            Rc::new(move |v: Value| to.resolve(&scheduler, v))
        };
        let reject_fn: RejectFn = {
            let to = to.clone();
            let scheduler = self.scheduler.clone();
            Rc::new(move |v: Value| to.reject(&scheduler, v))
        };
        let notify_fn: NotifyFn = {
            let to = to.clone();
            let scheduler = self.scheduler.clone();
            Rc::new(move |v: Value| to.notify(&scheduler, v))
        };

        if let Err(err) = resolver(resolve_fn, reject_fn, notify_fn) {
            to.reject(&self.scheduler, err);
        }

        promise
    }

    /// If `x` is already a trusted promise, returns it unchanged; else
    /// wraps the classified value in a fresh promise.
    pub fn resolve(&self, x: Value) -> Promise {
        combinators::resolve(&self.scheduler, x)
    }

    /// A promise wrapping an already-rejected handler.
    pub fn reject(&self, reason: Value) -> Promise {
        combinators::reject(&self.scheduler, reason)
    }

    /// The singleton permanently-pending promise. Built lazily on first
    /// access behind a `OnceCell` so there is no ordering hazard between
    /// `Core` construction and the singleton's own construction — the
    /// explicit resolution Design Note §9's open question calls for.
    pub fn empty(&self) -> Promise {
        self.empty
            .get_or_init(|| Promise::new(Handler::Empty, self.scheduler.clone()))
            .clone()
    }

    /// Fulfills with an array of results once every input has fulfilled,
    /// preserving index order; rejects as soon as any input rejects.
    pub fn all(&self, xs: Vec<Value>) -> Promise {
        combinators::all(&self.scheduler, xs)
    }

    /// Settles with whichever input settles first. An empty input
    /// returns the same singleton `empty()` identity.
    pub fn race(&self, xs: Vec<Value>) -> Promise {
        combinators::race(&self.scheduler, xs, &self.empty())
    }

    /// Calls `f` synchronously and funnels its outcome through the same
    /// resolve/reject path `resolve`/`reject` would use.
    pub fn try_fn(&self, f: impl FnOnce() -> Result<Value, Value>) -> Promise {
        combinators::try_fn(&self.scheduler, f)
    }

    /// Returns a `(promise, resolve, reject)` triple without requiring
    /// the caller to write an executor closure.
    pub fn with_resolvers(&self) -> (Promise, ResolveFn, RejectFn) {
        combinators::with_resolvers(&self.scheduler)
    }

    /// The escape hatch for conditions that have nowhere sensible to
    /// settle: enqueues a task that rethrows `err` via the fatal-error
    /// sink, outside of any promise's resolve/reject path. The core
    /// itself never uses this for ordinary rejections.
    pub fn fatal(&self, err: Value) {
        self.scheduler.enqueue(Box::new(FatalErrorTask {
            error: err,
            on_fatal: self.on_fatal.clone(),
        }));
    }
}
