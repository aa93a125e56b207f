// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The public promise facade.
//!
//! A `Promise` is built two ways: through [`Core::promise`](crate::core::Core::promise),
//! which runs a user resolver, or internally by the core itself (every
//! combinator in [`crate::combinators`] wraps an already-known handler
//! directly). Both produce the exact same type with the exact same
//! chaining surface — the distinction is purely in how the handler
//! underneath came to exist.

use std::rc::Rc;

use crate::handler::{Handler, StateSnapshot};
use crate::reaction::{Callback, Reaction};
use crate::scheduler::Scheduler;
use crate::value::Value;

#[derive(Clone)]
pub struct Promise {
    handler: Handler,
    scheduler: Rc<dyn Scheduler>,
}

impl Promise {
    pub(crate) fn new(handler: Handler, scheduler: Rc<dyn Scheduler>) -> Self {
        Promise { handler, scheduler }
    }

    pub(crate) fn handler(&self) -> Handler {
        self.handler.clone()
    }

    /// A synchronous view of the promise's current state. Does not force
    /// any scheduled work to run.
    pub fn inspect(&self) -> StateSnapshot {
        self.handler.inspect()
    }

    /// Attaches fulfillment, rejection, and/or progress reactions and
    /// returns a new promise chained off the result. Absent handlers
    /// pass their respective settlement through unchanged.
    pub fn then(
        &self,
        on_fulfilled: Option<Callback>,
        on_rejected: Option<Callback>,
        on_progress: Option<Callback>,
    ) -> Promise {
        let to = Handler::new_deferred();
        let reaction = Reaction {
            to: to.clone(),
            receiver: self.handler.receiver(),
            on_fulfilled,
            on_rejected,
            on_progress,
        };
        self.handler.when(&self.scheduler, reaction);
        Promise::new(to, self.scheduler.clone())
    }

    /// Shortcut for `then(None, Some(on_rejected), None)`.
    pub fn catch(&self, on_rejected: Callback) -> Promise {
        self.then(None, Some(on_rejected), None)
    }

    /// Alias for [`Promise::catch`].
    pub fn otherwise(&self, on_rejected: Callback) -> Promise {
        self.catch(on_rejected)
    }

    /// Returns a chainable promise whose subsequent reactions run with
    /// `this_arg` bound as their receiver. A non-standard extension; see
    /// the design notes on receiver rebinding.
    pub fn with(&self, this_arg: Value) -> Promise {
        let handler = Handler::following(self.handler.clone(), this_arg);
        Promise::new(handler, self.scheduler.clone())
    }

    /// Alias for [`Promise::with`].
    pub fn with_this(&self, this_arg: Value) -> Promise {
        self.with(this_arg)
    }

    /// Whether `self` and `other` ultimately name the same underlying
    /// handler — the `===` identity check the testable-properties
    /// section uses to pin down `resolve(X) === X` and `race([]) ===
    /// empty()`.
    pub fn is_identical(&self, other: &Promise) -> bool {
        self.handler.identical(&other.handler)
    }
}
