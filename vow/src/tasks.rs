// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scheduler payloads the core ever enqueues.
//!
//! Each task carries exactly the arguments it needs precomputed at
//! construction time, and `run` is the only thing the scheduler ever
//! calls on it.

use std::rc::Rc;

use crate::handler::Handler;
use crate::reaction::Reaction;
use crate::scheduler::{Scheduler, Task};
use crate::value::{RejectFn, ResolveFn, ThenMethod, Value};

/// Runs a fulfillment reaction: applies `onFulfilled` (or passes the
/// value through unchanged) and resolves the downstream deferred with
/// whatever it returns, or rejects it with whatever it throws.
pub struct FulfillTask {
    pub reaction: Reaction,
    pub value: Value,
}

impl Task for FulfillTask {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>) {
        let result = match &self.reaction.on_fulfilled {
            Some(handler) => handler(self.value.clone(), self.reaction.receiver.as_ref()),
            None => Ok(self.value.clone()),
        };
        match result {
            Ok(value) => self.reaction.to.resolve(&scheduler, value),
            Err(reason) => self.reaction.to.reject(&scheduler, reason),
        }
    }
}

/// Runs a rejection reaction: applies `onRejected`, or re-raises the
/// reason unchanged (propagating the rejection) if absent.
pub struct RejectTask {
    pub reaction: Reaction,
    pub reason: Value,
}

impl Task for RejectTask {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>) {
        let result = match &self.reaction.on_rejected {
            Some(handler) => handler(self.reason.clone(), self.reaction.receiver.as_ref()),
            None => Err(self.reason.clone()),
        };
        match result {
            Ok(value) => self.reaction.to.resolve(&scheduler, value),
            Err(reason) => self.reaction.to.reject(&scheduler, reason),
        }
    }
}

/// Invokes a foreign thenable's `then` method, binding resolve/reject/
/// notify callbacks to `target`. A synchronous throw rejects `target`
/// directly; a normal return leaves it to the thenable to eventually
/// call one of the three callbacks (possibly much later, which is why
/// they each hold an owned clone of the scheduler).
pub struct AssimilateTask {
    pub target: Handler,
    pub thenable: Value,
    pub then: Rc<dyn ThenMethod>,
}

impl Task for AssimilateTask {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>) {
        let resolve: ResolveFn = {
            let target = self.target.clone();
            let scheduler = scheduler.clone();
            Rc::new(move |v: Value| target.resolve(&scheduler, v))
        };
        let reject: RejectFn = {
            let target = self.target.clone();
            let scheduler = scheduler.clone();
            Rc::new(move |v: Value| target.reject(&scheduler, v))
        };
        let notify: RejectFn = {
            let target = self.target.clone();
            let scheduler = scheduler.clone();
            Rc::new(move |v: Value| target.notify(&scheduler, v))
        };

        if let Err(err) = self.then.call(self.thenable, resolve, reject, notify) {
            self.target.reject(&scheduler, err);
        }
    }
}

/// Replays a progress notification snapshot taken at the moment `notify`
/// was called. A progress-handler exception is forwarded as the
/// notification payload, not as a rejection — this is a deliberate
/// asymmetry with fulfillment/rejection handling.
pub struct ProgressTask {
    pub consumers: Vec<Reaction>,
    pub value: Value,
}

impl Task for ProgressTask {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>) {
        for reaction in self.consumers {
            let out = match &reaction.on_progress {
                Some(handler) => match handler(self.value.clone(), reaction.receiver.as_ref()) {
                    Ok(v) => v,
                    Err(e) => e,
                },
                None => self.value.clone(),
            };
            reaction.to.notify(&scheduler, out);
        }
    }
}

/// Replays a `when` call against a handler that has since settled (or
/// been joined to another, possibly still-pending, handler).
pub struct ForwardingTask {
    pub target: Handler,
    pub reaction: Reaction,
}

impl Task for ForwardingTask {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>) {
        self.target.when(&scheduler, self.reaction);
    }
}

/// The escape hatch for conditions that have nowhere sensible to settle:
/// rethrows the stored error at the top level via the core's fatal
/// handler, analogous to a host surfacing an uncaught exception.
pub struct FatalErrorTask {
    pub error: Value,
    pub on_fatal: Rc<dyn Fn(Value)>,
}

impl Task for FatalErrorTask {
    fn run(self: Box<Self>, _scheduler: Rc<dyn Scheduler>) {
        (self.on_fatal)(self.error);
    }
}
