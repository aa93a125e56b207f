// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single pending attachment made through `then`.
//!
//! The source language's `when` call carries seven arguments
//! (`onResolve`, `onNotify`, `taskContext`, `receiver`, `onFulfilled`,
//! `onRejected`, `onProgress`). `onResolve`/`onNotify`/`taskContext` are
//! all derivable from a single target deferred (`to`): resolving means
//! `to.resolve(..)`, notifying means `to.notify(..)`, and the task context
//! *is* `to`. A [`ForwardingTask`](crate::tasks::ForwardingTask) simply
//! owns a `Reaction` and replays it, so nothing from the original seven
//! arguments is actually lost by collapsing them into one record.

use std::rc::Rc;

use crate::handler::Handler;
use crate::value::Value;

/// A user reaction callback. Errors propagate via `Err` rather than a
/// Rust panic — a thrown exception in the source model is just the
/// callback declining to produce a value.
pub type Callback = Rc<dyn Fn(Value, Option<&Value>) -> Result<Value, Value>>;

#[derive(Clone)]
pub struct Reaction {
    /// The deferred this reaction ultimately resolves, rejects, or
    /// notifies.
    pub to: Handler,
    /// The receiver bound to user callbacks, if any (see `with`/`withThis`).
    pub receiver: Option<Value>,
    pub on_fulfilled: Option<Callback>,
    pub on_rejected: Option<Callback>,
    pub on_progress: Option<Callback>,
}

impl Reaction {
    pub fn with_receiver(mut self, receiver: Option<Value>) -> Self {
        if receiver.is_some() {
            self.receiver = receiver;
        }
        self
    }
}
