// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The resolution algorithm: classifying an arbitrary value into the
//! handler that represents its promise state.

use std::rc::Rc;

use crate::error::self_resolution_error;
use crate::handler::Handler;
use crate::scheduler::Scheduler;
use crate::tasks::AssimilateTask;
use crate::value::Value;

/// Classifies `value` into a [`Handler`].
///
/// `resolving` is the deferred handler attempting the resolution, if
/// any — passed so a promise resolved with itself can be detected and
/// turned into a rejection (I4) rather than an infinite chain.
///
/// Order of checks mirrors the source algorithm precisely:
/// 1. A trusted promise is adopted directly (or rejected, if it is the
///    very deferred doing the resolving).
/// 2. A value with object nature has its `then` property read, guarded;
///    a callable `then` schedules assimilation, anything else is treated
///    as a plain fulfillment of the object itself.
/// 3. Anything else is fulfilled as-is.
pub fn classify(scheduler: &Rc<dyn Scheduler>, value: Value, resolving: Option<&Handler>) -> Handler {
    match value {
        Value::Promise(promise) => {
            let handler = promise.handler();
            if let Some(resolving) = resolving {
                if handler.identical(resolving) {
                    return Handler::rejected(self_resolution_error());
                }
            }
            handler
        }
        Value::Object(object) => match object.then() {
            Err(err) => Handler::rejected(err),
            Ok(None) => Handler::fulfilled(Value::Object(object)),
            Ok(Some(then_method)) => {
                let deferred = Handler::new_deferred();
                scheduler.enqueue(Box::new(AssimilateTask {
                    target: deferred.clone(),
                    thenable: Value::Object(object),
                    then: then_method,
                }));
                deferred
            }
        },
        other => Handler::fulfilled(other),
    }
}
