// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The small, closed set of error conditions the core itself can raise.
//!
//! Everything else that flows through a rejected promise is just a
//! [`Value`](crate::value::Value) supplied by user code; this module only
//! covers the handful of cases where the core manufactures the reason
//! itself.

use crate::value::Value;

/// Marks a value used in rejection position. Carries no information beyond
/// [`Value`] itself — rejection reasons are untyped, exactly like
/// fulfillment values.
pub type Reason = Value;

/// Builds the TypeError raised when a deferred is resolved with a promise
/// that (directly or through a chain of adoptions) follows itself.
///
/// Mirrors `Agent::create_exception_with_static_message(TypeError, ...)`:
/// a static message, no formatting machinery.
pub fn self_resolution_error() -> Value {
    Value::plain(TypeError("Tried to resolve a promise with itself."))
}

/// A minimal tagged error value. Distinguishable via [`Value::downcast_ref`]
/// so library consumers can recognize the core's own TypeError without
/// string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeError(pub &'static str);

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeError: {}", self.0)
    }
}
