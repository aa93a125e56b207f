// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The generic value carrier that flows through promises.
//!
//! A [`Value`] is deliberately a closed, three-way split rather than a
//! single `Rc<dyn Any>`: the resolution classifier (see
//! [`crate::classify`]) needs to know up front whether a value is a plain
//! payload with no `then` of its own, a foreign object that might expose
//! one, or a handle to one of this crate's own promises. Encoding that
//! split once as an enum tag avoids re-deriving it via runtime probing on
//! every resolve.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::promise::Promise;

/// Anything that can be called like a foreign `then` method.
///
/// Receives the thenable itself (as `this`) plus resolve/reject/notify
/// callbacks bound to the deferred doing the assimilation. Returns `Err`
/// if invoking the method threw synchronously.
pub trait ThenMethod: fmt::Debug {
    fn call(
        &self,
        thenable: Value,
        resolve: ResolveFn,
        reject: RejectFn,
        notify: NotifyFn,
    ) -> Result<(), Value>;
}

/// An object-natured value that may or may not expose a callable `then`.
///
/// `then()` models the guarded property read: `Err` means reading `then`
/// itself raised (the Rust analogue of a throwing property getter),
/// `Ok(None)` means no callable `then` was found, `Ok(Some(_))` hands back
/// the callable to invoke later from an assimilation task.
pub trait MaybeThenable: fmt::Debug {
    fn then(&self) -> Result<Option<Rc<dyn ThenMethod>>, Value>;
}

/// One-shot-friendly callback handles bound to a specific deferred.
/// Cloneable because a misbehaving thenable may hold onto and invoke them
/// more than once; idempotence at the deferred absorbs the extra calls.
pub type ResolveFn = Rc<dyn Fn(Value)>;
pub type RejectFn = Rc<dyn Fn(Value)>;
pub type NotifyFn = Rc<dyn Fn(Value)>;

/// A plain, non-thenable payload. Any `'static` type qualifies; the only
/// capability required of it is to be introspectable via [`Any`].
pub trait Payload: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Any value that can flow through a promise: a bare payload, an object
/// that might be thenable, a trusted promise, or one of the two values
/// the core itself ever manufactures (`undefined`, and the ordered lists
/// produced by [`crate::combinators::all`]).
#[derive(Clone)]
pub enum Value {
    Undefined,
    Plain(Rc<dyn Payload>),
    List(Rc<[Value]>),
    Object(Rc<dyn MaybeThenable>),
    Promise(Promise),
}

impl Value {
    pub fn plain<T: Any + fmt::Debug>(value: T) -> Self {
        Value::Plain(Rc::new(value))
    }

    pub fn list(values: Vec<Value>) -> Self {
        Value::List(values.into())
    }

    pub fn object(value: Rc<dyn MaybeThenable>) -> Self {
        Value::Object(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Plain(p) => p.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_promise(&self) -> bool {
        matches!(self, Value::Promise(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Plain(p) => write!(f, "{:?}", p),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(_) => write!(f, "<object>"),
            Value::Promise(_) => write!(f, "<promise>"),
        }
    }
}
