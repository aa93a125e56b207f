// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single-threaded Promise/A+-style asynchronous value core.
//!
//! This crate implements the *hard part* of a promises library: the
//! handler state machine, the algorithm that assimilates arbitrary
//! user-supplied thenables into trusted promises, the chaining rule that
//! derives a new promise from a user transformation, and the scheduling
//! discipline that guarantees reactions run in a later turn rather than
//! synchronously. It deliberately does not ship a microtask scheduler of
//! its own beyond [`scheduler::ManualQueue`] — callers supply one by
//! implementing [`scheduler::Scheduler`], the same way the core depends
//! on an opaque `enqueue(task)` capability rather than a concrete event
//! loop.
//!
//! Start at [`Core`]: it bundles the scheduler capability with the
//! promise-constructing surface described in the crate's design
//! document. Promises themselves ([`Promise`]) are cheap, `Clone`able
//! handles produced by `Core` or by chaining off another promise with
//! [`Promise::then`].
//!
//! ```
//! use std::rc::Rc;
//! use vow::core::Core;
//! use vow::scheduler::{ManualQueue, Scheduler};
//! use vow::value::Value;
//!
//! let queue = Rc::new(ManualQueue::new());
//! let scheduler: Rc<dyn Scheduler> = queue.clone();
//! let core = Core::new(scheduler);
//!
//! let promise = core
//!     .promise(|resolve, _reject, _notify| {
//!         resolve(Value::plain(42_i32));
//!         Ok(())
//!     })
//!     .then(
//!         Some(Rc::new(|v: Value, _receiver: Option<&Value>| {
//!             Ok(Value::plain(v.downcast_ref::<i32>().copied().unwrap_or(0) + 1))
//!         })),
//!         None,
//!         None,
//!     );
//!
//! ManualQueue::drain(&queue);
//! ```

pub mod classify;
pub mod combinators;
pub mod core;
pub mod error;
pub mod handler;
pub mod promise;
pub mod reaction;
pub mod scheduler;
pub mod tasks;
pub mod value;

pub use core::Core;
pub use promise::Promise;
