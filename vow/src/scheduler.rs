// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The microtask abstraction the core depends on.
//!
//! The core never assumes a particular source of asynchrony: it only
//! requires an [`enqueue`](Scheduler::enqueue) capability that runs queued
//! tasks, in FIFO order, outside the caller's stack. [`ManualQueue`] is
//! the one concrete, test-controllable scheduler this crate ships.
//!
//! Tasks receive an owned `Rc<dyn Scheduler>` rather than a borrowed
//! reference: an assimilation task hands resolve/reject/notify closures
//! to a foreign `then` that may call them back at an arbitrary later
//! point, long after the task's own `run` call has returned, so those
//! closures need their own durable handle on the scheduler rather than
//! one borrowed for the duration of a single call.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of work the scheduler runs later.
pub trait Task {
    fn run(self: Box<Self>, scheduler: Rc<dyn Scheduler>);
}

/// An opaque task queue. Implementations must preserve FIFO ordering of
/// `enqueue` calls relative to when tasks actually run.
pub trait Scheduler {
    fn enqueue(&self, task: Box<dyn Task>);
}

/// A FIFO queue that only runs tasks when explicitly told to. Intended for
/// tests and for small command-line demonstrations that have no host event
/// loop of their own to piggyback on.
#[derive(Default)]
pub struct ManualQueue {
    queue: RefCell<VecDeque<Box<dyn Task>>>,
}

impl ManualQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every currently queued task, including tasks enqueued by tasks
    /// that ran earlier in the same drain, until the queue is empty.
    ///
    /// Takes `&Rc<Self>` rather than `&self` so it can hand each task an
    /// owned `Rc<dyn Scheduler>` pointing back at this same queue.
    pub fn drain(queue: &Rc<ManualQueue>) {
        loop {
            let next = queue.queue.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    let scheduler: Rc<dyn Scheduler> = queue.clone();
                    task.run(scheduler);
                }
                None => break,
            }
        }
    }

    /// Returns true if the queue currently has no pending tasks.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Scheduler for ManualQueue {
    fn enqueue(&self, task: Box<dyn Task>) {
        self.queue.borrow_mut().push_back(task);
    }
}
