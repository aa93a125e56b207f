// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handler polymorphism, re-architected as a tagged enum.
//!
//! The five handler kinds below are the single axis of polymorphism the
//! whole core turns on. Each used to be reached through prototype
//! dispatch; here the dispatch is a `match` in this module, and the
//! no-op behaviors a terminal variant has for e.g. `notify` fall out of
//! the match arms directly instead of needing an explicit empty override.

mod deferred;
mod empty;
mod following;
mod fulfilled;
mod rejected;

pub use deferred::DeferredState;
pub use following::FollowingHandler;
pub use fulfilled::FulfilledHandler;
pub use rejected::RejectedHandler;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::self_resolution_error;
use crate::reaction::Reaction;
use crate::scheduler::Scheduler;
use crate::tasks::{ForwardingTask, FulfillTask, ProgressTask, RejectTask};
use crate::value::Value;

/// A synchronous snapshot of a handler's current state, as returned by
/// `inspect`.
#[derive(Debug, Clone)]
pub enum StateSnapshot {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

/// The polymorphic handler behind every promise.
#[derive(Clone)]
pub enum Handler {
    Fulfilled(Rc<FulfilledHandler>),
    Rejected(Rc<RejectedHandler>),
    Deferred(Rc<RefCell<DeferredState>>),
    Following(Rc<FollowingHandler>),
    Empty,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Fulfilled(h) => f.debug_tuple("Fulfilled").field(&h.value).finish(),
            Handler::Rejected(h) => f.debug_tuple("Rejected").field(&h.reason).finish(),
            Handler::Deferred(_) => write!(f, "Deferred"),
            Handler::Following(_) => write!(f, "Following"),
            Handler::Empty => write!(f, "Empty"),
        }
    }
}

impl Handler {
    pub fn fulfilled(value: Value) -> Self {
        Handler::Fulfilled(Rc::new(FulfilledHandler { value }))
    }

    pub fn rejected(reason: Value) -> Self {
        Handler::Rejected(Rc::new(RejectedHandler { reason }))
    }

    pub fn new_deferred() -> Self {
        Handler::Deferred(Rc::new(RefCell::new(DeferredState::default())))
    }

    pub fn following(inner: Handler, receiver: Value) -> Self {
        Handler::Following(Rc::new(FollowingHandler {
            inner,
            receiver: Some(receiver),
        }))
    }

    /// Collapses chains of `Following`/joined `Deferred` to their current
    /// tail: a terminal `Fulfilled`/`Rejected`/`Empty`, or a `Deferred`
    /// that is still genuinely pending.
    pub fn traverse(&self) -> Handler {
        match self {
            Handler::Following(f) => f.inner.traverse(),
            Handler::Deferred(state) => match &*state.borrow() {
                DeferredState::Pending { .. } => self.clone(),
                DeferredState::Joined(h) => h.traverse(),
            },
            _ => self.clone(),
        }
    }

    /// The receiver a `Following` wrapper rebinds, if any.
    pub fn receiver(&self) -> Option<Value> {
        match self {
            Handler::Following(f) => f.receiver.clone(),
            _ => None,
        }
    }

    pub fn inspect(&self) -> StateSnapshot {
        match self.traverse() {
            Handler::Fulfilled(h) => StateSnapshot::Fulfilled(h.value.clone()),
            Handler::Rejected(h) => StateSnapshot::Rejected(h.reason.clone()),
            Handler::Deferred(_) | Handler::Empty => StateSnapshot::Pending,
            Handler::Following(_) => unreachable!("traverse never returns Following"),
        }
    }

    /// Returns true if `self` and `other` ultimately name the same
    /// underlying handler object. Used by the resolution classifier's
    /// self-resolution cycle check (I4).
    pub fn identical(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Fulfilled(a), Handler::Fulfilled(b)) => Rc::ptr_eq(a, b),
            (Handler::Rejected(a), Handler::Rejected(b)) => Rc::ptr_eq(a, b),
            (Handler::Deferred(a), Handler::Deferred(b)) => Rc::ptr_eq(a, b),
            (Handler::Following(a), Handler::Following(b)) => Rc::ptr_eq(a, b),
            (Handler::Empty, Handler::Empty) => true,
            _ => false,
        }
    }

    /// Schedules `reaction` against this handler's eventual state. Never
    /// invokes any callback synchronously (I2).
    pub fn when(&self, scheduler: &Rc<dyn Scheduler>, reaction: Reaction) {
        match self {
            Handler::Fulfilled(h) => {
                scheduler.enqueue(Box::new(FulfillTask {
                    reaction,
                    value: h.value.clone(),
                }));
            }
            Handler::Rejected(h) => {
                scheduler.enqueue(Box::new(RejectTask {
                    reaction,
                    reason: h.reason.clone(),
                }));
            }
            Handler::Following(f) => {
                let reaction = reaction.with_receiver(f.receiver.clone());
                f.inner.traverse().when(scheduler, reaction);
            }
            Handler::Empty => {
                // Permanently pending: the reaction is never invoked.
            }
            Handler::Deferred(state) => {
                let mut state = state.borrow_mut();
                match &mut *state {
                    DeferredState::Pending { queue, .. } => queue.push(reaction),
                    DeferredState::Joined(h) => {
                        let h = h.clone();
                        drop(state);
                        h.when(scheduler, reaction);
                    }
                }
            }
        }
    }

    /// Resolves a deferred handler with an arbitrary value, running it
    /// through the resolution classifier. No-op on any other variant, and
    /// a no-op if this deferred has already been resolved (I1).
    pub fn resolve(&self, scheduler: &Rc<dyn Scheduler>, value: Value) {
        if let Handler::Deferred(state) = self {
            let already_resolved = {
                let mut state = state.borrow_mut();
                match &mut *state {
                    DeferredState::Pending { is_resolved, .. } => {
                        if *is_resolved {
                            true
                        } else {
                            *is_resolved = true;
                            false
                        }
                    }
                    DeferredState::Joined(_) => true,
                }
            };
            if already_resolved {
                return;
            }
            let classified = crate::classify::classify(scheduler, value, Some(self));
            self.join(scheduler, classified);
        }
    }

    /// Rejects a deferred handler directly, bypassing the classifier.
    /// No-op on any other variant or if already resolved (I1).
    pub fn reject(&self, scheduler: &Rc<dyn Scheduler>, reason: Value) {
        if let Handler::Deferred(state) = self {
            let already_resolved = {
                let mut state = state.borrow_mut();
                match &mut *state {
                    DeferredState::Pending { is_resolved, .. } => {
                        if *is_resolved {
                            true
                        } else {
                            *is_resolved = true;
                            false
                        }
                    }
                    DeferredState::Joined(_) => true,
                }
            };
            if already_resolved {
                return;
            }
            self.join(scheduler, Handler::rejected(reason));

            debug_assert!(matches!(self.traverse(), Handler::Rejected(_)));
        }
    }

    /// Joins a pending deferred to `target`, draining its consumer queue
    /// against `target`'s traversal. `target` may itself still be
    /// pending (adopting another unsettled promise reparents the queue
    /// onto it rather than settling anything yet).
    fn join(&self, scheduler: &Rc<dyn Scheduler>, target: Handler) {
        let Handler::Deferred(state) = self else {
            return;
        };
        // `classify`'s identity check only catches a direct
        // `resolve(self_promise)`; a `Following` rebind or a longer
        // `Deferred`-to-`Deferred` chain back to `self` slips past it
        // untraversed. Checking the fully traversed target here catches
        // self-resolution at any depth instead.
        let traversed = target.traverse();
        let traversed = if self.identical(&traversed) {
            Handler::rejected(self_resolution_error())
        } else {
            traversed
        };
        let queue = {
            let mut state = state.borrow_mut();
            let queue = match &mut *state {
                DeferredState::Pending { queue, .. } => std::mem::take(queue),
                DeferredState::Joined(_) => Vec::new(),
            };
            *state = DeferredState::Joined(traversed.clone());
            queue
        };
        for reaction in queue {
            scheduler.enqueue(Box::new(ForwardingTask {
                target: traversed.clone(),
                reaction,
            }));
        }
    }

    /// Delivers a progress notification to every consumer currently
    /// queued. Dropped entirely once the deferred has settled, and
    /// invisible to consumers attached after this call returns.
    pub fn notify(&self, scheduler: &Rc<dyn Scheduler>, value: Value) {
        if let Handler::Deferred(state) = self {
            let snapshot = match &*state.borrow() {
                DeferredState::Pending { queue, .. } => Some(queue.clone()),
                DeferredState::Joined(_) => None,
            };
            if let Some(snapshot) = snapshot {
                scheduler.enqueue(Box::new(ProgressTask {
                    consumers: snapshot,
                    value,
                }));
            }
        }
    }
}
