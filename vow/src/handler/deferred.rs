// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::handler::Handler;
use crate::reaction::Reaction;

/// The mutable half of a pending promise: a consumer queue waiting to be
/// drained, or the handler this deferred has joined to.
///
/// "Joined" does not imply terminal: resolving a deferred with a promise
/// that is itself still pending joins to that promise's (also pending)
/// handler. Settlement, as observed by `when`, only happens once the
/// joined-to handler itself settles — which is naturally expressed here
/// because `Handler::Deferred` shares the same `Rc<RefCell<_>>` wherever
/// it is cloned.
pub enum DeferredState {
    Pending {
        queue: Vec<Reaction>,
        /// Set as soon as `resolve`/`reject` is called, even though the
        /// eventual settlement may still be pending (e.g. while an
        /// assimilation task runs). Guards idempotence (I1) without
        /// waiting for the joined-to handler to settle.
        is_resolved: bool,
    },
    Joined(Handler),
}

impl Default for DeferredState {
    fn default() -> Self {
        DeferredState::Pending {
            queue: Vec::new(),
            is_resolved: false,
        }
    }
}
