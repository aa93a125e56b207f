// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::handler::Handler;
use crate::value::Value;

/// Forwards to another handler, optionally rebinding the receiver bound
/// to downstream user callbacks.
///
/// This is how `with`/`withThis` are implemented: rather than mutating
/// the wrapped handler, a `Following` wrapper sits in front of it and
/// substitutes the receiver on the way through `when`. It deliberately
/// breaks strict A+ compliance in exchange for ergonomic receiver-bound
/// callbacks.
#[derive(Debug)]
pub struct FollowingHandler {
    pub inner: Handler,
    pub receiver: Option<Value>,
}
