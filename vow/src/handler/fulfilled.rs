// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::value::Value;

/// A settled-fulfilled handler. Terminal: once built it never changes.
#[derive(Debug)]
pub struct FulfilledHandler {
    pub value: Value,
}
