// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The permanently-pending handler.
//!
//! `Handler::Empty` carries no state: every instance is interchangeable,
//! which is what lets `race([])` return the exact same singleton identity
//! as `empty()` (see [`crate::core::Core::empty`]).
