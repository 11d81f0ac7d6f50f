// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only lookups.
//!
//! Every lookup returns `Ok(None)` (or an empty list) for absence; absence is
//! never an error at this layer.

pub mod contests;
pub mod registrations;
