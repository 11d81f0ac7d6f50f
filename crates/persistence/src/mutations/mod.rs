// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Single-table writes.
//!
//! Each mutation maps its Diesel error to `InsertFailed` or `DeleteFailed`
//! naming the table, so the unit of work that aborts can report which step
//! broke. None of them opens a transaction.

pub mod contests;
pub mod registrations;
