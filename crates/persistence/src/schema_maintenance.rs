// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::info;

use crate::backend::{EMAIL_INDEX_NAME, PersistenceBackend};
use crate::error::PersistenceError;

/// Creates the `user_email` index when the catalog shows it missing.
///
/// Returns `true` if the index was created by this call.
///
/// # Errors
///
/// Returns an error if the catalog query or the DDL fails.
pub fn ensure_email_index<C: PersistenceBackend>(conn: &mut C) -> Result<bool, PersistenceError> {
    if conn.email_index_exists()? {
        return Ok(false);
    }
    conn.create_email_index()?;
    info!(index = EMAIL_INDEX_NAME, "Created index on user.email");
    Ok(true)
}
