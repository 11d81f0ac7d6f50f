// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scoped write transactions.
//!
//! Diesel's `Connection::transaction` cannot tell a failed commit apart from
//! a failed step, and it opens SQLite transactions as `DEFERRED`. This
//! coordinator drives `AnsiTransactionManager` directly instead: the
//! transaction is opened by `PersistenceBackend::begin_write_transaction`,
//! every exit path ends in exactly one commit or rollback, and panics are
//! rolled back before they resume unwinding.

use std::panic::{self, AssertUnwindSafe};

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use tracing::{debug, error};

use crate::backend::PersistenceBackend;
use crate::error::PersistenceError;

/// Runs `work` inside one write transaction.
///
/// Commits only when `work` returns `Ok`. An `Err` or a panic rolls back; a
/// rollback failure is logged and the original error (or panic) wins.
///
/// # Errors
///
/// Returns `BeginFailed` if the transaction cannot be opened, the error from
/// `work`, or `CommitFailed` if the final commit fails.
pub fn run_unit_of_work<C, T, F>(conn: &mut C, label: &str, work: F) -> Result<T, PersistenceError>
where
    C: PersistenceBackend,
    F: FnOnce(&mut C) -> Result<T, PersistenceError>,
{
    conn.begin_write_transaction()
        .map_err(|e| PersistenceError::BeginFailed(e.to_string()))?;
    debug!(unit = label, "Transaction opened");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&mut *conn)));

    match outcome {
        Ok(Ok(value)) => {
            <AnsiTransactionManager as TransactionManager<C>>::commit_transaction(conn).map_err(
                |e| {
                    error!(unit = label, error = %e, "Commit failed");
                    PersistenceError::CommitFailed(e.to_string())
                },
            )?;
            debug!(unit = label, "Transaction committed");
            Ok(value)
        }
        Ok(Err(err)) => {
            debug!(unit = label, error = %err, "Rolling back transaction");
            roll_back(conn, label);
            Err(err)
        }
        Err(payload) => {
            error!(unit = label, "Unit of work panicked, rolling back");
            roll_back(conn, label);
            panic::resume_unwind(payload)
        }
    }
}

fn roll_back<C: PersistenceBackend>(conn: &mut C, label: &str) {
    if let Err(e) = <AnsiTransactionManager as TransactionManager<C>>::rollback_transaction(conn) {
        error!(unit = label, error = %e, "Rollback failed");
    }
}
