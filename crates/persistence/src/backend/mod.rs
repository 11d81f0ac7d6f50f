// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates the pieces that cannot be expressed in
//! backend-agnostic Diesel DSL:
//!
//! - Connection initialization and migration execution
//! - Backend-specific configuration (PRAGMA, session variables)
//! - How a write transaction is opened
//! - The locking read used for id allocation
//! - Catalog lookups for the `user_email` index
//!
//! All registration queries and mutations live in `queries/` and `mutations/`
//! and are generated for both backends by `backend_fn!`.

pub mod mysql;
pub mod sqlite;

use diesel::connection::AnsiTransactionManager;
use diesel::{Connection, MysqlConnection, SqliteConnection};

use crate::error::PersistenceError;
use crate::id_allocator::IdTable;

/// Name of the secondary index on `user.email`.
pub const EMAIL_INDEX_NAME: &str = "user_email";

/// Trait for backend-specific operations.
///
/// Implemented for both `SqliteConnection` and `MysqlConnection`. The
/// transaction coordinator drives `AnsiTransactionManager` directly, so
/// both backends are pinned to it.
pub trait PersistenceBackend: Connection<TransactionManager = AnsiTransactionManager> {
    /// Opens a transaction that holds the write lock from its first statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    fn begin_write_transaction(&mut self) -> diesel::QueryResult<()>;

    /// Reads the highest id in `table` so that no concurrent writer can
    /// allocate the same value before this transaction ends.
    ///
    /// Must be called inside a transaction opened by
    /// `begin_write_transaction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn locked_max_id(&mut self, table: IdTable) -> Result<Option<i32>, PersistenceError>;

    /// Reports whether the `user_email` index exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    fn email_index_exists(&mut self) -> Result<bool, PersistenceError>;

    /// Creates the `user_email` index.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL statement fails.
    fn create_email_index(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn begin_write_transaction(&mut self) -> diesel::QueryResult<()> {
        sqlite::begin_immediate(self)
    }

    fn locked_max_id(&mut self, table: IdTable) -> Result<Option<i32>, PersistenceError> {
        sqlite::locked_max_id(self, table)
    }

    fn email_index_exists(&mut self) -> Result<bool, PersistenceError> {
        sqlite::email_index_exists(self)
    }

    fn create_email_index(&mut self) -> Result<(), PersistenceError> {
        sqlite::create_email_index(self)
    }
}

impl PersistenceBackend for MysqlConnection {
    fn begin_write_transaction(&mut self) -> diesel::QueryResult<()> {
        mysql::begin(self)
    }

    fn locked_max_id(&mut self, table: IdTable) -> Result<Option<i32>, PersistenceError> {
        mysql::locked_max_id(self, table)
    }

    fn email_index_exists(&mut self) -> Result<bool, PersistenceError> {
        mysql::email_index_exists(self)
    }

    fn create_email_index(&mut self) -> Result<(), PersistenceError> {
        mysql::create_email_index(self)
    }
}
