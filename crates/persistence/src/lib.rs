// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional registration store for DOMjudge-style contest databases.
//!
//! This crate creates and removes the linked rows that make up a contest
//! registration (team, user, role assignment, contest membership), creates
//! and tears down contests, rotates participant secrets and reads cached
//! scoreboards. It is built on Diesel and supports multiple database
//! backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`**: Used for development and all standard tests. Migrations
//!   in `migrations/` are applied on open.
//! - **`MariaDB`/`MySQL`**: The production target: a live DOMjudge
//!   database. The schema is owned by DOMjudge, so opening a `mysql://` URL
//!   runs no migrations. `migrations_mysql/` is only applied by the opt-in
//!   validation tests.
//!
//! To run `MySQL` validation tests:
//! ```bash
//! cargo xtask test-mariadb
//! ```
//!
//! ## Write Model
//!
//! Every multi-row write runs in one transaction opened by
//! `transaction::run_unit_of_work`. Ids are application-assigned
//! (`highest + 1`) under a write lock held until commit, and every insert
//! that may already have happened goes through `guard::insert_if_absent`.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use contestreg_domain::{
    Contest, Email, IssuedCredentials, NewContest, Standing, UserAccount, UserKey,
};
use diesel::{MysqlConnection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Scheme prefix selecting the `MySQL`/`MariaDB` backend in `open`.
pub const MYSQL_URL_PREFIX: &str = "mysql://";

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_mysql` taking `&mut MysqlConnection`
///
/// Diesel needs a concrete backend type to build a query, so leaf functions
/// cannot be generic over the connection. Code above the leaves reaches them
/// through `store::RegistryStore`.
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     pub fn find_team(conn: &mut _, team_id: i32) -> Result<Option<TeamRow>, PersistenceError> {
///         Ok(team::table.find(team_id).select(TeamRow::as_select()).first(conn).optional()?)
///     }
/// }
/// ```
///
/// This generates `find_team_sqlite` and `find_team_mysql`.
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            // Generate MySQL version
            $(#[$meta])*
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod backend;
mod contest_lifecycle;
mod credentials;
mod data_models;
mod diesel_schema;
mod error;
mod guard;
mod id_allocator;
mod mutations;
mod queries;
mod registration;
mod removal;
mod results;
mod schema_maintenance;
mod store;
mod transaction;

#[cfg(test)]
mod tests;

pub use contest_lifecycle::{ContestCreation, ContestTeardown};
pub use credentials::{
    SECRET_HASH_COST, SECRET_LENGTH, generate_secret, hash_secret, verify_secret,
};
pub use error::{PersistenceError, Table};
pub use registration::Registration;
pub use removal::Deregistration;

use store::RegistryStore;

/// Internal enum for backend-specific database connections.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    Mysql(MysqlConnection),
}

/// The registration store.
///
/// Backend selection happens once at construction time and is transparent to
/// callers. Operations run sequentially on the one connection; the handle
/// also remembers whether the `user_email` index has been verified.
pub struct Persistence {
    pub(crate) conn: BackendConnection,
    email_index_verified: bool,
}

impl Persistence {
    const fn from_connection(conn: BackendConnection) -> Self {
        Self {
            conn,
            email_index_verified: false,
        }
    }

    /// Opens the store named by a connection string.
    ///
    /// `mysql://…` URLs connect to an existing DOMjudge database; anything
    /// else is treated as a `SQLite` file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(conn_str: &str) -> Result<Self, PersistenceError> {
        if conn_str.starts_with(MYSQL_URL_PREFIX) {
            Self::new_with_mysql(conn_str)
        } else {
            Self::new_with_file(conn_str)
        }
    }

    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(BackendConnection::Sqlite(conn)))
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(BackendConnection::Sqlite(conn)))
    }

    /// Connects to an existing `MySQL`/`MariaDB` database. No migrations run.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or foreign keys are disabled.
    pub fn new_with_mysql(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::connect(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(BackendConnection::Mysql(conn)))
    }

    /// Connects to a scratch `MySQL`/`MariaDB` database and applies the
    /// embedded schema.
    ///
    /// # Errors
    ///
    /// Returns an error if connection or migration fails.
    pub fn new_with_mysql_migrated(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::initialize_database(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self::from_connection(BackendConnection::Mysql(conn)))
    }

    /// Makes sure the `user_email` index exists.
    ///
    /// The catalog is consulted once per handle; later calls return
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query or index creation fails.
    pub fn ensure_email_index(&mut self) -> Result<(), PersistenceError> {
        if self.email_index_verified {
            return Ok(());
        }
        let created: bool = match &mut self.conn {
            BackendConnection::Sqlite(conn) => schema_maintenance::ensure_email_index(conn)?,
            BackendConnection::Mysql(conn) => schema_maintenance::ensure_email_index(conn)?,
        };
        if !created {
            info!("Index on user.email already present");
        }
        self.email_index_verified = true;
        Ok(())
    }

    /// Reports whether `ensure_email_index` has succeeded on this handle.
    #[must_use]
    pub const fn email_index_verified(&self) -> bool {
        self.email_index_verified
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Finds a contest by short name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_contest(&mut self, short_name: &str) -> Result<Option<Contest>, PersistenceError> {
        let row = match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.find_contest_by_short_name(short_name)?,
            BackendConnection::Mysql(conn) => conn.find_contest_by_short_name(short_name)?,
        };
        Ok(row.map(Contest::from))
    }

    /// Finds a contest by short name, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ContestNotFound` or a query error.
    pub fn resolve_contest(&mut self, short_name: &str) -> Result<Contest, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => contest_lifecycle::resolve_contest(conn, short_name),
            BackendConnection::Mysql(conn) => contest_lifecycle::resolve_contest(conn, short_name),
        }
    }

    /// Finds a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_user_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<UserAccount>, PersistenceError> {
        let row = match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.find_user_by_email(email.as_str())?,
            BackendConnection::Mysql(conn) => conn.find_user_by_email(email.as_str())?,
        };
        Ok(row.map(UserAccount::from))
    }

    // ========================================================================
    // Registrations
    // ========================================================================

    /// Registers `email` for a contest: team, user, role and membership in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error or `CommitFailed`; nothing is
    /// written in that case.
    pub fn register(
        &mut self,
        email: &Email,
        contest_id: i32,
    ) -> Result<Registration, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => registration::register(conn, email, contest_id),
            BackendConnection::Mysql(conn) => registration::register(conn, email, contest_id),
        }
    }

    /// Removes the registration of the user identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound`, `DeleteFailed` naming the table, or
    /// `CommitFailed`; nothing is removed in that case.
    pub fn deregister(&mut self, key: &UserKey) -> Result<Deregistration, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => removal::deregister(conn, key),
            BackendConnection::Mysql(conn) => removal::deregister(conn, key),
        }
    }

    /// Issues a new secret to the user registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound`, `SecretHashFailed`, or a store error.
    pub fn rotate_secret(&mut self, email: &Email) -> Result<IssuedCredentials, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => registration::rotate_secret(conn, email),
            BackendConnection::Mysql(conn) => registration::rotate_secret(conn, email),
        }
    }

    // ========================================================================
    // Contests
    // ========================================================================

    /// Creates a contest unless its short name already exists.
    ///
    /// Ensures the `user_email` index first.
    ///
    /// # Errors
    ///
    /// Returns `NoRows` if the store has no contest yet, `InsertFailed`,
    /// `CommitFailed`, or an index maintenance error.
    pub fn create_contest(
        &mut self,
        contest: &NewContest,
    ) -> Result<ContestCreation, PersistenceError> {
        self.ensure_email_index()?;
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => contest_lifecycle::create_contest(conn, contest),
            BackendConnection::Mysql(conn) => contest_lifecycle::create_contest(conn, contest),
        }
    }

    /// Inserts a contest under an explicit id unless its short name exists.
    ///
    /// This is the bootstrap path for stores without any contest.
    ///
    /// # Errors
    ///
    /// Returns `InsertFailed` or `CommitFailed`.
    pub fn seed_contest(
        &mut self,
        contest_id: i32,
        contest: &NewContest,
    ) -> Result<ContestCreation, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                contest_lifecycle::seed_contest(conn, contest_id, contest)
            }
            BackendConnection::Mysql(conn) => {
                contest_lifecycle::seed_contest(conn, contest_id, contest)
            }
        }
    }

    /// Deregisters every team of a contest, then deletes the contest.
    ///
    /// # Errors
    ///
    /// Returns `ContestNotFound`, a listing error, or the contest delete
    /// error. Per-team failures are reported in the returned teardown.
    pub fn delete_contest_full(
        &mut self,
        short_name: &str,
    ) -> Result<ContestTeardown, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                contest_lifecycle::delete_contest_full(conn, short_name)
            }
            BackendConnection::Mysql(conn) => {
                contest_lifecycle::delete_contest_full(conn, short_name)
            }
        }
    }

    /// Returns the ranked cached scoreboard of a contest.
    ///
    /// # Errors
    ///
    /// Returns `ContestNotFound` or a query error.
    pub fn fetch_results(&mut self, short_name: &str) -> Result<Vec<Standing>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => results::fetch_results(conn, short_name),
            BackendConnection::Mysql(conn) => results::fetch_results(conn, short_name),
        }
    }
}
