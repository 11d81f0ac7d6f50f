// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! This module is limited to:
//! - Connection initialization and migration execution
//! - SQLite-specific configuration (PRAGMA statements)
//! - `BEGIN IMMEDIATE` write transactions
//! - `sqlite_master` lookups for the email index

use diesel::connection::AnsiTransactionManager;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use super::EMAIL_INDEX_NAME;
use crate::diesel_schema::{contest, team, user};
use crate::error::PersistenceError;
use crate::id_allocator::IdTable;

/// SQLite-specific migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a writer waits for a competing lock before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Helper row struct for PRAGMA queries.
///
/// This is a justified use of raw SQL as Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Verifies that foreign key enforcement is enabled.
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Opens a transaction with `BEGIN IMMEDIATE`.
///
/// The reserved lock is taken before the id read, so two writers can never
/// observe the same maximum.
///
/// # Errors
///
/// Returns an error if the lock cannot be acquired within the busy timeout.
pub fn begin_immediate(conn: &mut SqliteConnection) -> QueryResult<()> {
    AnsiTransactionManager::begin_transaction_sql(conn, "BEGIN IMMEDIATE")
}

/// Reads the current maximum id of `table`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn locked_max_id(
    conn: &mut SqliteConnection,
    table: IdTable,
) -> Result<Option<i32>, PersistenceError> {
    let highest: Option<i32> = match table {
        IdTable::Contest => contest::table
            .select(max(contest::cid))
            .get_result(conn)?,
        IdTable::Team => team::table.select(max(team::teamid)).get_result(conn)?,
        IdTable::User => user::table.select(max(user::userid)).get_result(conn)?,
    };
    debug!(table = %table, ?highest, "Read current maximum id");
    Ok(highest)
}

/// Reports whether the `user_email` index exists.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn email_index_exists(conn: &mut SqliteConnection) -> Result<bool, PersistenceError> {
    let row: CountRow = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master \
         WHERE type = 'index' AND tbl_name = 'user' AND name = ?",
    )
    .bind::<Text, _>(EMAIL_INDEX_NAME)
    .get_result(conn)
    .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(row.count > 0)
}

/// Creates the `user_email` index.
///
/// # Errors
///
/// Returns an error if the DDL statement fails.
pub fn create_email_index(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    diesel::sql_query(format!(
        "CREATE INDEX IF NOT EXISTS {EMAIL_INDEX_NAME} ON user (email)"
    ))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running SQLite database migrations");
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Initialize a `SQLite` database at the given URL and run migrations.
///
/// # Arguments
///
/// * `database_url` - The `SQLite` database URL (e.g., `":memory:"` or file path)
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    info!("Initializing SQLite database at: {}", database_url);

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
        .execute(&mut conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Enable WAL mode for file-based `SQLite` databases.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}
