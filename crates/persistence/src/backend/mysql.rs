// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! MySQL/MariaDB-specific backend utilities.
//!
//! Production stores are DOMjudge databases whose schema is owned by
//! DOMjudge itself, so `connect` never runs migrations. The embedded
//! `migrations_mysql/` set exists only for validation runs against a scratch
//! `MariaDB` instance (`cargo xtask test-mariadb`) and must stay semantically
//! identical to the `SQLite` migrations.
//!
//! Id allocation relies on `SELECT ... FOR UPDATE` against the InnoDB
//! primary key, which blocks concurrent allocators until commit.

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use super::EMAIL_INDEX_NAME;
use crate::diesel_schema::{contest, team, user};
use crate::error::PersistenceError;
use crate::id_allocator::IdTable;

/// `MySQL`-specific migrations.
pub const MYSQL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_mysql");

/// Result type for foreign key check query.
#[derive(QueryableByName)]
struct ForeignKeyCheck {
    #[diesel(sql_type = Integer)]
    fk_checks: i32,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Connects to an existing `MySQL`/`MariaDB` database without touching its
/// schema.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub fn connect(database_url: &str) -> Result<MysqlConnection, PersistenceError> {
    info!("Connecting to MySQL database");
    MysqlConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))
}

/// Connects to a `MySQL` database and runs the embedded migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<MysqlConnection, PersistenceError> {
    let mut conn: MysqlConnection = connect(database_url)?;
    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    Ok(conn)
}

/// Run pending migrations on the provided `MySQL` connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut MysqlConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running MySQL database migrations");
    conn.run_pending_migrations(MYSQL_MIGRATIONS)?;
    Ok(())
}

/// Verify that foreign key enforcement is enabled on `MySQL`.
///
/// # Errors
///
/// Returns an error if verification fails.
pub fn verify_foreign_key_enforcement(conn: &mut MysqlConnection) -> Result<(), PersistenceError> {
    // NOTE: This is raw SQL (justified - Diesel has no system variable query DSL)
    let result: Result<ForeignKeyCheck, _> =
        diesel::sql_query("SELECT @@foreign_key_checks AS fk_checks").get_result(conn);

    match result {
        Ok(check) => {
            if check.fk_checks == 1 {
                info!("MySQL foreign key enforcement is enabled");
                Ok(())
            } else {
                Err(PersistenceError::ForeignKeyEnforcementNotEnabled)
            }
        }
        Err(e) => Err(PersistenceError::QueryFailed(format!(
            "Failed to verify foreign key enforcement: {e}"
        ))),
    }
}

/// Opens a plain InnoDB transaction. Row locks are taken by `locked_max_id`.
///
/// # Errors
///
/// Returns an error if `BEGIN` fails.
pub fn begin(conn: &mut MysqlConnection) -> QueryResult<()> {
    <AnsiTransactionManager as TransactionManager<MysqlConnection>>::begin_transaction(conn)
}

/// Reads the highest id of `table` with `FOR UPDATE`.
///
/// # Errors
///
/// Returns an error if the query fails or times out waiting for the lock.
pub fn locked_max_id(
    conn: &mut MysqlConnection,
    table: IdTable,
) -> Result<Option<i32>, PersistenceError> {
    let highest: Option<i32> = match table {
        IdTable::Contest => contest::table
            .select(contest::cid)
            .order(contest::cid.desc())
            .for_update()
            .first(conn)
            .optional()?,
        IdTable::Team => team::table
            .select(team::teamid)
            .order(team::teamid.desc())
            .for_update()
            .first(conn)
            .optional()?,
        IdTable::User => user::table
            .select(user::userid)
            .order(user::userid.desc())
            .for_update()
            .first(conn)
            .optional()?,
    };
    debug!(table = %table, ?highest, "Locked current maximum id");
    Ok(highest)
}

/// Reports whether the `user_email` index exists in the current schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn email_index_exists(conn: &mut MysqlConnection) -> Result<bool, PersistenceError> {
    let row: CountRow = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM INFORMATION_SCHEMA.STATISTICS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = 'user' AND INDEX_NAME = ?",
    )
    .bind::<Text, _>(EMAIL_INDEX_NAME)
    .get_result(conn)
    .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(row.count > 0)
}

/// Creates the `user_email` B-tree index.
///
/// # Errors
///
/// Returns an error if the DDL statement fails.
pub fn create_email_index(conn: &mut MysqlConnection) -> Result<(), PersistenceError> {
    diesel::sql_query(format!(
        "CREATE INDEX {EMAIL_INDEX_NAME} USING BTREE ON `user` (email)"
    ))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}
