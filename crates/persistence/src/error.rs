// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Store tables named in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Contest,
    Team,
    User,
    UserRole,
    ContestTeam,
    RankCache,
}

impl Table {
    /// The SQL table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contest => "contest",
            Self::Team => "team",
            Self::User => "user",
            Self::UserRole => "userrole",
            Self::ContestTeam => "contestteam",
            Self::RankCache => "rankcache",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A transaction could not be started.
    BeginFailed(String),
    /// Every step succeeded but the commit itself failed.
    CommitFailed(String),
    /// An insert into the named table failed.
    InsertFailed { table: Table, reason: String },
    /// A delete from the named table failed.
    DeleteFailed { table: Table, reason: String },
    /// An id was requested from a table that must already hold rows.
    NoRows(Table),
    /// The next id would overflow the id column.
    IdSpaceExhausted(Table),
    /// No user matches the lookup key.
    UserNotFound(String),
    /// No contest has the given short name.
    ContestNotFound(String),
    /// The generated secret could not be hashed.
    SecretHashFailed(String),
    /// A stored secret hash could not be checked.
    SecretVerifyFailed(String),
}

impl PersistenceError {
    pub(crate) fn insert_failed(table: Table, err: &diesel::result::Error) -> Self {
        Self::InsertFailed {
            table,
            reason: err.to_string(),
        }
    }

    pub(crate) fn delete_failed(table: Table, err: &diesel::result::Error) -> Self {
        Self::DeleteFailed {
            table,
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::BeginFailed(msg) => write!(f, "Failed to begin transaction: {msg}"),
            Self::CommitFailed(msg) => write!(f, "Failed to commit transaction: {msg}"),
            Self::InsertFailed { table, reason } => {
                write!(f, "Insert into {table} failed: {reason}")
            }
            Self::DeleteFailed { table, reason } => {
                write!(f, "Delete from {table} failed: {reason}")
            }
            Self::NoRows(table) => write!(f, "No rows in {table} to derive the next id from"),
            Self::IdSpaceExhausted(table) => write!(f, "Id space exhausted for {table}"),
            Self::UserNotFound(key) => write!(f, "User not found: {key}"),
            Self::ContestNotFound(short_name) => write!(f, "Contest not found: {short_name}"),
            Self::SecretHashFailed(msg) => write!(f, "Failed to hash secret: {msg}"),
            Self::SecretVerifyFailed(msg) => write!(f, "Failed to verify secret: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::QueryFailed("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
