// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Project automation for the contestreg workspace.
//!
//! - `cargo xtask ci` runs lint, build and the `SQLite` test suite.
//! - `cargo xtask test-mariadb` starts a disposable `MariaDB` 11 container
//!   and runs the ignored backend validation tests against it.
//! - `cargo xtask verify-migrations` applies both migration sets and checks
//!   that the resulting schemas match.
//!
//! Plain `cargo test` never needs a database server.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::process::Output;
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::eyre, eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");
const MYSQL_MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../crates/persistence/migrations_mysql");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting and clippy
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run the `SQLite` test suite
    #[command(visible_alias = "t")]
    Test,

    /// Run the backend validation tests against a `MariaDB` container
    #[command(visible_alias = "tm")]
    TestMariadb,

    /// Check that the `SQLite` and `MySQL` migrations produce the same schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestMariadb => test_mariadb(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint formatting and clippy
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run all tests that need no external services
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// A throwaway `MariaDB` 11 container. Stopped and removed on drop.
struct MariaDbContainer {
    name: &'static str,
    database: &'static str,
    user: &'static str,
    password: &'static str,
    port: &'static str,
}

impl MariaDbContainer {
    /// Starts the container and waits up to 30 seconds for it to accept
    /// connections.
    fn start(
        name: &'static str,
        database: &'static str,
        port: &'static str,
    ) -> Result<Self> {
        tracing::info!("Checking Docker availability");
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        let container = Self {
            name,
            database,
            user: "contestreg",
            password: "test_password",
            port,
        };
        container.remove();

        tracing::info!("Starting MariaDB container: {}", name);
        cmd!(
            "docker",
            "run",
            "--name",
            name,
            "-e",
            format!("MARIADB_DATABASE={database}"),
            "-e",
            format!("MARIADB_USER={}", container.user),
            "-e",
            format!("MARIADB_PASSWORD={}", container.password),
            "-e",
            "MARIADB_ROOT_PASSWORD=root_password",
            "-p",
            format!("{port}:3306"),
            "-d",
            "mariadb:11"
        )
        .run_with_trace()
        .wrap_err("Failed to start MariaDB container")?;

        container.wait_ready()?;
        Ok(container)
    }

    fn wait_ready(&self) -> Result<()> {
        tracing::info!("Waiting for MariaDB to be ready...");
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {}/{}", attempt, max_attempts);

            let probe = cmd!(
                "docker",
                "exec",
                self.name,
                "mariadb",
                "-u",
                self.user,
                format!("-p{}", self.password),
                "-e",
                "SELECT 1"
            )
            .stdout_null()
            .stderr_null()
            .run();

            if probe.is_ok() {
                tracing::info!("MariaDB is ready");
                return Ok(());
            }
        }
        Err(eyre!("MariaDB did not become ready within timeout"))
    }

    fn url(&self) -> String {
        format!(
            "mysql://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.database
        )
    }

    fn remove(&self) {
        let _ = cmd!("docker", "stop", self.name)
            .stdout_null()
            .stderr_null()
            .run();
        let _ = cmd!("docker", "rm", self.name)
            .stdout_null()
            .stderr_null()
            .run();
    }
}

impl Drop for MariaDbContainer {
    fn drop(&mut self) {
        tracing::info!("Stopping MariaDB container {}", self.name);
        self.remove();
    }
}

/// Run `MariaDB` backend validation tests
///
/// Starts a `MariaDB` 11 container on port 3307, then runs the ignored
/// `backend_validation_tests` of `contestreg-persistence` with
/// `DATABASE_URL` and `CONTESTREG_TEST_BACKEND=mariadb` set. The container is
/// removed whatever the outcome.
fn test_mariadb() -> Result<()> {
    tracing::info!("Starting MariaDB backend validation");
    let container = MariaDbContainer::start("contestreg-test-mariadb", "contestreg_test", "3307")?;

    tracing::info!("Running MariaDB backend validation tests");
    cmd!(
        "cargo",
        "test",
        "--package",
        "contestreg-persistence",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.url())
    .env("CONTESTREG_TEST_BACKEND", "mariadb")
    .run_with_trace()
    .wrap_err("MariaDB backend validation tests failed")?;

    tracing::info!("MariaDB backend validation completed successfully");
    Ok(())
}

/// Verify schema parity between the `SQLite` and `MySQL` migrations
///
/// Applies `migrations/` to an in-memory `SQLite` database and
/// `migrations_mysql/` to a `MariaDB` container on port 3308, introspects
/// both and fails on any difference in tables, columns, types, nullability,
/// primary keys, foreign keys or unique constraints.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting schema parity verification");
    let container =
        MariaDbContainer::start("contestreg-verify-migrations", "contestreg_verify", "3308")?;

    tracing::info!("Applying SQLite migrations");
    let mut sqlite_conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut sqlite_conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;
    sqlite_conn
        .run_pending_migrations(SQLITE_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {e}"))?;

    tracing::info!("Applying MySQL migrations");
    let mut mysql_conn =
        MysqlConnection::establish(&container.url()).wrap_err("Failed to connect to MariaDB")?;
    mysql_conn
        .run_pending_migrations(MYSQL_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply MySQL migrations: {e}"))?;

    let sqlite_schema = introspect_sqlite_schema(&mut sqlite_conn)?;
    let mysql_schema = introspect_mysql_schema(&mut mysql_conn, container.database)?;

    tracing::info!("Comparing schemas");
    compare_schemas(&sqlite_schema, &mysql_schema)?;

    tracing::info!("Schema parity verification passed");
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Table {
    /// Column name to (normalized type, nullable).
    columns: BTreeMap<String, (String, bool)>,
    primary_keys: BTreeSet<String>,
    /// (from column, referenced table, referenced column).
    foreign_keys: BTreeSet<(String, String, String)>,
    unique_constraints: BTreeSet<Vec<String>>,
}

type Schema = BTreeMap<String, Table>;

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    let tables: Vec<NameRow> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    let mut schema = Schema::new();
    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info(\"{}\")", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;
        for col in columns {
            let nullable = col.notnull == 0 && col.pk == 0;
            info.columns
                .insert(col.name.clone(), (normalize_sqlite_type(&col.r#type), nullable));
            if col.pk > 0 {
                info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list(\"{}\")", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get foreign keys for table {}", table.name))?;
        for fk in fks {
            info.foreign_keys.insert((fk.from, fk.table, fk.to));
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list(\"{}\")", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;
        for idx in indexes.into_iter().filter(|i| i.origin == "u") {
            let columns: Vec<NameRow> =
                diesel::sql_query(format!("PRAGMA index_info(\"{}\")", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
            info.unique_constraints
                .insert(columns.into_iter().map(|c| c.name).collect());
        }

        schema.insert(table.name, info);
    }
    Ok(schema)
}

fn introspect_mysql_schema(conn: &mut MysqlConnection, db_name: &str) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
        #[diesel(sql_type = Text)]
        column_key: String,
    }

    #[derive(QueryableByName)]
    #[allow(clippy::struct_field_names)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        referenced_table_name: String,
        #[diesel(sql_type = Text)]
        referenced_column_name: String,
    }

    #[derive(QueryableByName)]
    struct UniqueInfo {
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
    }

    let tables: Vec<NameRow> = diesel::sql_query(
        "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = ? \
         AND table_name != '__diesel_schema_migrations' ORDER BY table_name",
    )
    .bind::<Text, _>(db_name)
    .load(conn)
    .wrap_err("Failed to query MySQL tables")?;

    let mut schema = Schema::new();
    for table in tables {
        let mut info = Table::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(
            "SELECT column_name, data_type, is_nullable, column_key FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.name)
        .load(conn)
        .wrap_err(format!("Failed to get columns for table {}", table.name))?;
        for col in columns {
            info.columns.insert(
                col.column_name.clone(),
                (normalize_mysql_type(&col.data_type), col.is_nullable == "YES"),
            );
            if col.column_key == "PRI" {
                info.primary_keys.insert(col.column_name);
            }
        }

        let fks: Vec<ForeignKeyInfo> = diesel::sql_query(
            "SELECT column_name, referenced_table_name, referenced_column_name \
             FROM information_schema.key_column_usage \
             WHERE table_schema = ? AND table_name = ? AND referenced_table_name IS NOT NULL",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.name)
        .load(conn)
        .wrap_err(format!("Failed to get foreign keys for table {}", table.name))?;
        for fk in fks {
            info.foreign_keys.insert((
                fk.column_name,
                fk.referenced_table_name,
                fk.referenced_column_name,
            ));
        }

        let uniques: Vec<UniqueInfo> = diesel::sql_query(
            "SELECT index_name, column_name FROM information_schema.statistics \
             WHERE table_schema = ? AND table_name = ? AND non_unique = 0 \
             AND index_name != 'PRIMARY' ORDER BY index_name, seq_in_index",
        )
        .bind::<Text, _>(db_name)
        .bind::<Text, _>(&table.name)
        .load(conn)
        .wrap_err(format!("Failed to get unique indexes for table {}", table.name))?;
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for unique in uniques {
            grouped
                .entry(unique.index_name)
                .or_default()
                .push(unique.column_name);
        }
        info.unique_constraints.extend(grouped.into_values());

        schema.insert(table.name, info);
    }
    Ok(schema)
}

fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

#[allow(clippy::match_same_arms)]
fn normalize_mysql_type(mysql_type: &str) -> String {
    match mysql_type.to_uppercase().as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => "integer".to_string(),
        "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => "real".to_string(),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            "blob".to_string()
        }
        _ => "text".to_string(),
    }
}

/// Compares two schemas and reports every difference.
fn compare_schemas(sqlite_schema: &Schema, mysql_schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for name in sqlite_schema.keys() {
        if !mysql_schema.contains_key(name) {
            errors.push(format!("table '{name}' exists in SQLite but not in MySQL"));
        }
    }
    for name in mysql_schema.keys() {
        if !sqlite_schema.contains_key(name) {
            errors.push(format!("table '{name}' exists in MySQL but not in SQLite"));
        }
    }

    for (name, sqlite_table) in sqlite_schema {
        let Some(mysql_table) = mysql_schema.get(name) else {
            continue;
        };
        if sqlite_table.columns != mysql_table.columns {
            errors.push(format!(
                "columns differ in '{name}'\n    SQLite: {:?}\n    MySQL:  {:?}",
                sqlite_table.columns, mysql_table.columns
            ));
        }
        if sqlite_table.primary_keys != mysql_table.primary_keys {
            errors.push(format!(
                "primary keys differ in '{name}'\n    SQLite: {:?}\n    MySQL:  {:?}",
                sqlite_table.primary_keys, mysql_table.primary_keys
            ));
        }
        if sqlite_table.foreign_keys != mysql_table.foreign_keys {
            errors.push(format!(
                "foreign keys differ in '{name}'\n    SQLite: {:?}\n    MySQL:  {:?}",
                sqlite_table.foreign_keys, mysql_table.foreign_keys
            ));
        }
        if sqlite_table.unique_constraints != mysql_table.unique_constraints {
            errors.push(format!(
                "unique constraints differ in '{name}'\n    SQLite: {:?}\n    MySQL:  {:?}",
                sqlite_table.unique_constraints, mysql_table.unique_constraints
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(eyre!(
            "Schema parity check FAILED:\n  - {}",
            errors.join("\n  - ")
        ))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
