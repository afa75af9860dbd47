//! Storage layer for scierie.
//!
//! This module provides `SQLite`-based persistent storage for the sawmill's
//! records: users, stock, production, sales, expenses, supplier charges,
//! invoices and the profit summary. Report aggregation runs in SQL.
//!
//! A single connection sits behind a mutex. Operations that touch several
//! rows (a sale and its stock decrement, a mutation and the profit
//! recomputation it triggers) run in one `IMMEDIATE` transaction.

pub mod migrations;
pub mod schema;

mod charges;
mod dashboard;
mod expenses;
mod invoices;
mod productions;
mod profit;
mod reports;
mod sales;
mod stock;
mod users;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, ErrorCode, Params, Row, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use dashboard::{Dashboard, DashboardTotals};

/// Number of rows the dashboard shows per table.
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

/// Storage engine for the sawmill's records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;",
        )?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the connection.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection mutex poisoned"))
    }

    /// Run `f` inside an `IMMEDIATE` transaction, committing on success.
    ///
    /// The write lock is taken up front so a read-then-write inside `f`
    /// cannot interleave with another writer.
    fn transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Run a query and collect every mapped row.
fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Turn a unique-constraint failure into a client-facing conflict.
fn map_unique_violation(err: rusqlite::Error, message: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Error::conflict(message)
        }
        other => other.into(),
    }
}

/// Sum a numeric column over a whole table.
fn sum_column(conn: &Connection, table: &str, column: &str) -> Result<f64> {
    let sum = conn.query_row(
        &format!("SELECT COALESCE(SUM({column}), 0.0) FROM {table}"),
        [],
        |row| row.get(0),
    )?;
    Ok(sum)
}
