//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply `DbOptions` pragmas before handing the connection out.
//!
//! # Invariants
//! - Returned connections are in autocommit mode.
//! - Tables are not created here; callers run `db::schema::create_tables`
//!   or the per-repository `create_table`.

use super::{DbOptions, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens a SQLite database file with default options.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with(path, DbOptions::default())
}

/// Opens a SQLite database file with explicit options.
pub fn open_db_with(path: impl AsRef<Path>, options: DbOptions) -> DbResult<Connection> {
    open_logged("file", options, || Connection::open(path))
}

/// Opens a private in-memory SQLite database with default options.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db_in_memory_with(DbOptions::default())
}

/// Opens a private in-memory SQLite database with explicit options.
pub fn open_db_in_memory_with(options: DbOptions) -> DbResult<Connection> {
    open_logged("memory", options, Connection::open_in_memory)
}

fn open_logged(
    mode: &'static str,
    options: DbOptions,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match configure_connection(&conn, options) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} foreign_keys={} duration_ms={}",
                mode,
                options.foreign_keys,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &Connection, options: DbOptions) -> DbResult<()> {
    let pragma = if options.foreign_keys {
        "PRAGMA foreign_keys = ON;"
    } else {
        "PRAGMA foreign_keys = OFF;"
    };
    conn.execute_batch(pragma)?;
    conn.busy_timeout(options.busy_timeout)?;
    Ok(())
}
