//! Table registry and idempotent DDL.
//!
//! # Responsibility
//! - Own the `CREATE TABLE` statements for every roster table.
//! - Create tables parent-first and drop them child-first.
//!
//! # Invariants
//! - `TABLES` is ordered so that every foreign key points at an earlier entry.
//! - Create/drop are safe to repeat.

use crate::db::DbResult;
use log::info;
use rusqlite::Connection;

/// One persisted table and its DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    create_sql: &'static str,
}

pub const DEPARTMENTS: Table = Table {
    name: "departments",
    create_sql: "CREATE TABLE IF NOT EXISTS departments (
        id INTEGER PRIMARY KEY,
        name TEXT,
        location TEXT
    );",
};

pub const EMPLOYEES: Table = Table {
    name: "employees",
    create_sql: "CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY,
        name TEXT,
        job_title TEXT,
        department_id INTEGER,
        FOREIGN KEY (department_id) REFERENCES departments(id)
    );",
};

pub const REVIEWS: Table = Table {
    name: "reviews",
    create_sql: "CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY,
        year INT,
        summary TEXT,
        employee_id INTEGER,
        FOREIGN KEY (employee_id) REFERENCES employees(id)
    );",
};

const TABLES: &[Table] = &[DEPARTMENTS, EMPLOYEES, REVIEWS];

impl Table {
    /// Runs `CREATE TABLE IF NOT EXISTS` for this table.
    pub fn create_table(&self, conn: &Connection) -> DbResult<()> {
        conn.execute_batch(self.create_sql)?;
        info!(
            "event=schema_create module=db status=ok table={}",
            self.name
        );
        Ok(())
    }

    /// Runs `DROP TABLE IF EXISTS` for this table.
    pub fn drop_table(&self, conn: &Connection) -> DbResult<()> {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", self.name))?;
        info!("event=schema_drop module=db status=ok table={}", self.name);
        Ok(())
    }

    /// Returns whether the table is present in `sqlite_master`.
    pub fn exists(&self, conn: &Connection) -> DbResult<bool> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

/// Creates every roster table, parents first.
pub fn create_tables(conn: &Connection) -> DbResult<()> {
    for table in TABLES {
        table.create_table(conn)?;
    }
    Ok(())
}

/// Drops every roster table, children first.
pub fn drop_tables(conn: &Connection) -> DbResult<()> {
    for table in TABLES.iter().rev() {
        table.drop_table(conn)?;
    }
    Ok(())
}

/// Returns every registered table in creation order.
pub fn tables() -> &'static [Table] {
    TABLES
}
