//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a roster database (in memory unless a path is given).
//! - Ensure tables exist and print one line per table with its row count.

use roster_core::db::schema;
use roster_core::{open_db, open_db_in_memory, DbError};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("roster_core ping={}", roster_core::ping());
    println!("roster_core version={}", roster_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), DbError> {
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    schema::create_tables(&conn)?;

    for table in schema::tables() {
        let rows: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", table.name),
            [],
            |row| row.get(0),
        )?;
        println!("table={} rows={rows}", table.name);
    }
    Ok(())
}
