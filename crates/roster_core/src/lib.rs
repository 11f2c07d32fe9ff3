//! Core domain logic for Roster.
//! Departments, employees and their reviews mapped onto SQLite rows, with one
//! live in-memory record per primary key.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbOptions};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    Department, DepartmentId, Employee, EmployeeId, Review, ReviewId, ValidationError,
    MIN_REVIEW_YEAR,
};
pub use repo::department_repo::{DepartmentRepository, DepartmentRow, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeRepository, EmployeeRow, SqliteEmployeeRepository};
pub use repo::review_repo::{ReviewRepository, ReviewRow, SqliteReviewRepository};
pub use repo::{
    share, DepartmentLookup, EmployeeLookup, IdentityMap, RepoError, RepoResult, Shared,
};
pub use service::roster_service::{RosterService, SqliteRosterService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
