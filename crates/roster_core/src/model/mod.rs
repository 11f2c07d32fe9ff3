//! Roster domain model.
//!
//! # Responsibility
//! - Define the department/employee/review records held by repositories.
//! - Own field-shape validation; referential checks live in `repo`.
//!
//! # Invariants
//! - `id` is `None` until storage assigns one and is only set by repositories.
//! - A record that passed `validate()` never holds an empty required string.

pub mod department;
pub mod employee;
pub mod review;
pub mod validation;

pub use department::{Department, DepartmentId};
pub use employee::{Employee, EmployeeId};
pub use review::{Review, ReviewId, MIN_REVIEW_YEAR};
pub use validation::ValidationError;
