//! Existence checks injected into write paths.
//!
//! Repositories never reach into another entity's table to validate a
//! foreign key on their own; callers pass the lookup for the parent entity.

use crate::model::{DepartmentId, EmployeeId};
use crate::repo::error::RepoResult;
use std::collections::HashSet;

/// Answers whether a department row exists.
pub trait DepartmentLookup {
    fn department_exists(&self, id: DepartmentId) -> RepoResult<bool>;
}

/// Answers whether an employee row exists.
pub trait EmployeeLookup {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool>;
}

impl DepartmentLookup for HashSet<DepartmentId> {
    fn department_exists(&self, id: DepartmentId) -> RepoResult<bool> {
        Ok(self.contains(&id))
    }
}

impl EmployeeLookup for HashSet<EmployeeId> {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        Ok(self.contains(&id))
    }
}
