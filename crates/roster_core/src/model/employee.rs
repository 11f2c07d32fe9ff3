//! Employee record.
//!
//! # Invariants
//! - `name` and `job_title` are non-empty after `validate()`.
//! - `department_id` is only known to exist after a repository write path
//!   checked it through `DepartmentLookup`; the record itself cannot tell.

use crate::model::department::DepartmentId;
use crate::model::validation::{require_non_empty, ValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Storage-assigned employee primary key.
pub type EmployeeId = i64;

/// Person with a job title, belonging to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<EmployeeId>,
    pub name: String,
    pub job_title: String,
    pub department_id: DepartmentId,
}

impl Employee {
    /// Creates an unsaved employee after checking field shape.
    ///
    /// The department reference is checked later, by the repository, before
    /// anything is written.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: DepartmentId,
    ) -> Result<Self, ValidationError> {
        let employee = Self {
            id: None,
            name: name.into(),
            job_title: job_title.into(),
            department_id,
        };
        employee.validate()?;
        Ok(employee)
    }

    /// Primary key, `None` while unsaved or after delete.
    pub fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks `name` and `job_title` are non-empty strings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("job_title", &self.job_title)
    }

    pub(crate) fn set_id(&mut self, id: Option<EmployeeId>) {
        self.id = id;
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(
            f,
            "<Employee {id}: {}, {}, Department ID: {}>",
            self.name, self.job_title, self.department_id
        )
    }
}
