//! Department record.
//!
//! Departments are the parent side of the employee relationship. Employees
//! reference them by id and the reference is checked through
//! `repo::DepartmentLookup`.

use crate::model::validation::{require_non_empty, ValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Storage-assigned department primary key.
pub type DepartmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    id: Option<DepartmentId>,
    pub name: String,
    pub location: String,
}

impl Department {
    /// Creates an unsaved department after checking field shape.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let department = Self {
            id: None,
            name: name.into(),
            location: location.into(),
        };
        department.validate()?;
        Ok(department)
    }

    pub fn id(&self) -> Option<DepartmentId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks `name` and `location` are non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("location", &self.location)
    }

    pub(crate) fn set_id(&mut self, id: Option<DepartmentId>) {
        self.id = id;
    }
}

impl Display for Department {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(f, "<Department {id}: {}, {}>", self.name, self.location)
    }
}
