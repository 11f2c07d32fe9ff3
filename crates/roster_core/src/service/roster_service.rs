//! Roster use-case service.
//!
//! # Responsibility
//! - Own one repository per entity over a shared connection.
//! - Pass the parent repository as the reference lookup on every write.
//! - Serve the department -> employees and employee -> reviews relations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Deleting an employee never deletes its reviews; orphaned reviews are
//!   reported through a `warn` event instead.

use crate::model::{Department, DepartmentId, Employee, EmployeeId, Review, ReviewId};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::identity_map::borrow_record;
use crate::repo::review_repo::{ReviewRepository, SqliteReviewRepository};
use crate::repo::{RepoError, RepoResult, Shared};
use log::{info, warn};
use rusqlite::Connection;

/// Service over the SQLite repositories sharing one connection.
pub type SqliteRosterService<'conn> = RosterService<
    SqliteDepartmentRepository<'conn>,
    SqliteEmployeeRepository<'conn>,
    SqliteReviewRepository<'conn>,
>;

/// Use-case service wrapper for department/employee/review operations.
pub struct RosterService<D, E, R> {
    departments: D,
    employees: E,
    reviews: R,
}

impl<'conn> SqliteRosterService<'conn> {
    /// Builds SQLite repositories on `conn`, each with an empty identity map.
    pub fn open(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteDepartmentRepository::new(conn),
            SqliteEmployeeRepository::new(conn),
            SqliteReviewRepository::new(conn),
        )
    }
}

impl<D, E, R> RosterService<D, E, R>
where
    D: DepartmentRepository,
    E: EmployeeRepository,
    R: ReviewRepository,
{
    pub fn new(departments: D, employees: E, reviews: R) -> Self {
        Self {
            departments,
            employees,
            reviews,
        }
    }

    /// Creates all tables, parents first.
    pub fn create_tables(&self) -> RepoResult<()> {
        self.departments.create_table()?;
        self.employees.create_table()?;
        self.reviews.create_table()
    }

    /// Drops all tables, children first.
    pub fn drop_tables(&self) -> RepoResult<()> {
        self.reviews.drop_table()?;
        self.employees.drop_table()?;
        self.departments.drop_table()
    }

    pub fn create_department(
        &mut self,
        name: &str,
        location: &str,
    ) -> RepoResult<Shared<Department>> {
        self.departments.create(name, location)
    }

    /// Creates an employee after checking its department exists.
    pub fn create_employee(
        &mut self,
        name: &str,
        job_title: &str,
        department_id: DepartmentId,
    ) -> RepoResult<Shared<Employee>> {
        self.employees
            .create(name, job_title, department_id, &self.departments)
    }

    pub fn save_employee(&mut self, employee: &Shared<Employee>) -> RepoResult<EmployeeId> {
        self.employees.save(employee, &self.departments)
    }

    pub fn update_employee(&self, employee: &Shared<Employee>) -> RepoResult<()> {
        self.employees.update(employee, &self.departments)
    }

    /// Deletes an employee row and detaches the record.
    ///
    /// Reviews pointing at the employee are left in place. When there are
    /// any, an `employee_delete` warning carries their count.
    pub fn delete_employee(&mut self, employee: &Shared<Employee>) -> RepoResult<EmployeeId> {
        let pending_reviews = match borrow_record("employee", employee)?.id() {
            Some(id) => self.reviews.count_by_employee_id(id)?,
            None => 0,
        };

        let id = self.employees.delete(employee)?;
        if pending_reviews > 0 {
            warn!(
                "event=employee_delete module=service status=ok employee_id={} orphaned_reviews={}",
                id, pending_reviews
            );
        } else {
            info!(
                "event=employee_delete module=service status=ok employee_id={}",
                id
            );
        }
        Ok(id)
    }

    /// Creates a review after checking its employee exists.
    pub fn create_review(
        &mut self,
        year: i32,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<Shared<Review>> {
        self.reviews.create(year, summary, employee_id, &self.employees)
    }

    pub fn save_review(&mut self, review: &Shared<Review>) -> RepoResult<ReviewId> {
        self.reviews.save(review, &self.employees)
    }

    pub fn update_review(&self, review: &Shared<Review>) -> RepoResult<()> {
        self.reviews.update(review, &self.employees)
    }

    pub fn delete_review(&mut self, review: &Shared<Review>) -> RepoResult<ReviewId> {
        self.reviews.delete(review)
    }

    /// Returns the reviews written for `employee`, in storage order.
    pub fn employee_reviews(
        &mut self,
        employee: &Shared<Employee>,
    ) -> RepoResult<Vec<Shared<Review>>> {
        let id = borrow_record("employee", employee)?
            .id()
            .ok_or(RepoError::NotPersisted("employee"))?;
        self.reviews.find_by_employee_id(id)
    }

    /// Returns the employees assigned to `department`, in storage order.
    pub fn department_employees(
        &mut self,
        department: &Shared<Department>,
    ) -> RepoResult<Vec<Shared<Employee>>> {
        let id = borrow_record("department", department)?
            .id()
            .ok_or(RepoError::NotPersisted("department"))?;
        self.employees.find_by_department_id(id)
    }

    /// Counts reviews whose employee row is gone.
    ///
    /// Employee ids are plain `INTEGER PRIMARY KEY` rowids, so SQLite may
    /// hand a deleted employee's id to the next hire. Reviews left behind by
    /// that employee then attach to the new row and drop out of this count.
    pub fn count_orphaned_reviews(&self) -> RepoResult<u64> {
        self.reviews.count_orphaned()
    }

    pub fn departments(&mut self) -> &mut D {
        &mut self.departments
    }

    pub fn employees(&mut self) -> &mut E {
        &mut self.employees
    }

    pub fn reviews(&mut self) -> &mut R {
        &mut self.reviews
    }
}
