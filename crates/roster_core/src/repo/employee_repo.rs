//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide identity-mapped CRUD over the `employees` table.
//! - Answer `EmployeeLookup` for review write paths.
//!
//! # Invariants
//! - `save`/`update` check field shape and the department reference before
//!   any SQL runs.
//! - Deleting an employee does not touch its reviews.

use crate::db::schema::EMPLOYEES;
use crate::model::validation::require_reference;
use crate::model::{DepartmentId, Employee, EmployeeId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::identity_map::{borrow_record, borrow_record_mut, share, IdentityMap, Shared};
use crate::repo::lookup::{DepartmentLookup, EmployeeLookup};
use rusqlite::{params, Connection, Params, Row};

const ENTITY: &str = "employee";
const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, job_title, department_id FROM employees";

/// Raw `employees` row as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: EmployeeId,
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl EmployeeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            job_title: row.get("job_title")?,
            department_id: row.get("department_id")?,
        })
    }
}

/// Repository interface for employee CRUD operations.
pub trait EmployeeRepository: EmployeeLookup {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    fn save(
        &mut self,
        employee: &Shared<Employee>,
        departments: &dyn DepartmentLookup,
    ) -> RepoResult<EmployeeId>;
    fn update(
        &self,
        employee: &Shared<Employee>,
        departments: &dyn DepartmentLookup,
    ) -> RepoResult<()>;
    fn delete(&mut self, employee: &Shared<Employee>) -> RepoResult<EmployeeId>;
    fn instance_from_db(&mut self, row: EmployeeRow) -> RepoResult<Shared<Employee>>;
    fn get_all(&mut self) -> RepoResult<Vec<Shared<Employee>>>;
    fn find_by_id(&mut self, id: EmployeeId) -> RepoResult<Option<Shared<Employee>>>;
    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Employee>>>;
    fn find_by_department_id(
        &mut self,
        department_id: DepartmentId,
    ) -> RepoResult<Vec<Shared<Employee>>>;
    fn identity_map(&self) -> &IdentityMap<Employee>;

    /// Builds, validates and saves a new employee.
    ///
    /// Fails before touching storage when any field, including the
    /// department reference, is invalid.
    fn create(
        &mut self,
        name: &str,
        job_title: &str,
        department_id: DepartmentId,
        departments: &dyn DepartmentLookup,
    ) -> RepoResult<Shared<Employee>> {
        let employee = share(Employee::new(name, job_title, department_id)?);
        self.save(&employee, departments)?;
        Ok(employee)
    }
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
    identity: IdentityMap<Employee>,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            identity: IdentityMap::new(ENTITY),
        }
    }

    fn hydrate_rows(&mut self, rows: Vec<EmployeeRow>) -> RepoResult<Vec<Shared<Employee>>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }
}

impl EmployeeLookup for SqliteEmployeeRepository<'_> {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        EMPLOYEES.create_table(self.conn)?;
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        EMPLOYEES.drop_table(self.conn)?;
        Ok(())
    }

    fn save(
        &mut self,
        employee: &Shared<Employee>,
        departments: &dyn DepartmentLookup,
    ) -> RepoResult<EmployeeId> {
        {
            let record = borrow_record(ENTITY, employee)?;
            if let Some(id) = record.id() {
                return Err(RepoError::AlreadyPersisted { entity: ENTITY, id });
            }
            validate_employee(&record, departments)?;

            self.conn.execute(
                "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3);",
                params![
                    record.name.as_str(),
                    record.job_title.as_str(),
                    record.department_id,
                ],
            )?;
        }

        let id = self.conn.last_insert_rowid();
        borrow_record_mut(ENTITY, employee)?.set_id(Some(id));
        self.identity.register(id, employee);
        Ok(id)
    }

    fn update(
        &self,
        employee: &Shared<Employee>,
        departments: &dyn DepartmentLookup,
    ) -> RepoResult<()> {
        let record = borrow_record(ENTITY, employee)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, employee)?;
        validate_employee(&record, departments)?;

        let changed = self.conn.execute(
            "UPDATE employees SET name = ?1, job_title = ?2, department_id = ?3 WHERE id = ?4;",
            params![
                record.name.as_str(),
                record.job_title.as_str(),
                record.department_id,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn delete(&mut self, employee: &Shared<Employee>) -> RepoResult<EmployeeId> {
        let mut record = borrow_record_mut(ENTITY, employee)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, employee)?;

        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        self.identity.evict(id);
        record.set_id(None);
        Ok(id)
    }

    fn instance_from_db(&mut self, row: EmployeeRow) -> RepoResult<Shared<Employee>> {
        let department_id = row.department_id.ok_or_else(|| {
            RepoError::InvalidData(format!("employees row {}: department_id is null", row.id))
        })?;
        let mut fresh = Employee::new(
            row.name.unwrap_or_default(),
            row.job_title.unwrap_or_default(),
            department_id,
        )
        .map_err(|err| RepoError::InvalidData(format!("employees row {}: {err}", row.id)))?;
        fresh.set_id(Some(row.id));

        let refreshed = fresh.clone();
        self.identity.hydrate(
            row.id,
            move |existing| {
                existing.name = refreshed.name;
                existing.job_title = refreshed.job_title;
                existing.department_id = refreshed.department_id;
            },
            move || fresh,
        )
    }

    fn get_all(&mut self) -> RepoResult<Vec<Shared<Employee>>> {
        let rows = fetch_rows(self.conn, &format!("{EMPLOYEE_SELECT_SQL};"), [])?;
        self.hydrate_rows(rows)
    }

    fn find_by_id(&mut self, id: EmployeeId) -> RepoResult<Option<Shared<Employee>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(self.hydrate_rows(rows)?.into_iter().next())
    }

    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Employee>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{EMPLOYEE_SELECT_SQL} WHERE name IS ?1 LIMIT 1;"),
            [name],
        )?;
        Ok(self.hydrate_rows(rows)?.into_iter().next())
    }

    fn find_by_department_id(
        &mut self,
        department_id: DepartmentId,
    ) -> RepoResult<Vec<Shared<Employee>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{EMPLOYEE_SELECT_SQL} WHERE department_id = ?1;"),
            [department_id],
        )?;
        self.hydrate_rows(rows)
    }

    fn identity_map(&self) -> &IdentityMap<Employee> {
        &self.identity
    }
}

fn validate_employee(employee: &Employee, departments: &dyn DepartmentLookup) -> RepoResult<()> {
    employee.validate()?;
    let exists = departments.department_exists(employee.department_id)?;
    require_reference("department_id", employee.department_id, exists)?;
    Ok(())
}

fn fetch_rows(conn: &Connection, sql: &str, params: impl Params) -> RepoResult<Vec<EmployeeRow>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut fetched = Vec::new();

    while let Some(row) = rows.next()? {
        fetched.push(EmployeeRow::from_row(row)?);
    }

    Ok(fetched)
}
