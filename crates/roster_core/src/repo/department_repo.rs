//! Department repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide identity-mapped CRUD over the `departments` table.
//! - Answer `DepartmentLookup` for employee write paths.

use crate::db::schema::DEPARTMENTS;
use crate::model::{Department, DepartmentId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::identity_map::{borrow_record, borrow_record_mut, share, IdentityMap, Shared};
use crate::repo::lookup::DepartmentLookup;
use rusqlite::{params, Connection, Params, Row};

const ENTITY: &str = "department";
const DEPARTMENT_SELECT_SQL: &str = "SELECT id, name, location FROM departments";

/// Raw `departments` row as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRow {
    pub id: DepartmentId,
    pub name: Option<String>,
    pub location: Option<String>,
}

impl DepartmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            location: row.get("location")?,
        })
    }
}

/// Repository interface for department CRUD operations.
pub trait DepartmentRepository: DepartmentLookup {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    fn save(&mut self, department: &Shared<Department>) -> RepoResult<DepartmentId>;
    fn update(&self, department: &Shared<Department>) -> RepoResult<()>;
    fn delete(&mut self, department: &Shared<Department>) -> RepoResult<DepartmentId>;
    fn instance_from_db(&mut self, row: DepartmentRow) -> RepoResult<Shared<Department>>;
    fn get_all(&mut self) -> RepoResult<Vec<Shared<Department>>>;
    fn find_by_id(&mut self, id: DepartmentId) -> RepoResult<Option<Shared<Department>>>;
    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Department>>>;
    fn identity_map(&self) -> &IdentityMap<Department>;

    /// Builds, validates and saves a new department.
    fn create(&mut self, name: &str, location: &str) -> RepoResult<Shared<Department>> {
        let department = share(Department::new(name, location)?);
        self.save(&department)?;
        Ok(department)
    }
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
    identity: IdentityMap<Department>,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            identity: IdentityMap::new(ENTITY),
        }
    }

    fn hydrate_rows(&mut self, rows: Vec<DepartmentRow>) -> RepoResult<Vec<Shared<Department>>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }
}

impl DepartmentLookup for SqliteDepartmentRepository<'_> {
    fn department_exists(&self, id: DepartmentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        DEPARTMENTS.create_table(self.conn)?;
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        DEPARTMENTS.drop_table(self.conn)?;
        Ok(())
    }

    fn save(&mut self, department: &Shared<Department>) -> RepoResult<DepartmentId> {
        {
            let record = borrow_record(ENTITY, department)?;
            if let Some(id) = record.id() {
                return Err(RepoError::AlreadyPersisted { entity: ENTITY, id });
            }
            record.validate()?;
            self.conn.execute(
                "INSERT INTO departments (name, location) VALUES (?1, ?2);",
                params![record.name.as_str(), record.location.as_str()],
            )?;
        }

        let id = self.conn.last_insert_rowid();
        borrow_record_mut(ENTITY, department)?.set_id(Some(id));
        self.identity.register(id, department);
        Ok(id)
    }

    fn update(&self, department: &Shared<Department>) -> RepoResult<()> {
        let record = borrow_record(ENTITY, department)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, department)?;
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE departments SET name = ?1, location = ?2 WHERE id = ?3;",
            params![record.name.as_str(), record.location.as_str(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn delete(&mut self, department: &Shared<Department>) -> RepoResult<DepartmentId> {
        let mut record = borrow_record_mut(ENTITY, department)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, department)?;

        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        self.identity.evict(id);
        record.set_id(None);
        Ok(id)
    }

    fn instance_from_db(&mut self, row: DepartmentRow) -> RepoResult<Shared<Department>> {
        let mut fresh = Department::new(
            row.name.unwrap_or_default(),
            row.location.unwrap_or_default(),
        )
        .map_err(|err| RepoError::InvalidData(format!("departments row {}: {err}", row.id)))?;
        fresh.set_id(Some(row.id));

        let refreshed = fresh.clone();
        self.identity.hydrate(
            row.id,
            move |existing| {
                existing.name = refreshed.name;
                existing.location = refreshed.location;
            },
            move || fresh,
        )
    }

    fn get_all(&mut self) -> RepoResult<Vec<Shared<Department>>> {
        let rows = fetch_rows(self.conn, &format!("{DEPARTMENT_SELECT_SQL};"), [])?;
        self.hydrate_rows(rows)
    }

    fn find_by_id(&mut self, id: DepartmentId) -> RepoResult<Option<Shared<Department>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{DEPARTMENT_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(self.hydrate_rows(rows)?.into_iter().next())
    }

    fn find_by_name(&mut self, name: &str) -> RepoResult<Option<Shared<Department>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{DEPARTMENT_SELECT_SQL} WHERE name IS ?1 LIMIT 1;"),
            [name],
        )?;
        Ok(self.hydrate_rows(rows)?.into_iter().next())
    }

    fn identity_map(&self) -> &IdentityMap<Department> {
        &self.identity
    }
}

fn fetch_rows(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> RepoResult<Vec<DepartmentRow>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut fetched = Vec::new();

    while let Some(row) = rows.next()? {
        fetched.push(DepartmentRow::from_row(row)?);
    }

    Ok(fetched)
}
