//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide identity-mapped CRUD over the `reviews` table.
//! - Serve the employee -> reviews relationship in storage order.
//!
//! # Invariants
//! - `save`/`update` check `year`, `summary` and the employee reference
//!   before any SQL runs.

use crate::db::schema::REVIEWS;
use crate::model::validation::require_reference;
use crate::model::{EmployeeId, Review, ReviewId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::identity_map::{borrow_record, borrow_record_mut, share, IdentityMap, Shared};
use crate::repo::lookup::EmployeeLookup;
use rusqlite::{params, Connection, Params, Row};

const ENTITY: &str = "review";
const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// Raw `reviews` row as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub employee_id: Option<EmployeeId>,
}

impl ReviewRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            summary: row.get("summary")?,
            employee_id: row.get("employee_id")?,
        })
    }
}

/// Repository interface for review CRUD operations.
pub trait ReviewRepository {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    fn save(
        &mut self,
        review: &Shared<Review>,
        employees: &dyn EmployeeLookup,
    ) -> RepoResult<ReviewId>;
    fn update(&self, review: &Shared<Review>, employees: &dyn EmployeeLookup) -> RepoResult<()>;
    fn delete(&mut self, review: &Shared<Review>) -> RepoResult<ReviewId>;
    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<Shared<Review>>;
    fn get_all(&mut self) -> RepoResult<Vec<Shared<Review>>>;
    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<Shared<Review>>>;
    /// Reviews whose `employee_id` matches, in storage order.
    fn find_by_employee_id(&mut self, employee_id: EmployeeId)
        -> RepoResult<Vec<Shared<Review>>>;
    fn count_by_employee_id(&self, employee_id: EmployeeId) -> RepoResult<u64>;
    /// Counts reviews whose employee row no longer exists. Reviews whose
    /// `employee_id` was reused by a later insert are not counted.
    fn count_orphaned(&self) -> RepoResult<u64>;
    fn identity_map(&self) -> &IdentityMap<Review>;

    /// Builds, validates and saves a new review.
    fn create(
        &mut self,
        year: i32,
        summary: &str,
        employee_id: EmployeeId,
        employees: &dyn EmployeeLookup,
    ) -> RepoResult<Shared<Review>> {
        let review = share(Review::new(year, summary, employee_id)?);
        self.save(&review, employees)?;
        Ok(review)
    }
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
    identity: IdentityMap<Review>,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            identity: IdentityMap::new(ENTITY),
        }
    }

    fn hydrate_rows(&mut self, rows: Vec<ReviewRow>) -> RepoResult<Vec<Shared<Review>>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }

    fn count(&self, sql: &str, params: impl Params) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative review count {count}")))
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        REVIEWS.create_table(self.conn)?;
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        REVIEWS.drop_table(self.conn)?;
        Ok(())
    }

    fn save(
        &mut self,
        review: &Shared<Review>,
        employees: &dyn EmployeeLookup,
    ) -> RepoResult<ReviewId> {
        {
            let record = borrow_record(ENTITY, review)?;
            if let Some(id) = record.id() {
                return Err(RepoError::AlreadyPersisted { entity: ENTITY, id });
            }
            validate_review(&record, employees)?;

            self.conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
                params![record.year, record.summary.as_str(), record.employee_id],
            )?;
        }

        let id = self.conn.last_insert_rowid();
        borrow_record_mut(ENTITY, review)?.set_id(Some(id));
        self.identity.register(id, review);
        Ok(id)
    }

    fn update(&self, review: &Shared<Review>, employees: &dyn EmployeeLookup) -> RepoResult<()> {
        let record = borrow_record(ENTITY, review)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, review)?;
        validate_review(&record, employees)?;

        let changed = self.conn.execute(
            "UPDATE reviews SET year = ?1, summary = ?2, employee_id = ?3 WHERE id = ?4;",
            params![record.year, record.summary.as_str(), record.employee_id, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn delete(&mut self, review: &Shared<Review>) -> RepoResult<ReviewId> {
        let mut record = borrow_record_mut(ENTITY, review)?;
        let id = record.id().ok_or(RepoError::NotPersisted(ENTITY))?;
        self.identity.ensure_tracked(id, review)?;

        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        self.identity.evict(id);
        record.set_id(None);
        Ok(id)
    }

    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<Shared<Review>> {
        let (year, employee_id) = match (row.year, row.employee_id) {
            (Some(year), Some(employee_id)) => (year, employee_id),
            _ => {
                return Err(RepoError::InvalidData(format!(
                    "reviews row {}: year and employee_id must be set",
                    row.id
                )));
            }
        };
        let mut fresh = Review::new(year, row.summary.unwrap_or_default(), employee_id)
            .map_err(|err| RepoError::InvalidData(format!("reviews row {}: {err}", row.id)))?;
        fresh.set_id(Some(row.id));

        let refreshed = fresh.clone();
        self.identity.hydrate(
            row.id,
            move |existing| {
                existing.year = refreshed.year;
                existing.summary = refreshed.summary;
                existing.employee_id = refreshed.employee_id;
            },
            move || fresh,
        )
    }

    fn get_all(&mut self) -> RepoResult<Vec<Shared<Review>>> {
        let rows = fetch_rows(self.conn, &format!("{REVIEW_SELECT_SQL};"), [])?;
        self.hydrate_rows(rows)
    }

    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<Shared<Review>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(self.hydrate_rows(rows)?.into_iter().next())
    }

    fn find_by_employee_id(
        &mut self,
        employee_id: EmployeeId,
    ) -> RepoResult<Vec<Shared<Review>>> {
        let rows = fetch_rows(
            self.conn,
            &format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1;"),
            [employee_id],
        )?;
        self.hydrate_rows(rows)
    }

    fn count_by_employee_id(&self, employee_id: EmployeeId) -> RepoResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM reviews WHERE employee_id = ?1;",
            [employee_id],
        )
    }

    fn count_orphaned(&self) -> RepoResult<u64> {
        self.count(
            "SELECT COUNT(*)
             FROM reviews
             WHERE NOT EXISTS (
                SELECT 1 FROM employees WHERE employees.id = reviews.employee_id
             );",
            [],
        )
    }

    fn identity_map(&self) -> &IdentityMap<Review> {
        &self.identity
    }
}

fn validate_review(review: &Review, employees: &dyn EmployeeLookup) -> RepoResult<()> {
    review.validate()?;
    let exists = employees.employee_exists(review.employee_id)?;
    require_reference("employee_id", review.employee_id, exists)?;
    Ok(())
}

fn fetch_rows(conn: &Connection, sql: &str, params: impl Params) -> RepoResult<Vec<ReviewRow>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut fetched = Vec::new();

    while let Some(row) = rows.next()? {
        fetched.push(ReviewRow::from_row(row)?);
    }

    Ok(fetched)
}
