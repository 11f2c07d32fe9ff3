use roster_core::db::{open_db_in_memory, open_db_in_memory_with};
use roster_core::{
    share, DbOptions, Employee, EmployeeId, EmployeeRepository, RepoError, Review,
    ReviewRepository, Shared, SqliteRosterService, ValidationError, MIN_REVIEW_YEAR,
};
use rusqlite::Connection;
use std::rc::Rc;

#[test]
fn create_rejects_year_before_2000_without_insert() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");

    let err = service.create_review(1999, "Solid year", ann).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::YearOutOfRange {
            year: 1999,
            min: MIN_REVIEW_YEAR
        })
    ));
    assert_eq!(review_count(&conn), 0);

    let accepted = service
        .create_review(MIN_REVIEW_YEAR, "First review", ann)
        .unwrap();
    assert!(accepted.borrow().is_persisted());
}

#[test]
fn create_rejects_blank_summary() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");

    let err = service.create_review(2023, "  \t ", ann).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankField { field: "summary" })
    ));
    assert_eq!(review_count(&conn), 0);
}

#[test]
fn create_rejects_unknown_employee() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);

    let err = service.create_review(2023, "Great work", 77).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingReference {
            field: "employee_id",
            id: 77
        })
    ));
    assert_eq!(review_count(&conn), 0);
}

#[test]
fn employee_reviews_returns_only_matching_reviews_in_storage_order() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let bea = hire(&mut service, "Bea");

    let first = service.create_review(2021, "Ann 2021", ann).unwrap();
    service.create_review(2021, "Bea 2021", bea).unwrap();
    let second = service.create_review(2022, "Ann 2022", ann).unwrap();

    let ann_record = find_employee(&mut service, ann);
    let reviews = service.employee_reviews(&ann_record).unwrap();

    assert_eq!(reviews.len(), 2);
    assert!(Rc::ptr_eq(&reviews[0], &first));
    assert!(Rc::ptr_eq(&reviews[1], &second));
    assert!(reviews
        .iter()
        .all(|review| review.borrow().employee_id == ann));
}

#[test]
fn find_by_id_returns_the_same_instance_and_update_persists() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    review.borrow_mut().summary = "Very good".to_string();
    service.update_review(&review).unwrap();

    let found = service.reviews().find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&found, &review));
    assert_eq!(found.borrow().summary, "Very good");

    let stored: String = conn
        .query_row("SELECT summary FROM reviews WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, "Very good");
}

#[test]
fn update_rejects_invalid_year_and_keeps_row() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();

    review.borrow_mut().year = 1985;
    let err = service.update_review(&review).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::YearOutOfRange { year: 1985, .. })
    ));

    let stored: i32 = conn
        .query_row("SELECT year FROM reviews;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 2022);
}

#[test]
fn delete_evicts_and_detaches_review() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    service.delete_review(&review).unwrap();

    assert_eq!(review.borrow().id(), None);
    assert!(service.reviews().find_by_id(id).unwrap().is_none());
    assert!(service.reviews().identity_map().is_empty());
}

#[test]
fn saving_an_unsaved_review_registers_it() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = share(Review::new(2024, "Mid-year", ann).unwrap());

    let id = service.save_review(&review).unwrap();

    let all = service.reviews().get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert!(Rc::ptr_eq(&all[0], &review));
    assert_eq!(review.borrow().id(), Some(id));
}

#[test]
fn deleting_employee_leaves_reviews_orphaned() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    service.create_review(2021, "One", ann).unwrap();
    service.create_review(2022, "Two", ann).unwrap();

    let ann_record = find_employee(&mut service, ann);
    service.delete_employee(&ann_record).unwrap();

    assert_eq!(review_count(&conn), 2);
    assert_eq!(service.count_orphaned_reviews().unwrap(), 2);
    assert_eq!(service.reviews().find_by_employee_id(ann).unwrap().len(), 2);
}

#[test]
fn reused_employee_id_adopts_orphaned_reviews() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    service.create_review(2021, "Ann's review", ann).unwrap();

    let ann_record = find_employee(&mut service, ann);
    service.delete_employee(&ann_record).unwrap();
    assert_eq!(service.count_orphaned_reviews().unwrap(), 1);

    let bob = hire(&mut service, "Bob");
    assert_eq!(bob, ann);
    assert_eq!(service.count_orphaned_reviews().unwrap(), 0);

    let bob_record = find_employee(&mut service, bob);
    let reviews = service.employee_reviews(&bob_record).unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].borrow().summary, "Ann's review");
}

#[test]
fn enforced_foreign_keys_block_deleting_reviewed_employee() {
    let options = DbOptions {
        foreign_keys: true,
        ..DbOptions::default()
    };
    let conn = open_db_in_memory_with(options).unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    service.create_review(2021, "One", ann).unwrap();

    let ann_record = find_employee(&mut service, ann);
    let err = service.delete_employee(&ann_record).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(ann_record.borrow().id(), Some(ann));
    assert_eq!(service.count_orphaned_reviews().unwrap(), 0);
}

#[test]
fn update_rejects_unknown_employee_and_keeps_row() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();

    review.borrow_mut().employee_id = 404;
    let err = service.update_review(&review).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingReference {
            field: "employee_id",
            id: 404
        })
    ));

    let stored: i64 = conn
        .query_row("SELECT employee_id FROM reviews;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, ann);
}

#[test]
fn update_and_delete_report_row_removed_behind_the_map() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    conn.execute("DELETE FROM reviews WHERE id = ?1;", [id])
        .unwrap();

    assert!(matches!(
        service.update_review(&review),
        Err(RepoError::NotFound { entity: "review", id: missing }) if missing == id
    ));
    assert!(matches!(
        service.delete_review(&review),
        Err(RepoError::NotFound { entity: "review", id: missing }) if missing == id
    ));
    assert_eq!(review.borrow().id(), Some(id));
    assert!(service.reviews().identity_map().contains(id));
}

#[test]
fn update_and_delete_reject_a_copy_of_the_mapped_review() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    let copy = share(review.borrow().clone());
    copy.borrow_mut().summary = "Rewritten".to_string();

    assert!(matches!(
        service.update_review(&copy),
        Err(RepoError::UntrackedInstance { entity: "review", id: copied }) if copied == id
    ));
    assert!(matches!(
        service.delete_review(&copy),
        Err(RepoError::UntrackedInstance { entity: "review", .. })
    ));

    let stored: String = conn
        .query_row("SELECT summary FROM reviews WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, "Good");
    assert_eq!(copy.borrow().id(), Some(id));

    service.delete_review(&review).unwrap();
    assert_eq!(review.borrow().id(), None);
}

#[test]
fn hydration_refreshes_the_mapped_review() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    conn.execute(
        "UPDATE reviews SET year = 2024, summary = 'Outstanding' WHERE id = ?1;",
        [id],
    )
    .unwrap();
    let found = service.reviews().find_by_id(id).unwrap().unwrap();

    assert!(Rc::ptr_eq(&found, &review));
    assert_eq!(review.borrow().year, 2024);
    assert_eq!(review.borrow().summary, "Outstanding");
    assert_eq!(service.reviews().identity_map().len(), 1);
}

#[test]
fn hydration_reports_borrowed_review_instead_of_panicking() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    let review = service.create_review(2022, "Good", ann).unwrap();
    let id = review.borrow().id().unwrap();

    let _writer = review.borrow_mut();
    let err = service.reviews().find_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::InstanceBorrowed("review")));
}

#[test]
fn hydration_rejects_rows_missing_year_or_employee() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (NULL, 'No year', ?1);",
        [ann],
    )
    .unwrap();
    let no_year = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (2022, 'Nobody', NULL);",
        [],
    )
    .unwrap();
    let no_employee = conn.last_insert_rowid();

    for id in [no_year, no_employee] {
        let err = service.reviews().find_by_id(id).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)), "row {id}: {err}");
    }
    assert!(service.reviews().identity_map().is_empty());
}

#[test]
fn hydration_rejects_stored_rows_that_fail_validation() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ready_service(&conn);
    let ann = hire(&mut service, "Ann");
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (1999, 'Too early', ?1);",
        [ann],
    )
    .unwrap();
    let early = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (2022, '   ', ?1);",
        [ann],
    )
    .unwrap();
    let blank = conn.last_insert_rowid();

    for id in [early, blank] {
        let err = service.reviews().find_by_id(id).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)), "row {id}: {err}");
    }
    assert!(matches!(
        service.reviews().get_all(),
        Err(RepoError::InvalidData(_))
    ));
}

fn find_employee(service: &mut SqliteRosterService<'_>, id: EmployeeId) -> Shared<Employee> {
    service.employees().find_by_id(id).unwrap().unwrap()
}

fn ready_service(conn: &Connection) -> SqliteRosterService<'_> {
    let mut service = SqliteRosterService::open(conn);
    service.create_tables().unwrap();
    service.create_department("Engineering", "Building A").unwrap();
    service
}

fn hire(service: &mut SqliteRosterService<'_>, name: &str) -> EmployeeId {
    let employee = service.create_employee(name, "Engineer", 1).unwrap();
    let id = employee.borrow().id().unwrap();
    id
}

fn review_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))
        .unwrap()
}
