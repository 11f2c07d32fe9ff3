use roster_core::db::open_db_in_memory;
use roster_core::{
    share, DepartmentLookup, DepartmentRepository, RepoError, SqliteDepartmentRepository,
    SqliteRosterService,
};
use std::rc::Rc;

#[test]
fn create_find_and_lookup_department() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();

    let sales = repo.create("Sales", "Floor 2").unwrap();
    let id = sales.borrow().id().unwrap();

    assert!(repo.department_exists(id).unwrap());
    assert!(!repo.department_exists(id + 1).unwrap());

    let by_id = repo.find_by_id(id).unwrap().unwrap();
    let by_name = repo.find_by_name("Sales").unwrap().unwrap();
    assert!(Rc::ptr_eq(&by_id, &sales));
    assert!(Rc::ptr_eq(&by_name, &sales));
}

#[test]
fn update_and_delete_department() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    let sales = repo.create("Sales", "Floor 2").unwrap();
    let id = sales.borrow().id().unwrap();

    sales.borrow_mut().location = "Floor 3".to_string();
    repo.update(&sales).unwrap();
    let mut fresh = SqliteDepartmentRepository::new(&conn);
    assert_eq!(
        fresh.find_by_id(id).unwrap().unwrap().borrow().location,
        "Floor 3"
    );

    repo.delete(&sales).unwrap();
    assert_eq!(sales.borrow().id(), None);
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(matches!(
        repo.delete(&sales),
        Err(RepoError::NotPersisted("department"))
    ));
}

#[test]
fn update_reports_row_deleted_behind_the_map() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    let sales = repo.create("Sales", "Floor 2").unwrap();
    let id = sales.borrow().id().unwrap();

    conn.execute("DELETE FROM departments WHERE id = ?1;", [id])
        .unwrap();

    let err = repo.update(&sales).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "department",
            id: missing
        } if missing == id
    ));
}

#[test]
fn update_and_delete_reject_a_copy_of_the_mapped_department() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::new(&conn);
    repo.create_table().unwrap();
    let sales = repo.create("Sales", "Floor 2").unwrap();
    let id = sales.borrow().id().unwrap();

    let copy = share(sales.borrow().clone());
    copy.borrow_mut().location = "Basement".to_string();

    assert!(matches!(
        repo.update(&copy),
        Err(RepoError::UntrackedInstance { entity: "department", id: copied }) if copied == id
    ));
    assert!(matches!(
        repo.delete(&copy),
        Err(RepoError::UntrackedInstance { entity: "department", .. })
    ));
    assert!(repo.department_exists(id).unwrap());

    let mapped = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&mapped, &sales));
    assert_eq!(mapped.borrow().location, "Floor 2");
}

#[test]
fn department_employees_lists_members_in_storage_order() {
    let conn = open_db_in_memory().unwrap();
    let mut service = SqliteRosterService::open(&conn);
    service.create_tables().unwrap();
    let sales = service.create_department("Sales", "Floor 2").unwrap();
    let support = service.create_department("Support", "Floor 1").unwrap();
    let sales_id = sales.borrow().id().unwrap();
    let support_id = support.borrow().id().unwrap();

    let ann = service.create_employee("Ann", "Rep", sales_id).unwrap();
    service.create_employee("Bea", "Agent", support_id).unwrap();
    let cal = service.create_employee("Cal", "Lead", sales_id).unwrap();

    let members = service.department_employees(&sales).unwrap();
    assert_eq!(members.len(), 2);
    assert!(Rc::ptr_eq(&members[0], &ann));
    assert!(Rc::ptr_eq(&members[1], &cal));
}
