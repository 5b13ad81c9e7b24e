use tabsplit_core::db::open_db_in_memory;
use tabsplit_core::{
    AssignmentSubmission, Bill, ItemAssignment, Money, SplitService, SplitServiceError,
    SqliteBillRepository,
};
use uuid::Uuid;

fn demo_bill() -> Bill {
    Bill::new(
        "Luigi's",
        vec![
            ("Burger".to_string(), Money::from_cents(1200)),
            ("Fries".to_string(), Money::from_cents(400)),
        ],
        Money::from_cents(1600),
        Money::from_cents(160),
        Money::from_cents(320),
        Money::from_cents(2080),
    )
}

fn demo_submission() -> AssignmentSubmission {
    AssignmentSubmission {
        assignments: vec![
            ItemAssignment {
                item_id: 0,
                assigned_to: vec!["ana".to_string(), "ben".to_string()],
            },
            ItemAssignment {
                item_id: 1,
                assigned_to: vec!["ana".to_string()],
            },
        ],
        people: vec!["ana".to_string(), "ben".to_string()],
    }
}

#[test]
fn create_assign_and_read_back_through_the_service() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let bill = demo_bill();
    let id = service.create_bill(&bill).unwrap();
    assert_eq!(service.get_bill(id).unwrap(), bill);

    let settlement = service.submit_assignments(id, &demo_submission()).unwrap();
    assert_eq!(settlement.total_collected(), Money::from_cents(2080));
    assert_eq!(settlement.revision(), 0);
}

#[test]
fn missing_bill_is_a_semantic_error() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let ghost = Uuid::new_v4();
    assert!(matches!(
        service.get_bill(ghost),
        Err(SplitServiceError::BillNotFound(id)) if id == ghost
    ));
    assert!(matches!(
        service.submit_assignments(ghost, &demo_submission()),
        Err(SplitServiceError::BillNotFound(_))
    ));
}

#[test]
fn resubmission_bumps_revision_and_keeps_paid_flags() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let id = service.create_bill(&demo_bill()).unwrap();
    service.submit_assignments(id, &demo_submission()).unwrap();
    service.toggle_paid(id, "ben").unwrap();

    let settlement = service.submit_assignments(id, &demo_submission()).unwrap();
    assert_eq!(settlement.revision(), 1);

    // ben stayed paid across the wholesale replacement.
    let status = service.toggle_paid(id, "ben").unwrap();
    assert!(!status.paid);
}

#[test]
fn toggle_before_assignment_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let id = service.create_bill(&demo_bill()).unwrap();
    assert!(matches!(
        service.toggle_paid(id, "ana"),
        Err(SplitServiceError::NotYetAssigned(_))
    ));
}

#[test]
fn toggle_updates_persisted_aggregates() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let id = service.create_bill(&demo_bill()).unwrap();
    service.submit_assignments(id, &demo_submission()).unwrap();

    let status = service.toggle_paid(id, "ana").unwrap();
    assert!(status.paid);
    assert_eq!(status.outstanding, Money::from_cents(780));
    assert!(!status.fully_paid);

    let status = service.toggle_paid(id, "ben").unwrap();
    assert!(status.fully_paid);

    assert!(matches!(
        service.toggle_paid(id, "ghost"),
        Err(SplitServiceError::UnknownPerson { person, .. }) if person == "ghost"
    ));
}

#[test]
fn payment_references_require_a_stored_settlement() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let id = service.create_bill(&demo_bill()).unwrap();
    assert!(matches!(
        service.payment_references(id, "@luigi"),
        Err(SplitServiceError::NotYetAssigned(_))
    ));

    service.submit_assignments(id, &demo_submission()).unwrap();
    let references = service.payment_references(id, "@luigi").unwrap();
    assert_eq!(references.len(), 2);
    assert!(references[0].link.contains("note=Bill%20from%20Luigi%27s"));
}

#[test]
fn history_entry_derives_fully_paid() {
    let conn = open_db_in_memory().unwrap();
    let service = SplitService::new(SqliteBillRepository::new(&conn));

    let id = service.create_bill(&demo_bill()).unwrap();
    service.submit_assignments(id, &demo_submission()).unwrap();

    let entry = service.history_entry(id, 1_700_000_000_000).unwrap();
    assert_eq!(entry.bill_id, id);
    assert_eq!(entry.restaurant, "Luigi's");
    assert_eq!(entry.recorded_at, 1_700_000_000_000);
    assert!(!entry.fully_paid);

    service.toggle_paid(id, "ana").unwrap();
    service.toggle_paid(id, "ben").unwrap();
    assert!(service.history_entry(id, 1_700_000_000_001).unwrap().fully_paid);
}
