use tabsplit_core::db::open_db_in_memory;
use tabsplit_core::{
    compute_splits, AssignmentTable, Bill, BillRepository, Money, PaidLedger, RepoError,
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

fn demo_settlement(bill: &Bill) -> tabsplit_core::Settlement {
    let people = vec!["ana".to_string(), "ben".to_string()];
    let mut table = AssignmentTable::new();
    table.assign_all_evenly(bill, &people);
    compute_splits(bill, &table, &people).unwrap()
}

#[test]
fn create_and_get_bill_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    let id = repo.create_bill(&bill).unwrap();

    let loaded = repo.get_bill(id).unwrap().unwrap();
    assert_eq!(loaded, bill);
}

#[test]
fn get_missing_bill_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    assert!(repo.get_bill(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn invalid_bill_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let mut bill = demo_bill();
    bill.total = Money::from_cents(9999);
    let err = repo.create_bill(&bill).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.get_bill(bill.id).unwrap().is_none());
}

#[test]
fn settlement_roundtrip_preserves_entries_order_and_flags() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    repo.create_bill(&bill).unwrap();

    let settlement = demo_settlement(&bill);
    let mut ledger = PaidLedger::for_people(settlement.people());
    ledger.toggle("ben").unwrap();
    repo.replace_settlement(bill.id, &settlement, &ledger).unwrap();

    let (loaded, loaded_ledger) = repo.load_settlement(bill.id).unwrap().unwrap();
    assert_eq!(loaded, settlement);
    assert_eq!(loaded_ledger.is_paid("ana"), Some(false));
    assert_eq!(loaded_ledger.is_paid("ben"), Some(true));
}

#[test]
fn load_settlement_before_assignment_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    repo.create_bill(&bill).unwrap();
    assert!(repo.load_settlement(bill.id).unwrap().is_none());
}

#[test]
fn replace_settlement_for_missing_bill_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    let settlement = demo_settlement(&bill);
    let ledger = PaidLedger::for_people(settlement.people());

    let err = repo
        .replace_settlement(bill.id, &settlement, &ledger)
        .unwrap_err();
    assert!(matches!(err, RepoError::BillNotFound(id) if id == bill.id));
}

#[test]
fn replace_settlement_is_wholesale() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    repo.create_bill(&bill).unwrap();

    let settlement = demo_settlement(&bill);
    let ledger = PaidLedger::for_people(settlement.people());
    repo.replace_settlement(bill.id, &settlement, &ledger).unwrap();

    // Recompute with a single person; the old two-person rows must vanish.
    let people = vec!["cat".to_string()];
    let mut table = AssignmentTable::new();
    table.assign_all_evenly(&bill, &people);
    let replacement = compute_splits(&bill, &table, &people).unwrap();
    let replacement_ledger = PaidLedger::for_people(replacement.people());
    repo.replace_settlement(bill.id, &replacement, &replacement_ledger)
        .unwrap();

    let (loaded, loaded_ledger) = repo.load_settlement(bill.id).unwrap().unwrap();
    assert_eq!(loaded.entries().len(), 1);
    assert_eq!(loaded.entries()[0].person, "cat");
    assert_eq!(loaded_ledger.is_paid("ana"), None);
}

#[test]
fn set_paid_updates_one_person() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    repo.create_bill(&bill).unwrap();
    let settlement = demo_settlement(&bill);
    let ledger = PaidLedger::for_people(settlement.people());
    repo.replace_settlement(bill.id, &settlement, &ledger).unwrap();

    repo.set_paid(bill.id, "ana", true).unwrap();
    let (_, loaded_ledger) = repo.load_settlement(bill.id).unwrap().unwrap();
    assert_eq!(loaded_ledger.is_paid("ana"), Some(true));
    assert_eq!(loaded_ledger.is_paid("ben"), Some(false));
}

#[test]
fn set_paid_for_unknown_person_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBillRepository::new(&conn);

    let bill = demo_bill();
    repo.create_bill(&bill).unwrap();
    let settlement = demo_settlement(&bill);
    let ledger = PaidLedger::for_people(settlement.people());
    repo.replace_settlement(bill.id, &settlement, &ledger).unwrap();

    let err = repo.set_paid(bill.id, "ghost", true).unwrap_err();
    assert!(matches!(
        err,
        RepoError::PersonNotFound { person, .. } if person == "ghost"
    ));
}
