use tabsplit_core::{
    compute_splits, generate_references, AssignmentTable, Bill, Money, PaymentError,
};

fn settled_bill(items: &[(&str, i64)], names: &[&str]) -> tabsplit_core::Settlement {
    let subtotal: i64 = items.iter().map(|(_, cents)| cents).sum();
    let bill = Bill::new(
        "Luigi's Trattoria",
        items
            .iter()
            .map(|(name, cents)| (name.to_string(), Money::from_cents(*cents)))
            .collect(),
        Money::from_cents(subtotal),
        Money::ZERO,
        Money::ZERO,
        Money::from_cents(subtotal),
    );
    let people: Vec<String> = names.iter().map(|name| name.to_string()).collect();
    let mut table = AssignmentTable::new();
    for index in 0..items.len() {
        table.assign(index as u32, names[index % names.len()]);
    }
    compute_splits(&bill, &table, &people).unwrap()
}

#[test]
fn links_carry_handle_amount_and_encoded_note() {
    let settlement = settled_bill(&[("Pizza", 1850)], &["ana"]);
    let references = generate_references(&settlement, "@luigi", "Luigi's Trattoria").unwrap();

    assert_eq!(references.len(), 1);
    let reference = &references[0];
    assert_eq!(reference.person, "ana");
    assert_eq!(reference.amount, Money::from_cents(1850));
    assert_eq!(
        reference.link,
        "https://venmo.com/luigi?txn=pay&amount=18.50&note=Bill%20from%20Luigi%27s%20Trattoria"
    );
    // The scannable payload encodes exactly the link.
    assert_eq!(reference.code, reference.link);
}

#[test]
fn zero_due_people_get_no_reference() {
    let settlement = settled_bill(&[("Pizza", 1850), ("Water", 0)], &["ana", "ben"]);
    let references = generate_references(&settlement, "luigi", "Luigi's").unwrap();

    assert_eq!(references.len(), 1);
    assert_eq!(references[0].person, "ana");
}

#[test]
fn missing_handle_aborts_generation() {
    let settlement = settled_bill(&[("Pizza", 1850)], &["ana"]);
    assert_eq!(
        generate_references(&settlement, "", "Luigi's").unwrap_err(),
        PaymentError::MissingOrganizerHandle
    );
    assert_eq!(
        generate_references(&settlement, "   ", "Luigi's").unwrap_err(),
        PaymentError::MissingOrganizerHandle
    );
}

#[test]
fn malformed_handle_is_rejected() {
    let settlement = settled_bill(&[("Pizza", 1850)], &["ana"]);
    assert!(matches!(
        generate_references(&settlement, "lui gi", "Luigi's"),
        Err(PaymentError::InvalidOrganizerHandle(_))
    ));
}

#[test]
fn blank_restaurant_label_falls_back() {
    let settlement = settled_bill(&[("Pizza", 1850)], &["ana"]);
    let references = generate_references(&settlement, "luigi", "  ").unwrap();
    assert!(references[0].link.ends_with("note=Bill%20from%20Restaurant"));
}

#[test]
fn references_are_regenerable_and_identical() {
    let settlement = settled_bill(&[("Pizza", 1850), ("Salad", 950)], &["ana", "ben"]);
    let first = generate_references(&settlement, "luigi", "Luigi's").unwrap();
    let second = generate_references(&settlement, "luigi", "Luigi's").unwrap();
    assert_eq!(first, second);
}
