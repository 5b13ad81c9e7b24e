//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tabsplit_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::error::Error;

use tabsplit_core::{AssignmentSubmission, Bill, ItemAssignment, Money, SplitSession};

fn main() -> Result<(), Box<dyn Error>> {
    println!("tabsplit_core ping={}", tabsplit_core::ping());
    println!("tabsplit_core version={}", tabsplit_core::core_version());

    // Deterministic demo split so the whole pipeline is exercised without
    // any storage or network setup.
    let bill = Bill::new(
        "Demo Diner",
        vec![
            ("Burger".to_string(), Money::from_cents(1200)),
            ("Fries".to_string(), Money::from_cents(400)),
        ],
        Money::from_cents(1600),
        Money::from_cents(160),
        Money::from_cents(320),
        Money::from_cents(2080),
    );

    let mut session = SplitSession::new(bill);
    session.finish_review()?;
    let submission = AssignmentSubmission {
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
    };

    let settlement = session.submit_assignments(&submission)?;
    for entry in settlement.entries() {
        println!(
            "{} owes {} (items={} tax={} tip={})",
            entry.person, entry.total_due, entry.item_total, entry.tax_share, entry.tip_share
        );
    }

    for reference in session.payment_references("@demo-organizer")? {
        println!("{} -> {}", reference.person, reference.link);
    }

    Ok(())
}
