//! Split computation over a frozen bill.
//!
//! # Responsibility
//! - Validate the bill, people list and assignment coverage.
//! - Turn (bill, assignment table, people) into a per-person settlement.
//!
//! # Invariants
//! - Pure and deterministic: identical inputs yield identical settlements.
//! - `sum(total_due)` equals `subtotal + tax + tip` to the cent for any
//!   valid input; no partial settlement is ever returned.
//! - Leftover cents always go to the people earliest in the people list.

use crate::model::assignment::AssignmentTable;
use crate::model::bill::{Bill, ItemId};
use crate::model::money::Money;
use crate::model::settlement::{Settlement, SettlementEntry};
use crate::split::allocate::{split_evenly, split_proportionally};
use crate::split::{SplitError, SplitResult};
use std::collections::BTreeSet;

/// Computes the per-person settlement for `bill`.
///
/// # Contract
/// - Every bill item must be covered by a non-empty assignee set.
/// - Every assignee must appear in `people`; names are trimmed and must be
///   non-empty and unique.
/// - Tax and tip are shared proportionally to each person's item total;
///   a zero item-total sum yields zero shares for everyone.
///
/// # Errors
/// - `SplitError::Bill` when the bill fails its own invariants.
/// - `SplitError::EmptyPeople`, `InvalidPersonName`, `DuplicatePerson` for
///   people-list defects.
/// - `SplitError::UnassignedItems` listing every uncovered item id.
/// - `SplitError::UnknownItem` / `UnknownPerson` for references outside the
///   bill or the people list.
pub fn compute_splits(
    bill: &Bill,
    table: &AssignmentTable,
    people: &[String],
) -> SplitResult<Settlement> {
    bill.validate().map_err(SplitError::Bill)?;
    let people = normalize_people(people)?;
    validate_coverage(bill, table, &people)?;

    let mut item_totals = vec![Money::ZERO; people.len()];
    for item in &bill.items {
        // Coverage was validated above; every item has assignees here.
        let Some(assignees) = table.assignees(item.id) else {
            continue;
        };

        // Stable order: assignees sorted by their position in the people
        // list, so leftover cents land deterministically.
        let mut indices: Vec<usize> = people
            .iter()
            .enumerate()
            .filter(|(_, person)| assignees.contains(*person))
            .map(|(index, _)| index)
            .collect();
        indices.sort_unstable();

        let shares = split_evenly(item.price, indices.len());
        for (index, share) in indices.into_iter().zip(shares) {
            item_totals[index] += share;
        }
    }

    let tax_shares = split_proportionally(bill.tax, &item_totals);
    let tip_shares = split_proportionally(bill.tip, &item_totals);

    let entries = people
        .into_iter()
        .enumerate()
        .map(|(index, person)| SettlementEntry {
            person,
            item_total: item_totals[index],
            tax_share: tax_shares[index],
            tip_share: tip_shares[index],
            total_due: item_totals[index] + tax_shares[index] + tip_shares[index],
        })
        .collect();

    Ok(Settlement::new(entries))
}

fn normalize_people(people: &[String]) -> SplitResult<Vec<String>> {
    if people.is_empty() {
        return Err(SplitError::EmptyPeople);
    }

    let mut normalized = Vec::with_capacity(people.len());
    let mut seen = BTreeSet::new();
    for person in people {
        let trimmed = person.trim();
        if trimmed.is_empty() {
            return Err(SplitError::InvalidPersonName(person.clone()));
        }
        if !seen.insert(trimmed.to_string()) {
            return Err(SplitError::DuplicatePerson(trimmed.to_string()));
        }
        normalized.push(trimmed.to_string());
    }
    Ok(normalized)
}

fn validate_coverage(
    bill: &Bill,
    table: &AssignmentTable,
    people: &[String],
) -> SplitResult<()> {
    for (item_id, assignees) in table.iter() {
        if bill.item(item_id).is_none() {
            return Err(SplitError::UnknownItem(item_id));
        }
        for assignee in assignees {
            if !people.iter().any(|person| person == assignee) {
                return Err(SplitError::UnknownPerson(assignee.clone()));
            }
        }
    }

    let unassigned: Vec<ItemId> = bill
        .items
        .iter()
        .map(|item| item.id)
        .filter(|id| table.assignees(*id).map_or(true, BTreeSet::is_empty))
        .collect();
    if !unassigned.is_empty() {
        return Err(SplitError::UnassignedItems(unassigned));
    }

    Ok(())
}
