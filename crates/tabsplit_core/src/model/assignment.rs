//! Item-to-people assignment table.
//!
//! # Responsibility
//! - Map each bill item to the set of people sharing its cost.
//! - Provide even-assignment shorthands used by the assignment UI.
//!
//! # Invariants
//! - Assignee sets are deduplicated; assigning the same person twice is a
//!   no-op, not a double share.
//! - The table itself is freely mutable until a split is requested; coverage
//!   and name validation happen at computation time.

use crate::model::bill::{Bill, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Wire shape for one item assignment, as submitted by the assignment UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssignment {
    pub item_id: ItemId,
    pub assigned_to: Vec<String>,
}

/// Wire shape for a full assignment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSubmission {
    pub assignments: Vec<ItemAssignment>,
    pub people: Vec<String>,
}

/// Mapping from item id to the set of people sharing that item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssignmentTable {
    assignments: BTreeMap<ItemId, BTreeSet<String>>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one person to an item's assignee set.
    pub fn assign(&mut self, item_id: ItemId, person: impl Into<String>) {
        self.assignments
            .entry(item_id)
            .or_default()
            .insert(person.into());
    }

    /// Replaces an item's assignee set with an even split among `people`.
    pub fn assign_evenly<I, S>(&mut self, item_id: ItemId, people: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assignees: BTreeSet<String> = people.into_iter().map(Into::into).collect();
        self.assignments.insert(item_id, assignees);
    }

    /// Assigns every item of `bill` evenly to all of `people`.
    ///
    /// Shorthand for populating the table before a split; introduces no new
    /// splitting semantics.
    pub fn assign_all_evenly(&mut self, bill: &Bill, people: &[String]) {
        for item in &bill.items {
            self.assign_evenly(item.id, people.iter().cloned());
        }
    }

    /// Removes one person from an item's assignee set.
    ///
    /// Drops the item entry entirely when its set becomes empty, so the item
    /// shows up as unassigned instead of keeping a hollow entry.
    pub fn unassign(&mut self, item_id: ItemId, person: &str) {
        if let Some(assignees) = self.assignments.get_mut(&item_id) {
            assignees.remove(person);
            if assignees.is_empty() {
                self.assignments.remove(&item_id);
            }
        }
    }

    /// Clears all assignments.
    pub fn clear(&mut self) {
        self.assignments.clear();
    }

    /// Returns the assignee set for one item, if any.
    pub fn assignees(&self, item_id: ItemId) -> Option<&BTreeSet<String>> {
        self.assignments.get(&item_id)
    }

    /// Iterates `(item_id, assignees)` in item-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &BTreeSet<String>)> {
        self.assignments.iter().map(|(id, set)| (*id, set))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }
}

impl From<&AssignmentSubmission> for AssignmentTable {
    fn from(submission: &AssignmentSubmission) -> Self {
        let mut table = AssignmentTable::new();
        for assignment in &submission.assignments {
            for person in &assignment.assigned_to {
                table.assign(assignment.item_id, person.clone());
            }
        }
        table
    }
}
