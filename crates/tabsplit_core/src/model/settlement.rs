//! Settlement record and paid-state ledger.
//!
//! # Responsibility
//! - Hold the computed per-person breakdown of owed amounts.
//! - Track paid/unpaid flags independently of settlement recomputation.
//!
//! # Invariants
//! - A settlement is replaced wholesale on every computation, never patched;
//!   `revision` orders replacements so stale results can be discarded.
//! - Paid flags survive settlement regeneration and are pruned only when a
//!   person leaves the people list.
//! - A paid toggle on an unknown person is an error, never an auto-insert.

use crate::model::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-person breakdown of owed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    pub person: String,
    /// Sum of this person's shares of the items assigned to them.
    pub item_total: Money,
    /// Proportional share of the bill's tax.
    pub tax_share: Money,
    /// Proportional share of the bill's tip.
    pub tip_share: Money,
    /// `item_total + tax_share + tip_share`.
    pub total_due: Money,
}

/// Full settlement for one bill: entries in people order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    entries: Vec<SettlementEntry>,
    /// Monotonic counter bumped per recomputation; a settlement with a lower
    /// revision than the current one is stale and must be discarded.
    revision: u64,
}

impl Settlement {
    pub(crate) fn new(entries: Vec<SettlementEntry>) -> Self {
        Self {
            entries,
            revision: 0,
        }
    }

    /// Restores a persisted settlement with its stored revision.
    pub fn from_parts(entries: Vec<SettlementEntry>, revision: u64) -> Self {
        Self { entries, revision }
    }

    /// Marks this settlement as the successor of `previous`.
    pub(crate) fn supersede(mut self, previous: Option<&Settlement>) -> Self {
        self.revision = previous.map_or(0, |settlement| settlement.revision + 1);
        self
    }

    pub fn entries(&self) -> &[SettlementEntry] {
        &self.entries
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up one person's entry.
    pub fn entry(&self, person: &str) -> Option<&SettlementEntry> {
        self.entries.iter().find(|entry| entry.person == person)
    }

    /// People in settlement order.
    pub fn people(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.person.as_str())
    }

    /// Sum of all `total_due` amounts (reconciles to the bill total).
    pub fn total_collected(&self) -> Money {
        self.entries.iter().map(|entry| entry.total_due).sum()
    }
}

/// Paid-toggle error: the ledger never auto-inserts people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    UnknownPerson(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPerson(person) => write!(f, "unknown person in paid ledger: `{person}`"),
        }
    }
}

impl Error for LedgerError {}

/// Paid/unpaid flags keyed by person.
///
/// The aggregate views (`outstanding`, `fully_paid`) are pure functions over
/// the ledger and a settlement, recomputed on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaidLedger {
    paid: BTreeMap<String, bool>,
}

impl PaidLedger {
    /// Creates a ledger with every person unpaid.
    pub fn for_people<I, S>(people: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paid: people
                .into_iter()
                .map(|person| (person.into(), false))
                .collect(),
        }
    }

    /// Restores a persisted ledger from explicit flags.
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            paid: flags
                .into_iter()
                .map(|(person, paid)| (person.into(), paid))
                .collect(),
        }
    }

    /// Builds the ledger for a regenerated settlement.
    ///
    /// Existing flags are preserved, new people default to unpaid, and
    /// people no longer present are pruned.
    pub fn carry_over<'a, I>(&self, people: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            paid: people
                .into_iter()
                .map(|person| {
                    let paid = self.paid.get(person).copied().unwrap_or(false);
                    (person.to_string(), paid)
                })
                .collect(),
        }
    }

    /// Flips one person's paid flag and returns the new value.
    ///
    /// Two toggles of the same person cancel out; both transition directions
    /// are always legal.
    pub fn toggle(&mut self, person: &str) -> Result<bool, LedgerError> {
        match self.paid.get_mut(person) {
            Some(flag) => {
                *flag = !*flag;
                Ok(*flag)
            }
            None => Err(LedgerError::UnknownPerson(person.to_string())),
        }
    }

    /// Sets one person's paid flag to an explicit value.
    pub fn set_paid(&mut self, person: &str, paid: bool) -> Result<(), LedgerError> {
        match self.paid.get_mut(person) {
            Some(flag) => {
                *flag = paid;
                Ok(())
            }
            None => Err(LedgerError::UnknownPerson(person.to_string())),
        }
    }

    /// Returns one person's paid flag, or `None` when absent.
    pub fn is_paid(&self, person: &str) -> Option<bool> {
        self.paid.get(person).copied()
    }

    /// Iterates `(person, paid)` in name order.
    pub fn flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.paid.iter().map(|(person, paid)| (person.as_str(), *paid))
    }

    pub fn len(&self) -> usize {
        self.paid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paid.is_empty()
    }

    /// Sum of `total_due` over people not yet marked paid.
    ///
    /// People present in the settlement but missing from the ledger count as
    /// unpaid; owed money never silently disappears from the aggregate.
    pub fn outstanding(&self, settlement: &Settlement) -> Money {
        settlement
            .entries()
            .iter()
            .filter(|entry| !self.is_paid(&entry.person).unwrap_or(false))
            .map(|entry| entry.total_due)
            .sum()
    }

    /// Whether nothing remains to collect for `settlement`.
    pub fn fully_paid(&self, settlement: &Settlement) -> bool {
        self.outstanding(settlement).is_zero()
    }
}
