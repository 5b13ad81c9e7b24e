//! Bill domain model.
//!
//! # Responsibility
//! - Define the canonical digitized receipt: items plus summary figures.
//! - Validate bill-level consistency before any split computation.
//!
//! # Invariants
//! - `id` is stable and never reused for another bill.
//! - Item ids are the item's index in `items` (stable assignment keys).
//! - `total == subtotal + tax + tip` within a one-cent tolerance; mismatch
//!   is reported, never auto-corrected by the core.

use crate::model::money::Money;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a digitized bill.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BillId = Uuid;

/// Stable per-bill identifier of a line item (its index in `Bill::items`).
pub type ItemId = u32;

/// Tolerance, in cents, for OCR rounding noise in the bill summary figures.
pub const BILL_TOLERANCE_CENTS: i64 = 1;

/// One receipt line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Index-stable id used as the assignment key.
    pub id: ItemId,
    pub name: String,
    pub price: Money,
}

/// Canonical digitized receipt.
///
/// Created once by receipt ingestion (external) and read-only to the core
/// after review completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Stable global ID used for persistence, history and payment flows.
    pub id: BillId,
    pub restaurant: String,
    pub items: Vec<Item>,
    pub subtotal: Money,
    pub tax: Money,
    pub tip: Money,
    pub total: Money,
}

/// Bill-level consistency violations (upstream ingestion/review defects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillValidationError {
    /// `total` differs from `subtotal + tax + tip` by more than one cent.
    TotalMismatch { expected: Money, actual: Money },
    /// A summary figure or item price is negative.
    NegativeAmount { field: String, amount: Money },
    /// An item's `id` does not match its index in `items`.
    MisnumberedItem { index: usize, id: ItemId },
}

impl Display for BillValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalMismatch { expected, actual } => write!(
                f,
                "bill total {actual} does not reconcile with subtotal + tax + tip = {expected}"
            ),
            Self::NegativeAmount { field, amount } => {
                write!(f, "bill field `{field}` has negative amount {amount}")
            }
            Self::MisnumberedItem { index, id } => {
                write!(f, "item at index {index} carries id {id}; ids must be index-stable")
            }
        }
    }
}

impl Error for BillValidationError {}

impl Bill {
    /// Creates a bill with a generated id and index-stable item ids.
    pub fn new(
        restaurant: impl Into<String>,
        item_lines: Vec<(String, Money)>,
        subtotal: Money,
        tax: Money,
        tip: Money,
        total: Money,
    ) -> Self {
        let items = item_lines
            .into_iter()
            .enumerate()
            .map(|(index, (name, price))| Item {
                id: index as ItemId,
                name,
                price,
            })
            .collect();
        Self {
            id: Uuid::new_v4(),
            restaurant: restaurant.into(),
            items,
            subtotal,
            tax,
            tip,
            total,
        }
    }

    /// Checks bill-level invariants.
    ///
    /// # Errors
    /// - `NegativeAmount` for any negative price or summary figure.
    /// - `MisnumberedItem` when an item id drifts from its index.
    /// - `TotalMismatch` when `total` is off by more than one cent.
    pub fn validate(&self) -> Result<(), BillValidationError> {
        for (field, amount) in [
            ("subtotal", self.subtotal),
            ("tax", self.tax),
            ("tip", self.tip),
            ("total", self.total),
        ] {
            if amount.is_negative() {
                return Err(BillValidationError::NegativeAmount {
                    field: field.to_string(),
                    amount,
                });
            }
        }

        for (index, item) in self.items.iter().enumerate() {
            if item.price.is_negative() {
                return Err(BillValidationError::NegativeAmount {
                    field: format!("items[{index}].price"),
                    amount: item.price,
                });
            }
            if item.id as usize != index {
                return Err(BillValidationError::MisnumberedItem {
                    index,
                    id: item.id,
                });
            }
        }

        let expected = self.subtotal + self.tax + self.tip;
        if expected.abs_diff_cents(self.total) > BILL_TOLERANCE_CENTS {
            return Err(BillValidationError::TotalMismatch {
                expected,
                actual: self.total,
            });
        }

        Ok(())
    }

    /// Sum of all item prices (the reconciled subtotal).
    pub fn items_total(&self) -> Money {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Looks up one item by its stable id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id as usize)
    }
}
