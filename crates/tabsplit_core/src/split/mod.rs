//! Split calculation: validation errors and the settlement computation.
//!
//! # Responsibility
//! - Define the caller-fixable validation error taxonomy for splitting.
//! - Expose the pure `compute_splits` entry point.
//!
//! # Invariants
//! - Errors abort the computation; no partial settlement escapes.
//! - All error variants are recoverable by retrying with corrected input.

use crate::model::bill::{BillValidationError, ItemId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod allocate;
mod calculator;

pub use calculator::compute_splits;

pub type SplitResult<T> = Result<T, SplitError>;

/// Validation and consistency errors raised by split computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// Upstream bill invariant violation; fixing it belongs to bill review.
    Bill(BillValidationError),
    /// The people list is empty.
    EmptyPeople,
    /// A person name is blank after trimming.
    InvalidPersonName(String),
    /// The same name appears twice in the people list.
    DuplicatePerson(String),
    /// Items with no assignees; lists every offender, none are dropped.
    UnassignedItems(Vec<ItemId>),
    /// The assignment table references an item id outside the bill.
    UnknownItem(ItemId),
    /// The assignment table references a person missing from the list.
    UnknownPerson(String),
}

impl Display for SplitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bill(err) => write!(f, "{err}"),
            Self::EmptyPeople => write!(f, "people list is empty"),
            Self::InvalidPersonName(name) => {
                write!(f, "person name `{name}` is blank after trimming")
            }
            Self::DuplicatePerson(name) => {
                write!(f, "duplicate person name in people list: `{name}`")
            }
            Self::UnassignedItems(ids) => {
                let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "items without assignees: [{}]", rendered.join(", "))
            }
            Self::UnknownItem(id) => write!(f, "assignment references unknown item id {id}"),
            Self::UnknownPerson(name) => {
                write!(f, "assignment references unknown person `{name}`")
            }
        }
    }
}

impl Error for SplitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bill(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BillValidationError> for SplitError {
    fn from(value: BillValidationError) -> Self {
        Self::Bill(value)
    }
}
