//! Storage-backed split use-case service.
//!
//! # Responsibility
//! - Orchestrate bill persistence, split computation, payment reference
//!   generation and paid-state changes over a `BillRepository`.
//! - Emit structured log events for each use case.
//!
//! # Invariants
//! - Assignment submissions replace the stored settlement wholesale; paid
//!   flags carry over and removed people are pruned.
//! - Service APIs never bypass repository validation contracts.

use crate::model::assignment::{AssignmentSubmission, AssignmentTable};
use crate::model::bill::{Bill, BillId};
use crate::model::settlement::Settlement;
use crate::payment::{generate_references, PaymentError, PaymentReference};
use crate::repo::bill_repo::{BillRepository, RepoError};
use crate::repo::history_repo::HistoryEntry;
use crate::session::PaidStatus;
use crate::split::{compute_splits, SplitError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SplitServiceResult<T> = Result<T, SplitServiceError>;

/// Service error for split use-cases.
#[derive(Debug)]
pub enum SplitServiceError {
    /// Target bill does not exist.
    BillNotFound(BillId),
    /// The bill has no stored settlement yet (assignment never submitted).
    NotYetAssigned(BillId),
    /// Paid toggle addressed a person outside the settlement.
    UnknownPerson { bill_id: BillId, person: String },
    /// Split-computation validation failure.
    Split(SplitError),
    /// Payment reference generation failure.
    Payment(PaymentError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for SplitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BillNotFound(id) => write!(f, "bill not found: {id}"),
            Self::NotYetAssigned(id) => write!(f, "bill {id} has not been assigned yet"),
            Self::UnknownPerson { bill_id, person } => {
                write!(f, "person `{person}` not in settlement of bill {bill_id}")
            }
            Self::Split(err) => write!(f, "{err}"),
            Self::Payment(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SplitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Split(err) => Some(err),
            Self::Payment(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SplitError> for SplitServiceError {
    fn from(value: SplitError) -> Self {
        Self::Split(value)
    }
}

impl From<PaymentError> for SplitServiceError {
    fn from(value: PaymentError) -> Self {
        Self::Payment(value)
    }
}

impl From<RepoError> for SplitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::BillNotFound(id) => Self::BillNotFound(id),
            RepoError::PersonNotFound { bill_id, person } => {
                Self::UnknownPerson { bill_id, person }
            }
            other => Self::Repo(other),
        }
    }
}

/// Use-case service wrapper for bill splitting over persistent storage.
pub struct SplitService<R: BillRepository> {
    repo: R,
}

impl<R: BillRepository> SplitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a freshly ingested bill.
    pub fn create_bill(&self, bill: &Bill) -> SplitServiceResult<BillId> {
        let id = self.repo.create_bill(bill)?;
        info!(
            "event=bill_created module=service status=ok bill_id={id} items={}",
            bill.items.len()
        );
        Ok(id)
    }

    /// Loads one bill by id.
    pub fn get_bill(&self, id: BillId) -> SplitServiceResult<Bill> {
        self.repo
            .get_bill(id)?
            .ok_or(SplitServiceError::BillNotFound(id))
    }

    /// Computes and stores the settlement for an assignment submission.
    ///
    /// # Contract
    /// - Replaces any previously stored settlement wholesale, bumping its
    ///   revision; paid flags carry over and removed people are pruned.
    /// - Returns the freshly stored settlement.
    pub fn submit_assignments(
        &self,
        bill_id: BillId,
        submission: &AssignmentSubmission,
    ) -> SplitServiceResult<Settlement> {
        let bill = self.get_bill(bill_id)?;
        let table = AssignmentTable::from(submission);

        let previous = self.repo.load_settlement(bill_id)?;
        let settlement = compute_splits(&bill, &table, &submission.people)?
            .supersede(previous.as_ref().map(|(settlement, _)| settlement));
        let ledger = previous
            .map(|(_, ledger)| ledger)
            .unwrap_or_default()
            .carry_over(settlement.people());

        self.repo.replace_settlement(bill_id, &settlement, &ledger)?;
        info!(
            "event=splits_stored module=service status=ok bill_id={bill_id} revision={} people={} collected={}",
            settlement.revision(),
            settlement.entries().len(),
            settlement.total_collected()
        );
        Ok(settlement)
    }

    /// Flips one person's persisted paid flag.
    ///
    /// Returns the new flag plus recomputed aggregates so callers can update
    /// their display and history record in one round trip.
    pub fn toggle_paid(
        &self,
        bill_id: BillId,
        person: &str,
    ) -> SplitServiceResult<PaidStatus> {
        let (settlement, mut ledger) = self
            .repo
            .load_settlement(bill_id)?
            .ok_or(SplitServiceError::NotYetAssigned(bill_id))?;

        let paid = ledger
            .toggle(person)
            .map_err(|_| SplitServiceError::UnknownPerson {
                bill_id,
                person: person.to_string(),
            })?;
        self.repo.set_paid(bill_id, person, paid)?;

        let status = PaidStatus {
            person: person.to_string(),
            paid,
            outstanding: ledger.outstanding(&settlement),
            fully_paid: ledger.fully_paid(&settlement),
        };
        info!(
            "event=paid_toggled module=service status=ok bill_id={bill_id} paid={} outstanding={}",
            status.paid, status.outstanding
        );
        Ok(status)
    }

    /// Generates payment references from the stored settlement.
    ///
    /// The bill's restaurant name seeds the payment note.
    pub fn payment_references(
        &self,
        bill_id: BillId,
        organizer_handle: &str,
    ) -> SplitServiceResult<Vec<PaymentReference>> {
        let bill = self.get_bill(bill_id)?;
        let (settlement, _) = self
            .repo
            .load_settlement(bill_id)?
            .ok_or(SplitServiceError::NotYetAssigned(bill_id))?;

        let references = generate_references(&settlement, organizer_handle, &bill.restaurant)?;
        info!(
            "event=references_generated module=service status=ok bill_id={bill_id} references={}",
            references.len()
        );
        Ok(references)
    }

    /// Builds the history record for a bill, deriving `fully_paid`.
    ///
    /// Storage of the history list itself stays behind
    /// [`crate::repo::history_repo::HistoryRepository`].
    pub fn history_entry(
        &self,
        bill_id: BillId,
        recorded_at: i64,
    ) -> SplitServiceResult<HistoryEntry> {
        let bill = self.get_bill(bill_id)?;
        let (settlement, ledger) = self
            .repo
            .load_settlement(bill_id)?
            .ok_or(SplitServiceError::NotYetAssigned(bill_id))?;

        Ok(HistoryEntry {
            bill_id,
            restaurant: bill.restaurant,
            recorded_at,
            fully_paid: ledger.fully_paid(&settlement),
        })
    }
}
