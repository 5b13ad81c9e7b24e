//! Split session state machine.
//!
//! # Responsibility
//! - Drive one bill through review, assignment and settling as an explicit
//!   finite state machine owning the bill, settlement and paid ledger.
//! - Apply paid toggles optimistically with compensating rollback when the
//!   caller's persistence hook fails.
//!
//! # Invariants
//! - The bill is frozen once review finishes; later steps never mutate it.
//! - Each assignment submission replaces the settlement wholesale and bumps
//!   its revision; stale results are superseded, never merged.
//! - Paid flags survive recomputation and are pruned with removed people.

use crate::model::assignment::{AssignmentSubmission, AssignmentTable};
use crate::model::bill::{Bill, BillValidationError};
use crate::model::money::Money;
use crate::model::settlement::{LedgerError, PaidLedger, Settlement};
use crate::payment::{generate_references, PaymentError, PaymentReference};
use crate::split::{compute_splits, SplitError};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Named wizard step; replaces ad hoc step flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Receipt figures are still being corrected; the bill may change.
    Reviewing,
    /// Bill frozen; the assignment table is being edited.
    Assigning,
    /// A settlement exists; payment references and paid toggles are live.
    Settling,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Reviewing => "reviewing",
            Self::Assigning => "assigning",
            Self::Settling => "settling",
        };
        write!(f, "{name}")
    }
}

/// Session-level errors: illegal transitions plus wrapped step failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation attempted in a state where it is not legal.
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
    Bill(BillValidationError),
    Split(SplitError),
    Payment(PaymentError),
    Ledger(LedgerError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState { action, state } => {
                write!(f, "cannot {action} while session is {state}")
            }
            Self::Bill(err) => write!(f, "{err}"),
            Self::Split(err) => write!(f, "{err}"),
            Self::Payment(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidState { .. } => None,
            Self::Bill(err) => Some(err),
            Self::Split(err) => Some(err),
            Self::Payment(err) => Some(err),
            Self::Ledger(err) => Some(err),
        }
    }
}

impl From<BillValidationError> for SessionError {
    fn from(value: BillValidationError) -> Self {
        Self::Bill(value)
    }
}

impl From<SplitError> for SessionError {
    fn from(value: SplitError) -> Self {
        Self::Split(value)
    }
}

impl From<PaymentError> for SessionError {
    fn from(value: PaymentError) -> Self {
        Self::Payment(value)
    }
}

impl From<LedgerError> for SessionError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

/// Toggle error distinguishing session failures from persistence failures.
///
/// A persistence failure means the local flip was rolled back.
#[derive(Debug, PartialEq, Eq)]
pub enum ToggleError<E> {
    Session(SessionError),
    Persistence(E),
}

impl<E: Display> Display for ToggleError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session(err) => write!(f, "{err}"),
            Self::Persistence(err) => {
                write!(f, "paid toggle rolled back; persistence failed: {err}")
            }
        }
    }
}

impl<E: Display + std::fmt::Debug> Error for ToggleError<E> {}

/// Outcome of a paid toggle, with the recomputed aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidStatus {
    pub person: String,
    pub paid: bool,
    pub outstanding: Money,
    pub fully_paid: bool,
}

/// Owning context for one bill's review → assign → settle flow.
#[derive(Debug, Clone)]
pub struct SplitSession {
    bill: Bill,
    state: SessionState,
    people: Vec<String>,
    settlement: Option<Settlement>,
    ledger: PaidLedger,
}

impl SplitSession {
    /// Starts a session in `Reviewing` for a freshly ingested bill.
    pub fn new(bill: Bill) -> Self {
        Self {
            bill,
            state: SessionState::Reviewing,
            people: Vec::new(),
            settlement: None,
            ledger: PaidLedger::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn people(&self) -> &[String] {
        &self.people
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn ledger(&self) -> &PaidLedger {
        &self.ledger
    }

    /// Applies a corrected bill while still reviewing.
    ///
    /// # Errors
    /// - `InvalidState` outside `Reviewing`; the bill is frozen afterwards.
    pub fn update_bill(&mut self, bill: Bill) -> Result<(), SessionError> {
        if self.state != SessionState::Reviewing {
            return Err(SessionError::InvalidState {
                action: "update the bill",
                state: self.state,
            });
        }
        self.bill = bill;
        Ok(())
    }

    /// Freezes the bill and moves to `Assigning`.
    ///
    /// # Errors
    /// - `InvalidState` outside `Reviewing`.
    /// - `Bill` when the bill fails its consistency invariants; the session
    ///   stays in `Reviewing` so the figures can be corrected.
    pub fn finish_review(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Reviewing {
            return Err(SessionError::InvalidState {
                action: "finish review",
                state: self.state,
            });
        }
        self.bill.validate()?;
        self.state = SessionState::Assigning;
        info!(
            "event=review_finished module=session status=ok bill_id={} items={}",
            self.bill.id,
            self.bill.items.len()
        );
        Ok(())
    }

    /// Computes a settlement from an assignment submission.
    ///
    /// Legal in `Assigning` and in `Settling` (re-assignment). The new
    /// settlement supersedes any previous one wholesale; paid flags carry
    /// over, with removed people pruned.
    ///
    /// # Errors
    /// - `InvalidState` while still `Reviewing`.
    /// - `Split` for any validation failure; session state and the previous
    ///   settlement are left untouched.
    pub fn submit_assignments(
        &mut self,
        submission: &AssignmentSubmission,
    ) -> Result<&Settlement, SessionError> {
        if self.state == SessionState::Reviewing {
            return Err(SessionError::InvalidState {
                action: "submit assignments",
                state: self.state,
            });
        }

        let table = AssignmentTable::from(submission);
        let settlement =
            compute_splits(&self.bill, &table, &submission.people)?.supersede(self.settlement.as_ref());

        self.ledger = self.ledger.carry_over(settlement.people());
        self.people = settlement.people().map(str::to_string).collect();
        info!(
            "event=splits_computed module=session status=ok bill_id={} revision={} people={} collected={}",
            self.bill.id,
            settlement.revision(),
            self.people.len(),
            settlement.total_collected()
        );
        self.settlement = Some(settlement);
        self.state = SessionState::Settling;
        Ok(self.settlement.as_ref().expect("settlement just stored"))
    }

    /// Generates payment references for everyone who still owes money.
    ///
    /// The bill's restaurant name seeds the payment note.
    ///
    /// # Errors
    /// - `InvalidState` outside `Settling`.
    /// - `Payment` for organizer-handle problems.
    pub fn payment_references(
        &self,
        organizer_handle: &str,
    ) -> Result<Vec<PaymentReference>, SessionError> {
        let settlement = self.require_settling("generate payment references")?;
        Ok(generate_references(
            settlement,
            organizer_handle,
            &self.bill.restaurant,
        )?)
    }

    /// Flips one person's paid flag in memory.
    ///
    /// # Errors
    /// - `InvalidState` outside `Settling`.
    /// - `Ledger` for unknown people; the ledger never auto-inserts.
    pub fn toggle_paid(&mut self, person: &str) -> Result<PaidStatus, SessionError> {
        self.require_settling("toggle paid state")?;
        let paid = self.ledger.toggle(person)?;
        Ok(self.paid_status(person, paid))
    }

    /// Flips one person's paid flag, persisting through `persist`.
    ///
    /// Optimistic with compensating rollback: the flag flips locally first;
    /// when `persist` fails the flip is reverted and the persistence error
    /// is returned, leaving the aggregate consistent.
    pub fn toggle_paid_with<E>(
        &mut self,
        person: &str,
        persist: impl FnOnce(&str, bool) -> Result<(), E>,
    ) -> Result<PaidStatus, ToggleError<E>> {
        let status = self.toggle_paid(person).map_err(ToggleError::Session)?;

        if let Err(err) = persist(person, status.paid) {
            // Compensate: the local flip must not outlive a failed write.
            self.ledger
                .toggle(person)
                .expect("person verified by the forward toggle");
            return Err(ToggleError::Persistence(err));
        }
        Ok(status)
    }

    /// Sum of `total_due` over people not yet marked paid.
    pub fn outstanding(&self) -> Result<Money, SessionError> {
        let settlement = self.require_settling("read outstanding amount")?;
        Ok(self.ledger.outstanding(settlement))
    }

    /// Whether nothing remains to collect (feeds the external history list).
    pub fn fully_paid(&self) -> Result<bool, SessionError> {
        let settlement = self.require_settling("read fully-paid state")?;
        Ok(self.ledger.fully_paid(settlement))
    }

    fn require_settling(&self, action: &'static str) -> Result<&Settlement, SessionError> {
        if self.state != SessionState::Settling {
            return Err(SessionError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(self
            .settlement
            .as_ref()
            .expect("settling state always carries a settlement"))
    }

    fn paid_status(&self, person: &str, paid: bool) -> PaidStatus {
        let settlement = self
            .settlement
            .as_ref()
            .expect("settling state always carries a settlement");
        PaidStatus {
            person: person.to_string(),
            paid,
            outstanding: self.ledger.outstanding(settlement),
            fully_paid: self.ledger.fully_paid(settlement),
        }
    }
}
