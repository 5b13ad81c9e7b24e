//! Core domain logic for TabSplit.
//! This crate is the single source of truth for business invariants:
//! per-person amounts always reconcile to the bill total, to the cent.

pub mod db;
pub mod logging;
pub mod model;
pub mod payment;
pub mod repo;
pub mod service;
pub mod session;
pub mod split;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::assignment::{AssignmentSubmission, AssignmentTable, ItemAssignment};
pub use model::bill::{Bill, BillId, BillValidationError, Item, ItemId};
pub use model::money::{Money, MoneyParseError};
pub use model::settlement::{LedgerError, PaidLedger, Settlement, SettlementEntry};
pub use payment::{generate_references, PaymentError, PaymentReference};
pub use repo::bill_repo::{BillRepository, RepoError, RepoResult, SqliteBillRepository};
pub use repo::history_repo::{
    HistoryEntry, HistoryRepository, SqliteHistoryRepository, HISTORY_CAPACITY,
};
pub use service::split_service::{SplitService, SplitServiceError};
pub use session::{PaidStatus, SessionError, SessionState, SplitSession, ToggleError};
pub use split::{compute_splits, SplitError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
