//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Bill::validate()` before persistence.
//! - Repository APIs return semantic errors (`BillNotFound`) in addition to
//!   DB transport errors.

pub mod bill_repo;
pub mod history_repo;
