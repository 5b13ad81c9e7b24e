//! Domain model for bill splitting.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep exact integer-cent money semantics across every boundary shape.
//!
//! # Invariants
//! - Monetary amounts are integer minor units; no binary floating point.
//! - A bill is frozen once splitting begins; only the assignment table and
//!   the paid ledger mutate afterwards.

pub mod assignment;
pub mod bill;
pub mod money;
pub mod settlement;
