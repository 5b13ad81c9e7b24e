//! Payment reference generation.
//!
//! # Responsibility
//! - Turn a settlement into per-person payable deep links and scannable-code
//!   payloads seeded by the organizer's payment handle.
//!
//! # Invariants
//! - Pure data transformation: no I/O, regenerable from the same inputs.
//! - People with nothing due get no reference.
//! - Image rendering and link resolution stay external; `code` is the exact
//!   payload a scannable-code renderer encodes.

mod links;

pub use links::{generate_references, PaymentError, PaymentReference, PaymentResult};
