//! Deep-link and scannable-payload construction.
//!
//! # Responsibility
//! - Build one payable deep link per person who still owes money.
//! - Validate the organizer handle before constructing any link.
//!
//! # Invariants
//! - Links always carry a two-decimal amount and a percent-encoded note.
//! - A blank organizer handle aborts generation with no partial output.

use crate::model::money::Money;
use crate::model::settlement::Settlement;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid handle regex"));

const FALLBACK_RESTAURANT_LABEL: &str = "Restaurant";

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Payment reference generation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Organizer handle is empty or whitespace.
    MissingOrganizerHandle,
    /// Organizer handle contains characters the payment provider rejects.
    InvalidOrganizerHandle(String),
}

impl Display for PaymentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOrganizerHandle => write!(f, "organizer payment handle is missing"),
            Self::InvalidOrganizerHandle(handle) => {
                write!(f, "organizer payment handle `{handle}` is invalid")
            }
        }
    }
}

impl Error for PaymentError {}

/// One person's payable reference: deep link plus scannable-code payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReference {
    pub person: String,
    pub amount: Money,
    /// Deep link requesting `amount` from `person` toward the organizer.
    pub link: String,
    /// Payload an external scannable-code renderer encodes (the link).
    pub code: String,
}

/// Builds payment references for every settlement entry with money due.
///
/// # Contract
/// - `organizer_handle` may carry a leading `@`, which is stripped.
/// - `restaurant_label` seeds the payment note; a blank label falls back to
///   a generic one.
/// - Entries with `total_due == 0` are omitted (nothing to collect).
///
/// # Errors
/// - `PaymentError::MissingOrganizerHandle` for a blank handle.
/// - `PaymentError::InvalidOrganizerHandle` for malformed handles.
pub fn generate_references(
    settlement: &Settlement,
    organizer_handle: &str,
    restaurant_label: &str,
) -> PaymentResult<Vec<PaymentReference>> {
    let handle = normalize_handle(organizer_handle)?;
    let note = payment_note(restaurant_label);

    Ok(settlement
        .entries()
        .iter()
        .filter(|entry| !entry.total_due.is_zero())
        .map(|entry| {
            let link = payment_link(&handle, entry.total_due, &note);
            PaymentReference {
                person: entry.person.clone(),
                amount: entry.total_due,
                code: link.clone(),
                link,
            }
        })
        .collect())
}

fn normalize_handle(raw: &str) -> PaymentResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PaymentError::MissingOrganizerHandle);
    }
    let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if handle.is_empty() || !HANDLE_RE.is_match(handle) {
        return Err(PaymentError::InvalidOrganizerHandle(raw.trim().to_string()));
    }
    Ok(handle.to_string())
}

fn payment_note(restaurant_label: &str) -> String {
    let label = restaurant_label.trim();
    let label = if label.is_empty() {
        FALLBACK_RESTAURANT_LABEL
    } else {
        label
    };
    format!("Bill from {label}")
}

fn payment_link(handle: &str, amount: Money, note: &str) -> String {
    format!(
        "https://venmo.com/{handle}?txn=pay&amount={amount}&note={}",
        percent_encode(note)
    )
}

/// RFC 3986 percent-encoding keeping only unreserved characters.
fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::{normalize_handle, payment_note, percent_encode, PaymentError};

    #[test]
    fn handle_strips_leading_at_sign() {
        assert_eq!(normalize_handle("@ana-pays").unwrap(), "ana-pays");
        assert_eq!(normalize_handle(" ana_pays ").unwrap(), "ana_pays");
    }

    #[test]
    fn blank_handle_is_missing_not_invalid() {
        assert_eq!(
            normalize_handle("   ").unwrap_err(),
            PaymentError::MissingOrganizerHandle
        );
        assert_eq!(
            normalize_handle("@").unwrap_err(),
            PaymentError::InvalidOrganizerHandle("@".to_string())
        );
    }

    #[test]
    fn handle_rejects_url_breaking_characters() {
        for bad in ["ana pays", "ana/pays", "ana?x=1", "ana&b"] {
            assert!(matches!(
                normalize_handle(bad),
                Err(PaymentError::InvalidOrganizerHandle(_))
            ));
        }
    }

    #[test]
    fn note_falls_back_for_blank_labels() {
        assert_eq!(payment_note("Luigi's"), "Bill from Luigi's");
        assert_eq!(payment_note("  "), "Bill from Restaurant");
    }

    #[test]
    fn percent_encoding_covers_spaces_and_reserved_chars() {
        assert_eq!(percent_encode("Bill from Luigi's"), "Bill%20from%20Luigi%27s");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("plain-text_1.0~x"), "plain-text_1.0~x");
    }
}
