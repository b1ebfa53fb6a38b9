//! Accepted-record type shared by the validators, the tracker, and the
//! HTTP boundary.

use serde::Serialize;

/// A record that has passed both field validators.
///
/// The identifier is canonical: nine ASCII digits, zero-padded. Two records
/// built from `"18"` and `"000000018"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Canonical nine-digit identifier
    pub identifier: String,
    /// Bounded random number, `100_000_000 <= n < 1_000_000_000`
    pub random_number: i64,
}

impl Record {
    pub fn new(identifier: impl Into<String>, random_number: i64) -> Self {
        Self {
            identifier: identifier.into(),
            random_number,
        }
    }
}
