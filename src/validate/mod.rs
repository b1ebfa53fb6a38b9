//! Field validators for incoming records
//!
//! Pure functions only: identifier checksum validation and numeric range
//! validation. The HTTP boundary decides how failures map onto responses.

pub mod identifier;
pub mod number;
