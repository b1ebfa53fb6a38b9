//! Israeli ID checksum validation
//!
//! An identifier is up to nine ASCII digits, left-padded with zeros to nine
//! characters, carrying a Luhn-like check digit: each digit is weighted 1 or
//! 2 alternating from the least-significant position, products above 9 have
//! 9 subtracted, and the adjusted sum must be a multiple of 10.

/// Identifier width after zero-padding
pub const CANONICAL_WIDTH: usize = 9;

/// Normalize a raw identifier into its canonical nine-digit form.
///
/// Returns `None` when the trimmed input is empty, longer than nine
/// characters, or contains anything but ASCII digits. The checksum is not
/// evaluated here; see [`validate`].
pub fn canonicalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.len() > CANONICAL_WIDTH {
        return None;
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!("{:0>width$}", trimmed, width = CANONICAL_WIDTH))
}

/// Canonicalize and checksum a raw identifier.
///
/// Returns the canonical nine-digit form when the identifier is well-formed
/// and its weighted digit sum is a multiple of 10.
pub fn validate(raw: &str) -> Option<String> {
    canonicalize(raw).filter(|id| weighted_sum(id) % 10 == 0)
}

/// Check identifier validity without keeping the canonical form.
pub fn is_valid(raw: &str) -> bool {
    validate(raw).is_some()
}

/// Weighted digit sum over a canonical identifier.
///
/// Digits are enumerated from the least-significant position: weight 1 at
/// even positions, 2 at odd positions, with 9 subtracted from any product
/// above 9.
fn weighted_sum(canonical: &str) -> u32 {
    canonical
        .bytes()
        .rev()
        .enumerate()
        .map(|(position, byte)| {
            let digit = u32::from(byte - b'0');
            let product = if position % 2 == 0 { digit } else { digit * 2 };
            if product > 9 {
                product - 9
            } else {
                product
            }
        })
        .sum()
}
