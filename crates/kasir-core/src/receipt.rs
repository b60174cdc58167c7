//! # Receipt Numbers
//!
//! Formatting and candidate generation for receipt identifiers.
//!
//! ## Format
//! ```text
//! INV/YYMMDD/XXXX
//!  │     │     └── 4 random base-36 characters (0-9, A-Z)
//!  │     └──────── sale date (UTC)
//!  └────────────── fixed invoice prefix
//! ```
//!
//! ## Uniqueness Contract
//! This module only produces *candidates*. The transaction processor
//! persists under a unique index and regenerates the suffix on collision,
//! up to [`MAX_RECEIPT_ATTEMPTS`] times, then fails with
//! `ReceiptGenerationFailed`. A receipt number is assigned exactly once,
//! at first persistence, and never reassigned.

use chrono::NaiveDate;
use rand::Rng;

/// Retry budget for the generate-then-check collision loop.
///
/// 36^4 = 1.6M suffixes per day; five attempts is far beyond what any
/// realistic daily volume needs.
pub const MAX_RECEIPT_ATTEMPTS: u32 = 5;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 4;

/// Base-36 alphabet for the suffix.
const SUFFIX_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Formats a receipt number from a date and a suffix.
pub fn format_receipt_number(date: NaiveDate, suffix: &str) -> String {
    format!("INV/{}/{}", date.format("%y%m%d"), suffix)
}

/// Draws a random 4-character base-36 suffix from the supplied RNG.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Generates a fresh receipt-number candidate for the given date.
pub fn generate_candidate<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    let suffix = random_suffix(rng);
    format_receipt_number(date, &suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(format_receipt_number(date, "AB12"), "INV/260830/AB12");
    }

    #[test]
    fn test_suffix_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let suffix = random_suffix(&mut rng);
            assert_eq!(suffix.len(), 4);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_candidate_matches_format() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut rng = rand::thread_rng();
        let candidate = generate_candidate(date, &mut rng);

        assert!(candidate.starts_with("INV/260105/"));
        assert_eq!(candidate.len(), "INV/260105/".len() + 4);
    }
}
