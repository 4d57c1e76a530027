//! # Invoice Codes
//!
//! Human-readable, per-day sequential transaction codes.
//!
//! ```text
//! INV-20261019-001   first sale of 19 Oct 2026
//! INV-20261019-002
//! ...
//! INV-20261019-999
//! INV-20261019-1000  padding is a minimum width, not a cap
//! INV-20261020-001   new day, sequence resets
//! ```
//!
//! Finding the last code of the day is a storage concern (kasir-db); the
//! arithmetic on it lives here.

use chrono::NaiveDate;

pub const INVOICE_PREFIX: &str = "INV";

/// `INV-YYYYMMDD`
pub fn date_prefix(date: NaiveDate) -> String {
    format!("{}-{}", INVOICE_PREFIX, date.format("%Y%m%d"))
}

/// `INV-YYYYMMDD-NNN`, sequence zero-padded to at least 3 digits.
pub fn format_invoice_code(date: NaiveDate, sequence: u32) -> String {
    format!("{}-{:03}", date_prefix(date), sequence)
}

/// Numeric suffix of an invoice code, if well-formed.
pub fn parse_sequence(code: &str) -> Option<u32> {
    code.splitn(3, '-').nth(2)?.parse().ok()
}

/// Next code for `date` given the greatest code already issued that day.
///
/// A missing or unparsable previous code starts the day at 001.
pub fn next_invoice_code(date: NaiveDate, last_issued: Option<&str>) -> String {
    let next = last_issued
        .and_then(parse_sequence)
        .map_or(1, |n| n.saturating_add(1));
    format_invoice_code(date, next)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_code_of_day() {
        assert_eq!(next_invoice_code(day(2026, 10, 19), None), "INV-20261019-001");
    }

    #[test]
    fn test_increments_last_code() {
        let date = day(2026, 10, 19);
        assert_eq!(
            next_invoice_code(date, Some("INV-20261019-041")),
            "INV-20261019-042"
        );
    }

    #[test]
    fn test_padding_and_overflow_past_three_digits() {
        let date = day(2026, 1, 5);
        assert_eq!(format_invoice_code(date, 7), "INV-20260105-007");
        assert_eq!(
            next_invoice_code(date, Some("INV-20260105-999")),
            "INV-20260105-1000"
        );
    }

    #[test]
    fn test_unparsable_suffix_restarts() {
        let date = day(2026, 10, 19);
        assert_eq!(
            next_invoice_code(date, Some("INV-20261019-abc")),
            "INV-20261019-001"
        );
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("INV-20261019-015"), Some(15));
        assert_eq!(parse_sequence("INV-20261019"), None);
    }

    #[test]
    fn test_codes_strictly_increase_within_day() {
        let date = day(2026, 10, 19);
        let mut last: Option<String> = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            let code = next_invoice_code(date, last.as_deref());
            seen.push(code.clone());
            last = Some(code);
        }
        assert_eq!(seen.first().map(String::as_str), Some("INV-20261019-001"));
        assert_eq!(seen.last().map(String::as_str), Some("INV-20261019-005"));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
