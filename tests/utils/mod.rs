//! Shared builders for the integration tests.

use std::path::PathBuf;

use chrono::NaiveDate;
use outage_cohorts::{ClaimRecord, ClaimsTable};

/// Shorthand for a calendar date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A small in-memory claims table covering the interesting cases:
/// duplicate rows for one beneficiary, a secondary-only diagnosis match,
/// other counties, other dates, other ages, and a lowercase code
pub fn sample_claims() -> ClaimsTable {
    let d1 = date(2018, 5, 1);
    let d2 = date(2018, 5, 2);
    let records = vec![
        // Beneficiary A generated two qualifying rows on the same day
        ClaimRecord::new("019", "A", d1, "J069", 70),
        ClaimRecord::new("019", "A", d1, "J069", 70),
        ClaimRecord::new("019", "B", d1, "J449", 70),
        // Target code only in the secondary field; must never count
        ClaimRecord::new("019", "C", d1, "J189", 70).with_secondary("J069"),
        // Other county
        ClaimRecord::new("037", "D", d1, "J069", 70),
        // Other service day
        ClaimRecord::new("019", "E", d2, "J069", 70),
        // Too young for the over-64 band
        ClaimRecord::new("019", "F", d1, "J069", 40),
        // Diagnosis matching is case-sensitive
        ClaimRecord::new("019", "G", d1, "j069", 70),
    ];
    ClaimsTable::from_records(&records).unwrap()
}

/// A unique path under the system temp directory
pub fn temp_path(name: &str) -> PathBuf {
    let unique = format!(
        "outage-cohorts-test-{}-{name}",
        std::process::id()
    );
    std::env::temp_dir().join(unique)
}
