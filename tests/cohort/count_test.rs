use crate::utils::{date, sample_claims};
use outage_cohorts::{count_cohort, AgeBand, ClaimsTable, CohortQuery};

/// A beneficiary with two qualifying claim rows on the same day is
/// counted once, not twice
#[test]
fn test_deduplicates_beneficiaries() {
    let table = sample_claims();
    let counts = count_cohort(&table, "019", date(2018, 5, 1), "J069", &AgeBand::Over(64)).unwrap();
    assert_eq!(counts.get("019"), 1);
}

/// Zero qualifying rows produce an explicit zero, not an error and not
/// an absent entry
#[test]
fn test_empty_match_is_explicit_zero() {
    let table = sample_claims();
    let counts = count_cohort(&table, "999", date(2018, 5, 1), "J069", &AgeBand::Over(64)).unwrap();
    assert_eq!(counts.get("999"), 0);
    assert!(counts.iter().any(|(county, count)| county == "999" && count == 0));
}

#[test]
fn test_empty_table_counts_zero() {
    let table = ClaimsTable::from_records(&[]).unwrap();
    let counts = count_cohort(&table, "019", date(2018, 5, 1), "J069", &AgeBand::Any).unwrap();
    assert_eq!(counts.get("019"), 0);
}

/// A record carrying the target code only in the secondary diagnosis
/// field must not be counted
#[test]
fn test_primary_diagnosis_only() {
    let table = sample_claims();
    // "C" carries J069 as a secondary diagnosis and J189 as primary
    let j069 = count_cohort(&table, "019", date(2018, 5, 1), "J069", &AgeBand::Over(64)).unwrap();
    assert_eq!(j069.get("019"), 1); // only "A"

    let j189 = count_cohort(&table, "019", date(2018, 5, 1), "J189", &AgeBand::Over(64)).unwrap();
    assert_eq!(j189.get("019"), 1); // "C" counts under its primary code
}

/// Diagnosis matching is exact and case-sensitive
#[test]
fn test_diagnosis_case_sensitive() {
    let table = sample_claims();
    let counts = count_cohort(&table, "019", date(2018, 5, 1), "j069", &AgeBand::Over(64)).unwrap();
    // Only "G", whose primary code is lowercase
    assert_eq!(counts.get("019"), 1);
}

/// County and date are exact single-value matches
#[test]
fn test_county_and_date_are_exact() {
    let table = sample_claims();

    let other_county =
        count_cohort(&table, "037", date(2018, 5, 1), "J069", &AgeBand::Over(64)).unwrap();
    assert_eq!(other_county.get("037"), 1); // only "D"
    assert_eq!(other_county.get("019"), 0);

    let other_day =
        count_cohort(&table, "019", date(2018, 5, 2), "J069", &AgeBand::Over(64)).unwrap();
    assert_eq!(other_day.get("019"), 1); // only "E"
}

/// Without an age restriction both the old and young beneficiaries count
#[test]
fn test_age_band_any() {
    let table = sample_claims();
    let counts = count_cohort(&table, "019", date(2018, 5, 1), "J069", &AgeBand::Any).unwrap();
    assert_eq!(counts.get("019"), 2); // "A" (70) and "F" (40)
}

#[test]
fn test_age_band_semantics() {
    assert!(AgeBand::Over(64).contains(65));
    assert!(!AgeBand::Over(64).contains(64));
    assert!(AgeBand::Under(5).contains(4));
    assert!(!AgeBand::Under(5).contains(5));
    // Half-open: [0, 5)
    assert!(AgeBand::Range(0, 5).contains(0));
    assert!(AgeBand::Range(0, 5).contains(4));
    assert!(!AgeBand::Range(0, 5).contains(5));
    assert_eq!(AgeBand::Range(0, 5).label(), "0_to_5");
    assert_eq!(AgeBand::Over(64).label(), "over_64");
}

/// The manuscript's worked example: claims for A (twice) and B, query for
/// J069 over 64
#[test]
fn test_manuscript_example() {
    let table = sample_claims();
    let query = CohortQuery::new("019", date(2018, 5, 1), "J069").with_age(AgeBand::Over(64));
    let counts = query.execute(&table).unwrap();
    assert_eq!(counts.get("019"), 1);
}

/// Queries are independent: the same query repeated gives the same count
#[test]
fn test_queries_are_order_independent() {
    let table = sample_claims();
    let query = CohortQuery::new("019", date(2018, 5, 1), "J449").with_age(AgeBand::Over(64));
    let first = query.execute(&table).unwrap();
    let _other = count_cohort(&table, "037", date(2018, 5, 1), "J069", &AgeBand::Any).unwrap();
    let second = query.execute(&table).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get("019"), 1); // "B"
}
