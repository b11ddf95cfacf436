use crate::utils::{date, sample_claims};
use outage_cohorts::claims::COUNTY;
use outage_cohorts::{count_cohort, AgeBand};

/// Every row of a county view satisfies the county match and the age
/// predicate
#[test]
fn test_view_rows_satisfy_filters() {
    let table = sample_claims();
    let view = table.county_view("019", &AgeBand::Over(64)).unwrap();

    assert!(view.num_rows() > 0);
    for county in view.string_values(COUNTY).unwrap() {
        assert_eq!(county, "019");
    }
}

/// Composing the county view with date/diagnosis filters gives the same
/// counts as the direct query
#[test]
fn test_view_composition_preserves_counts() {
    let table = sample_claims();

    let direct = count_cohort(&table, "019", date(2018, 5, 1), "J069", &AgeBand::Over(64)).unwrap();

    let view = table.county_view("019", &AgeBand::Over(64)).unwrap();
    let via_view = count_cohort(&view, "019", date(2018, 5, 1), "J069", &AgeBand::Any).unwrap();

    assert_eq!(direct, via_view);
}

/// The view itself carries no extra state; repeated diagnosis/date
/// queries against one view match one-off queries
#[test]
fn test_view_is_reusable() {
    let table = sample_claims();
    let view = table.county_view("019", &AgeBand::Over(64)).unwrap();

    for (dx, day, expected) in [
        ("J069", date(2018, 5, 1), 1),
        ("J449", date(2018, 5, 1), 1),
        ("J069", date(2018, 5, 2), 1),
        ("J189", date(2018, 5, 2), 0),
    ] {
        let counts = count_cohort(&view, "019", day, dx, &AgeBand::Any).unwrap();
        assert_eq!(counts.get("019"), expected, "dx {dx} on {day}");
    }
}

/// A view over a county with no claims is empty but still queryable
#[test]
fn test_view_of_absent_county() {
    let table = sample_claims();
    let view = table.county_view("999", &AgeBand::Any).unwrap();
    assert!(view.is_empty());

    let counts = count_cohort(&view, "999", date(2018, 5, 1), "J069", &AgeBand::Any).unwrap();
    assert_eq!(counts.get("999"), 0);
}
