use std::path::PathBuf;

use crate::utils::temp_path;
use outage_cohorts::figures::normalize_county_key;
use outage_cohorts::figures::tables::{
    load_daily_outages, load_outage_totals, load_regression_points, outage_measures,
    outage_totals_from_daily, wildfire_measures, CountyOutageTotal, DailyOutage, WildfireYear,
};
use outage_cohorts::CohortError;

fn write_csv(name: &str, content: &str) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A CSV lacking a required header fails with `MissingColumn` naming the
/// table and the absent column, before any row is parsed
#[test]
fn test_missing_header_is_reported() {
    let path = write_csv(
        "totals_no_fips.csv",
        "County,CustomerHoursOutTotal\nButte,120.5\n",
    );
    let err = load_outage_totals(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    match err {
        CohortError::MissingColumn { table, column } => {
            assert_eq!(table, "county outage totals");
            assert_eq!(column, "FIPS");
        }
        other => panic!("expected MissingColumn, got {other}"),
    }
}

#[test]
fn test_missing_regression_header_is_reported() {
    let path = write_csv("regression_bad.csv", "Day,Total\n1,5\n");
    let err = load_regression_points(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    match err {
        CohortError::MissingColumn { table, column } => {
            assert_eq!(table, "regression input");
            assert_eq!(column, "Count");
        }
        other => panic!("expected MissingColumn, got {other}"),
    }
}

#[test]
fn test_load_daily_outages() {
    let path = write_csv(
        "daily.csv",
        "Year,Month,FIPS,CustomerHoursOut\n2018,11,06007,42.5\n2018,12,6037,7.0\n",
    );
    let rows = load_daily_outages(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, 2018);
    assert_eq!(rows[0].fips, "06007");
    assert!((rows[0].customer_hours_out - 42.5).abs() < f64::EPSILON);
}

/// Totals are keyed by the normalized county name so they join against
/// boundary NAMEs with or without the "County" suffix
#[test]
fn test_outage_measures_keyed_by_normalized_name() {
    let rows = vec![CountyOutageTotal {
        county: "Los Angeles County".to_string(),
        fips: "06037".to_string(),
        customer_hours_out_total: 99.0,
    }];
    let measures = outage_measures(&rows);
    assert_eq!(
        measures.get(&normalize_county_key("Los Angeles")),
        Some(&99.0)
    );
}

/// The daily fallback keeps only the requested year, sums a county's
/// records, and zero-pads the FIPS key
#[test]
fn test_daily_totals_filter_year_and_sum() {
    let row = |year, fips: &str, hours| DailyOutage {
        year,
        month: 11,
        fips: fips.to_string(),
        customer_hours_out: hours,
    };
    let rows = vec![
        row(2018, "6037", 5.0),
        row(2018, "06037", 7.0),
        row(2017, "6037", 100.0),
        row(2018, "06007", 2.5),
    ];

    let totals = outage_totals_from_daily(&rows, 2018);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals.get("06037"), Some(&12.0));
    assert_eq!(totals.get("06007"), Some(&2.5));
}

/// Acres burned are summed per county within the requested year only
#[test]
fn test_wildfire_measures_filter_year_and_sum() {
    let row = |name: &str, year, acres| WildfireYear {
        county_name: name.to_string(),
        year,
        acres_burned: acres,
    };
    let rows = vec![
        row("Butte County", 2018, 100.0),
        row("Butte", 2018, 50.0),
        row("Butte", 2017, 999.0),
        row("Shasta", 2018, 10.0),
    ];

    let acres = wildfire_measures(&rows, 2018);
    assert_eq!(acres.len(), 2);
    assert_eq!(acres.get("BUTTE"), Some(&150.0));
    assert_eq!(acres.get("SHASTA"), Some(&10.0));
}
