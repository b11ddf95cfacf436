use crate::utils::{date, sample_claims, temp_path};
use outage_cohorts::cohort::extraction::{write_counts_csv, ExtractionPlan};
use outage_cohorts::{count_cohort, AgeBand};

fn sample_plan() -> ExtractionPlan {
    ExtractionPlan {
        counties: vec!["019".to_string(), "037".to_string()],
        dates: vec![date(2018, 5, 1), date(2018, 5, 2)],
        diagnoses: vec!["J069".to_string()],
        age_bands: vec![AgeBand::Over(64), AgeBand::Any],
    }
}

#[test]
fn test_plan_enumerates_cartesian_product() {
    let plan = sample_plan();
    assert_eq!(plan.len(), 8);

    let queries = plan.queries();
    assert_eq!(queries.len(), 8);
    // Deterministic enumeration order: counties outermost
    assert_eq!(queries[0].county, "019");
    assert_eq!(queries[7].county, "037");
    assert_eq!(queries[0].diagnosis, "J069");
    assert_eq!(queries[0].age, AgeBand::Over(64));
    assert_eq!(queries[1].age, AgeBand::Any);
}

#[test]
fn test_run_matches_individual_queries() {
    let table = sample_claims();
    let plan = sample_plan();

    let rows = plan.run(&table).unwrap();
    assert_eq!(rows.len(), plan.len());

    for (row, query) in rows.iter().zip(plan.queries()) {
        let expected = count_cohort(&table, &query.county, query.date, &query.diagnosis, &query.age)
            .unwrap()
            .get(&query.county);
        assert_eq!(row.count, expected, "query {query:?}");
        assert_eq!(row.county, query.county);
        assert_eq!(row.age_band, query.age.label());
    }
}

#[test]
fn test_date_window_is_inclusive() {
    let window = ExtractionPlan::date_window(date(2018, 10, 1), date(2018, 10, 14));
    assert_eq!(window.len(), 14);
    assert_eq!(window[0], date(2018, 10, 1));
    assert_eq!(window[13], date(2018, 10, 14));
}

#[test]
fn test_plan_round_trips_through_json() {
    let json = r#"{
        "counties": ["019"],
        "dates": ["2018-05-01", "2018-05-02"],
        "diagnoses": ["J069", "J449"],
        "age_bands": ["Any", {"Over": 64}, {"Range": [0, 5]}]
    }"#;
    let plan: ExtractionPlan = serde_json::from_str(json).unwrap();
    assert_eq!(plan.len(), 12);
    assert_eq!(plan.dates[0], date(2018, 5, 1));
    assert_eq!(plan.age_bands[2], AgeBand::Range(0, 5));
}

#[test]
fn test_counts_csv_output() {
    let table = sample_claims();
    let plan = sample_plan();
    let rows = plan.run(&table).unwrap();

    let path = temp_path("counts.csv");
    write_counts_csv(&rows, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "county,date,diagnosis,age_band,count"
    );
    assert_eq!(lines.count(), rows.len());
    std::fs::remove_file(&path).ok();
}
