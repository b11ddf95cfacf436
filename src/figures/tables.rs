//! CSV extracts for the figure pipeline.
//!
//! Each loader validates the expected columns up front so a malformed
//! extract fails that figure with a `MissingColumn` error instead of a
//! row-level parse error deep in deserialization.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{CohortError, Result};
use crate::figures::boundaries::normalize_county_key;

/// One county-day of outage exposure
#[derive(Debug, Clone, Deserialize)]
pub struct DailyOutage {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    /// 5-digit county FIPS code, zero-padded
    #[serde(rename = "FIPS")]
    pub fips: String,
    #[serde(rename = "CustomerHoursOut")]
    pub customer_hours_out: f64,
}

/// 2018 outage total for one county
#[derive(Debug, Clone, Deserialize)]
pub struct CountyOutageTotal {
    #[serde(rename = "County")]
    pub county: String,
    /// 5-digit county FIPS code, zero-padded
    #[serde(rename = "FIPS")]
    pub fips: String,
    #[serde(rename = "CustomerHoursOutTotal")]
    pub customer_hours_out_total: f64,
}

/// Acres burned in one county-year
#[derive(Debug, Clone, Deserialize)]
pub struct WildfireYear {
    #[serde(rename = "CountyName")]
    pub county_name: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "AcresBurned")]
    pub acres_burned: f64,
}

/// One observation of the per-county regression input: a numeric
/// day-offset from the outage start and a respiratory-infection count
#[derive(Debug, Clone, Deserialize)]
pub struct RegressionPoint {
    #[serde(rename = "Day")]
    pub day: f64,
    #[serde(rename = "Count")]
    pub count: f64,
}

/// Load a CSV extract, validating its header row first
///
/// # Errors
/// Returns `MissingColumn` when a required header is absent, or a CSV
/// error when a row fails to parse
pub fn load_csv<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(CohortError::missing_column(table, *column));
        }
    }

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load the daily outage records
pub fn load_daily_outages(path: &Path) -> Result<Vec<DailyOutage>> {
    load_csv(
        path,
        "daily outages",
        &["Year", "Month", "FIPS", "CustomerHoursOut"],
    )
}

/// Load the 2018 per-county outage totals
pub fn load_outage_totals(path: &Path) -> Result<Vec<CountyOutageTotal>> {
    load_csv(
        path,
        "county outage totals",
        &["County", "FIPS", "CustomerHoursOutTotal"],
    )
}

/// Load the wildfire records
pub fn load_wildfires(path: &Path) -> Result<Vec<WildfireYear>> {
    load_csv(path, "wildfires", &["CountyName", "Year", "AcresBurned"])
}

/// Load one per-county regression input
pub fn load_regression_points(path: &Path) -> Result<Vec<RegressionPoint>> {
    load_csv(path, "regression input", &["Day", "Count"])
}

/// Customer-hours-out keyed by normalized county name
#[must_use]
pub fn outage_measures(rows: &[CountyOutageTotal]) -> FxHashMap<String, f64> {
    rows.iter()
        .map(|r| (normalize_county_key(&r.county), r.customer_hours_out_total))
        .collect()
}

/// Customer-hours-out summed over the daily records, keyed by FIPS
#[must_use]
pub fn outage_totals_from_daily(rows: &[DailyOutage], year: i32) -> FxHashMap<String, f64> {
    let mut totals: FxHashMap<String, f64> = FxHashMap::default();
    for row in rows.iter().filter(|r| r.year == year) {
        *totals.entry(pad_fips(&row.fips)).or_insert(0.0) += row.customer_hours_out;
    }
    totals
}

/// Acres burned in the given year, summed per county and keyed by
/// normalized county name
#[must_use]
pub fn wildfire_measures(rows: &[WildfireYear], year: i32) -> FxHashMap<String, f64> {
    let mut acres: FxHashMap<String, f64> = FxHashMap::default();
    for row in rows.iter().filter(|r| r.year == year) {
        *acres.entry(normalize_county_key(&row.county_name)).or_insert(0.0) += row.acres_burned;
    }
    acres
}

/// Zero-pad a FIPS code to its 5-digit form
///
/// Numeric CSV columns drop the leading zero from California FIPS codes
/// ("6037" for "06037"); normalize before joining.
#[must_use]
pub fn pad_fips(fips: &str) -> String {
    let trimmed = fips.trim();
    format!("{trimmed:0>5}")
}
