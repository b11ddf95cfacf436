//! Descriptive figure pipeline.
//!
//! Loads the pre-aggregated CSV extracts, joins per-county measures to
//! boundary polygons, and renders the choropleths and the LOESS
//! regression figures. Figures are generated one at a time; an error is
//! fatal to that figure only and the remaining figures still run, since
//! each unit of work is cheap to rerun wholesale.

pub mod boundaries;
pub mod choropleth;
pub mod loess;
pub mod regression;
pub mod tables;

use std::path::Path;

pub use boundaries::{
    join_measures, load_county_boundaries, normalize_county_key, CountyShape, JoinKey,
};
pub use choropleth::{render_choropleth, ChoroplethSpec, MISSING_FILL};
pub use loess::{loess, LoessPoint, CI_95};
pub use regression::{render_loess_scatter, RegressionSpec};

use crate::config::StudyConfig;
use crate::error::Result;

/// Study year of the manuscript
pub const STUDY_YEAR: i32 = 2018;

/// County boundary polygons, GeoJSON FeatureCollection
pub const BOUNDARIES_FILE: &str = "ca_counties.geojson";
/// 2018 per-county outage totals
pub const OUTAGE_TOTALS_FILE: &str = "county_outage_totals_2018.csv";
/// Daily outage records
pub const DAILY_OUTAGES_FILE: &str = "daily_outages.csv";
/// Wildfire records
pub const WILDFIRES_FILE: &str = "wildfires.csv";
/// Prefix of the per-county regression input files
pub const REGRESSION_PREFIX: &str = "regression_";

/// Generate every figure whose inputs are present
///
/// # Errors
/// Returns an error only when the output directory cannot be created;
/// individual figure failures are logged and do not abort the rest
pub fn generate_all(config: &StudyConfig) -> Result<()> {
    config.ensure_output_dir()?;

    let boundaries_path = config.input(BOUNDARIES_FILE);
    if boundaries_path.exists() {
        match load_county_boundaries(&boundaries_path) {
            Ok(shapes) => {
                run_figure("outage choropleth", || outage_choropleth(config, &shapes));
                run_figure("wildfire choropleth", || wildfire_choropleth(config, &shapes));
            }
            Err(e) => {
                log::error!("Failed to load county boundaries, skipping choropleths: {e}");
            }
        }
    } else {
        log::warn!(
            "Boundary file not found, skipping choropleths: {}",
            boundaries_path.display()
        );
    }

    regression_figures(config)?;
    Ok(())
}

/// Run a single figure, containing its failure
fn run_figure(name: &str, figure: impl FnOnce() -> Result<()>) {
    if let Err(e) = figure() {
        log::error!("Figure '{name}' failed: {e}");
    }
}

/// Choropleth of 2018 customer-hours of outage per county
///
/// Prefers the pre-aggregated totals extract (joined by normalized county
/// name); falls back to summing the daily records (joined by FIPS) when
/// the totals are absent.
fn outage_choropleth(config: &StudyConfig, shapes: &[CountyShape]) -> Result<()> {
    let totals_path = config.input(OUTAGE_TOTALS_FILE);
    let daily_path = config.input(DAILY_OUTAGES_FILE);

    let (measures, join) = if totals_path.exists() {
        let rows = tables::load_outage_totals(&totals_path)?;
        (tables::outage_measures(&rows), JoinKey::Name)
    } else if daily_path.exists() {
        log::info!("Outage totals extract absent; aggregating daily records");
        let rows = tables::load_daily_outages(&daily_path)?;
        (tables::outage_totals_from_daily(&rows, STUDY_YEAR), JoinKey::Fips)
    } else {
        log::warn!("No outage extract found, skipping outage choropleth");
        return Ok(());
    };

    let joined = join_measures(shapes, &measures, join);
    render_choropleth(
        &joined,
        &ChoroplethSpec::new("Customer-hours of power outage, 2018"),
        &config.output("choropleth_outage_hours_2018.png"),
    )
}

/// Choropleth of 2018 acres burned per county
fn wildfire_choropleth(config: &StudyConfig, shapes: &[CountyShape]) -> Result<()> {
    let path = config.input(WILDFIRES_FILE);
    if !path.exists() {
        log::warn!("Wildfire extract not found, skipping wildfire choropleth");
        return Ok(());
    }

    let rows = tables::load_wildfires(&path)?;
    let measures = tables::wildfire_measures(&rows, STUDY_YEAR);
    let joined = join_measures(shapes, &measures, JoinKey::Name);
    render_choropleth(
        &joined,
        &ChoroplethSpec::new("Acres burned, 2018"),
        &config.output("choropleth_acres_burned_2018.png"),
    )
}

/// One LOESS regression figure per `regression_<county>.csv` input
fn regression_figures(config: &StudyConfig) -> Result<()> {
    if !config.base_dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(&config.base_dir)? {
        let path = entry?.path();
        let Some(county) = regression_county(&path) else {
            continue;
        };
        let county = county.to_string();
        run_figure(&format!("regression ({county})"), || {
            let points = tables::load_regression_points(&path)?;
            let spec = RegressionSpec::new(format!(
                "Respiratory infections around outage start, {county}"
            ));
            let out = config.output(&format!("regression_{county}.png"));
            render_loess_scatter(&points, &spec, &out)
        });
    }
    Ok(())
}

/// County label of a `regression_<county>.csv` file, if the path is one
fn regression_county(path: &Path) -> Option<&str> {
    if !path.is_file() || path.extension().is_none_or(|ext| ext != "csv") {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(REGRESSION_PREFIX)
}
