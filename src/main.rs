use std::time::Instant;

use log::{info, warn};
use outage_cohorts::cohort::extraction::{write_counts_csv, ExtractionPlan};
use outage_cohorts::{figures, ClaimsTable, Result, StudyConfig};

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StudyConfig::from_env();
    info!("Study data directory: {}", config.base_dir.display());
    config.ensure_output_dir()?;

    run_extraction(&config)?;
    run_figures(&config)?;

    info!("Study run complete");
    Ok(())
}

/// Run the cohort extraction when the claims data and a plan are present
fn run_extraction(config: &StudyConfig) -> Result<()> {
    let claims_dir = config.claims_dir();
    if !claims_dir.exists() {
        warn!(
            "Claims directory not found, skipping extraction: {}",
            claims_dir.display()
        );
        return Ok(());
    }

    let plan_path = config.plan_path();
    if !plan_path.exists() {
        warn!(
            "Extraction plan not found, skipping extraction: {}",
            plan_path.display()
        );
        return Ok(());
    }

    let start = Instant::now();
    let plan = ExtractionPlan::from_json_file(&plan_path)?;
    info!(
        "Extraction plan: {} counties x {} dates x {} diagnoses x {} age bands = {} queries",
        plan.counties.len(),
        plan.dates.len(),
        plan.diagnoses.len(),
        plan.age_bands.len(),
        plan.len()
    );

    let table = ClaimsTable::from_parquet_dir(&claims_dir, Some(config.batch_size))?;
    info!(
        "Loaded {} claim rows in {:?}",
        table.num_rows(),
        start.elapsed()
    );

    let rows = plan.run(&table)?;
    write_counts_csv(&rows, &config.output("cohort_counts.csv"))?;
    info!("Extraction finished in {:?}", start.elapsed());
    Ok(())
}

/// Generate every figure whose CSV inputs are present
fn run_figures(config: &StudyConfig) -> Result<()> {
    if !config.base_dir.exists() {
        warn!(
            "Data directory not found, skipping figures: {}",
            config.base_dir.display()
        );
        return Ok(());
    }

    let start = Instant::now();
    figures::generate_all(config)?;
    info!("Figure generation finished in {:?}", start.elapsed());
    Ok(())
}
