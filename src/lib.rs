//! Cohort extraction and descriptive figures for the 2018 California
//! power outage claims study.
//!
//! Two independent pipelines: parameterized cohort counts against a
//! claims table (county × date × diagnosis × age band), and CSV-driven
//! choropleth / LOESS regression figures joined to county boundaries.

pub mod claims;
pub mod cohort;
pub mod config;
pub mod error;
pub mod figures;
pub mod filter;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use claims::{claims_schema, ClaimRecord, ClaimsTable};
pub use cohort::extraction::{write_counts_csv, ExtractionPlan, ExtractionRow};
pub use cohort::{count_cohort, AgeBand, CohortCount, CohortQuery};
pub use config::StudyConfig;
pub use error::{CohortError, Result};

// Filtering capabilities
pub use filter::{col, evaluate_expr, filter_record_batch, Expr};

// Figure pipeline
pub use figures::{generate_all, normalize_county_key};
