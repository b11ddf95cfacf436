//! Configuration for the study pipelines.

use std::path::{Path, PathBuf};

/// Configuration for a study run
///
/// The config is passed explicitly to every pipeline entry point; there is
/// no process-wide session state.
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Base directory holding the input CSV extracts and boundary file
    pub base_dir: PathBuf,
    /// Directory for rendered figures and the extraction output table,
    /// created on demand if absent
    pub output_dir: PathBuf,
    /// Batch size for Parquet reading
    pub batch_size: usize,
}

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            batch_size: batch_size_from_env().unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }
}

impl StudyConfig {
    /// Create a config rooted at the given base directory, with the output
    /// directory beneath it
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let output_dir = base_dir.join("output");
        Self {
            base_dir,
            output_dir,
            batch_size: batch_size_from_env().unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }

    /// Build a config from the `OUTAGE_DATA_DIR` environment variable,
    /// falling back to the defaults when unset
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("OUTAGE_DATA_DIR") {
            Ok(dir) => Self::new(dir),
            Err(_) => Self::default(),
        }
    }

    /// Resolve an input file name against the base directory
    #[must_use]
    pub fn input(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Resolve an output file name against the output directory
    #[must_use]
    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Ensure the output directory exists
    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
    }

    /// Directory expected to hold the claims Parquet extracts
    #[must_use]
    pub fn claims_dir(&self) -> PathBuf {
        self.base_dir.join("claims")
    }

    /// Path of the extraction-plan configuration table
    #[must_use]
    pub fn plan_path(&self) -> PathBuf {
        self.base_dir.join("extraction_plan.json")
    }
}

/// Helper function to get batch size from environment
#[must_use]
pub fn batch_size_from_env() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> crate::error::Result<()> {
    if !dir.exists() || !dir.is_dir() {
        return Err(crate::error::CohortError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}
