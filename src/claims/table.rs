//! The queryable claims table.
//!
//! A `ClaimsTable` is the "row-filterable, groupable tabular source" the
//! cohort queries run against: a set of Arrow record batches plus the
//! filter-expression engine. Selections return new tables, so a county
//! view can be built once and reused across date/diagnosis queries.

use std::path::Path;

use arrow::array::StringArray;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::claims::record::{claims_batch, claims_schema, ClaimRecord};
use crate::claims::COUNTY;
use crate::cohort::AgeBand;
use crate::error::{CohortError, Result};
use crate::filter::{col, evaluate_expr, filter_record_batch, Expr};
use crate::utils;

/// A queryable source of claim records
#[derive(Debug, Clone)]
pub struct ClaimsTable {
    batches: Vec<RecordBatch>,
}

impl ClaimsTable {
    /// Wrap existing record batches
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Build an in-memory table from claim records
    ///
    /// # Errors
    /// Returns an error if the records cannot be assembled into a batch
    pub fn from_records(records: &[ClaimRecord]) -> Result<Self> {
        if records.is_empty() {
            return Ok(Self::new(Vec::new()));
        }
        Ok(Self::new(vec![claims_batch(records)?]))
    }

    /// Load a single Parquet claims extract, projected to the claims schema
    ///
    /// # Errors
    /// Returns a `DataSource` error if the file cannot be read
    pub fn from_parquet_file(path: &Path, batch_size: Option<usize>) -> Result<Self> {
        let schema = claims_schema();
        let batches = utils::read_parquet(path, Some(&schema), batch_size)
            .map_err(|e| CohortError::data_source(format!("{}: {e}", path.display())))?;
        Ok(Self::new(batches))
    }

    /// Load every Parquet claims extract in a directory, in parallel
    ///
    /// # Errors
    /// Returns a `DataSource` error if the directory or any file cannot be
    /// read
    pub fn from_parquet_dir(dir: &Path, batch_size: Option<usize>) -> Result<Self> {
        let schema = claims_schema();
        let batches = utils::load_parquet_files_parallel(dir, Some(&schema), batch_size)
            .map_err(|e| CohortError::data_source(format!("{}: {e}", dir.display())))?;
        Ok(Self::new(batches))
    }

    /// The underlying record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total row count across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Apply a filter expression, keeping the matching rows
    ///
    /// Empty batches are dropped from the result; a table with zero
    /// matching rows is a valid (empty) table, not an error.
    ///
    /// # Errors
    /// Returns an error if the expression references an absent column or
    /// an incompatible type
    pub fn select(&self, expr: &Expr) -> Result<Self> {
        let mut filtered = Vec::new();
        for batch in &self.batches {
            let mask = evaluate_expr(batch, expr)?;
            let batch = filter_record_batch(batch, &mask)?;
            if batch.num_rows() > 0 {
                filtered.push(batch);
            }
        }
        Ok(Self::new(filtered))
    }

    /// A reusable county view: the county and age filters applied once, so
    /// multiple date/diagnosis queries can share the reduced table
    ///
    /// # Errors
    /// Returns an error if the underlying selection fails
    pub fn county_view(&self, county_code: &str, age: &AgeBand) -> Result<Self> {
        self.select(&col(COUNTY).eq(county_code).and(age.to_expr()))
    }

    /// Collect the string values of a column across all batches
    ///
    /// # Errors
    /// Returns an error if the column is absent or not a string column
    pub fn string_values(&self, column: &str) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let index = batch.schema().index_of(column)?;
            let array = batch
                .column(index)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    ArrowError::ComputeError(format!("Column '{column}' is not a StringArray"))
                })?;
            values.extend(array.iter().flatten().map(str::to_string));
        }
        Ok(values)
    }
}
