//! Claim record model
//!
//! One `ClaimRecord` per service event. Records are immutable and sourced
//! externally; the pipelines never create or mutate them, only read.

use std::sync::Arc;

use arrow::array::{Date32Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::claims::{AGE, BENE_ID, COUNTY, DX_PRIMARY, DX_SECONDARY, SERVICE_DATE};
use crate::error::Result;
use crate::filter::date_to_days;

/// One row of the claims table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    /// 3-digit county code
    pub county: String,
    /// Beneficiary identifier
    pub bene_id: String,
    /// Service-begin date
    pub service_date: NaiveDate,
    /// Primary ICD-10 diagnosis code
    pub dx_primary: String,
    /// Secondary ICD-10 diagnosis code, when present. Never consulted by
    /// the cohort filter.
    pub dx_secondary: Option<String>,
    /// Age in whole years at service
    pub age: i32,
}

impl ClaimRecord {
    /// Create a new claim record
    #[must_use]
    pub fn new(
        county: impl Into<String>,
        bene_id: impl Into<String>,
        service_date: NaiveDate,
        dx_primary: impl Into<String>,
        age: i32,
    ) -> Self {
        Self {
            county: county.into(),
            bene_id: bene_id.into(),
            service_date,
            dx_primary: dx_primary.into(),
            dx_secondary: None,
            age,
        }
    }

    /// Attach a secondary diagnosis code
    #[must_use]
    pub fn with_secondary(mut self, dx: impl Into<String>) -> Self {
        self.dx_secondary = Some(dx.into());
        self
    }
}

/// Arrow schema of the claims table
#[must_use]
pub fn claims_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(COUNTY, DataType::Utf8, false),
        Field::new(BENE_ID, DataType::Utf8, false),
        Field::new(SERVICE_DATE, DataType::Date32, false),
        Field::new(DX_PRIMARY, DataType::Utf8, false),
        Field::new(DX_SECONDARY, DataType::Utf8, true),
        Field::new(AGE, DataType::Int32, false),
    ]))
}

/// Build a record batch from claim records
///
/// # Errors
/// Returns an error if the columns cannot be assembled into a batch
pub fn claims_batch(records: &[ClaimRecord]) -> Result<RecordBatch> {
    let county = StringArray::from_iter_values(records.iter().map(|r| r.county.as_str()));
    let bene_id = StringArray::from_iter_values(records.iter().map(|r| r.bene_id.as_str()));
    let service_date = Date32Array::from_iter_values(
        records.iter().map(|r| date_to_days(r.service_date)),
    );
    let dx_primary = StringArray::from_iter_values(records.iter().map(|r| r.dx_primary.as_str()));
    let dx_secondary: StringArray = records
        .iter()
        .map(|r| r.dx_secondary.as_deref())
        .collect();
    let age = Int32Array::from_iter_values(records.iter().map(|r| r.age));

    Ok(RecordBatch::try_new(
        claims_schema(),
        vec![
            Arc::new(county),
            Arc::new(bene_id),
            Arc::new(service_date),
            Arc::new(dx_primary),
            Arc::new(dx_secondary),
            Arc::new(age),
        ],
    )?)
}
