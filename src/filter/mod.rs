//! A reusable Arrow `RecordBatch` filter engine for claims queries.
//!
//! Filters are described first as composable expressions, then evaluated
//! vectorized against record batches at an explicit execution step.

use std::collections::HashSet;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq};
use arrow::compute::{and, filter as filter_array, not, or};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Result;

/// Filter against a string column
#[derive(Debug, Clone)]
pub enum StringFilter {
    /// Exact, case-sensitive equality
    Eq(String),
    /// Membership in a set of values
    In(Vec<String>),
}

/// Filter against an integer column
#[derive(Debug, Clone)]
pub enum IntFilter {
    Eq(i64),
    Gt(i64),
    Gte(i64),
    Lt(i64),
    Lte(i64),
}

/// Typed filter for a single column
#[derive(Debug, Clone)]
pub enum ColumnFilter {
    String(StringFilter),
    Int(IntFilter),
    /// Exact match on a single calendar day (Date32 column)
    Date(NaiveDate),
}

/// A composable filter expression
#[derive(Debug, Clone)]
pub enum Expr {
    Filter {
        column: String,
        filter: ColumnFilter,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// Matches every row
    AlwaysTrue,
}

impl Expr {
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub const fn always_true() -> Self {
        Self::AlwaysTrue
    }

    /// Returns the set of column names this expression reads
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut set = HashSet::new();
        self.collect_columns(&mut set);
        set
    }

    fn collect_columns(&self, set: &mut HashSet<String>) {
        match self {
            Self::Filter { column, .. } => {
                set.insert(column.clone());
            }
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_columns(set);
                rhs.collect_columns(set);
            }
            Self::Not(inner) => inner.collect_columns(set),
            Self::AlwaysTrue => {}
        }
    }
}

/// Entry point for building a single-column filter
#[must_use]
pub fn col(name: &str) -> ColumnBuilder {
    ColumnBuilder {
        name: name.to_string(),
    }
}

pub struct ColumnBuilder {
    name: String,
}

impl ColumnBuilder {
    pub fn eq(self, val: impl Into<ColumnFilter>) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: val.into(),
        }
    }

    #[must_use]
    pub fn in_list(self, values: Vec<String>) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::String(StringFilter::In(values)),
        }
    }

    #[must_use]
    pub fn gt(self, val: i64) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::Int(IntFilter::Gt(val)),
        }
    }

    #[must_use]
    pub fn gte(self, val: i64) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::Int(IntFilter::Gte(val)),
        }
    }

    #[must_use]
    pub fn lt(self, val: i64) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::Int(IntFilter::Lt(val)),
        }
    }

    #[must_use]
    pub fn lte(self, val: i64) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::Int(IntFilter::Lte(val)),
        }
    }

    /// Exact match on a single service day
    #[must_use]
    pub fn on_date(self, date: NaiveDate) -> Expr {
        Expr::Filter {
            column: self.name,
            filter: ColumnFilter::Date(date),
        }
    }
}

impl From<&str> for ColumnFilter {
    fn from(s: &str) -> Self {
        Self::String(StringFilter::Eq(s.to_string()))
    }
}

impl From<String> for ColumnFilter {
    fn from(s: String) -> Self {
        Self::String(StringFilter::Eq(s))
    }
}

impl From<i64> for ColumnFilter {
    fn from(v: i64) -> Self {
        Self::Int(IntFilter::Eq(v))
    }
}

impl From<NaiveDate> for ColumnFilter {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Days since the Unix epoch, the Date32 wire representation
#[must_use]
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

/// Evaluates a filter expression against a record batch
///
/// # Returns
/// A boolean array indicating which rows match the filter
///
/// # Errors
/// Returns an error if a referenced column is absent or has an
/// incompatible type
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::Filter { column, filter } => column_mask(batch, column, filter),
        Expr::And(lhs, rhs) => Ok(and(
            &evaluate_expr(batch, lhs)?,
            &evaluate_expr(batch, rhs)?,
        )?),
        Expr::Or(lhs, rhs) => Ok(or(
            &evaluate_expr(batch, lhs)?,
            &evaluate_expr(batch, rhs)?,
        )?),
        Expr::Not(inner) => Ok(not(&evaluate_expr(batch, inner)?)?),
        Expr::AlwaysTrue => Ok(BooleanArray::from(vec![true; batch.num_rows()])),
    }
}

fn column_mask(batch: &RecordBatch, column: &str, filter: &ColumnFilter) -> Result<BooleanArray> {
    match filter {
        ColumnFilter::String(f) => string_mask(batch, column, f),
        ColumnFilter::Int(f) => int_mask(batch, column, f),
        ColumnFilter::Date(d) => date_mask(batch, column, *d),
    }
}

fn string_mask(batch: &RecordBatch, column: &str, filter: &StringFilter) -> Result<BooleanArray> {
    let index = batch.schema().index_of(column)?;
    let array = batch.column(index);
    let str_array = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            ArrowError::ComputeError(format!("Column '{column}' is not a StringArray"))
        })?;

    match filter {
        StringFilter::Eq(val) => {
            let scalar = StringArray::new_scalar(val.clone());
            Ok(eq(str_array, &scalar)?)
        }
        StringFilter::In(values) => {
            // Null values never match a membership test
            let value_set: HashSet<&str> = values.iter().map(String::as_str).collect();
            Ok(str_array
                .iter()
                .map(|opt| opt.map(|s| value_set.contains(s)))
                .collect())
        }
    }
}

fn int_mask(batch: &RecordBatch, column: &str, filter: &IntFilter) -> Result<BooleanArray> {
    let index = batch.schema().index_of(column)?;
    let array = batch.column(index);

    if let Some(int_array) = array.as_any().downcast_ref::<Int32Array>() {
        let val = match filter {
            IntFilter::Eq(v)
            | IntFilter::Gt(v)
            | IntFilter::Gte(v)
            | IntFilter::Lt(v)
            | IntFilter::Lte(v) => *v as i32,
        };
        let scalar = Int32Array::new_scalar(val);
        let mask = match filter {
            IntFilter::Eq(_) => eq(int_array, &scalar)?,
            IntFilter::Gt(_) => gt(int_array, &scalar)?,
            IntFilter::Gte(_) => gt_eq(int_array, &scalar)?,
            IntFilter::Lt(_) => lt(int_array, &scalar)?,
            IntFilter::Lte(_) => lt_eq(int_array, &scalar)?,
        };
        Ok(mask)
    } else if let Some(int_array) = array.as_any().downcast_ref::<Int64Array>() {
        let val = match filter {
            IntFilter::Eq(v)
            | IntFilter::Gt(v)
            | IntFilter::Gte(v)
            | IntFilter::Lt(v)
            | IntFilter::Lte(v) => *v,
        };
        let scalar = Int64Array::new_scalar(val);
        let mask = match filter {
            IntFilter::Eq(_) => eq(int_array, &scalar)?,
            IntFilter::Gt(_) => gt(int_array, &scalar)?,
            IntFilter::Gte(_) => gt_eq(int_array, &scalar)?,
            IntFilter::Lt(_) => lt(int_array, &scalar)?,
            IntFilter::Lte(_) => lt_eq(int_array, &scalar)?,
        };
        Ok(mask)
    } else {
        Err(ArrowError::ComputeError(format!(
            "Expected Int32Array or Int64Array for column '{column}'"
        ))
        .into())
    }
}

fn date_mask(batch: &RecordBatch, column: &str, date: NaiveDate) -> Result<BooleanArray> {
    let index = batch.schema().index_of(column)?;
    let array = batch.column(index);
    let date_array = array
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| {
            ArrowError::ComputeError(format!("Column '{column}' is not a Date32Array"))
        })?;

    let scalar = Date32Array::new_scalar(date_to_days(date));
    Ok(eq(date_array, &scalar)?)
}

/// Filters a record batch down to the rows where the mask is true
///
/// # Errors
/// Returns an error if the mask length does not match the batch
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ArrowError::ComputeError(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        ))
        .into());
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| filter_array(col.as_ref(), mask))
        .collect::<arrow::error::Result<_>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}
