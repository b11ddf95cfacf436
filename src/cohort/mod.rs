//! Cohort queries over the claims table.
//!
//! A cohort is the set of unique beneficiaries matching a county, a single
//! service day, a primary diagnosis code, and an age band. Queries are
//! two-phase: describe the filter first (`CohortQuery`), then run it with
//! an explicit `execute` against a `ClaimsTable`.

pub mod extraction;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::claims::{ClaimsTable, AGE, BENE_ID, COUNTY, DX_PRIMARY, SERVICE_DATE};
use crate::error::{CohortError, Result};
use crate::filter::{col, Expr};

/// An age restriction on cohort membership
///
/// `Range` is half-open: `Range(0, 5)` matches ages 0 through 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBand {
    /// No age restriction
    Any,
    /// Strictly below the given age
    Under(i64),
    /// Strictly above the given age
    Over(i64),
    /// At least `lo`, strictly below `hi`
    Range(i64, i64),
}

impl AgeBand {
    /// The filter expression this band applies to the age column
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Any => Expr::always_true(),
            Self::Under(n) => col(AGE).lt(*n),
            Self::Over(n) => col(AGE).gt(*n),
            Self::Range(lo, hi) => col(AGE).gte(*lo).and(col(AGE).lt(*hi)),
        }
    }

    /// Whether a single age satisfies the band
    #[must_use]
    pub fn contains(&self, age: i64) -> bool {
        match self {
            Self::Any => true,
            Self::Under(n) => age < *n,
            Self::Over(n) => age > *n,
            Self::Range(lo, hi) => age >= *lo && age < *hi,
        }
    }

    /// Stable label for output tables
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Any => "all".to_string(),
            Self::Under(n) => format!("under_{n}"),
            Self::Over(n) => format!("over_{n}"),
            Self::Range(lo, hi) => format!("{lo}_to_{hi}"),
        }
    }
}

/// Distinct-beneficiary counts keyed by county code
///
/// An empty match set materializes an explicit zero for the queried
/// county; absent keys also read as zero, for downstream arithmetic
/// safety.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortCount {
    counts: FxHashMap<String, u64>,
}

impl CohortCount {
    /// The count for a county, zero when the county is absent
    #[must_use]
    pub fn get(&self, county_code: &str) -> u64 {
        self.counts.get(county_code).copied().unwrap_or(0)
    }

    /// All (county, count) entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn insert(&mut self, county_code: String, count: u64) {
        self.counts.insert(county_code, count);
    }
}

/// A cohort filter specification: county, service day, primary diagnosis,
/// age band
///
/// All four dimensions are required; `AgeBand::Any` stands in when no age
/// restriction applies. Construction performs no IO; the query only runs
/// at `execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortQuery {
    /// 3-digit county code, exact match
    pub county: String,
    /// Single service day, not a range
    pub date: NaiveDate,
    /// ICD-10 code, exact and case-sensitive against the primary
    /// diagnosis field only
    pub diagnosis: String,
    /// Age restriction
    pub age: AgeBand,
}

impl CohortQuery {
    /// Describe a cohort with no age restriction
    #[must_use]
    pub fn new(
        county: impl Into<String>,
        date: NaiveDate,
        diagnosis: impl Into<String>,
    ) -> Self {
        Self {
            county: county.into(),
            date,
            diagnosis: diagnosis.into(),
            age: AgeBand::Any,
        }
    }

    /// Restrict the cohort to an age band
    #[must_use]
    pub fn with_age(mut self, age: AgeBand) -> Self {
        self.age = age;
        self
    }

    /// The combined filter expression for this cohort
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        col(COUNTY)
            .eq(self.county.as_str())
            .and(col(SERVICE_DATE).on_date(self.date))
            .and(col(DX_PRIMARY).eq(self.diagnosis.as_str()))
            .and(self.age.to_expr())
    }

    /// Run the query: filter, project to (county, beneficiary),
    /// deduplicate by beneficiary, count per county
    ///
    /// A beneficiary with several qualifying claim rows is counted once.
    /// The result always carries an entry for the queried county, zero
    /// when nothing matched.
    ///
    /// # Errors
    /// Returns a `DataSource` error when the claims table cannot satisfy
    /// the query. Not retried; independent queries are unaffected.
    pub fn execute(&self, table: &ClaimsTable) -> Result<CohortCount> {
        let matched = table
            .select(&self.to_expr())
            .map_err(|e| CohortError::data_source(format!("cohort query failed: {e}")))?;

        let counties = matched
            .string_values(COUNTY)
            .map_err(|e| CohortError::data_source(format!("cohort query failed: {e}")))?;
        let beneficiaries = matched
            .string_values(BENE_ID)
            .map_err(|e| CohortError::data_source(format!("cohort query failed: {e}")))?;

        // Dedup on (county, beneficiary) before counting; the county key
        // is degenerate here since the filter fixed it
        let distinct: FxHashSet<(String, String)> =
            counties.into_iter().zip(beneficiaries).collect();

        let mut per_county: FxHashMap<String, u64> = FxHashMap::default();
        for (county, _) in distinct {
            *per_county.entry(county).or_insert(0) += 1;
        }

        let mut result = CohortCount::default();
        for (county, count) in per_county {
            result.insert(county, count);
        }
        if !result.counts.contains_key(&self.county) {
            result.insert(self.county.clone(), 0);
        }
        Ok(result)
    }
}

/// Count the distinct beneficiaries matching a cohort filter
///
/// Convenience wrapper over [`CohortQuery`]: one call per
/// (county, date, diagnosis, age-band) combination. Calls are independent
/// and order-independent.
///
/// # Errors
/// Returns a `DataSource` error when the claims table cannot satisfy the
/// query
pub fn count_cohort(
    table: &ClaimsTable,
    county_code: &str,
    date: NaiveDate,
    diagnosis_code: &str,
    age: &AgeBand,
) -> Result<CohortCount> {
    CohortQuery::new(county_code, date, diagnosis_code)
        .with_age(age.clone())
        .execute(table)
}
