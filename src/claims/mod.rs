//! Claims data: the record model, its Arrow schema, and the queryable
//! table abstraction.

pub mod record;
pub mod table;

pub use record::{claims_batch, claims_schema, ClaimRecord};
pub use table::ClaimsTable;

/// Column name for the 3-digit county code
pub const COUNTY: &str = "COUNTY";
/// Column name for the beneficiary identifier
pub const BENE_ID: &str = "BENE_ID";
/// Column name for the service-begin date
pub const SERVICE_DATE: &str = "SERVICE_DATE";
/// Column name for the primary ICD-10 diagnosis code
pub const DX_PRIMARY: &str = "DX_PRIMARY";
/// Column name for the secondary ICD-10 diagnosis code
pub const DX_SECONDARY: &str = "DX_SECONDARY";
/// Column name for the beneficiary age in whole years
pub const AGE: &str = "AGE";
