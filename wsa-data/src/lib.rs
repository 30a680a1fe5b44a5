//! Core data types for watershed metric datasets.
//!
//! Raw tabular records flow through this crate one way:
//! records -> [`numeric`] / [`temporal`] -> [`series`]. The [`region`] registry
//! resolves region identifiers to display names and boundary features.

pub mod dataset;
pub mod error;
pub mod loader;
pub mod numeric;
pub mod record;
pub mod region;
pub mod series;
pub mod temporal;

pub use dataset::Dataset;
pub use error::{DataError, Result};
pub use record::{Record, RecordSchema};
pub use region::RegionRegistry;
pub use series::SeriesTable;
pub use temporal::{DatePolicy, TemporalIndex};

/// Region identifier field used by the watershed boundary layer and its tables.
pub const DEFAULT_REGION_FIELD: &str = "WATERSHED_ID";

/// Display name property on watershed boundary features.
pub const DEFAULT_NAME_FIELD: &str = "WATERSHED_NAME";

/// Date format for ISO calendar dates: "YYYY-MM-DD"
pub const ISO_FORMAT: &str = "%Y-%m-%d";
