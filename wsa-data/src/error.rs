//! Error types for dataset loading.

use thiserror::Error;

/// Errors raised while reading record sources and boundary registries.
///
/// Unparseable metric values and malformed records are not errors; they are
/// skipped where they are read.
#[derive(Error, Debug)]
pub enum DataError {
    /// A date string matched neither `DD.MM.YYYY` nor ISO 8601.
    #[error("Unrecognized date format: '{raw}'")]
    DateFormat { raw: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read data: {0}")]
    Io(#[from] std::io::Error),

    /// The source parsed but left no record with a usable date.
    #[error("Dataset {location} has no usable records")]
    EmptyDataset { location: String },

    /// The source location has an extension no loader understands.
    #[error("Unsupported data format: {location}")]
    UnsupportedFormat { location: String },
}

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_message() {
        let err = DataError::DateFormat {
            raw: "2020/13/45".to_string(),
        };
        assert_eq!(err.to_string(), "Unrecognized date format: '2020/13/45'");
    }

    #[test]
    fn test_empty_dataset_message() {
        let err = DataError::EmptyDataset {
            location: "monthly.csv".to_string(),
        };
        assert_eq!(err.to_string(), "Dataset monthly.csv has no usable records");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DataError = io_err.into();
        assert!(matches!(err, DataError::Io(_)));
    }
}
