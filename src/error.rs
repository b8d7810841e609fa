//! Centralized error handling for carbonsight.
//!
//! Every fallible operation in the inventory pipeline returns
//! [`Result<T>`], whose error side is [`CarbonError`]. The variants follow the
//! pipeline's error taxonomy:
//!
//! - [`CarbonError::UnsupportedFormat`]: the input encoding could not be
//!   determined from its declared type or extension.
//! - [`CarbonError::Schema`]: one or more required fields are absent.
//! - [`CarbonError::InvalidValue`]: a required field holds a value that
//!   cannot be read as the expected type.
//! - [`CarbonError::InvalidArgument`]: a caller-supplied parameter is out of
//!   range.
//!
//! Missing *values* are never errors; they are reported through
//! [`crate::inventory::ValidationReport`]. Likewise an empty filter match is a
//! [`crate::inventory::NoMatchWarning`], not an error.
//!
//! ```
//! use carbonsight::error::CarbonError;
//!
//! fn describe(err: &CarbonError) -> &'static str {
//!     match err {
//!         CarbonError::Schema { .. } => "fix the column headers",
//!         CarbonError::InvalidValue { .. } => "fix the offending row",
//!         _ => "see message",
//!     }
//! }
//! # let _ = describe;
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any result whose error converts into
//! [`CarbonError`]:
//!
//! ```no_run
//! use carbonsight::error::ResultExt as _;
//! use std::fs;
//!
//! fn load_bytes() -> carbonsight::error::Result<Vec<u8>> {
//!     fs::read("emissions.csv").context("Failed to read activity data")
//! }
//! ```

use std::fmt;

/// Main error type for carbonsight operations.
#[derive(Debug)]
pub enum CarbonError {
    /// The input encoding is not one we can read.
    UnsupportedFormat(String),

    /// Required fields are missing from the dataset's column set.
    Schema { missing: Vec<String> },

    /// A field value cannot be interpreted as its expected type.
    InvalidValue {
        record: String,
        field: String,
        value: String,
    },

    /// A caller-supplied parameter is outside its contractual range.
    InvalidArgument(String),

    /// I/O errors (file operations)
    Io(std::io::Error),

    /// Polars or spreadsheet reader failures
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl CarbonError {
    pub fn schema<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Schema {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalid_value(
        record: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            record: record.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fields named by a [`CarbonError::Schema`] error, empty otherwise.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Self::Schema { missing } => missing,
            _ => &[],
        }
    }
}

impl fmt::Display for CarbonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(fmt_name) => {
                write!(f, "Unsupported format: {fmt_name} (use CSV, TSV, Parquet, JSON or a spreadsheet)")
            }
            Self::Schema { missing } => {
                write!(f, "Missing required columns: {}", missing.join(", "))
            }
            Self::InvalidValue {
                record,
                field,
                value,
            } => write!(
                f,
                "Invalid value in record {record}: field '{field}' has '{value}', expected a number"
            ),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CarbonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CarbonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for CarbonError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for CarbonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for CarbonError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for CarbonError {
    fn from(err: calamine::Error) -> Self {
        Self::DataProcessing(format!("spreadsheet: {err}"))
    }
}

impl From<CarbonError> for String {
    fn from(err: CarbonError) -> Self {
        err.to_string()
    }
}

/// Result type alias for carbonsight operations.
pub type Result<T> = std::result::Result<T, CarbonError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CarbonError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CarbonError = e.into();
            CarbonError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CarbonError = e.into();
            CarbonError::Other(format!("{}: {}", f(), err))
        })
    }
}
