//! Error types for the CFONB transcoder library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during transcoding and reporting operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing the CSV export.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Amount sub-field is not a run of decimal digits.
    #[error("malformed amount field: {0:?}")]
    MalformedAmount(String),

    /// Converted amount has more digits than the destination field holds.
    #[error("amount {value} needs {digits} digits but the field is {width} wide")]
    AmountOverflow {
        value: u64,
        digits: usize,
        width: usize,
    },

    /// Conversion rate is zero, negative, or not a decimal number.
    #[error("invalid conversion rate: {0}")]
    InvalidRate(String),

    /// Unknown rounding policy name.
    #[error("invalid rounding policy: {0}")]
    InvalidRounding(String),

    /// Unknown rate direction name.
    #[error("invalid rate direction: {0}")]
    InvalidDirection(String),

    /// Unknown layout variant name.
    #[error("invalid layout variant: {0}")]
    InvalidLayout(String),

    /// Unknown footer synthesis policy name.
    #[error("invalid footer policy: {0}")]
    InvalidFooterPolicy(String),

    /// Header override value is wider than the header's account field.
    #[error("header account override {value:?} needs {len} columns but the field is {width} wide")]
    HeaderOverrideTooLong {
        value: String,
        len: usize,
        width: usize,
    },

    /// A field span does not fit inside the configured record width.
    #[error("field span {start}+{len} exceeds record width {width}")]
    InvalidSpan {
        start: usize,
        len: usize,
        width: usize,
    },

    /// Converted amount does not fit in an integer.
    #[error("conversion result out of range for {0} source units")]
    AmountOutOfRange(u64),
}
