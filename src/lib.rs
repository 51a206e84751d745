//! CFONB Batch Transcoder Library
//!
//! A library for rewriting fixed-width CFONB interbank payment batches from
//! one currency denomination to another, recomputing batch totals, and
//! producing control reports.
//!
//! # What it does
//!
//! - Classifies each fixed-width line by its leading record-type code
//! - Converts the amount field of transfer and total records at a fixed rate
//!   with an explicit rounding policy, leaving every other column untouched
//! - Regenerates the batch footer total from the converted detail amounts
//! - Collects per-transfer summary records and format violations for
//!   operator review
//!
//! Column layouts drifted between source systems, so field spans are
//! configuration ([`LayoutTable`]), not code: adding a bank's variant means
//! adding a layout entry.
//!
//! # Examples
//!
//! ## Converting a EUR batch to XPF
//!
//! ```
//! use cfonb_system::currency::{Converter, RateDirection, RoundingPolicy, EUR_XPF_RATE};
//! use cfonb_system::layout::LayoutTable;
//! use cfonb_system::transcoder::{transcode, TranscodeConfig};
//!
//! let rate: rust_decimal::Decimal = EUR_XPF_RATE.parse()?;
//! let converter = Converter::new(
//!     rate,
//!     RateDirection::Multiply,
//!     RoundingPolicy::RoundNearest,
//!     2,
//! )?;
//! let config = TranscodeConfig::new(LayoutTable::standard(), converter);
//!
//! let result = transcode(b"", config)?;
//! assert!(result.lines.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod amount;
pub mod currency;
pub mod error;
pub mod layout;
pub mod report;
pub mod transcoder;

use std::str::FromStr;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{FieldSpec, LayoutTable, RecordLayout, RecordRole};
pub use transcoder::{transcode, BatchResult, BatchTranscoder, TranscodeConfig, TransferRecord};

/// Built-in column-layout variants, selected per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutVariant {
    /// 160 columns, 16-column amount field at offset 65, amounts in cents.
    Standard,
    /// 160 columns, 14-column amount field at offset 67, integer major units.
    Legacy,
}

impl FromStr for LayoutVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "cfonb160" => Ok(LayoutVariant::Standard),
            "legacy" | "cfonb160-legacy" => Ok(LayoutVariant::Legacy),
            _ => Err(Error::InvalidLayout(s.to_string())),
        }
    }
}

impl LayoutVariant {
    /// The layout table for this variant.
    pub fn table(&self) -> LayoutTable {
        match self {
            LayoutVariant::Standard => LayoutTable::standard(),
            LayoutVariant::Legacy => LayoutTable::legacy(),
        }
    }
}
