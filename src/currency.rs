//! Currency conversion with an explicit, named rounding policy.
//!
//! Different back offices round what is nominally the same EUR to XPF
//! conversion differently, and switching policies silently
//! moves every converted amount by up to one unit. The policy is therefore a
//! required configuration value, never a per-call-site default.
//!
//! All arithmetic is exact [`Decimal`] arithmetic; no floating-point amount
//! ever escapes this module.

use crate::error::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// The fixed EUR/XPF peg: XPF per EUR.
pub const EUR_XPF_RATE: &str = "119.3317";

/// How a fractional target amount is committed to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingPolicy {
    /// Always round toward positive infinity (ceiling).
    RoundUp,
    /// Round to nearest, midpoint away from zero.
    RoundNearest,
    /// Round to nearest, midpoint to even (banker's rounding).
    RoundHalfEven,
}

impl FromStr for RoundingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "round-up" | "up" | "ceiling" => Ok(RoundingPolicy::RoundUp),
            "round-nearest" | "nearest" => Ok(RoundingPolicy::RoundNearest),
            "round-half-even" | "half-even" | "bankers" => Ok(RoundingPolicy::RoundHalfEven),
            _ => Err(Error::InvalidRounding(s.to_string())),
        }
    }
}

/// Whether source amounts are multiplied or divided by the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDirection {
    /// `target = source_major * rate` (rate is target units per source unit).
    Multiply,
    /// `target = source_major / rate` (rate is source units per target unit).
    Divide,
}

impl FromStr for RateDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "multiply" | "mul" => Ok(RateDirection::Multiply),
            "divide" | "div" => Ok(RateDirection::Divide),
            _ => Err(Error::InvalidDirection(s.to_string())),
        }
    }
}

/// Fixed-rate converter from source field units to integer target units.
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    rate: Decimal,
    direction: RateDirection,
    rounding: RoundingPolicy,
    scale: u32,
}

impl Converter {
    /// Create a converter.
    ///
    /// `scale` is the implied decimal-place count of the source amount
    /// fields (2 when the field holds cents, 0 when it already holds major
    /// units). The rate must be strictly positive.
    pub fn new(
        rate: Decimal,
        direction: RateDirection,
        rounding: RoundingPolicy,
        scale: u32,
    ) -> Result<Self> {
        if rate <= Decimal::ZERO {
            return Err(Error::InvalidRate(rate.to_string()));
        }
        Ok(Self {
            rate,
            direction,
            rounding,
            scale,
        })
    }

    /// Convert an amount read from a source field into integer target units.
    ///
    /// Deterministic: the same input always yields the same integer under a
    /// fixed policy.
    pub fn convert(&self, source_units: u64) -> Result<u64> {
        let major = Decimal::from(source_units) / Decimal::from(10u64.pow(self.scale));
        let target = match self.direction {
            RateDirection::Multiply => major * self.rate,
            RateDirection::Divide => major / self.rate,
        };
        let committed = match self.rounding {
            RoundingPolicy::RoundUp => target.ceil(),
            RoundingPolicy::RoundNearest => {
                target.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            }
            RoundingPolicy::RoundHalfEven => {
                target.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            }
        };
        committed
            .to_u64()
            .ok_or(Error::AmountOutOfRange(source_units))
    }
}
