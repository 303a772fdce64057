//! Instruments priced on a LIBOR market model schedule and the engine
//! contract.
//!
//! Instruments refer to the model's accrual periods by index, so every
//! cash flow lines up with a simulated forward rate.

use lmm_core::{ensure, errors::Result, Real};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Contains the NPV and optionally additional named results
/// (e.g. "swap_rate", "volatility").
#[derive(Debug, Clone, Default)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Error estimate (e.g. from MC simulation).
    pub error_estimate: Option<Real>,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            additional_results: HashMap::new(),
        }
    }

    /// Attach a Monte Carlo error estimate.
    pub fn with_error_estimate(mut self, error: Real) -> Self {
        self.error_estimate = Some(error);
        self
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }
}

/// Base trait for all pricing engines.
///
/// A pricing engine computes `PricingResults` for a specific instrument type.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

// ── Caps and floors ──────────────────────────────────────────────────────────

/// Cap or floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapFloorType {
    /// Pays `τ (L − K)⁺` per period.
    Cap,
    /// Pays `τ (K − L)⁺` per period.
    Floor,
}

/// A strip of caplets or floorlets over model periods
/// `first_period..first_period + periods`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapFloor {
    /// Cap or floor.
    pub cap_floor_type: CapFloorType,
    /// Strike rate.
    pub strike: Real,
    /// Index of the first accrual period.
    pub first_period: usize,
    /// Number of periods.
    pub periods: usize,
    /// Notional.
    pub notional: Real,
}

impl CapFloor {
    /// Strip on `periods` consecutive periods, unit notional.
    pub fn new(cap_floor_type: CapFloorType, strike: Real, first_period: usize, periods: usize) -> Result<Self> {
        ensure!(strike > 0.0, "cap/floor strike must be positive, got {strike}");
        ensure!(periods > 0, "a cap/floor needs at least one period");
        Ok(Self {
            cap_floor_type,
            strike,
            first_period,
            periods,
            notional: 1.0,
        })
    }

    /// Single caplet or floorlet on `period`.
    pub fn caplet(cap_floor_type: CapFloorType, strike: Real, period: usize) -> Result<Self> {
        Self::new(cap_floor_type, strike, period, 1)
    }

    /// Scale every payment by `notional`.
    pub fn with_notional(mut self, notional: Real) -> Self {
        self.notional = notional;
        self
    }

    /// Model periods covered.
    pub fn period_range(&self) -> std::ops::Range<usize> {
        self.first_period..self.first_period + self.periods
    }
}

// ── Swaptions ────────────────────────────────────────────────────────────────

/// Payer or receiver swaption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwaptionType {
    /// Right to pay fixed.
    Payer,
    /// Right to receive fixed.
    Receiver,
}

/// European swaption exercising at fixing `exercise + 1` into a swap over
/// periods `exercise + 1 ..= exercise + length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swaption {
    /// Payer or receiver.
    pub swaption_type: SwaptionType,
    /// Fixed rate.
    pub strike: Real,
    /// Exercise index `α`.
    pub exercise: usize,
    /// Swap length in periods.
    pub length: usize,
    /// Notional.
    pub notional: Real,
}

impl Swaption {
    /// Swaption with unit notional.
    pub fn new(swaption_type: SwaptionType, strike: Real, exercise: usize, length: usize) -> Result<Self> {
        ensure!(strike > 0.0, "swaption strike must be positive, got {strike}");
        ensure!(length > 0, "the underlying swap needs at least one period");
        Ok(Self {
            swaption_type,
            strike,
            exercise,
            length,
            notional: 1.0,
        })
    }

    /// Scale by `notional`.
    pub fn with_notional(mut self, notional: Real) -> Self {
        self.notional = notional;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_error_estimate(0.1)
            .with_result("volatility", 0.2);
        assert!((r.npv - 42.0).abs() < 1e-15);
        assert_eq!(r.error_estimate, Some(0.1));
        assert!((r.additional_results["volatility"] - 0.2).abs() < 1e-15);
    }

    #[test]
    fn instrument_validation() {
        assert!(CapFloor::new(CapFloorType::Cap, 0.0, 0, 2).is_err());
        assert!(CapFloor::new(CapFloorType::Cap, 0.05, 0, 0).is_err());
        assert_eq!(CapFloor::new(CapFloorType::Floor, 0.05, 1, 3).unwrap().period_range(), 1..4);
        assert!(Swaption::new(SwaptionType::Payer, 0.05, 0, 0).is_err());
    }
}
