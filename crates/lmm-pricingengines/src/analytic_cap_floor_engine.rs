//! Analytic cap/floor engine on the LIBOR forward model.
//!
//! Each caplet is a put on the zero bond maturing at the end of its accrual
//! period: `τ (L − K)⁺` paid at `T_end` is worth
//! `(1 + τK) · Put(1/(1+τK); T_start, T_end)`. Floorlets use the call.

use crate::instrument::{CapFloor, CapFloorType, PricingEngine, PricingResults};
use lmm_core::{errors::Result, Error, OptionType, Real};
use lmm_models::LiborForwardModel;
use std::sync::Arc;
use tracing::debug;

/// Prices caps and floors as strips of discount-bond options.
#[derive(Debug)]
pub struct AnalyticCapFloorEngine {
    model: Arc<LiborForwardModel>,
}

impl AnalyticCapFloorEngine {
    /// Engine over `model`.
    pub fn new(model: Arc<LiborForwardModel>) -> Self {
        Self { model }
    }

    /// The underlying model.
    pub fn model(&self) -> &Arc<LiborForwardModel> {
        &self.model
    }

    /// Value of the caplet or floorlet on one model period, unit notional.
    pub fn optionlet(&self, cap_floor_type: CapFloorType, strike: Real, period: usize) -> Result<Real> {
        let process = self.model.process();
        let n = process.accrual_periods().len();
        if period >= n {
            return Err(Error::IndexOutOfRange { index: period, size: n });
        }
        let tau = process.accrual_periods()[period];
        let start = process.accrual_start_times()[period];
        let end = process.accrual_end_times()[period];
        let option_type = match cap_floor_type {
            CapFloorType::Cap => OptionType::Put,
            CapFloorType::Floor => OptionType::Call,
        };
        let growth = 1.0 + tau * strike;
        Ok(growth * self.model.discount_bond_option(option_type, 1.0 / growth, start, end)?)
    }
}

impl PricingEngine<CapFloor> for AnalyticCapFloorEngine {
    fn calculate(&self, args: &CapFloor) -> Result<PricingResults> {
        debug!(
            kind = ?args.cap_floor_type,
            strike = args.strike,
            periods = args.periods,
            "analytic cap/floor"
        );
        let mut npv = 0.0;
        let mut results = PricingResults::default();
        for period in args.period_range() {
            let value = args.notional * self.optionlet(args.cap_floor_type, args.strike, period)?;
            results.additional_results.insert(format!("optionlet_{period}"), value);
            npv += value;
        }
        results.npv = npv;
        Ok(results)
    }
}
