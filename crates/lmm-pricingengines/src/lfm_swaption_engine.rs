//! European swaption engine on the LIBOR forward model.
//!
//! The Black formula is applied to the forward swap rate with Rebonato's
//! approximate volatility, read from the model's cached volatility matrix
//! when the swaption falls inside it.

use crate::instrument::{PricingEngine, PricingResults, Swaption, SwaptionType};
use lmm_core::{errors::Result, OptionType, Real};
use lmm_math::black_formula;
use lmm_models::LiborForwardModel;
use std::sync::Arc;
use tracing::debug;

/// Black pricing of swaptions with LMM-implied volatilities.
#[derive(Debug)]
pub struct LfmSwaptionEngine {
    model: Arc<LiborForwardModel>,
}

impl LfmSwaptionEngine {
    /// Engine over `model`.
    pub fn new(model: Arc<LiborForwardModel>) -> Self {
        Self { model }
    }

    /// The underlying model.
    pub fn model(&self) -> &Arc<LiborForwardModel> {
        &self.model
    }

    fn volatility(&self, args: &Swaption) -> Result<Real> {
        let matrix = self.model.swaption_volatility_matrix()?;
        let (rows, cols) = (matrix.exercise_times().len(), matrix.lengths().len());
        if args.exercise < rows && args.length <= cols {
            matrix.volatility(args.exercise, args.length - 1)
        } else {
            self.model
                .swaption_volatility(args.exercise, args.exercise + args.length)
        }
    }
}

impl PricingEngine<Swaption> for LfmSwaptionEngine {
    fn calculate(&self, args: &Swaption) -> Result<PricingResults> {
        let (alpha, beta) = (args.exercise, args.exercise + args.length);
        let swap_rate = self.model.swaption_rate(alpha, beta)?;
        let annuity = self.model.annuity(alpha, beta)?;
        let volatility = self.volatility(args)?;
        let exercise_time = self.model.process().fixing_times()[alpha + 1];
        debug!(alpha, beta, swap_rate, volatility, "lfm swaption");

        let option_type = match args.swaption_type {
            SwaptionType::Payer => OptionType::Call,
            SwaptionType::Receiver => OptionType::Put,
        };
        let npv = args.notional
            * black_formula(
                option_type,
                args.strike,
                swap_rate,
                volatility * exercise_time.sqrt(),
                annuity,
            )?;
        Ok(PricingResults::from_npv(npv)
            .with_result("swap_rate", swap_rate)
            .with_result("annuity", annuity)
            .with_result("volatility", volatility))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lmm_core::{Compounding, Time};
    use lmm_models::{
        ForwardRateSchedule, LinearExponentialCorrelation, LinearExponentialVolatility,
    };
    use lmm_termstructures::{FlatForward, YieldTermStructure};
    use lmm_time::{Actual365Fixed, Date};

    fn model(n: usize) -> Arc<LiborForwardModel> {
        let today = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::new(today, 0.05, Arc::new(Actual365Fixed), Compounding::Compounded(1)));
        let fixings: Vec<Time> = (1..=n).map(|i| i as Time).collect();
        let ends: Vec<Time> = (2..=n + 1).map(|i| i as Time).collect();
        let schedule =
            ForwardRateSchedule::from_times(fixings.clone(), fixings.clone(), ends, vec![1.0; n], curve).unwrap();
        let model = LiborForwardModel::from_schedule(
            schedule,
            LinearExponentialVolatility::new(fixings, 0.1, 0.5, 0.05, 0.15).unwrap().into(),
            LinearExponentialCorrelation::new(n, 0.3, 0.2, Some(3)).unwrap().into(),
        )
        .unwrap();
        Arc::new(model)
    }

    #[test]
    fn payer_receiver_parity() {
        let engine = LfmSwaptionEngine::new(model(8));
        let strike = 0.045;
        let payer = engine
            .calculate(&Swaption::new(SwaptionType::Payer, strike, 1, 3).unwrap())
            .unwrap();
        let receiver = engine
            .calculate(&Swaption::new(SwaptionType::Receiver, strike, 1, 3).unwrap())
            .unwrap();
        let annuity = payer.additional_results["annuity"];
        let swap_rate = payer.additional_results["swap_rate"];
        assert_relative_eq!(payer.npv - receiver.npv, annuity * (swap_rate - strike), max_relative = 1e-10);
        assert_relative_eq!(swap_rate, 0.05, max_relative = 1e-12);
    }

    #[test]
    fn cached_and_direct_volatilities_agree() {
        let m = model(8);
        let engine = LfmSwaptionEngine::new(Arc::clone(&m));
        let inside = engine
            .calculate(&Swaption::new(SwaptionType::Payer, 0.05, 2, 2).unwrap())
            .unwrap();
        assert_relative_eq!(
            inside.additional_results["volatility"],
            m.swaption_volatility(2, 4).unwrap(),
            max_relative = 1e-12
        );
        // exercise 4 lies outside the 4×4 cached matrix
        let outside = engine
            .calculate(&Swaption::new(SwaptionType::Payer, 0.05, 4, 3).unwrap())
            .unwrap();
        assert_relative_eq!(
            outside.additional_results["volatility"],
            m.swaption_volatility(4, 7).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn swap_beyond_schedule_is_rejected() {
        let engine = LfmSwaptionEngine::new(model(8));
        let err = engine
            .calculate(&Swaption::new(SwaptionType::Payer, 0.05, 5, 3).unwrap())
            .unwrap_err();
        assert!(matches!(err, lmm_core::Error::IndexOutOfRange { .. }));
    }
}
