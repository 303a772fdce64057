//! Monte Carlo caplet engine under the spot measure.
//!
//! Forward rates are evolved on a grid containing every fixing up to the
//! caplet's own. The numeraire is the discretely rolled money-market
//! account started at the first accrual start, so a payment `V` at the end
//! of period `i` is worth `P(0, T_0^start) · E[V · Π_{j≤i} 1/(1 + τ_j L_j(T_j))]`.

use crate::instrument::{CapFloor, CapFloorType, PricingEngine, PricingResults};
use lmm_core::{ensure, errors::Result, Error, Real, Time};
use lmm_methods::{MonteCarloModel, MultiPath, MultiPathPricer, SimulationSettings, TimeGrid};
use lmm_models::{LiborForwardModel, LiborForwardProcess};
use std::sync::Arc;
use tracing::debug;

/// Tolerance when checking that accrual periods are contiguous.
const CONTIGUITY_TOLERANCE: Real = 1e-10;

/// Deflated caplet and floorlet payoffs on simulated forward rates.
struct OptionletPathPricer<'a> {
    process: &'a LiborForwardProcess,
    cap_floor_type: CapFloorType,
    strike: Real,
    periods: std::ops::Range<usize>,
}

impl MultiPathPricer for OptionletPathPricer<'_> {
    fn value(&self, path: &MultiPath) -> Result<Real> {
        // every rate up to the last period has fixed at the final grid time
        let rates = path.state(path.len() - 1);
        let deflators = self.process.discount_bonds(rates)?;
        let tau = self.process.accrual_periods();
        Ok(self
            .periods
            .clone()
            .map(|i| {
                let payoff = match self.cap_floor_type {
                    CapFloorType::Cap => (rates[i] - self.strike).max(0.0),
                    CapFloorType::Floor => (self.strike - rates[i]).max(0.0),
                };
                tau[i] * payoff * deflators[i]
            })
            .sum())
    }
}

/// Prices caps and floors by simulating the model's forward-rate process.
#[derive(Debug)]
pub struct McCapletEngine {
    model: Arc<LiborForwardModel>,
    settings: SimulationSettings,
}

impl McCapletEngine {
    /// Engine over `model` with the given simulation settings.
    pub fn new(model: Arc<LiborForwardModel>, settings: SimulationSettings) -> Self {
        Self { model, settings }
    }

    /// Simulation settings.
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Grid through every fixing up to `last`, with at least
    /// `steps_per_year` steps per year.
    fn grid(&self, last: usize) -> Result<TimeGrid> {
        let fixings = &self.model.process().fixing_times()[..=last];
        let horizon = fixings[last];
        let steps = (horizon * self.settings.steps_per_year as Time).ceil() as usize;
        TimeGrid::from_times(fixings, steps)
    }

    fn check_contiguous(&self, last: usize) -> Result<()> {
        let process = self.model.process();
        let (starts, ends) = (process.accrual_start_times(), process.accrual_end_times());
        for j in 0..last {
            if (ends[j] - starts[j + 1]).abs() > CONTIGUITY_TOLERANCE {
                return Err(Error::ScheduleMismatch(format!(
                    "period {j} ends at {} but period {} starts at {}",
                    ends[j],
                    j + 1,
                    starts[j + 1]
                )));
            }
        }
        Ok(())
    }
}

impl PricingEngine<CapFloor> for McCapletEngine {
    fn calculate(&self, args: &CapFloor) -> Result<PricingResults> {
        ensure!(args.periods > 0, "a cap/floor needs at least one period");
        let process = self.model.process();
        let n = process.accrual_periods().len();
        let last = args.first_period + args.periods - 1;
        if last >= n {
            return Err(Error::IndexOutOfRange { index: last, size: n });
        }
        self.check_contiguous(last)?;

        let grid = self.grid(last)?;
        debug!(
            last,
            steps = grid.steps(),
            paths = self.settings.paths,
            "monte carlo cap/floor"
        );
        let pricer = OptionletPathPricer {
            process,
            cap_floor_type: args.cap_floor_type,
            strike: args.strike,
            periods: args.period_range(),
        };
        let mc = MonteCarloModel::new(process, grid, self.settings)?;
        let result = mc.run(&pricer)?;

        let scale = args.notional * self.model.discount(process.accrual_start_times()[0]);
        Ok(PricingResults::from_npv(scale * result.mean)
            .with_error_estimate(scale * result.error_estimate)
            .with_result("samples", result.samples as Real))
    }
}
