//! Calibrated LIBOR forward model.
//!
//! Couples a [`LiborForwardProcess`] with the [`CovarianceProxy`] driving it
//! and derives closed-form quantities from the proxy: discount-bond option
//! prices and Rebonato's approximate swaption volatilities.

use crate::correlation::CorrelationModel;
use crate::covariance_proxy::CovarianceProxy;
use crate::parameter::{Parameter, ParameterConstraint};
use crate::process::LiborForwardProcess;
use crate::schedule::ForwardRateSchedule;
use crate::stochastic_process::StochasticProcess;
use crate::volatility::VolatilityModel;
use lmm_core::{ensure, errors::Result, DiscountFactor, Error, Generation, OptionType, Rate, Real, Time, VersionedCache};
use lmm_math::optimization::{CostFunction, EndCriteria, OptimizationResult, Simplex};
use lmm_math::{black_formula, lower_bound, Array, Matrix};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Tolerance (in units of `ε`, scaled by `max(|t|, 1)`) when matching
/// option maturities to the schedule.
const MATURITY_TOLERANCE: Real = 100.0 * Real::EPSILON;

// ── Swaption volatility matrix ────────────────────────────────────────────────

/// Rebonato volatilities by exercise and swap length.
///
/// Entry `(k, l)` is the volatility of the swaption exercising at fixing
/// `k + 1` into a swap over `l + 1` periods.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaptionVolatilityMatrix {
    exercise_times: Vec<Time>,
    lengths: Vec<usize>,
    volatilities: Matrix,
}

impl SwaptionVolatilityMatrix {
    /// Exercise times (rows).
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }

    /// Swap lengths in periods (columns).
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// The full matrix.
    pub fn volatilities(&self) -> &Matrix {
        &self.volatilities
    }

    /// Volatility for exercise row `k` and length column `l`.
    pub fn volatility(&self, k: usize, l: usize) -> Result<Real> {
        let n = self.exercise_times.len();
        for idx in [k, l] {
            if idx >= n {
                return Err(Error::IndexOutOfRange { index: idx, size: n });
            }
        }
        Ok(self.volatilities[(k, l)])
    }
}

/// A market swaption volatility to calibrate to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwaptionVolatilityQuote {
    /// Exercise index `α`; the swaption exercises at fixing `α + 1`.
    pub exercise: usize,
    /// Swap length in periods; the swap ends at period `α + length`.
    pub length: usize,
    /// Quoted lognormal volatility.
    pub volatility: Real,
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// LIBOR market model with a volatility/correlation covariance.
#[derive(Debug, Clone)]
pub struct LiborForwardModel {
    process: LiborForwardProcess,
    proxy: Arc<CovarianceProxy>,
    generation: Generation,
    swaption_cache: VersionedCache<Arc<SwaptionVolatilityMatrix>>,
}

impl LiborForwardModel {
    /// Model on `schedule` driven by the covariance of `volatility` and
    /// `correlation`.
    pub fn from_schedule(
        schedule: ForwardRateSchedule,
        volatility: VolatilityModel,
        correlation: CorrelationModel,
    ) -> Result<Self> {
        let proxy = Arc::new(CovarianceProxy::new(volatility, correlation)?);
        let process = LiborForwardProcess::new(schedule, proxy.clone())?;
        Ok(Self {
            process,
            proxy,
            generation: Generation::initial(),
            swaption_cache: VersionedCache::new(),
        })
    }

    /// Build the covariance from `volatility` and `correlation` and install
    /// it in `process`.
    pub fn new(
        mut process: LiborForwardProcess,
        volatility: VolatilityModel,
        correlation: CorrelationModel,
    ) -> Result<Self> {
        let proxy = Arc::new(CovarianceProxy::new(volatility, correlation)?);
        process.set_covariance(proxy.clone())?;
        Ok(Self {
            process,
            proxy,
            generation: Generation::initial(),
            swaption_cache: VersionedCache::new(),
        })
    }

    /// The forward-rate process, driven by [`Self::covariance_proxy`].
    pub fn process(&self) -> &LiborForwardProcess {
        &self.process
    }

    /// Current covariance.
    pub fn covariance_proxy(&self) -> &Arc<CovarianceProxy> {
        &self.proxy
    }

    /// Parameter generation, bumped on every accepted `set_params`.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Calibration parameters, volatility block first.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.proxy.parameters()
    }

    /// Flattened parameter values.
    pub fn params(&self) -> Vec<Real> {
        self.proxy.params()
    }

    /// Replace every parameter; derived caches are invalidated.
    pub fn set_params(&mut self, values: &[Real]) -> Result<()> {
        let mut proxy = (*self.proxy).clone();
        proxy.set_params(values)?;
        let proxy = Arc::new(proxy);
        self.process.set_covariance(proxy.clone())?;
        self.proxy = proxy;
        self.generation = self.generation.next();
        debug!(generation = self.generation.value(), "model parameters updated");
        Ok(())
    }

    /// Discount factor from the seed curve.
    pub fn discount(&self, t: Time) -> DiscountFactor {
        self.process.schedule().curve().discount(t)
    }

    // ── Discount-bond options ────────────────────────────────────────────────

    /// Price of an option on the zero bond maturing at `bond_maturity`,
    /// exercised at `maturity`, both of which must be the boundaries of one
    /// accrual period.
    ///
    /// A put on the bond is a caplet on the period's rate with cap rate
    /// `(1/strike − 1)/τ`.
    pub fn discount_bond_option(
        &self,
        option_type: OptionType,
        strike: Real,
        maturity: Time,
        bond_maturity: Time,
    ) -> Result<Real> {
        ensure!(strike > 0.0, "bond strike must be positive, got {strike}");
        let starts = self.process.accrual_start_times();
        let ends = self.process.accrual_end_times();
        let (front, back) = (starts[0], starts[starts.len() - 1]);
        let tolerance = |x: Real| MATURITY_TOLERANCE * x.abs().max(1.0);
        let tol = tolerance(maturity);
        if !(maturity >= front - tol && maturity <= back + tol) {
            return Err(Error::ScheduleMismatch(format!(
                "option maturity {maturity} outside accrual starts [{front}, {back}]"
            )));
        }
        let i = lower_bound(starts, maturity - tol);
        let matches = |a: Real, b: Real| (a - b).abs() <= tolerance(a);
        if i >= starts.len() || !matches(maturity, starts[i]) || !matches(bond_maturity, ends[i]) {
            return Err(Error::ScheduleMismatch(format!(
                "option on [{maturity}, {bond_maturity}] does not match an accrual period"
            )));
        }

        let tenor = self.process.accrual_periods()[i];
        let forward = self.process.initial_values()[i];
        let cap_rate = (1.0 / strike - 1.0) / tenor;
        let variance = self
            .proxy
            .integrated_covariance_entry(i, i, self.process.fixing_times()[i], &[])?;
        let black = black_formula(option_type.flip(), cap_rate, forward, variance.sqrt(), 1.0)?;
        Ok(self.discount(bond_maturity) * tenor * black / (1.0 + cap_rate * tenor))
    }

    // ── Swap quantities ──────────────────────────────────────────────────────

    fn check_swap(&self, alpha: usize, beta: usize) -> Result<()> {
        ensure!(alpha < beta, "swap start {alpha} must precede its end {beta}");
        let n = self.process.size();
        if beta >= n {
            return Err(Error::IndexOutOfRange { index: beta, size: n });
        }
        Ok(())
    }

    /// Weights `w_i` (`i = α+1..=β`) expressing the forward swap rate as
    /// `Σ w_i f_i`, indexed from 0 with zeros up to `α`.
    pub fn swap_weights(&self, alpha: usize, beta: usize) -> Result<Vec<Real>> {
        self.check_swap(alpha, beta)?;
        let tau = self.process.accrual_periods();
        let forwards = self.process.initial_values();
        let mut weights = vec![0.0; beta + 1];
        let mut bond = 1.0;
        let mut total = 0.0;
        for i in alpha + 1..=beta {
            bond /= 1.0 + tau[i] * forwards[i];
            weights[i] = tau[i] * bond;
            total += weights[i];
        }
        for w in &mut weights[alpha + 1..] {
            *w /= total;
        }
        Ok(weights)
    }

    /// Forward swap rate `S_0(α, β)`.
    pub fn swaption_rate(&self, alpha: usize, beta: usize) -> Result<Rate> {
        let weights = self.swap_weights(alpha, beta)?;
        let forwards = self.process.initial_values();
        Ok((alpha + 1..=beta).map(|i| weights[i] * forwards[i]).sum())
    }

    /// Annuity `Σ τ_i P(T_i^end)` over periods `α+1..=β`.
    pub fn annuity(&self, alpha: usize, beta: usize) -> Result<Real> {
        self.check_swap(alpha, beta)?;
        let tau = self.process.accrual_periods();
        let ends = self.process.accrual_end_times();
        Ok((alpha + 1..=beta).map(|i| tau[i] * self.discount(ends[i])).sum())
    }

    /// Rebonato volatility of the swaption exercising at fixing `α + 1`
    /// into the swap over periods `α+1..=β`.
    pub fn swaption_volatility(&self, alpha: usize, beta: usize) -> Result<Real> {
        self.check_swap(alpha, beta)?;
        let t_alpha = self.process.fixing_times()[alpha + 1];
        let dim = beta - alpha;
        let mut variance = Matrix::zeros(dim, dim);
        for a in 0..dim {
            for b in a..dim {
                let v = self
                    .proxy
                    .integrated_covariance_entry(alpha + 1 + a, alpha + 1 + b, t_alpha, &[])?;
                variance[(a, b)] = v;
                variance[(b, a)] = v;
            }
        }
        self.rebonato(alpha, beta, t_alpha, &variance)
    }

    /// `sqrt(Σ w_i w_j f_i f_j V_ij / t_α) / S_0`, with `V` indexed from
    /// rate `α + 1`.
    fn rebonato(&self, alpha: usize, beta: usize, t_alpha: Time, variance: &Matrix) -> Result<Real> {
        let weights = self.swap_weights(alpha, beta)?;
        let forwards = self.process.initial_values();
        let mut sum = 0.0;
        for i in alpha + 1..=beta {
            for j in alpha + 1..=beta {
                sum += weights[i]
                    * weights[j]
                    * forwards[i]
                    * forwards[j]
                    * variance[(i - alpha - 1, j - alpha - 1)];
            }
        }
        Ok((sum / t_alpha).sqrt() / self.swaption_rate(alpha, beta)?)
    }

    /// Rebonato volatilities for every exercise `k < N/2` and length
    /// `1..=N/2`, cached until the parameters change.
    pub fn swaption_volatility_matrix(&self) -> Result<Arc<SwaptionVolatilityMatrix>> {
        self.swaption_cache
            .get_or_try_insert_with(self.generation, || self.build_swaption_matrix().map(Arc::new))
    }

    fn build_swaption_matrix(&self) -> Result<SwaptionVolatilityMatrix> {
        let size = self.process.size() / 2;
        ensure!(size > 0, "at least two forward rates are needed for swaptions");
        debug!(size, generation = self.generation.value(), "building swaption volatility matrix");
        let fixing = self.process.fixing_times();
        let mut volatilities = Matrix::zeros(size, size);
        for k in 0..size {
            let t_alpha = fixing[k + 1];
            let mut variance = Matrix::zeros(size, size);
            for a in 0..size {
                for b in a..size {
                    let v = self
                        .proxy
                        .integrated_covariance_entry(k + 1 + a, k + 1 + b, t_alpha, &[])?;
                    variance[(a, b)] = v;
                    variance[(b, a)] = v;
                }
            }
            for l in 1..=size {
                volatilities[(k, l - 1)] = self.rebonato(k, k + l, t_alpha, &variance)?;
            }
        }
        Ok(SwaptionVolatilityMatrix {
            exercise_times: fixing[1..=size].to_vec(),
            lengths: (1..=size).collect(),
            volatilities,
        })
    }

    // ── Calibration ──────────────────────────────────────────────────────────

    /// Least-squares fit of the parameters to swaption volatility quotes.
    ///
    /// On success the best parameters found are installed and the
    /// optimiser's result returned.
    pub fn calibrate(
        &mut self,
        quotes: &[SwaptionVolatilityQuote],
        optimizer: &Simplex,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        ensure!(!quotes.is_empty(), "no swaption quotes to calibrate to");
        for q in quotes {
            ensure!(q.length > 0, "swaption length must be at least one period");
            self.check_swap(q.exercise, q.exercise + q.length)?;
        }
        let constraint = ParameterConstraint::from_parameters(&self.parameters());
        let initial = Array::from_vec(self.params());
        let cost = SwaptionCalibration { model: self, quotes };
        debug!(quotes = quotes.len(), parameters = initial.size(), "calibrating to swaption volatilities");
        let result = optimizer.minimize(&cost, &constraint, &initial, end_criteria)?;
        self.set_params(result.x.as_slice())?;
        debug!(cost = result.value, iterations = result.iterations, "calibration finished");
        Ok(result)
    }
}

/// Residuals `model − market` of a set of swaption quotes.
struct SwaptionCalibration<'a> {
    model: &'a LiborForwardModel,
    quotes: &'a [SwaptionVolatilityQuote],
}

impl CostFunction for SwaptionCalibration<'_> {
    fn values(&self, x: &Array) -> Result<Array> {
        let mut trial = self.model.clone();
        if let Err(e) = trial.set_params(x.as_slice()) {
            return match e {
                Error::Configuration(_) => Ok(Array::from_element(self.quotes.len(), Real::INFINITY)),
                e => Err(e),
            };
        }
        self.quotes
            .iter()
            .map(|q| {
                trial
                    .swaption_volatility(q.exercise, q.exercise + q.length)
                    .map(|v| v - q.volatility)
            })
            .collect::<Result<Vec<_>>>()
            .map(Array::from_vec)
    }
}
