//! Monte Carlo simulation framework.
//!
//! * [`MultiPath`] — one realisation of a multi-dimensional process on a
//!   [`TimeGrid`]
//! * [`MultiPathGenerator`] — evolves a [`StochasticProcess`] with Gaussian
//!   draws, optionally antithetic
//! * [`MultiPathPricer`] — trait for evaluating payoffs on generated paths
//! * [`MonteCarloModel`] — runs a pricer over many paths, sequentially or
//!   on the rayon pool

use crate::time_grid::TimeGrid;
use lmm_core::{ensure, errors::Result, Real, Time};
use lmm_math::random_numbers::{GaussianSequenceGenerator, GeneratorKind};
use lmm_math::Statistics;
use lmm_models::StochasticProcess;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Paths simulated by one parallel work item.
const CHUNK_PATHS: usize = 1024;

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Monte Carlo configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of samples; with antithetic draws each sample averages a pair
    /// of paths.
    pub paths: usize,
    /// Minimum number of grid steps per year of simulated time.
    pub steps_per_year: usize,
    /// Seed of the Gaussian generator.
    pub seed: u64,
    /// Pair every path with its mirror image.
    pub antithetic: bool,
    /// Simulate chunks of paths on the rayon pool.
    pub parallel: bool,
    /// Random number backend.
    pub generator: GeneratorKind,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            paths: 10_000,
            steps_per_year: 4,
            seed: 42,
            antithetic: false,
            parallel: false,
            generator: GeneratorKind::default(),
        }
    }
}

/// Point estimate of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    /// Sample mean.
    pub mean: Real,
    /// Standard error of the mean.
    pub error_estimate: Real,
    /// Number of samples.
    pub samples: usize,
}

impl SimulationResult {
    fn from_statistics(stats: &Statistics) -> Result<Self> {
        ensure!(stats.samples() > 0, "simulation produced no samples");
        Ok(Self {
            mean: stats.mean().unwrap_or(0.0),
            error_estimate: stats.error_estimate().unwrap_or(0.0),
            samples: stats.samples(),
        })
    }
}

// ─── MultiPath ────────────────────────────────────────────────────────────────

/// A sample path of a multi-dimensional process: one state per grid time.
#[derive(Debug, Clone)]
pub struct MultiPath {
    times: Vec<Time>,
    states: Vec<Vec<Real>>,
}

impl MultiPath {
    /// Grid times, starting at zero.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// State at grid index `i`.
    pub fn state(&self, i: usize) -> &[Real] {
        &self.states[i]
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the path holds no points.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Dimension of each state.
    pub fn asset_count(&self) -> usize {
        self.states.first().map_or(0, Vec::len)
    }

    /// Values of component `asset` along the path.
    pub fn asset(&self, asset: usize) -> Vec<Real> {
        self.states.iter().map(|s| s[asset]).collect()
    }
}

// ─── MultiPathGenerator ───────────────────────────────────────────────────────

/// Generates paths of a process by repeated calls to
/// [`StochasticProcess::evolve`].
///
/// With antithetic sampling every second path reuses the previous draws
/// with their signs flipped.
pub struct MultiPathGenerator<'a, P: StochasticProcess + ?Sized> {
    process: &'a P,
    grid: TimeGrid,
    rng: GaussianSequenceGenerator,
    antithetic: bool,
    draws: Vec<Real>,
    mirror_next: bool,
}

impl<'a, P: StochasticProcess + ?Sized> MultiPathGenerator<'a, P> {
    /// Generator over `grid` drawing from `rng`, whose dimension must be
    /// `factors × steps`.
    pub fn new(process: &'a P, grid: TimeGrid, rng: GaussianSequenceGenerator, antithetic: bool) -> Result<Self> {
        let dimension = process.factors() * grid.steps();
        ensure!(
            rng.dimension() == dimension,
            "generator dimension {} differs from factors x steps = {dimension}",
            rng.dimension()
        );
        Ok(Self {
            process,
            grid,
            rng,
            antithetic,
            draws: vec![0.0; dimension],
            mirror_next: false,
        })
    }

    /// Seeded generator of the given kind sized for `process` and `grid`.
    pub fn with_seed(process: &'a P, grid: TimeGrid, kind: GeneratorKind, seed: u64, antithetic: bool) -> Result<Self> {
        let rng = GaussianSequenceGenerator::new(kind, process.factors() * grid.steps(), seed);
        Self::new(process, grid, rng, antithetic)
    }

    /// Simulation grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Next sample path.
    pub fn next_path(&mut self) -> Result<MultiPath> {
        if self.antithetic && self.mirror_next {
            for z in &mut self.draws {
                *z = -*z;
            }
        } else {
            self.rng.fill(&mut self.draws);
        }
        self.mirror_next = self.antithetic && !self.mirror_next;

        let factors = self.process.factors();
        let mut states = Vec::with_capacity(self.grid.size());
        let mut x = self.process.initial_values();
        for step in 0..self.grid.steps() {
            let dw = &self.draws[step * factors..(step + 1) * factors];
            let next = self.process.evolve(self.grid.time(step), &x, self.grid.dt(step), dw)?;
            states.push(std::mem::replace(&mut x, next));
        }
        states.push(x);
        Ok(MultiPath {
            times: self.grid.times().to_vec(),
            states,
        })
    }
}

// ─── MultiPathPricer ──────────────────────────────────────────────────────────

/// Evaluates a discounted payoff on a path.
pub trait MultiPathPricer: Send + Sync {
    /// Value of one path.
    fn value(&self, path: &MultiPath) -> Result<Real>;
}

// ─── MonteCarloModel ──────────────────────────────────────────────────────────

/// Runs a [`MultiPathPricer`] over simulated paths and gathers statistics.
pub struct MonteCarloModel<'a, P: StochasticProcess + ?Sized> {
    process: &'a P,
    grid: TimeGrid,
    settings: SimulationSettings,
}

impl<'a, P: StochasticProcess + ?Sized> MonteCarloModel<'a, P> {
    /// Model simulating `process` on `grid`.
    pub fn new(process: &'a P, grid: TimeGrid, settings: SimulationSettings) -> Result<Self> {
        ensure!(settings.paths > 0, "at least one path is required");
        Ok(Self {
            process,
            grid,
            settings,
        })
    }

    /// Simulation grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Run sequentially or in parallel as configured.
    pub fn run<Q: MultiPathPricer>(&self, pricer: &Q) -> Result<SimulationResult> {
        if self.settings.parallel {
            self.simulate_parallel(pricer)
        } else {
            self.simulate(pricer)
        }
    }

    /// All samples from a single generator seeded with `settings.seed`.
    pub fn simulate<Q: MultiPathPricer>(&self, pricer: &Q) -> Result<SimulationResult> {
        debug!(paths = self.settings.paths, steps = self.grid.steps(), "monte carlo simulation");
        let stats = self.simulate_chunk(pricer, self.settings.paths, self.settings.seed)?;
        SimulationResult::from_statistics(&stats)
    }

    /// Fixed-size chunks of samples on the rayon pool, chunk `i` seeded
    /// with `seed + i·6364136223846793005` (wrapping).
    ///
    /// The result depends on the chunking but not on the thread count.
    pub fn simulate_parallel<Q: MultiPathPricer>(&self, pricer: &Q) -> Result<SimulationResult> {
        let chunks = split_paths(self.settings.paths, CHUNK_PATHS);
        debug!(
            paths = self.settings.paths,
            chunks = chunks.len(),
            threads = rayon::current_num_threads(),
            "parallel monte carlo simulation"
        );
        let base_seed = self.settings.seed;
        let partial = chunks
            .par_iter()
            .enumerate()
            .map(|(i, &n)| {
                let seed = base_seed.wrapping_add((i as u64).wrapping_mul(6_364_136_223_846_793_005));
                self.simulate_chunk(pricer, n, seed)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut stats = Statistics::new();
        for s in &partial {
            stats.merge(s);
        }
        SimulationResult::from_statistics(&stats)
    }

    fn simulate_chunk<Q: MultiPathPricer>(&self, pricer: &Q, samples: usize, seed: u64) -> Result<Statistics> {
        let mut generator = MultiPathGenerator::with_seed(
            self.process,
            self.grid.clone(),
            self.settings.generator,
            seed,
            self.settings.antithetic,
        )?;
        let mut stats = Statistics::new();
        for _ in 0..samples {
            let value = if self.settings.antithetic {
                let first = pricer.value(&generator.next_path()?)?;
                let mirror = pricer.value(&generator.next_path()?)?;
                0.5 * (first + mirror)
            } else {
                pricer.value(&generator.next_path()?)?
            };
            stats.add(value);
        }
        Ok(stats)
    }
}

/// `total` split into chunks of at most `chunk` items.
fn split_paths(total: usize, chunk: usize) -> Vec<usize> {
    let chunk = chunk.max(1);
    let full = total / chunk;
    let mut sizes = vec![chunk; full];
    if total % chunk > 0 {
        sizes.push(total % chunk);
    }
    sizes
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lmm_math::Matrix;

    /// Geometric Brownian motion `dS = μ S dt + σ S dW` stepped exactly.
    #[derive(Debug)]
    struct Gbm {
        s0: Real,
        mu: Real,
        sigma: Real,
    }

    impl StochasticProcess for Gbm {
        fn size(&self) -> usize {
            1
        }

        fn initial_values(&self) -> Vec<Real> {
            vec![self.s0]
        }

        fn drift(&self, _t: Time, x: &[Real]) -> Result<Vec<Real>> {
            Ok(vec![self.mu * x[0]])
        }

        fn diffusion(&self, _t: Time, x: &[Real]) -> Result<Matrix> {
            Ok(Matrix::from_element(1, 1, self.sigma * x[0]))
        }

        fn evolve(&self, _t: Time, x: &[Real], dt: Time, dw: &[Real]) -> Result<Vec<Real>> {
            let s = self.sigma;
            Ok(vec![x[0] * ((self.mu - 0.5 * s * s) * dt + s * dt.sqrt() * dw[0]).exp()])
        }
    }

    struct Terminal;

    impl MultiPathPricer for Terminal {
        fn value(&self, path: &MultiPath) -> Result<Real> {
            Ok(path.state(path.len() - 1)[0])
        }
    }

    fn gbm() -> Gbm {
        Gbm {
            s0: 100.0,
            mu: 0.05,
            sigma: 0.2,
        }
    }

    #[test]
    fn paths_follow_the_grid() {
        let p = gbm();
        let grid = TimeGrid::uniform(1.0, 12).unwrap();
        let mut g = MultiPathGenerator::with_seed(&p, grid, GeneratorKind::MersenneTwister, 7, false).unwrap();
        let path = g.next_path().unwrap();
        assert_eq!(path.len(), 13);
        assert_eq!(path.asset_count(), 1);
        assert_eq!(path.state(0), &[100.0]);
        assert!(path.asset(0).iter().all(|&v| v > 0.0));
    }

    #[test]
    fn antithetic_paths_mirror_draws() {
        let p = gbm();
        let grid = TimeGrid::uniform(1.0, 1).unwrap();
        let mut g = MultiPathGenerator::with_seed(&p, grid, GeneratorKind::MersenneTwister, 7, true).unwrap();
        let up = g.next_path().unwrap().state(1)[0];
        let down = g.next_path().unwrap().state(1)[0];
        // log-returns are symmetric around the drift
        let drift = (0.05 - 0.02) * 1.0;
        assert!(((up / 100.0).ln() - drift + (down / 100.0).ln() - drift).abs() < 1e-12);
    }

    #[test]
    fn mean_of_gbm_is_forward() {
        let p = gbm();
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        let settings = SimulationSettings {
            paths: 20_000,
            ..SimulationSettings::default()
        };
        let mc = MonteCarloModel::new(&p, grid, settings).unwrap();
        let r = mc.simulate(&Terminal).unwrap();
        let expected = 100.0 * 0.05_f64.exp();
        assert_eq!(r.samples, 20_000);
        assert!((r.mean - expected).abs() < 4.0 * r.error_estimate);
    }

    #[test]
    fn parallel_run_is_reproducible() {
        let p = gbm();
        let grid = TimeGrid::uniform(1.0, 2).unwrap();
        let settings = SimulationSettings {
            paths: 5_000,
            parallel: true,
            antithetic: true,
            generator: GeneratorKind::StdRng,
            ..SimulationSettings::default()
        };
        let mc = MonteCarloModel::new(&p, grid, settings).unwrap();
        let a = mc.run(&Terminal).unwrap();
        let b = mc.run(&Terminal).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.samples, 5_000);
        let expected = 100.0 * 0.05_f64.exp();
        assert!((a.mean - expected).abs() < 4.0 * a.error_estimate);
    }

    #[test]
    fn generator_dimension_is_checked() {
        let p = gbm();
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        let rng = GaussianSequenceGenerator::new(GeneratorKind::MersenneTwister, 3, 1);
        assert!(MultiPathGenerator::new(&p, grid, rng, false).is_err());
    }

    #[test]
    fn chunking() {
        assert_eq!(split_paths(2500, 1024), vec![1024, 1024, 452]);
        assert_eq!(split_paths(1024, 1024), vec![1024]);
        assert!(split_paths(0, 1024).is_empty());
    }
}
