//! # lmm-methods
//!
//! Monte Carlo simulation of multi-factor processes: time grids, path
//! generation with optional antithetic draws, path pricers and a
//! simulation driver that runs sequentially or on the rayon pool.
//!
//! # Modules
//!
//! * [`time_grid`] — grids containing every mandatory time
//! * [`monte_carlo`] — path generation, path pricing, MC model orchestrator

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Monte Carlo simulation: path generation, pricing, statistics.
pub mod monte_carlo;

/// Simulation time grids.
pub mod time_grid;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use monte_carlo::{
    MonteCarloModel, MultiPath, MultiPathGenerator, MultiPathPricer, SimulationResult, SimulationSettings,
};
pub use time_grid::TimeGrid;
