//! # lmm
//!
//! A LIBOR market model: pluggable covariance parameterizations of the
//! forward-rate curve, predictor-corrector evolution under the spot
//! measure, and closed-form swaption volatilities and caplet prices.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `lmm-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! lmm = "0.1"
//! ```
//!
//! ```rust
//! use lmm::models::{CorrelationModel, ExponentialCorrelation};
//!
//! let corr: CorrelationModel = ExponentialCorrelation::new(3, 0.1).unwrap().into();
//! let rho = corr.correlation(0.0, &[]);
//! assert!((rho[(0, 1)] - (-0.1_f64).exp()).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use lmm_core as core;

/// Day counters, calendars, and accrual schedules.
pub use lmm_time as time;

/// Linear algebra, quadrature, optimisation, RNG.
pub use lmm_math as math;

/// Yield curves and caplet volatility structures.
pub use lmm_termstructures as termstructures;

/// Covariance parameterizations, the forward-rate process and the calibrated model.
pub use lmm_models as models;

/// Monte Carlo simulation.
pub use lmm_methods as methods;

/// Pricing engines.
pub use lmm_pricingengines as pricingengines;
