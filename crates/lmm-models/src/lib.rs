//! # lmm-models
//!
//! The LIBOR market model: covariance parameterizations of the forward-rate
//! vector, the spot-measure forward-rate process and the calibrated model.
//!
//! ## Composition
//!
//! ```text
//! CovarianceParameterization
//! ├── CovarianceProxy            → VolatilityModel × CorrelationModel
//! └── HullWhiteParameterization  → caplet volatilities × target correlation
//!
//! LiborForwardProcess  → ForwardRateSchedule + CovarianceParameterization
//! LiborForwardModel    → LiborForwardProcess + CovarianceProxy
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Infrastructure ───────────────────────────────────────────────────────
pub mod parameter;
pub mod stochastic_process;

// ── Covariance building blocks ───────────────────────────────────────────
pub mod correlation;
pub mod covariance;
pub mod covariance_proxy;
pub mod hull_white;
pub mod volatility;

// ── Forward-rate dynamics ────────────────────────────────────────────────
pub mod model;
pub mod process;
pub mod schedule;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use correlation::{CorrelationModel, ExponentialCorrelation, LinearExponentialCorrelation};
pub use covariance::{integrated_covariance_by_quadrature, CovarianceParameterization};
pub use covariance_proxy::CovarianceProxy;
pub use hull_white::HullWhiteParameterization;
pub use model::{LiborForwardModel, SwaptionVolatilityMatrix, SwaptionVolatilityQuote};
pub use parameter::{Constraint, Parameter, ParameterConstraint, ParameterLayout};
pub use process::LiborForwardProcess;
pub use schedule::ForwardRateSchedule;
pub use stochastic_process::StochasticProcess;
pub use volatility::{FixedVolatility, LinearExponentialVolatility, VolatilityModel};
