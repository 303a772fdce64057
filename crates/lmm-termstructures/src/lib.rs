//! # lmm-termstructures
//!
//! Market inputs of the LIBOR market model: yield curves that seed the
//! forward-rate vector and caplet volatility structures that drive the
//! Hull-White covariance calibration.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Caplet volatility term structures.
pub mod caplet_volatility;

/// Constant-forward yield curve.
pub mod flat_forward;

/// Log-linear discount-factor curve.
pub mod interpolated_discount_curve;

/// Base term-structure trait.
pub mod term_structure;

/// Yield term-structure trait.
pub mod yield_term_structure;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use caplet_volatility::{CapletVolatilityCurve, CapletVolatilityStructure, ConstantCapletVolatility};
pub use flat_forward::FlatForward;
pub use interpolated_discount_curve::InterpolatedDiscountCurve;
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
