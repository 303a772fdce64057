//! # lmm-pricingengines
//!
//! Pricing engines on the LIBOR forward model.
//!
//! ## Engines
//!
//! - [`AnalyticCapFloorEngine`] — caps and floors as strips of discount-bond options
//! - [`LfmSwaptionEngine`] — Black swaption prices with Rebonato volatilities
//! - [`McCapletEngine`] — Monte Carlo caps and floors under the spot measure

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_cap_floor_engine;
pub mod instrument;
pub mod lfm_swaption_engine;
pub mod mc_caplet_engine;

pub use analytic_cap_floor_engine::AnalyticCapFloorEngine;
pub use instrument::{CapFloor, CapFloorType, PricingEngine, PricingResults, Swaption, SwaptionType};
pub use lfm_swaption_engine::LfmSwaptionEngine;
pub use mc_caplet_engine::McCapletEngine;
