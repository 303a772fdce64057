//! # lmm-core
//!
//! Core types, traits, and error definitions for the LIBOR market model
//! workspace.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace – type aliases, the error hierarchy, option
//! and compounding enums, and the generation-counted [`VersionedCache`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Generation-counted caches invalidated on recalibration.
pub mod cache;

/// Compounding conventions.
pub mod compounding;

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Call / put option type.
pub mod option_type;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type of every rate, time and price.
pub type Real = f64;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A zero-bond price `P(0, T)`.
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A lognormal volatility, annualised.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use cache::{Generation, VersionedCache};
pub use compounding::Compounding;
pub use errors::{Error, Result};
pub use option_type::OptionType;
