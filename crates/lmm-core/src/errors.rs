//! Error types for the LIBOR market model workspace.
//!
//! A single `thiserror`-derived enum whose variants separate the failure
//! kinds a caller has to tell apart: bad configuration, numerical
//! non-convergence, schedule/state mismatches and unsupported operations.
//! The `ensure!` and `fail!` convenience macros are defined here.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Invalid parameter domain, mismatched sizes, malformed inputs.
    ///
    /// Detected eagerly at construction or `set_params`.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A numerical routine failed to converge or hit its evaluation budget,
    /// or a calibration step had no feasible solution.
    #[error("numerical non-convergence: {0}")]
    NonConvergence(String),

    /// The request does not fit the schedule or tabulated data
    /// (irregular periods, maturity not found, time out of range).
    #[error("schedule mismatch: {0}")]
    ScheduleMismatch(String),

    /// The operation is not available for this model or input.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

impl Error {
    /// `true` for [`Error::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// `true` for [`Error::NonConvergence`].
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Error::NonConvergence(_))
    }

    /// `true` for [`Error::ScheduleMismatch`].
    pub fn is_schedule_mismatch(&self) -> bool {
        matches!(self, Error::ScheduleMismatch(_))
    }

    /// `true` for [`Error::Unsupported`].
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check a precondition on inputs.
///
/// Returns `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lmm_core::{ensure, errors::Error};
/// fn positive(x: f64) -> lmm_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}

/// Bail out with a runtime error.
///
/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use lmm_core::{fail, errors::Error};
/// fn always_err() -> lmm_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
