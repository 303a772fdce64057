//! Compounding conventions.

use crate::{Real, Time};

/// How interest is compounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest `(1 + r/f)^(f·t)` with `f` periods per year.
    Compounded(u32),
    /// Continuously compounded: `e^(r·t)`
    Continuous,
}

impl Compounding {
    /// Growth factor of one unit invested at `rate` over `t` years.
    pub fn compound_factor(&self, rate: Real, t: Time) -> Real {
        match *self {
            Compounding::Simple => 1.0 + rate * t,
            Compounding::Compounded(f) => {
                let f = Real::from(f.max(1));
                (1.0 + rate / f).powf(f * t)
            }
            Compounding::Continuous => (rate * t).exp(),
        }
    }

    /// Continuously-compounded rate equivalent to `rate` under this
    /// convention over a horizon of `t` years.
    pub fn equivalent_continuous_rate(&self, rate: Real, t: Time) -> Real {
        match *self {
            Compounding::Continuous => rate,
            Compounding::Compounded(f) => {
                let f = Real::from(f.max(1));
                f * (1.0 + rate / f).ln()
            }
            Compounding::Simple => {
                if t <= 0.0 {
                    rate
                } else {
                    (1.0 + rate * t).ln() / t
                }
            }
        }
    }
}
