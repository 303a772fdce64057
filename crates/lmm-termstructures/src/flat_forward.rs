//! `FlatForward`: a curve with a single constant rate.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use lmm_core::{Compounding, DiscountFactor, Rate, Time};
use lmm_time::{Date, DayCounter};
use std::sync::Arc;

/// Constant-rate yield curve; `P(t) = exp(−r t)` with `r` the continuous
/// equivalent of the quoted rate.
#[derive(Debug, Clone)]
pub struct FlatForward {
    reference_date: Date,
    day_counter: Arc<dyn DayCounter>,
    rate: Rate,
}

impl FlatForward {
    /// Flat curve quoting `rate` under `compounding`.
    pub fn new(
        reference_date: Date,
        rate: Rate,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
    ) -> Self {
        Self {
            reference_date,
            day_counter,
            rate: compounding.equivalent_continuous_rate(rate, 1.0),
        }
    }

    /// Flat curve with a continuously-compounded rate.
    pub fn continuous(reference_date: Date, rate: Rate, day_counter: Arc<dyn DayCounter>) -> Self {
        Self::new(reference_date, rate, day_counter, Compounding::Continuous)
    }

    /// The continuously-compounded rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }
}
